// src/models/plan.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::process::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Priority {
    Alta,
    // Planilhas antigas trazem a grafia errada "Mídia"; aceitamos e
    // normalizamos na carga.
    #[serde(rename = "Média", alias = "Mídia")]
    Media,
    Baixa,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Priority::Alta => "Alta",
            Priority::Media => "Média",
            Priority::Baixa => "Baixa",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Item do plano anual de contratações. Dado de referência, imutável
/// durante a sessão; nunca alterado por este backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanItem {
    pub id: u64,
    pub object: String,
    pub value: Decimal,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    pub priority: Priority,
    #[serde(rename = "type", default)]
    pub item_type: Option<String>,
}

/// Situação derivada de um item do plano frente aos processos que o
/// referenciam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PlanStatus {
    #[serde(rename = "Não Iniciado")]
    NaoIniciado,
    #[serde(rename = "Em Andamento")]
    EmAndamento,
    #[serde(rename = "Executado")]
    Executado,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanItemOverview {
    #[serde(flatten)]
    pub item: PlanItem,
    pub status: PlanStatus,
}

/// Payload de "iniciar" um item do plano: os dados do item são copiados
/// para o novo processo, o chamador só informa o que o plano não tem.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartFromPlanPayload {
    #[validate(nested)]
    pub location: Location,

    #[serde(default)]
    pub process_number: Option<String>,

    #[serde(default)]
    pub modality: Option<String>,

    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    #[serde(default)]
    pub description: Option<String>,
}
