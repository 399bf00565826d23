// src/models/process.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::common::forms::{double_option, flexible_bool_opt, flexible_decimal_opt};

// --- ENUMS ---

/// Fase do ciclo de vida de um processo de contratação.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
pub enum Fase {
    #[default]
    #[serde(rename = "Não Iniciado")]
    NaoIniciado,
    #[serde(rename = "Planejamento")]
    Planejamento,
    #[serde(rename = "Em Licitação")]
    EmLicitacao,
    #[serde(rename = "Contratado")]
    Contratado,
}

impl Fase {
    pub const ALL: [Fase; 4] = [
        Fase::NaoIniciado,
        Fase::Planejamento,
        Fase::EmLicitacao,
        Fase::Contratado,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Fase::NaoIniciado => "Não Iniciado",
            Fase::Planejamento => "Planejamento",
            Fase::EmLicitacao => "Em Licitação",
            Fase::Contratado => "Contratado",
        }
    }
}

impl std::fmt::Display for Fase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// --- ESTRUTURAS DE APOIO ---

/// Setor e responsável atuais pelo processo. A comparação é textual exata,
/// sem normalização.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[validate(length(min = 1, message = "O setor é obrigatório"))]
    pub sector: String,
    #[serde(default)]
    pub responsible: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlertInfo {
    #[serde(default)]
    pub note: String,
    pub alert_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub filename: String,
    pub original_name: String,
    pub path: String,
}

/// Valor registrado em cada entrada do histórico de fases. Embrulha o enum
/// para que a entrada serialize como `{"fase": ..., "startDate": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaseEntry {
    pub fase: Fase,
}

// --- HISTÓRICO ---

/// Registro de intervalos de um atributo ao longo do tempo. A entrada aberta
/// é um campo próprio (`current`), separado das fechadas, então o invariante
/// "exatamente uma entrada sem data de fim" vale por construção. No JSON o
/// registro continua sendo o array ordenado de sempre, com a última entrada
/// aberta (`endDate: null`).
#[derive(Debug, Clone, PartialEq)]
pub struct AuditLog<T> {
    closed: Vec<ClosedEntry<T>>,
    current: OpenEntry<T>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedEntry<T> {
    pub value: T,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenEntry<T> {
    pub value: T,
    pub start_date: DateTime<Utc>,
}

impl<T: Clone + PartialEq> AuditLog<T> {
    pub fn open(value: T, at: DateTime<Utc>) -> Self {
        Self {
            closed: Vec::new(),
            current: OpenEntry { value, start_date: at },
        }
    }

    pub fn current(&self) -> &T {
        &self.current.value
    }

    pub fn current_since(&self) -> DateTime<Utc> {
        self.current.start_date
    }

    pub fn closed(&self) -> &[ClosedEntry<T>] {
        &self.closed
    }

    pub fn len(&self) -> usize {
        self.closed.len() + 1
    }

    /// Fecha a entrada atual em `closed_at` e abre uma nova em `started_at`.
    /// Sem efeito (retorna `false`) quando o valor não muda.
    pub fn record(&mut self, value: T, closed_at: DateTime<Utc>, started_at: DateTime<Utc>) -> bool {
        if value == self.current.value {
            return false;
        }
        let previous = std::mem::replace(&mut self.current, OpenEntry { value, start_date: started_at });
        self.closed.push(ClosedEntry {
            value: previous.value,
            start_date: previous.start_date,
            end_date: closed_at,
        });
        true
    }

    /// Reescreve a data de início da primeira entrada (usado quando a data
    /// oficial de abertura do processo é corrigida a posteriori).
    pub fn retime_first(&mut self, at: DateTime<Utc>) {
        match self.closed.first_mut() {
            Some(first) => first.start_date = at,
            None => self.current.start_date = at,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEntry<T> {
    #[serde(flatten)]
    value: T,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
}

impl<T: Serialize + Clone> Serialize for AuditLog<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut entries: Vec<WireEntry<T>> = self
            .closed
            .iter()
            .map(|e| WireEntry {
                value: e.value.clone(),
                start_date: e.start_date,
                end_date: Some(e.end_date),
            })
            .collect();
        entries.push(WireEntry {
            value: self.current.value.clone(),
            start_date: self.current.start_date,
            end_date: None,
        });
        entries.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for AuditLog<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        let mut entries = Vec::<WireEntry<T>>::deserialize(deserializer)?;
        let Some(last) = entries.pop() else {
            return Err(D::Error::custom("histórico vazio"));
        };
        if last.end_date.is_some() {
            return Err(D::Error::custom("a última entrada do histórico deve estar aberta"));
        }
        let mut closed = Vec::with_capacity(entries.len());
        for entry in entries {
            let Some(end_date) = entry.end_date else {
                return Err(D::Error::custom("entrada intermediária do histórico sem data de fim"));
            };
            closed.push(ClosedEntry {
                value: entry.value,
                start_date: entry.start_date,
                end_date,
            });
        }
        Ok(AuditLog {
            closed,
            current: OpenEntry { value: last.value, start_date: last.start_date },
        })
    }
}

// --- O PROCESSO ---

pub fn default_modality() -> String {
    "A definir".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    pub id: u64,
    #[serde(default)]
    pub process_number: Option<String>,
    pub object: String,
    /// Valor estimado da contratação.
    pub value: Decimal,
    pub fase: Fase,
    #[serde(default = "default_modality")]
    pub modality: String,
    #[serde(rename = "type", default)]
    pub process_type: Option<String>,
    #[serde(default)]
    pub priority: Option<crate::models::plan::Priority>,
    pub location: Location,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub plan_id: Option<u64>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    // Só têm significado quando fase = Contratado; ignorados nas agregações
    // fora dela.
    #[serde(default)]
    pub purchased_value: Option<Decimal>,
    #[serde(default)]
    pub contract_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_important: bool,
    #[serde(default)]
    pub alert_info: Option<AlertInfo>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub creation_date: DateTime<Utc>,
    #[schema(value_type = Vec<Object>)]
    pub history: AuditLog<FaseEntry>,
    #[schema(value_type = Vec<Object>)]
    pub location_history: AuditLog<Location>,
}

// --- PAYLOADS ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProcessPayload {
    #[serde(default)]
    pub process_number: Option<String>,

    #[validate(length(min = 1, message = "O objeto é obrigatório"))]
    pub object: String,

    #[validate(required(message = "O valor estimado é obrigatório"))]
    #[serde(default, deserialize_with = "flexible_decimal_opt")]
    #[schema(value_type = Option<f64>)]
    pub value: Option<Decimal>,

    #[serde(default)]
    pub fase: Fase,

    #[serde(default = "default_modality")]
    pub modality: String,

    #[serde(rename = "type", default)]
    pub process_type: Option<String>,

    #[serde(default)]
    pub priority: Option<crate::models::plan::Priority>,

    #[validate(nested)]
    pub location: Location,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub plan_id: Option<u64>,

    #[serde(default)]
    pub deadline: Option<NaiveDate>,

    /// Data oficial de abertura; na ausência, vale o instante da criação.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    #[serde(default)]
    pub contract_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "flexible_decimal_opt")]
    #[schema(value_type = Option<f64>)]
    pub purchased_value: Option<Decimal>,

    #[serde(default)]
    pub is_important: bool,

    #[serde(default)]
    pub alert_info: Option<AlertInfo>,
}

/// Atualização parcial: só os campos presentes são aplicados.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProcessPayload {
    #[serde(default)]
    pub process_number: Option<String>,

    #[serde(default)]
    pub object: Option<String>,

    #[serde(default, deserialize_with = "flexible_decimal_opt")]
    #[schema(value_type = Option<f64>)]
    pub value: Option<Decimal>,

    #[serde(default)]
    pub fase: Option<Fase>,

    #[serde(default)]
    pub modality: Option<String>,

    #[serde(rename = "type", default)]
    pub process_type: Option<String>,

    #[serde(default)]
    pub priority: Option<crate::models::plan::Priority>,

    #[validate(nested)]
    #[serde(default)]
    pub location: Option<Location>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub plan_id: Option<u64>,

    #[serde(default)]
    pub deadline: Option<NaiveDate>,

    /// Corrige a data de abertura do processo (e do primeiro intervalo dos
    /// dois históricos).
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    #[serde(default)]
    pub contract_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "flexible_decimal_opt")]
    #[schema(value_type = Option<f64>)]
    pub purchased_value: Option<Decimal>,

    #[serde(default, deserialize_with = "flexible_bool_opt")]
    pub is_important: Option<bool>,

    /// `null` explícito limpa o alerta; campo ausente não mexe nele.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<AlertInfo>)]
    pub alert_info: Option<Option<AlertInfo>>,

    /// `"false"` desliga o registro de histórico desta atualização
    /// (correções em massa sem trilha de auditoria).
    #[serde(default, deserialize_with = "flexible_bool_opt")]
    pub log_history: Option<bool>,
}

impl UpdateProcessPayload {
    pub fn log_enabled(&self) -> bool {
        self.log_history.unwrap_or(true)
    }
}
