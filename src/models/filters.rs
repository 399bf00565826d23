// src/models/filters.rs

use chrono::Datelike;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::plan::Priority;
use crate::models::process::{Fase, Process};

/// Filtros nomeados dos cartões do painel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SpecialFilter {
    /// Tudo que ainda não foi contratado.
    Active,
    /// Em planejamento ou em licitação.
    Pending,
}

/// Predicados composáveis sobre a coleção de processos. Todos os campos são
/// opcionais; um filtro vazio aceita qualquer processo.
#[derive(Debug, Clone, Default, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase", default)]
#[into_params(parameter_in = Query)]
pub struct ProcessFilter {
    pub fase: Option<Fase>,

    #[serde(rename = "type")]
    pub process_type: Option<String>,

    pub modality: Option<String>,

    pub priority: Option<Priority>,

    /// Busca textual (caso-insensível) em número do processo e objeto.
    pub search: Option<String>,

    /// Mês da contratação, índice 0-11.
    #[validate(range(max = 11, message = "O mês deve estar entre 0 e 11"))]
    pub month: Option<u32>,

    pub filter: Option<SpecialFilter>,
}

impl ProcessFilter {
    pub fn matches(&self, process: &Process) -> bool {
        if let Some(special) = self.filter {
            let ok = match special {
                SpecialFilter::Active => process.fase != Fase::Contratado,
                SpecialFilter::Pending => {
                    matches!(process.fase, Fase::Planejamento | Fase::EmLicitacao)
                }
            };
            if !ok {
                return false;
            }
        }

        if let Some(fase) = self.fase {
            if process.fase != fase {
                return false;
            }
        }

        if let Some(ref wanted) = self.process_type {
            if process.process_type.as_deref() != Some(wanted.as_str()) {
                return false;
            }
        }

        if let Some(ref wanted) = self.modality {
            if process.modality != *wanted {
                return false;
            }
        }

        if let Some(wanted) = self.priority {
            if process.priority != Some(wanted) {
                return false;
            }
        }

        if let Some(ref term) = self.search {
            let term = term.to_lowercase();
            let number_match = process
                .process_number
                .as_deref()
                .map(|n| n.to_lowercase().contains(&term))
                .unwrap_or(false);
            let object_match = process.object.to_lowercase().contains(&term);
            if !number_match && !object_match {
                return false;
            }
        }

        if let Some(month) = self.month {
            let matches_month = process
                .contract_date
                .map(|d| d.month0() == month)
                .unwrap_or(false);
            if !matches_month {
                return false;
            }
        }

        true
    }
}
