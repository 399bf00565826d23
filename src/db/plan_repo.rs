// src/db/plan_repo.rs

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::common::error::AppError;
use crate::models::plan::PlanItem;

// O arquivo do plano compartilha o formato {"processes": [...]} do arquivo
// de processos, por herança do sistema de planilhas que o gera.
#[derive(Debug, Default, Deserialize)]
struct PlanFile {
    #[serde(default)]
    processes: Vec<PlanItem>,
}

/// Coleção somente-leitura dos itens do plano anual, carregada uma única vez
/// na subida do servidor.
#[derive(Debug, Clone)]
pub struct PlanRepository {
    items: Arc<Vec<PlanItem>>,
}

impl PlanRepository {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let items = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => {
                let file: PlanFile = serde_json::from_str(&raw).map_err(|e| {
                    AppError::StorageCorrupt(format!("{}: {}", path.display(), e))
                })?;
                file.processes
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("Arquivo do plano {} não existe; plano vazio.", path.display());
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!("📋 Plano anual carregado: {} itens", items.len());
        Ok(Self { items: Arc::new(items) })
    }

    /// Constrói o repositório direto de uma coleção em memória.
    pub fn from_items(items: Vec<PlanItem>) -> Self {
        Self { items: Arc::new(items) }
    }

    pub fn all(&self) -> &[PlanItem] {
        &self.items
    }

    pub fn get(&self, id: u64) -> Option<&PlanItem> {
        self.items.iter().find(|item| item.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_yields_empty_plan() {
        let dir = tempfile::tempdir().unwrap();
        let repo = PlanRepository::load(dir.path().join("plano.json")).await.unwrap();
        assert!(repo.all().is_empty());
    }

    #[tokio::test]
    async fn loads_items_from_processes_shaped_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plano.json");
        tokio::fs::write(
            &path,
            r#"{
                "processes": [
                    { "id": 1, "object": "Computadores", "value": 50000.0, "deadline": "2025-11-30", "priority": "Alta", "type": "Equipamento" },
                    { "id": 2, "object": "Merenda escolar", "value": 120000.0, "priority": "Mídia", "type": "Material de Consumo" }
                ]
            }"#,
        )
        .await
        .unwrap();

        let repo = PlanRepository::load(&path).await.unwrap();
        assert_eq!(repo.all().len(), 2);
        assert_eq!(repo.get(2).unwrap().priority, crate::models::plan::Priority::Media);
        assert!(repo.get(99).is_none());
    }

    #[tokio::test]
    async fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plano.json");
        tokio::fs::write(&path, "{{{").await.unwrap();

        let err = PlanRepository::load(&path).await.unwrap_err();
        assert!(matches!(err, AppError::StorageCorrupt(_)));
    }
}
