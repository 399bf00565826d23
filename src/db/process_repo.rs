// src/db/process_repo.rs

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::common::error::AppError;
use crate::models::process::Process;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProcessFile {
    #[serde(default)]
    processes: Vec<Process>,
    // Marca d'água de ids: garante que um id nunca é reutilizado, mesmo que
    // o processo de maior id seja excluído e o servidor reinicie.
    #[serde(default)]
    next_id: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessFileRef<'a> {
    processes: &'a [Process],
    next_id: u64,
}

struct Store {
    path: PathBuf,
    processes: Vec<Process>,
    next_id: u64,
}

impl Store {
    async fn persist(&self) -> Result<(), AppError> {
        let raw = serde_json::to_string_pretty(&ProcessFileRef {
            processes: &self.processes,
            next_id: self.next_id,
        })
        .map_err(|e| AppError::StorageCorrupt(e.to_string()))?;
        tokio::fs::write(&self.path, raw).await?;
        Ok(())
    }
}

/// Armazenamento dos processos, persistido num único documento JSON. Toda
/// mutação é leitura-modificação-escrita sob o mutex, mantido até o persist
/// terminar — um escritor por vez, sem updates perdidos.
#[derive(Clone)]
pub struct ProcessRepository {
    store: Arc<Mutex<Store>>,
}

impl ProcessRepository {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref().to_path_buf();
        let file = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => serde_json::from_str::<ProcessFile>(&raw)
                .map_err(|e| AppError::StorageCorrupt(format!("{}: {}", path.display(), e)))?,
            Err(e) if e.kind() == ErrorKind::NotFound => ProcessFile::default(),
            Err(e) => return Err(e.into()),
        };

        let max_id = file.processes.iter().map(|p| p.id).max().unwrap_or(0);
        let next_id = file.next_id.max(max_id + 1);

        tracing::info!("🗂️ Processos carregados: {}", file.processes.len());
        Ok(Self {
            store: Arc::new(Mutex::new(Store {
                path,
                processes: file.processes,
                next_id,
            })),
        })
    }

    /// Snapshot atual, importantes primeiro e id crescente como desempate.
    pub async fn list(&self) -> Vec<Process> {
        let store = self.store.lock().await;
        let mut snapshot = store.processes.clone();
        snapshot.sort_by(|a, b| b.is_important.cmp(&a.is_important).then(a.id.cmp(&b.id)));
        snapshot
    }

    pub async fn get(&self, id: u64) -> Result<Process, AppError> {
        let store = self.store.lock().await;
        store
            .processes
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(AppError::ProcessNotFound)
    }

    /// Insere um novo processo; o construtor recebe o id recém-atribuído.
    pub async fn insert(
        &self,
        build: impl FnOnce(u64) -> Process,
    ) -> Result<Process, AppError> {
        let mut store = self.store.lock().await;
        let id = store.next_id;
        store.next_id += 1;

        let process = build(id);
        store.processes.push(process.clone());
        store.persist().await?;
        Ok(process)
    }

    /// Leitura-modificação-escrita atômica de um processo.
    pub async fn update<F>(&self, id: u64, apply: F) -> Result<Process, AppError>
    where
        F: FnOnce(&mut Process) -> Result<(), AppError>,
    {
        let mut store = self.store.lock().await;
        let index = store
            .processes
            .iter()
            .position(|p| p.id == id)
            .ok_or(AppError::ProcessNotFound)?;

        apply(&mut store.processes[index])?;
        store.persist().await?;
        Ok(store.processes[index].clone())
    }

    /// Remove e devolve o processo (o chamador cuida dos anexos).
    pub async fn remove(&self, id: u64) -> Result<Process, AppError> {
        let mut store = self.store.lock().await;
        let index = store
            .processes
            .iter()
            .position(|p| p.id == id)
            .ok_or(AppError::ProcessNotFound)?;

        let removed = store.processes.remove(index);
        store.persist().await?;
        Ok(removed)
    }
}
