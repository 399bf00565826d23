// src/services/attachment_service.rs

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::common::error::AppError;
use crate::models::process::Attachment;

/// Guarda os anexos em disco, com o nome prefixado pelo timestamp do upload
/// para evitar colisões.
#[derive(Clone)]
pub struct AttachmentStore {
    dir: PathBuf,
}

impl AttachmentStore {
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    /// Grava o arquivo e devolve a referência persistível. Falha de escrita
    /// derruba a operação inteira — ou todos os anexos entram, ou nenhum.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<Attachment, AppError> {
        // Só o nome base; nada de componentes de caminho vindos do cliente.
        let base = Path::new(original_name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("anexo");

        let filename = format!("{}-{}", Utc::now().timestamp_millis(), base);
        let path = self.dir.join(&filename);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::AttachmentIo(format!("{}: {}", path.display(), e)))?;

        Ok(Attachment {
            filename,
            original_name: base.to_string(),
            path: path.to_string_lossy().into_owned(),
        })
    }

    /// Exclusão de melhor esforço: falha vira log, nunca erro — a remoção do
    /// processo não pode ficar presa num anexo órfão.
    pub async fn delete(&self, attachment: &Attachment) {
        if let Err(e) = tokio::fs::remove_file(&attachment.path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    "Falha ao excluir anexo {}: {}",
                    attachment.path,
                    e
                );
            }
        }
    }
}
