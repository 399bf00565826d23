// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro central, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Payload inválido: {0}")]
    InvalidPayload(String),

    #[error("Processo não encontrado")]
    ProcessNotFound,

    #[error("Item do plano não encontrado")]
    PlanItemNotFound,

    // Falha de leitura/escrita nos arquivos de dados
    #[error("Erro de E/S no armazenamento: {0}")]
    StorageIo(#[from] std::io::Error),

    // O arquivo existe mas não decodifica no formato esperado
    #[error("Arquivo de dados corrompido: {0}")]
    StorageCorrupt(String),

    // Falha ao gravar um anexo em disco. Exclusões de anexo nunca chegam
    // aqui: são logadas e engolidas no próprio serviço.
    #[error("Falha ao gravar anexo: {0}")]
    AttachmentIo(String),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidPayload(msg) => {
                let body = Json(json!({ "error": format!("Payload inválido: {msg}") }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::ProcessNotFound => (StatusCode::NOT_FOUND, "Processo não encontrado."),
            AppError::PlanItemNotFound => (StatusCode::NOT_FOUND, "Item do plano não encontrado."),

            // Os demais (StorageIo, StorageCorrupt, AttachmentIo, InternalServerError)
            // viram 500. O `tracing` loga a mensagem detalhada do `thiserror`.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
