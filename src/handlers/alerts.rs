// src/handlers/alerts.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use crate::{
    common::error::AppError,
    config::AppState,
    models::process::UpdateProcessPayload,
    services::alert_service::DueAlert,
};

// GET /api/alerts/next
#[utoipa::path(
    get,
    path = "/api/alerts/next",
    tag = "Alertas",
    responses(
        (status = 200, description = "Próximo alerta vencido", body = DueAlert),
        (status = 204, description = "Nenhum alerta pendente")
    )
)]
pub async fn next_alert(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let today = Utc::now().date_naive();
    match app_state.alert_service.next(today).await {
        Some(alert) => Ok((StatusCode::OK, Json(alert)).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

// POST /api/alerts/{id}/deactivate
#[utoipa::path(
    post,
    path = "/api/alerts/{id}/deactivate",
    tag = "Alertas",
    params(("id" = u64, Path, description = "Id do processo dono do alerta")),
    responses(
        (status = 200, description = "Alerta e destaque removidos do processo", body = crate::models::process::Process),
        (status = 404, description = "Processo não encontrado")
    )
)]
pub async fn deactivate_alert(
    State(app_state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, AppError> {
    // Passa pelo caminho normal de atualização: limpa o alerta, tira o
    // destaque e invalida a fila.
    let payload = UpdateProcessPayload {
        alert_info: Some(None),
        is_important: Some(false),
        ..Default::default()
    };
    let updated = app_state
        .process_service
        .update(id, payload, Vec::new(), Utc::now())
        .await?;
    Ok((StatusCode::OK, Json(updated)))
}
