// src/handlers/plan.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::plan::StartFromPlanPayload,
    services::dashboard_service,
};

// GET /api/plan
#[utoipa::path(
    get,
    path = "/api/plan",
    tag = "Plano Anual",
    responses(
        (status = 200, description = "Itens do plano anual de contratações", body = Vec<crate::models::plan::PlanItem>)
    )
)]
pub async fn get_plan(State(app_state): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(app_state.plan_repo.all().to_vec()))
}

// GET /api/plan/overview
#[utoipa::path(
    get,
    path = "/api/plan/overview",
    tag = "Plano Anual",
    responses(
        (status = 200, description = "Itens do plano com a situação derivada dos processos vinculados", body = Vec<crate::models::plan::PlanItemOverview>)
    )
)]
pub async fn get_plan_overview(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let processes = app_state.process_repo.list().await;
    let overview = dashboard_service::plan_overview(app_state.plan_repo.all(), &processes);
    Ok((StatusCode::OK, Json(overview)))
}

// POST /api/plan/{id}/start
#[utoipa::path(
    post,
    path = "/api/plan/{id}/start",
    tag = "Plano Anual",
    params(("id" = u64, Path, description = "Id do item do plano")),
    request_body = StartFromPlanPayload,
    responses(
        (status = 201, description = "Processo criado a partir do item do plano", body = crate::models::process::Process),
        (status = 400, description = "Payload inválido"),
        (status = 404, description = "Item do plano não encontrado")
    )
)]
pub async fn start_plan_item(
    State(app_state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<StartFromPlanPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let created = app_state
        .process_service
        .create_from_plan(id, payload, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}
