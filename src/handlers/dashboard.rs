// src/handlers/dashboard.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        dashboard::{AnalyticsReport, PlanDashboard, ProcessDashboard},
        filters::ProcessFilter,
    },
    services::dashboard_service,
};

// GET /api/dashboard/processes
#[utoipa::path(
    get,
    path = "/api/dashboard/processes",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Contadores por fase e séries mensais de valores", body = ProcessDashboard)
    )
)]
pub async fn get_process_dashboard(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let processes = app_state.process_repo.list().await;
    let dashboard =
        dashboard_service::process_dashboard(&processes, app_state.plan_repo.all());
    Ok((StatusCode::OK, Json(dashboard)))
}

// GET /api/dashboard/plan
#[utoipa::path(
    get,
    path = "/api/dashboard/plan",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Execução do plano anual: totais, progresso, prazos próximos e vencidos", body = PlanDashboard)
    )
)]
pub async fn get_plan_dashboard(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let processes = app_state.process_repo.list().await;
    let dashboard = dashboard_service::plan_dashboard(
        app_state.plan_repo.all(),
        &processes,
        Utc::now().date_naive(),
    );
    Ok((StatusCode::OK, Json(dashboard)))
}

// GET /api/dashboard/analytics
#[utoipa::path(
    get,
    path = "/api/dashboard/analytics",
    tag = "Dashboard",
    params(ProcessFilter),
    responses(
        (status = 200, description = "Análise de economia sobre os processos contratados que passam nos filtros", body = AnalyticsReport),
        (status = 400, description = "Filtro inválido")
    )
)]
pub async fn get_analytics(
    State(app_state): State<AppState>,
    Query(filter): Query<ProcessFilter>,
) -> Result<impl IntoResponse, AppError> {
    filter.validate()?;

    let processes: Vec<_> = app_state
        .process_repo
        .list()
        .await
        .into_iter()
        .filter(|p| filter.matches(p))
        .collect();
    let report = dashboard_service::analytics(&processes, app_state.plan_repo.all());
    Ok((StatusCode::OK, Json(report)))
}
