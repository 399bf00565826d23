// src/handlers/processes.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    common::{error::AppError, forms::FormOrJson},
    config::AppState,
    models::{
        filters::ProcessFilter,
        process::{CreateProcessPayload, UpdateProcessPayload},
    },
};

// GET /api/processes
#[utoipa::path(
    get,
    path = "/api/processes",
    tag = "Processos",
    params(ProcessFilter),
    responses(
        (status = 200, description = "Processos que passam nos filtros, importantes primeiro", body = Vec<crate::models::process::Process>),
        (status = 400, description = "Filtro inválido")
    )
)]
pub async fn list_processes(
    State(app_state): State<AppState>,
    Query(filter): Query<ProcessFilter>,
) -> Result<impl IntoResponse, AppError> {
    filter.validate()?;

    let processes = app_state.process_service.list(&filter).await;
    Ok((StatusCode::OK, Json(processes)))
}

// POST /api/processes
#[utoipa::path(
    post,
    path = "/api/processes",
    tag = "Processos",
    request_body(content = CreateProcessPayload, description = "JSON ou multipart/form-data com anexos no campo `files`"),
    responses(
        (status = 201, description = "Processo criado", body = crate::models::process::Process),
        (status = 400, description = "Payload inválido")
    )
)]
pub async fn create_process(
    State(app_state): State<AppState>,
    FormOrJson { payload, files }: FormOrJson<CreateProcessPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let created = app_state
        .process_service
        .create(payload, files, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// PUT /api/processes/{id}
#[utoipa::path(
    put,
    path = "/api/processes/{id}",
    tag = "Processos",
    params(("id" = u64, Path, description = "Id do processo")),
    request_body(content = UpdateProcessPayload, description = "Campos presentes são aplicados; `logHistory=false` desliga a trilha de auditoria desta atualização"),
    responses(
        (status = 200, description = "Processo atualizado", body = crate::models::process::Process),
        (status = 400, description = "Payload inválido"),
        (status = 404, description = "Processo não encontrado")
    )
)]
pub async fn update_process(
    State(app_state): State<AppState>,
    Path(id): Path<u64>,
    FormOrJson { payload, files }: FormOrJson<UpdateProcessPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let updated = app_state
        .process_service
        .update(id, payload, files, Utc::now())
        .await?;
    Ok((StatusCode::OK, Json(updated)))
}

// DELETE /api/processes/{id}
#[utoipa::path(
    delete,
    path = "/api/processes/{id}",
    tag = "Processos",
    params(("id" = u64, Path, description = "Id do processo")),
    responses(
        (status = 204, description = "Processo e anexos removidos"),
        (status = 404, description = "Processo não encontrado")
    )
)]
pub async fn delete_process(
    State(app_state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, AppError> {
    app_state.process_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
