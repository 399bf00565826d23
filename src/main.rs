//src/main.rs

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod services;

use crate::config::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .compact()
        .init();

    // .expect() é aceitável aqui: sem estado montado não há aplicação.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    let process_routes = Router::new()
        .route(
            "/",
            get(handlers::processes::list_processes).post(handlers::processes::create_process),
        )
        .route(
            "/{id}",
            axum::routing::put(handlers::processes::update_process)
                .delete(handlers::processes::delete_process),
        );

    let plan_routes = Router::new()
        .route("/", get(handlers::plan::get_plan))
        .route("/overview", get(handlers::plan::get_plan_overview))
        .route("/{id}/start", post(handlers::plan::start_plan_item));

    let dashboard_routes = Router::new()
        .route("/processes", get(handlers::dashboard::get_process_dashboard))
        .route("/plan", get(handlers::dashboard::get_plan_dashboard))
        .route("/analytics", get(handlers::dashboard::get_analytics));

    let alert_routes = Router::new()
        .route("/next", get(handlers::alerts::next_alert))
        .route("/{id}/deactivate", post(handlers::alerts::deactivate_alert));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/processes", process_routes)
        .nest("/api/plan", plan_routes)
        .nest("/api/dashboard", dashboard_routes)
        .nest("/api/alerts", alert_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".into());
    let addr = format!("{host}:{port}");

    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", addr);
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
