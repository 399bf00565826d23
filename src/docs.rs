// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Processos ---
        handlers::processes::list_processes,
        handlers::processes::create_process,
        handlers::processes::update_process,
        handlers::processes::delete_process,

        // --- Plano Anual ---
        handlers::plan::get_plan,
        handlers::plan::get_plan_overview,
        handlers::plan::start_plan_item,

        // --- Dashboard ---
        handlers::dashboard::get_process_dashboard,
        handlers::dashboard::get_plan_dashboard,
        handlers::dashboard::get_analytics,

        // --- Alertas ---
        handlers::alerts::next_alert,
        handlers::alerts::deactivate_alert,
    ),
    components(
        schemas(
            // --- Processos ---
            models::process::Process,
            models::process::Fase,
            models::process::Location,
            models::process::AlertInfo,
            models::process::Attachment,
            models::process::CreateProcessPayload,
            models::process::UpdateProcessPayload,

            // --- Plano Anual ---
            models::plan::PlanItem,
            models::plan::Priority,
            models::plan::PlanStatus,
            models::plan::PlanItemOverview,
            models::plan::StartFromPlanPayload,

            // --- Filtros ---
            models::filters::SpecialFilter,

            // --- Dashboard ---
            models::dashboard::FaseCount,
            models::dashboard::ProcessDashboard,
            models::dashboard::PlanStatusCounts,
            models::dashboard::PlanDashboard,
            models::dashboard::AnalyticsRow,
            models::dashboard::GroupStat,
            models::dashboard::AnalyticsReport,

            // --- Alertas ---
            services::alert_service::DueAlert,
        )
    ),
    tags(
        (name = "Processos", description = "Cadastro e acompanhamento dos processos licitatórios"),
        (name = "Plano Anual", description = "Plano anual de contratações e sua execução"),
        (name = "Dashboard", description = "Métricas derivadas: fases, execução do plano e economia"),
        (name = "Alertas", description = "Lembretes com data de vencimento")
    ),
    info(
        title = "API de Acompanhamento de Licitações",
        description = "Backend do painel de acompanhamento de processos licitatórios frente ao plano anual de contratações."
    )
)]
pub struct ApiDoc;
