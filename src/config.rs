// src/config.rs

use std::{env, path::PathBuf};

use crate::{
    db::{PlanRepository, ProcessRepository},
    services::{
        alert_service::AlertService, attachment_service::AttachmentStore,
        process_service::ProcessService,
    },
};

/// Estado compartilhado da aplicação, montado uma vez na subida.
#[derive(Clone)]
pub struct AppState {
    pub plan_repo: PlanRepository,
    pub process_repo: ProcessRepository,
    pub process_service: ProcessService,
    pub alert_service: AlertService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let data_dir = PathBuf::from(env::var("DATA_DIR").unwrap_or_else(|_| "data".into()));
        let uploads_dir = env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".into());

        let plan_repo = PlanRepository::load(data_dir.join("plano.json")).await?;
        let process_repo = ProcessRepository::load(data_dir.join("processos.json")).await?;
        let attachments = AttachmentStore::open(uploads_dir).await?;

        // Monta o gráfico de dependências.
        let alert_service = AlertService::new(process_repo.clone());
        let process_service = ProcessService::new(
            process_repo.clone(),
            plan_repo.clone(),
            attachments,
            alert_service.clone(),
        );

        Ok(Self {
            plan_repo,
            process_repo,
            process_service,
            alert_service,
        })
    }
}
