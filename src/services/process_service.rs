// src/services/process_service.rs

use chrono::{DateTime, Utc};

use crate::{
    common::{error::AppError, forms::IncomingFile},
    db::{PlanRepository, ProcessRepository},
    models::{
        filters::ProcessFilter,
        plan::StartFromPlanPayload,
        process::{
            default_modality, AuditLog, CreateProcessPayload, Fase, FaseEntry, Process,
            UpdateProcessPayload,
        },
    },
    services::{alert_service::AlertService, attachment_service::AttachmentStore, history},
};

/// Orquestra o ciclo de vida dos processos: criação (avulsa ou a partir do
/// plano), atualização parcial com trilha de auditoria, anexos e exclusão.
#[derive(Clone)]
pub struct ProcessService {
    repo: ProcessRepository,
    plan: PlanRepository,
    attachments: AttachmentStore,
    alerts: AlertService,
}

impl ProcessService {
    pub fn new(
        repo: ProcessRepository,
        plan: PlanRepository,
        attachments: AttachmentStore,
        alerts: AlertService,
    ) -> Self {
        Self { repo, plan, attachments, alerts }
    }

    pub async fn list(&self, filter: &ProcessFilter) -> Vec<Process> {
        self.repo
            .list()
            .await
            .into_iter()
            .filter(|p| filter.matches(p))
            .collect()
    }

    pub async fn create(
        &self,
        payload: CreateProcessPayload,
        files: Vec<IncomingFile>,
        now: DateTime<Utc>,
    ) -> Result<Process, AppError> {
        let mut attachments = Vec::with_capacity(files.len());
        for file in &files {
            attachments.push(self.attachments.save(&file.original_name, &file.bytes).await?);
        }

        // A data oficial de abertura pode ser anterior ao cadastro no sistema.
        let opened_at = payload.start_date.map(history::date_to_instant).unwrap_or(now);
        let location = payload.location;
        let fase = payload.fase;

        let created = self
            .repo
            .insert(|id| Process {
                id,
                process_number: payload.process_number,
                object: payload.object,
                value: payload.value.unwrap_or_default(),
                fase,
                modality: payload.modality,
                process_type: payload.process_type,
                priority: payload.priority,
                location: location.clone(),
                description: payload.description,
                plan_id: payload.plan_id,
                deadline: payload.deadline,
                purchased_value: payload.purchased_value,
                contract_date: payload.contract_date,
                is_important: payload.is_important,
                alert_info: payload.alert_info,
                attachments,
                creation_date: opened_at,
                history: AuditLog::open(FaseEntry { fase }, opened_at),
                location_history: AuditLog::open(location, opened_at),
            })
            .await?;

        self.alerts.invalidate().await;
        Ok(created)
    }

    /// "Inicia" um item do plano: copia objeto, valor, prazo, prioridade e
    /// tipo para um processo novo em Planejamento, já vinculado pelo planId.
    pub async fn create_from_plan(
        &self,
        plan_id: u64,
        payload: StartFromPlanPayload,
        now: DateTime<Utc>,
    ) -> Result<Process, AppError> {
        let item = self.plan.get(plan_id).ok_or(AppError::PlanItemNotFound)?;

        let create = CreateProcessPayload {
            process_number: payload.process_number,
            object: item.object.clone(),
            value: Some(item.value),
            fase: Fase::Planejamento,
            modality: payload.modality.unwrap_or_else(default_modality),
            process_type: item.item_type.clone(),
            priority: Some(item.priority),
            location: payload.location,
            description: payload.description,
            plan_id: Some(item.id),
            deadline: item.deadline,
            start_date: payload.start_date,
            contract_date: None,
            purchased_value: None,
            is_important: false,
            alert_info: None,
        };

        self.create(create, Vec::new(), now).await
    }

    pub async fn update(
        &self,
        id: u64,
        payload: UpdateProcessPayload,
        files: Vec<IncomingFile>,
        now: DateTime<Utc>,
    ) -> Result<Process, AppError> {
        let mut new_attachments = Vec::with_capacity(files.len());
        for file in &files {
            new_attachments.push(self.attachments.save(&file.original_name, &file.bytes).await?);
        }

        let attachments_for_merge = new_attachments.clone();
        let result = self
            .repo
            .update(id, move |process| {
                // 1. Correção da data de abertura, antes de qualquer coisa.
                if let Some(new_start) = payload.start_date {
                    history::retime_creation(process, new_start);
                }

                let log_enabled = payload.log_enabled();

                // 2. Ganchos de auditoria de fase e localização.
                if let Some(new_fase) = payload.fase {
                    history::record_phase_change(
                        process,
                        new_fase,
                        payload.contract_date,
                        now,
                        log_enabled,
                    );
                }
                if let Some(new_location) = payload.location {
                    history::record_location_change(process, new_location, now, log_enabled);
                }

                // 3. Demais campos, só os presentes.
                if let Some(v) = payload.process_number {
                    process.process_number = Some(v);
                }
                if let Some(v) = payload.object {
                    process.object = v;
                }
                if let Some(v) = payload.value {
                    process.value = v;
                }
                if let Some(v) = payload.modality {
                    process.modality = v;
                }
                if let Some(v) = payload.process_type {
                    process.process_type = Some(v);
                }
                if let Some(v) = payload.priority {
                    process.priority = Some(v);
                }
                if let Some(v) = payload.description {
                    process.description = Some(v);
                }
                if let Some(v) = payload.plan_id {
                    process.plan_id = Some(v);
                }
                if let Some(v) = payload.deadline {
                    process.deadline = Some(v);
                }
                if let Some(v) = payload.contract_date {
                    process.contract_date = Some(v);
                }
                if let Some(v) = payload.purchased_value {
                    process.purchased_value = Some(v);
                }
                if let Some(v) = payload.is_important {
                    process.is_important = v;
                }
                if let Some(alert) = payload.alert_info {
                    process.alert_info = alert;
                }

                // 4. Anexos só acumulam, nunca substituem.
                process.attachments.extend(attachments_for_merge);
                Ok(())
            })
            .await;

        match result {
            Ok(updated) => {
                self.alerts.invalidate().await;
                Ok(updated)
            }
            Err(e) => {
                // Arquivos já gravados para uma atualização que não aconteceu.
                for attachment in &new_attachments {
                    self.attachments.delete(attachment).await;
                }
                Err(e)
            }
        }
    }

    pub async fn delete(&self, id: u64) -> Result<(), AppError> {
        let removed = self.repo.remove(id).await?;
        for attachment in &removed.attachments {
            self.attachments.delete(attachment).await;
        }
        self.alerts.invalidate().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::process::Location;
    use rust_decimal::Decimal;

    async fn service(dir: &std::path::Path) -> ProcessService {
        let repo = ProcessRepository::load(dir.join("processos.json")).await.unwrap();
        let plan = PlanRepository::from_items(Vec::new());
        let attachments = AttachmentStore::open(dir.join("uploads")).await.unwrap();
        let alerts = AlertService::new(repo.clone());
        ProcessService::new(repo, plan, attachments, alerts)
    }

    fn create_payload(object: &str, value: i64, fase: Fase) -> CreateProcessPayload {
        CreateProcessPayload {
            process_number: Some("001/2025".into()),
            object: object.into(),
            value: Some(Decimal::new(value, 0)),
            fase,
            modality: default_modality(),
            process_type: None,
            priority: None,
            location: Location { sector: "Compras".into(), responsible: "Ana".into() },
            description: None,
            plan_id: None,
            deadline: None,
            start_date: None,
            contract_date: None,
            purchased_value: None,
            is_important: false,
            alert_info: None,
        }
    }

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().expect("timestamp válido")
    }

    #[tokio::test]
    async fn contract_flow_closes_history_and_backdates_new_entry() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path()).await;

        let t_create = ts("2025-05-02T09:00:00Z");
        let created = svc
            .create(create_payload("Gêneros alimentícios", 1000, Fase::Planejamento), Vec::new(), t_create)
            .await
            .unwrap();
        assert_eq!(created.history.len(), 1);

        let t_update = ts("2025-08-01T15:00:00Z");
        let update = UpdateProcessPayload {
            fase: Some(Fase::Contratado),
            purchased_value: Some(Decimal::new(800, 0)),
            contract_date: Some("2025-07-15".parse().unwrap()),
            ..Default::default()
        };
        let updated = svc.update(created.id, update, Vec::new(), t_update).await.unwrap();

        assert_eq!(updated.fase, Fase::Contratado);
        assert_eq!(updated.history.len(), 2);
        assert_eq!(updated.history.closed()[0].end_date, t_update);
        assert_eq!(updated.history.current_since(), ts("2025-07-15T12:00:00Z"));
        assert_eq!(updated.purchased_value, Some(Decimal::new(800, 0)));
        assert_eq!(updated.contract_date, Some("2025-07-15".parse().unwrap()));
    }

    #[tokio::test]
    async fn update_with_log_disabled_changes_fase_without_history() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path()).await;

        let created = svc
            .create(create_payload("Obras", 5000, Fase::Planejamento), Vec::new(), Utc::now())
            .await
            .unwrap();

        let update = UpdateProcessPayload {
            fase: Some(Fase::EmLicitacao),
            log_history: Some(false),
            ..Default::default()
        };
        let updated = svc.update(created.id, update, Vec::new(), Utc::now()).await.unwrap();

        assert_eq!(updated.fase, Fase::EmLicitacao);
        assert_eq!(updated.history.len(), 1);
    }

    #[tokio::test]
    async fn attachments_accumulate_across_updates() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path()).await;

        let files = vec![IncomingFile { original_name: "edital.pdf".into(), bytes: b"a".to_vec() }];
        let created = svc
            .create(create_payload("Serviços", 100, Fase::Planejamento), files, Utc::now())
            .await
            .unwrap();
        assert_eq!(created.attachments.len(), 1);

        let more = vec![IncomingFile { original_name: "ata.pdf".into(), bytes: b"b".to_vec() }];
        let updated = svc
            .update(created.id, UpdateProcessPayload::default(), more, Utc::now())
            .await
            .unwrap();

        assert_eq!(updated.attachments.len(), 2);
        assert_eq!(updated.attachments[0].original_name, "edital.pdf");
    }

    #[tokio::test]
    async fn delete_removes_backing_attachment_files() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path()).await;

        let files = vec![
            IncomingFile { original_name: "a.pdf".into(), bytes: b"a".to_vec() },
            IncomingFile { original_name: "b.pdf".into(), bytes: b"b".to_vec() },
        ];
        let created = svc
            .create(create_payload("Com anexos", 100, Fase::Planejamento), files, Utc::now())
            .await
            .unwrap();

        let paths: Vec<String> = created.attachments.iter().map(|a| a.path.clone()).collect();
        for p in &paths {
            assert!(std::path::Path::new(p).exists());
        }

        svc.delete(created.id).await.unwrap();

        for p in &paths {
            assert!(!std::path::Path::new(p).exists());
        }
        assert!(svc.list(&ProcessFilter::default()).await.is_empty());
    }

    #[tokio::test]
    async fn retime_via_update_rewrites_creation_date() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path()).await;

        let created = svc
            .create(create_payload("Retroativo", 100, Fase::Planejamento), Vec::new(), ts("2025-06-01T10:00:00Z"))
            .await
            .unwrap();

        let update = UpdateProcessPayload {
            start_date: Some("2025-04-01".parse().unwrap()),
            ..Default::default()
        };
        let updated = svc.update(created.id, update, Vec::new(), Utc::now()).await.unwrap();

        assert_eq!(updated.creation_date, ts("2025-04-01T12:00:00Z"));
        assert_eq!(updated.history.current_since(), ts("2025-04-01T12:00:00Z"));
    }

    #[tokio::test]
    async fn starting_a_plan_item_copies_its_fields() {
        use crate::models::plan::{PlanItem, Priority};

        let dir = tempfile::tempdir().unwrap();
        let repo = ProcessRepository::load(dir.path().join("processos.json")).await.unwrap();
        let plan = PlanRepository::from_items(vec![PlanItem {
            id: 7,
            object: "Merenda escolar".into(),
            value: Decimal::new(120_000, 0),
            deadline: Some("2025-10-01".parse().unwrap()),
            priority: Priority::Alta,
            item_type: Some("Material de Consumo".into()),
        }]);
        let attachments = AttachmentStore::open(dir.path().join("uploads")).await.unwrap();
        let alerts = AlertService::new(repo.clone());
        let svc = ProcessService::new(repo, plan, attachments, alerts);

        let payload = StartFromPlanPayload {
            location: Location { sector: "Agente de Contratação".into(), responsible: "Carlos".into() },
            process_number: None,
            modality: None,
            start_date: Some("2025-06-10".parse().unwrap()),
            description: None,
        };
        let process = svc.create_from_plan(7, payload, Utc::now()).await.unwrap();

        assert_eq!(process.plan_id, Some(7));
        assert_eq!(process.fase, Fase::Planejamento);
        assert_eq!(process.object, "Merenda escolar");
        assert_eq!(process.value, Decimal::new(120_000, 0));
        assert_eq!(process.priority, Some(Priority::Alta));
        assert_eq!(process.creation_date, ts("2025-06-10T12:00:00Z"));

        let missing = svc
            .create_from_plan(
                99,
                StartFromPlanPayload {
                    location: Location { sector: "Compras".into(), responsible: String::new() },
                    process_number: None,
                    modality: None,
                    start_date: None,
                    description: None,
                },
                Utc::now(),
            )
            .await;
        assert!(matches!(missing, Err(AppError::PlanItemNotFound)));
    }
}
