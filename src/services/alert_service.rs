// src/services/alert_service.rs

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::Mutex;
use utoipa::ToSchema;

use crate::db::ProcessRepository;
use crate::models::process::Process;

/// Alerta vencido, pronto para exibição.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DueAlert {
    pub process_id: u64,
    pub process_number: Option<String>,
    pub object: String,
    pub note: String,
    pub alert_date: NaiveDate,
    pub is_important: bool,
}

/// Fila de alertas vencidos, entregues um por vez. A fila é reconstruída de
/// forma preguiçosa: qualquer mutação nos processos a invalida, e a próxima
/// consulta recomeça do conjunto atual de alertas com data <= hoje.
#[derive(Clone)]
pub struct AlertService {
    repo: ProcessRepository,
    queue: Arc<Mutex<Option<VecDeque<u64>>>>,
}

impl AlertService {
    pub fn new(repo: ProcessRepository) -> Self {
        Self { repo, queue: Arc::new(Mutex::new(None)) }
    }

    /// Descarta a fila pendente. Chamado após criar, atualizar ou excluir um
    /// processo — alertas já consumidos não voltam, os demais são recalculados.
    pub async fn invalidate(&self) {
        *self.queue.lock().await = None;
    }

    /// Próximo alerta vencido, ou `None` quando a fila esvazia.
    pub async fn next(&self, today: NaiveDate) -> Option<DueAlert> {
        let mut queue = self.queue.lock().await;

        if queue.is_none() {
            *queue = Some(self.build_queue(today).await);
        }

        let ids = queue.as_mut()?;
        while let Some(id) = ids.pop_front() {
            // O processo pode ter sumido entre a montagem da fila e agora.
            if let Ok(process) = self.repo.get(id).await {
                if let Some(alert) = due_alert(&process, today) {
                    return Some(alert);
                }
            }
        }
        None
    }

    // A fila segue a ordem natural da coleção (id crescente), como a
    // varredura que o painel sempre fez.
    async fn build_queue(&self, today: NaiveDate) -> VecDeque<u64> {
        let mut due: Vec<u64> = self
            .repo
            .list()
            .await
            .iter()
            .filter(|p| due_alert(p, today).is_some())
            .map(|p| p.id)
            .collect();
        due.sort_unstable();
        due.into_iter().collect()
    }
}

fn due_alert(process: &Process, today: NaiveDate) -> Option<DueAlert> {
    let info = process.alert_info.as_ref()?;
    if info.alert_date > today {
        return None;
    }
    Some(DueAlert {
        process_id: process.id,
        process_number: process.process_number.clone(),
        object: process.object.clone(),
        note: info.note.clone(),
        alert_date: info.alert_date,
        is_important: process.is_important,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::process::{AlertInfo, AuditLog, Fase, FaseEntry, Location};
    use chrono::Utc;

    fn date(s: &str) -> NaiveDate {
        s.parse().expect("data válida")
    }

    fn sample(object: &str, alert: Option<AlertInfo>) -> impl FnOnce(u64) -> Process + '_ {
        move |id| {
            let now = Utc::now();
            let location = Location { sector: "Compras".into(), responsible: "Ana".into() };
            Process {
                id,
                process_number: None,
                object: object.into(),
                value: "1000".parse().unwrap(),
                fase: Fase::Planejamento,
                modality: "Pregão".into(),
                process_type: None,
                priority: None,
                location: location.clone(),
                description: None,
                plan_id: None,
                deadline: None,
                purchased_value: None,
                contract_date: None,
                is_important: false,
                alert_info: alert,
                attachments: Vec::new(),
                creation_date: now,
                history: AuditLog::open(FaseEntry { fase: Fase::Planejamento }, now),
                location_history: AuditLog::open(location, now),
            }
        }
    }

    async fn repo() -> (tempfile::TempDir, ProcessRepository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = ProcessRepository::load(dir.path().join("processos.json")).await.unwrap();
        (dir, repo)
    }

    fn alert(note: &str, date_str: &str) -> Option<AlertInfo> {
        Some(AlertInfo { note: note.into(), alert_date: date(date_str) })
    }

    #[tokio::test]
    async fn delivers_due_alerts_in_collection_order_then_drains() {
        let (_dir, repo) = repo().await;
        repo.insert(sample("Futuro", alert("ainda não", "2025-09-01"))).await.unwrap();
        repo.insert(sample("Hoje", alert("no dia", "2025-08-20"))).await.unwrap();
        repo.insert(sample("Atrasado", alert("urgente", "2025-08-01"))).await.unwrap();
        repo.insert(sample("Sem alerta", None)).await.unwrap();

        let svc = AlertService::new(repo);
        let today = date("2025-08-20");

        // Ordem de cadastro (id), não de vencimento: "Hoje" entrou antes.
        let first = svc.next(today).await.unwrap();
        assert_eq!(first.object, "Hoje");
        let second = svc.next(today).await.unwrap();
        assert_eq!(second.object, "Atrasado");
        assert!(svc.next(today).await.is_none());
    }

    #[tokio::test]
    async fn invalidation_rebuilds_from_the_current_state() {
        let (_dir, repo) = repo().await;
        let p = repo.insert(sample("Único", alert("ver", "2025-08-01"))).await.unwrap();

        let svc = AlertService::new(repo.clone());
        let today = date("2025-08-20");
        assert!(svc.next(today).await.is_some());
        assert!(svc.next(today).await.is_none());

        // A desativação limpa o alerta; a fila reconstruída fica vazia.
        repo.update(p.id, |proc| {
            proc.alert_info = None;
            Ok(())
        })
        .await
        .unwrap();
        svc.invalidate().await;
        assert!(svc.next(today).await.is_none());
    }

    #[tokio::test]
    async fn skips_processes_deleted_after_the_queue_was_built() {
        let (_dir, repo) = repo().await;
        repo.insert(sample("Sai primeiro", alert("a", "2025-08-01"))).await.unwrap();
        let doomed = repo.insert(sample("Some", alert("b", "2025-08-02"))).await.unwrap();

        let svc = AlertService::new(repo.clone());
        let today = date("2025-08-20");

        // A primeira consulta monta a fila com os dois; o segundo é excluído
        // antes de chegar a sua vez e deve ser pulado em silêncio.
        let first = svc.next(today).await.unwrap();
        assert_eq!(first.object, "Sai primeiro");
        repo.remove(doomed.id).await.unwrap();
        assert!(svc.next(today).await.is_none());
    }
}
