// src/services/dashboard_service.rs
//
// Métricas derivadas. Todas as funções são puras: recebem o snapshot dos
// processos (e do plano) mais a data de referência, e nunca tocam o disco.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::{
    dashboard::{
        AnalyticsReport, AnalyticsRow, FaseCount, GroupStat, PlanDashboard, PlanStatusCounts,
        ProcessDashboard,
    },
    plan::{PlanItem, PlanItemOverview, PlanStatus},
    process::{Fase, Process},
};

const UPCOMING_WINDOW_DAYS: u64 = 30;

/// Situação de um item do plano segundo os processos que o referenciam.
/// Com mais de um processo vinculado, vale o criado por último.
pub fn classify_plan_item(item: &PlanItem, processes: &[Process]) -> PlanStatus {
    let latest = processes
        .iter()
        .filter(|p| p.plan_id == Some(item.id))
        .max_by_key(|p| (p.creation_date, p.id));

    match latest {
        None => PlanStatus::NaoIniciado,
        Some(p) if p.fase == Fase::Contratado => PlanStatus::Executado,
        Some(_) => PlanStatus::EmAndamento,
    }
}

pub fn plan_overview(items: &[PlanItem], processes: &[Process]) -> Vec<PlanItemOverview> {
    items
        .iter()
        .map(|item| PlanItemOverview {
            item: item.clone(),
            status: classify_plan_item(item, processes),
        })
        .collect()
}

pub fn process_dashboard(processes: &[Process], plan: &[PlanItem]) -> ProcessDashboard {
    let count_of = |fase: Fase| processes.iter().filter(|p| p.fase == fase).count();

    let fase_counts = Fase::ALL
        .into_iter()
        .map(|fase| FaseCount { fase, count: count_of(fase) })
        .collect();

    // A série planejada vem do plano anual; a contratada, só dos processos
    // contratados com valor de compra e data conhecidos.
    let mut planned_by_month = vec![Decimal::ZERO; 12];
    for item in plan {
        if let Some(deadline) = item.deadline {
            planned_by_month[deadline.month0() as usize] += item.value;
        }
    }

    let mut contracted_by_month = vec![Decimal::ZERO; 12];
    for p in processes.iter().filter(|p| p.fase == Fase::Contratado) {
        if let (Some(purchased), Some(contracted)) = (p.purchased_value, p.contract_date) {
            contracted_by_month[contracted.month0() as usize] += purchased;
        }
    }

    ProcessDashboard {
        total: processes.len(),
        em_licitacao: count_of(Fase::EmLicitacao),
        contratados: count_of(Fase::Contratado),
        pendentes: count_of(Fase::Planejamento) + count_of(Fase::EmLicitacao),
        fase_counts,
        planned_by_month,
        contracted_by_month,
    }
}

pub fn plan_dashboard(
    items: &[PlanItem],
    processes: &[Process],
    today: NaiveDate,
) -> PlanDashboard {
    let horizon = today
        .checked_add_days(Days::new(UPCOMING_WINDOW_DAYS))
        .unwrap_or(today);

    let mut counts = PlanStatusCounts { nao_iniciado: 0, em_andamento: 0, executado: 0 };
    let mut total_value = Decimal::ZERO;
    let mut executed_value = Decimal::ZERO;
    let mut upcoming_items = 0;
    let mut overdue_items = 0;
    let mut planned_by_month = vec![Decimal::ZERO; 12];

    for item in items {
        let status = classify_plan_item(item, processes);
        total_value += item.value;
        match status {
            PlanStatus::NaoIniciado => counts.nao_iniciado += 1,
            PlanStatus::EmAndamento => counts.em_andamento += 1,
            PlanStatus::Executado => {
                counts.executado += 1;
                executed_value += item.value;
            }
        }

        if let Some(deadline) = item.deadline {
            planned_by_month[deadline.month0() as usize] += item.value;
            if status == PlanStatus::NaoIniciado && deadline >= today && deadline <= horizon {
                upcoming_items += 1;
            }
            if status != PlanStatus::Executado && deadline < today {
                overdue_items += 1;
            }
        }
    }

    let started = counts.em_andamento + counts.executado;
    let progress = percentage(started, items.len());

    PlanDashboard {
        total_value,
        executed_value,
        progress,
        upcoming_items,
        overdue_items,
        status_counts: counts,
        planned_by_month,
    }
}

/// Análise de economia sobre os processos contratados com valor de compra e
/// data de contrato conhecidos.
pub fn analytics(processes: &[Process], plan: &[PlanItem]) -> AnalyticsReport {
    let mut rows = Vec::new();

    for p in processes {
        if p.fase != Fase::Contratado {
            continue;
        }
        let (Some(purchased), Some(contract_date)) = (p.purchased_value, p.contract_date) else {
            continue;
        };

        // O valor de referência vem do item do plano quando há vínculo;
        // senão, da própria estimativa do processo.
        let estimated = p
            .plan_id
            .and_then(|id| plan.iter().find(|item| item.id == id))
            .map(|item| item.value)
            .unwrap_or(p.value);

        let economy = estimated - purchased;
        let slack_days = p.deadline.map(|d| (d - contract_date).num_days());

        rows.push(AnalyticsRow {
            id: p.id,
            process_number: p.process_number.clone(),
            object: p.object.clone(),
            estimated_value: estimated,
            purchased_value: purchased,
            economy,
            economy_percentage: ratio_percentage(economy, estimated),
            deadline: p.deadline,
            contract_date,
            slack_days,
        });
    }

    let total_estimated: Decimal = rows.iter().map(|r| r.estimated_value).sum();
    let total_executed: Decimal = rows.iter().map(|r| r.purchased_value).sum();
    let total_economy = total_estimated - total_executed;
    let total_savings: Decimal = rows
        .iter()
        .filter(|r| r.economy > Decimal::ZERO)
        .map(|r| r.economy)
        .sum();
    let total_loss: Decimal = rows
        .iter()
        .filter(|r| r.economy < Decimal::ZERO)
        .map(|r| -r.economy)
        .sum();

    let with_deadline: Vec<&AnalyticsRow> =
        rows.iter().filter(|r| r.slack_days.is_some()).collect();
    let on_time = with_deadline
        .iter()
        .filter(|r| r.slack_days.unwrap_or(0) >= 0)
        .count();
    let on_time_rate = percentage(on_time, with_deadline.len());

    let mut by_modality: BTreeMap<String, GroupStat> = BTreeMap::new();
    let mut by_type: BTreeMap<String, GroupStat> = BTreeMap::new();
    let mut by_priority: BTreeMap<String, GroupStat> = BTreeMap::new();

    for p in processes.iter().filter(|p| p.fase == Fase::Contratado) {
        let Some(row) = rows.iter().find(|r| r.id == p.id) else {
            continue;
        };
        accumulate(&mut by_modality, p.modality.clone(), row);
        accumulate(
            &mut by_type,
            p.process_type.clone().unwrap_or_else(|| "Não informado".into()),
            row,
        );
        accumulate(
            &mut by_priority,
            p.priority.map(|pr| pr.label().to_string()).unwrap_or_else(|| "Sem prioridade".into()),
            row,
        );
    }
    for group in [&mut by_modality, &mut by_type, &mut by_priority] {
        for stat in group.values_mut() {
            if stat.count > 0 {
                stat.average_economy = stat.total_economy / Decimal::from(stat.count as u64);
            }
        }
    }

    AnalyticsReport {
        total_economy,
        total_estimated,
        total_executed,
        total_savings,
        total_loss,
        economy_percentage: ratio_percentage(total_economy, total_estimated),
        on_time_rate,
        rows,
        by_modality,
        by_type,
        by_priority,
    }
}

fn accumulate(groups: &mut BTreeMap<String, GroupStat>, key: String, row: &AnalyticsRow) {
    let stat = groups.entry(key).or_default();
    stat.count += 1;
    stat.total_purchased += row.purchased_value;
    stat.total_economy += row.economy;
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

fn ratio_percentage(part: Decimal, whole: Decimal) -> f64 {
    if whole.is_zero() {
        return 0.0;
    }
    (part / whole * Decimal::ONE_HUNDRED).to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::plan::Priority;
    use crate::models::process::{AuditLog, FaseEntry, Location};
    use chrono::{DateTime, Utc};

    fn date(s: &str) -> NaiveDate {
        s.parse().expect("data válida")
    }

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().expect("timestamp válido")
    }

    fn process(id: u64, fase: Fase) -> Process {
        let now = ts("2025-01-01T12:00:00Z");
        let location = Location { sector: "Compras".into(), responsible: "Ana".into() };
        Process {
            id,
            process_number: Some(format!("{id:03}/2025")),
            object: format!("Processo {id}"),
            value: Decimal::new(1000, 0),
            fase,
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
            alert_info: None,
            attachments: Vec::new(),
            creation_date: now,
            history: AuditLog::open(FaseEntry { fase }, now),
            location_history: AuditLog::open(location, now),
        }
    }

    fn plan_item(id: u64, value: i64) -> PlanItem {
        PlanItem {
            id,
            object: format!("Item {id}"),
            value: Decimal::new(value, 0),
            deadline: None,
            priority: Priority::Media,
            item_type: None,
        }
    }

    #[test]
    fn plan_item_status_follows_the_latest_linked_process() {
        let item = plan_item(1, 1000);

        let mut older = process(1, Fase::Contratado);
        older.plan_id = Some(1);
        older.creation_date = ts("2025-01-01T12:00:00Z");

        let mut newer = process(2, Fase::Planejamento);
        newer.plan_id = Some(1);
        newer.creation_date = ts("2025-03-01T12:00:00Z");

        assert_eq!(classify_plan_item(&item, &[]), PlanStatus::NaoIniciado);
        assert_eq!(
            classify_plan_item(&item, &[older.clone()]),
            PlanStatus::Executado
        );
        // O processo mais recente manda, mesmo que um antigo esteja contratado.
        assert_eq!(
            classify_plan_item(&item, &[older, newer]),
            PlanStatus::EmAndamento
        );
    }

    #[test]
    fn process_dashboard_counts_and_buckets_by_month() {
        let mut item = plan_item(1, 500);
        item.deadline = Some(date("2025-03-31"));

        let mut a = process(1, Fase::Planejamento);
        a.deadline = Some(date("2025-04-10"));
        a.value = Decimal::new(999, 0);

        let mut b = process(2, Fase::Contratado);
        b.contract_date = Some(date("2025-03-20"));
        b.purchased_value = Some(Decimal::new(800, 0));

        let c = process(3, Fase::EmLicitacao);

        let dash = process_dashboard(&[a, b, c], &[item]);
        assert_eq!(dash.total, 3);
        assert_eq!(dash.pendentes, 2);
        assert_eq!(dash.contratados, 1);
        // A série planejada sai do plano anual, nunca dos processos.
        assert_eq!(dash.planned_by_month[2], Decimal::new(500, 0));
        assert_eq!(dash.planned_by_month[3], Decimal::ZERO);
        assert_eq!(dash.contracted_by_month[2], Decimal::new(800, 0));
    }

    #[test]
    fn contracted_series_requires_phase_purchase_and_date() {
        // Data de contrato sem a fase Contratado: fora da série.
        let mut not_contracted = process(1, Fase::Planejamento);
        not_contracted.contract_date = Some(date("2025-03-20"));
        not_contracted.purchased_value = Some(Decimal::new(800, 0));

        // Contratado sem valor de compra: também fora, sem cair na estimativa.
        let mut unpriced = process(2, Fase::Contratado);
        unpriced.contract_date = Some(date("2025-04-05"));

        let dash = process_dashboard(&[not_contracted, unpriced], &[]);
        assert_eq!(dash.contracted_by_month[2], Decimal::ZERO);
        assert_eq!(dash.contracted_by_month[3], Decimal::ZERO);
    }

    #[test]
    fn plan_dashboard_tracks_upcoming_and_overdue_windows() {
        let today = date("2025-08-20");

        let mut soon = plan_item(1, 100);
        soon.deadline = Some(date("2025-09-01"));
        let mut late = plan_item(2, 200);
        late.deadline = Some(date("2025-08-01"));
        let mut distant = plan_item(3, 300);
        distant.deadline = Some(date("2025-12-01"));

        let mut executed = process(1, Fase::Contratado);
        executed.plan_id = Some(3);

        let dash = plan_dashboard(&[soon, late, distant], &[executed], today);
        assert_eq!(dash.upcoming_items, 1);
        assert_eq!(dash.overdue_items, 1);
        assert_eq!(dash.total_value, Decimal::new(600, 0));
        assert_eq!(dash.executed_value, Decimal::new(300, 0));
        assert_eq!(dash.status_counts.executado, 1);
        assert!((dash.progress - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn analytics_prefers_the_plan_value_as_the_estimate() {
        let plan = vec![plan_item(1, 1000)];

        let mut linked = process(1, Fase::Contratado);
        linked.plan_id = Some(1);
        linked.value = Decimal::new(999, 0); // ignorado em favor do plano
        linked.purchased_value = Some(Decimal::new(800, 0));
        linked.contract_date = Some(date("2025-07-15"));
        linked.deadline = Some(date("2025-08-01"));

        let mut standalone = process(2, Fase::Contratado);
        standalone.value = Decimal::new(500, 0);
        standalone.purchased_value = Some(Decimal::new(600, 0));
        standalone.contract_date = Some(date("2025-07-20"));
        standalone.deadline = Some(date("2025-07-01"));

        // Sem valor de compra: fora do relatório.
        let incomplete = process(3, Fase::Contratado);

        let report = analytics(&[linked, standalone, incomplete], &plan);
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].estimated_value, Decimal::new(1000, 0));
        assert_eq!(report.rows[0].economy, Decimal::new(200, 0));
        assert_eq!(report.rows[1].economy, Decimal::new(-100, 0));

        assert_eq!(report.total_economy, Decimal::new(100, 0));
        assert_eq!(report.total_savings, Decimal::new(200, 0));
        assert_eq!(report.total_loss, Decimal::new(100, 0));
        // Um dos dois contratou dentro do prazo.
        assert!((report.on_time_rate - 50.0).abs() < 1e-9);
    }

    #[test]
    fn analytics_groups_by_modality_with_averages() {
        let mut a = process(1, Fase::Contratado);
        a.modality = "Pregão".into();
        a.purchased_value = Some(Decimal::new(900, 0));
        a.contract_date = Some(date("2025-05-01"));

        let mut b = process(2, Fase::Contratado);
        b.modality = "Pregão".into();
        b.purchased_value = Some(Decimal::new(700, 0));
        b.contract_date = Some(date("2025-06-01"));

        let mut c = process(3, Fase::Contratado);
        c.modality = "Dispensa".into();
        c.purchased_value = Some(Decimal::new(1000, 0));
        c.contract_date = Some(date("2025-06-15"));

        let report = analytics(&[a, b, c], &[]);
        let pregao = &report.by_modality["Pregão"];
        assert_eq!(pregao.count, 2);
        assert_eq!(pregao.total_purchased, Decimal::new(1600, 0));
        // Economias de 100 e 300 sobre a estimativa de 1000.
        assert_eq!(pregao.total_economy, Decimal::new(400, 0));
        assert_eq!(pregao.average_economy, Decimal::new(200, 0));
        assert_eq!(report.by_modality["Dispensa"].total_economy, Decimal::ZERO);
    }
}
