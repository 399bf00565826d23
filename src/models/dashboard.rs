// src/models/dashboard.rs

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::process::Fase;

// 1. Painel de processos (os cartões do topo + gráficos)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FaseCount {
    pub fase: Fase,
    pub count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessDashboard {
    pub total: usize,
    pub em_licitacao: usize,
    pub contratados: usize,
    /// Planejamento + Em Licitação.
    pub pendentes: usize,
    pub fase_counts: Vec<FaseCount>,
    /// 12 posições, índice 0 = janeiro. Valor dos itens do plano anual por
    /// mês do prazo.
    pub planned_by_month: Vec<Decimal>,
    /// 12 posições. Valor de compra dos contratados por mês da data de
    /// contrato.
    pub contracted_by_month: Vec<Decimal>,
}

// 2. Painel do plano anual
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanStatusCounts {
    pub nao_iniciado: usize,
    pub em_andamento: usize,
    pub executado: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanDashboard {
    pub total_value: Decimal,
    pub executed_value: Decimal,
    /// Percentual de itens do plano com algum processo iniciado.
    pub progress: f64,
    /// Itens com prazo nos próximos 30 dias e ainda não iniciados.
    pub upcoming_items: usize,
    /// Itens com prazo vencido e ainda não executados.
    pub overdue_items: usize,
    pub status_counts: PlanStatusCounts,
    pub planned_by_month: Vec<Decimal>,
}

// 3. Análise de desempenho (economia) sobre os contratados
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsRow {
    pub id: u64,
    pub process_number: Option<String>,
    pub object: String,
    pub estimated_value: Decimal,
    pub purchased_value: Decimal,
    /// estimado - contratado; positivo = economia.
    pub economy: Decimal,
    pub economy_percentage: f64,
    pub deadline: Option<NaiveDate>,
    pub contract_date: NaiveDate,
    /// Dias entre o prazo e a contratação; positivo = adiantado.
    pub slack_days: Option<i64>,
}

#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupStat {
    pub count: usize,
    pub total_purchased: Decimal,
    pub total_economy: Decimal,
    pub average_economy: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub total_economy: Decimal,
    pub total_estimated: Decimal,
    pub total_executed: Decimal,
    pub total_savings: Decimal,
    pub total_loss: Decimal,
    pub economy_percentage: f64,
    /// Fração (em %) dos contratados com prazo e data de contrato em que a
    /// contratação saiu dentro do prazo.
    pub on_time_rate: f64,
    pub rows: Vec<AnalyticsRow>,
    pub by_modality: BTreeMap<String, GroupStat>,
    pub by_type: BTreeMap<String, GroupStat>,
    pub by_priority: BTreeMap<String, GroupStat>,
}
