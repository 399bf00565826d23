// src/services/history.rs
//
// Rastreador de histórico: toda mudança de fase ou de localização fecha o
// intervalo aberto e abre um novo. As funções são puras no sentido de que o
// relógio vem de fora — quem chama decide o "agora".

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::models::process::{Fase, FaseEntry, Location, Process};

/// Convenção única do sistema: datas puras (prazo, contrato, alerta) viram
/// instantes ao meio-dia UTC, nunca meia-noite local.
pub fn date_to_instant(date: NaiveDate) -> DateTime<Utc> {
    let midday = NaiveTime::from_hms_opt(12, 0, 0).expect("meio-dia é um horário válido");
    Utc.from_utc_datetime(&date.and_time(midday))
}

/// Registra uma mudança de fase. Sem efeito quando a fase não muda. Com
/// `log_enabled = false` a fase é sobrescrita sem trilha de auditoria
/// (correções em massa). Quando a nova fase é Contratado e há data de
/// contrato, a nova entrada começa nessa data — retroagir é permitido.
pub fn record_phase_change(
    process: &mut Process,
    new_fase: Fase,
    contract_date: Option<NaiveDate>,
    now: DateTime<Utc>,
    log_enabled: bool,
) {
    if new_fase == process.fase {
        return;
    }

    if log_enabled {
        let started_at = match (new_fase, contract_date) {
            (Fase::Contratado, Some(date)) => date_to_instant(date),
            _ => now,
        };

        if started_at < process.history.current_since() {
            tracing::warn!(
                process_id = process.id,
                "Data de contrato retroage para antes do início da fase atual"
            );
        }

        process.history.record(FaseEntry { fase: new_fase }, now, started_at);
    }

    process.fase = new_fase;
}

/// Registra uma troca de setor/responsável. A comparação é textual exata.
pub fn record_location_change(
    process: &mut Process,
    new_location: Location,
    now: DateTime<Utc>,
    log_enabled: bool,
) {
    if new_location == process.location {
        return;
    }

    if log_enabled {
        process.location_history.record(new_location.clone(), now, now);
    }

    process.location = new_location;
}

/// Corrige a data oficial de abertura: reescreve `creationDate` e o início
/// do primeiro intervalo dos dois históricos. Nenhuma outra entrada muda.
pub fn retime_creation(process: &mut Process, new_start: NaiveDate) {
    let at = date_to_instant(new_start);
    process.creation_date = at;
    process.history.retime_first(at);
    process.location_history.retime_first(at);
}
