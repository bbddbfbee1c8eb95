//! Adherence analytics — trend, per-medication performance, and streaks.
//!
//! Aggregates are derived from the ledger's effective slot statuses so the
//! numbers here agree with the schedule and reminder views.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use crate::ledger;
use crate::models::enums::DoseStatus;
use crate::models::Medication;

/// Days covered by the adherence trend and the streak scan.
pub const ANALYTICS_WINDOW_DAYS: u32 = 30;

/// One day of the adherence trend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayAdherence {
    pub date: NaiveDate,
    pub scheduled: u32,
    pub taken: u32,
    pub adherence_percent: u32,
}

/// Per-medication adherence over complete schedule cycles.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicationPerformance {
    pub id: Uuid,
    pub name: String,
    pub taken_count: u32,
    pub total_count: u32,
    pub adherence_percent: u32,
}

/// The full analytics payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub overall_adherence: u32,
    pub taken_doses: u32,
    pub total_doses: u32,
    pub current_streak: u32,
    pub best_streak: u32,
    pub medications_tracked: u32,
    /// Oldest day first, `ANALYTICS_WINDOW_DAYS` entries ending at today.
    pub trend: Vec<DayAdherence>,
    /// Sorted best adherence first.
    pub per_medication: Vec<MedicationPerformance>,
}

pub fn summarize(meds: &[Medication], today: NaiveDate) -> AnalyticsSummary {
    let total_doses = meds.iter().map(|m| m.dose_history.len() as u32).sum();
    let taken_doses = meds
        .iter()
        .flat_map(|m| &m.dose_history)
        .filter(|e| e.status == DoseStatus::Taken)
        .count() as u32;

    let streak = ledger::compute_streak(meds, today, ANALYTICS_WINDOW_DAYS);

    let mut per_medication: Vec<MedicationPerformance> = meds
        .iter()
        .map(|med| {
            let a = ledger::compute_adherence(med);
            MedicationPerformance {
                id: med.id,
                name: med.name.clone(),
                taken_count: a.taken_count,
                total_count: a.total_count,
                adherence_percent: a.adherence_percent,
            }
        })
        .collect();
    per_medication.sort_by(|a, b| b.adherence_percent.cmp(&a.adherence_percent));

    AnalyticsSummary {
        overall_adherence: ledger::percent(taken_doses, total_doses),
        taken_doses,
        total_doses,
        current_streak: streak.current,
        best_streak: streak.best,
        medications_tracked: meds.len() as u32,
        trend: trend(meds, today),
        per_medication,
    }
}

/// Per-day effective taken counts over the window, oldest day first.
fn trend(meds: &[Medication], today: NaiveDate) -> Vec<DayAdherence> {
    (0..ANALYTICS_WINDOW_DAYS)
        .rev()
        .map(|offset| {
            let day = today - Duration::days(i64::from(offset));
            let mut scheduled = 0u32;
            let mut taken = 0u32;
            for med in meds.iter().filter(|m| ledger::is_active_on(m, day)) {
                let statuses = ledger::effective_slot_statuses(med, day);
                scheduled += statuses.len() as u32;
                taken += statuses
                    .iter()
                    .filter(|s| **s == Some(DoseStatus::Taken))
                    .count() as u32;
            }
            DayAdherence {
                date: day,
                scheduled,
                taken,
                adherence_percent: ledger::percent(taken, scheduled),
            }
        })
        .collect()
}
