//! Dose ledger — the single source of truth for state derived from a
//! medication's schedule and its append-only dose history.
//!
//! Every consumer (today's schedule, reminders, analytics) resolves per-slot
//! status through this module instead of re-reading the raw history, so the
//! matching rules agree everywhere: an event belongs to a slot when its UTC
//! calendar day and slot label match, and the most recently appended event
//! for a `(day, slot)` pair wins.
//!
//! All functions are pure in `(medication, day, now)`; mutating operations
//! return a new record state for the caller to persist.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use crate::models::enums::{DoseStatus, SlotStatus, SlotUrgency};
use crate::models::{DoseEvent, Medication};

/// A pending slot more than this many minutes in the past is no longer
/// shown as overdue, only as scheduled.
pub const OVERDUE_WINDOW_MIN: i64 = 60;
/// Look-ahead half of the due-soon band.
pub const DUE_SOON_AHEAD_MIN: i64 = 60;
/// Look-behind half of the due-soon band.
pub const DUE_SOON_BEHIND_MIN: i64 = 15;

/// Resolved state of one schedule slot on a given day.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotView {
    pub time: String,
    pub status: SlotStatus,
    pub minutes_until_due: i64,
    /// Display urgency; only meaningful (and only set) while pending.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency: Option<SlotUrgency>,
}

/// Adherence counters over the recorded history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Adherence {
    pub taken_count: u32,
    pub total_count: u32,
    pub adherence_percent: u32,
}

/// Consecutive all-taken day streaks ending at (current) or within
/// (best) the scanned window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Streak {
    pub current: u32,
    pub best: u32,
}

/// Resolve every schedule slot of `med` for `day` against the dose history.
///
/// A slot's status is the last-appended history event matching the
/// `(day, slot)` pair, or pending when none exists. Pending slots carry a
/// display urgency derived from `now`.
pub fn resolve_day_status(med: &Medication, day: NaiveDate, now: DateTime<Utc>) -> Vec<SlotView> {
    let effective = effective_slot_statuses(med, day);
    med.schedule
        .iter()
        .zip(effective)
        .map(|(slot, status)| {
            let minutes_until_due = minutes_until_due(slot, day, now);
            let status = status.map(SlotStatus::from).unwrap_or(SlotStatus::Pending);
            let urgency = match status {
                SlotStatus::Pending => Some(classify_urgency(minutes_until_due)),
                _ => None,
            };
            SlotView {
                time: slot.clone(),
                status,
                minutes_until_due,
                urgency,
            }
        })
        .collect()
}

/// Effective (last-write-wins) status per schedule slot for `day`.
/// `None` means no event targets the slot on that day.
pub fn effective_slot_statuses(med: &Medication, day: NaiveDate) -> Vec<Option<DoseStatus>> {
    med.schedule
        .iter()
        .map(|slot| {
            med.dose_history
                .iter()
                .filter(|e| e.date.date_naive() == day && e.time == *slot)
                .next_back()
                .map(|e| e.status)
        })
        .collect()
}

/// Whole minutes from `now` until the slot's due instant on `day`.
/// Negative once the slot is in the past. Unparseable labels resolve to 0.
pub fn minutes_until_due(slot: &str, day: NaiveDate, now: DateTime<Utc>) -> i64 {
    match slot_instant(slot, day) {
        // Minute resolution on both sides, matching the HH:MM slot grid.
        Some(due) => due.timestamp().div_euclid(60) - now.timestamp().div_euclid(60),
        None => 0,
    }
}

fn slot_instant(slot: &str, day: NaiveDate) -> Option<DateTime<Utc>> {
    let time = NaiveTime::parse_from_str(slot, "%H:%M").ok()?;
    Some(DateTime::from_naive_utc_and_offset(day.and_time(time), Utc))
}

/// Classify a pending slot for display. Overdue takes precedence over the
/// `[-15, +60]` due-soon band; anything outside both is merely scheduled.
pub fn classify_urgency(minutes_until_due: i64) -> SlotUrgency {
    if minutes_until_due < 0 && minutes_until_due > -OVERDUE_WINDOW_MIN {
        SlotUrgency::Overdue
    } else if minutes_until_due >= -DUE_SOON_BEHIND_MIN && minutes_until_due <= DUE_SOON_AHEAD_MIN {
        SlotUrgency::DueSoon
    } else {
        SlotUrgency::Scheduled
    }
}

/// Record a dose event and apply its stock side effect.
///
/// Appends one event dated `now` against `slot_time` and, for a taken dose,
/// decrements stock with a floor at zero — the mark is still recorded when
/// the bottle is already empty. The slot label is not validated against the
/// schedule: the ledger is append-only and schedule-agnostic, so a schedule
/// edit never invalidates history.
pub fn mark_dose(
    med: &Medication,
    slot_time: &str,
    status: DoseStatus,
    now: DateTime<Utc>,
) -> Medication {
    let mut next = med.clone();
    next.dose_history.push(DoseEvent {
        date: now,
        time: slot_time.to_string(),
        status,
    });
    if status == DoseStatus::Taken && next.current_stock > 0 {
        next.current_stock -= 1;
    }
    next
}

/// Reset stock to `quantity` (when a positive amount is given) or to the
/// full-refill quantity, stamping `last_refill`. Refills are not doses and
/// leave the history untouched.
pub fn refill(med: &Medication, quantity: Option<u32>, now: DateTime<Utc>) -> Medication {
    let mut next = med.clone();
    next.current_stock = match quantity {
        Some(q) if q >= 1 => q,
        _ => next.total_stock,
    };
    next.last_refill = now;
    next
}

/// Adherence over complete schedule cycles.
///
/// `total_count` is the largest complete multiple of the schedule length
/// within the recorded history; a trailing partial day's worth of entries is
/// discarded. Zero recorded cycles yield 0 percent.
pub fn compute_adherence(med: &Medication) -> Adherence {
    let slots = med.schedule.len() as u32;
    let recorded = med.dose_history.len() as u32;
    let total_count = if slots == 0 { 0 } else { (recorded / slots) * slots };
    let taken_count = med
        .dose_history
        .iter()
        .filter(|e| e.status == DoseStatus::Taken)
        .count() as u32;
    Adherence {
        taken_count,
        total_count,
        adherence_percent: percent(taken_count, total_count),
    }
}

/// Walk backward from `today` over `window_days` days.
///
/// A day counts only when it has at least one scheduled slot and every slot
/// of every medication active that day resolves to taken. `current` stops at
/// the first failing day (the streak is about unbroken recency); `best` is
/// the longest all-taken run anywhere in the window.
pub fn compute_streak(meds: &[Medication], today: NaiveDate, window_days: u32) -> Streak {
    let mut current = 0u32;
    let mut best = 0u32;
    let mut run = 0u32;
    let mut current_broken = false;

    for offset in 0..window_days {
        let day = today - Duration::days(i64::from(offset));
        if day_fully_taken(meds, day) {
            run += 1;
            best = best.max(run);
        } else {
            if !current_broken {
                current = run;
                current_broken = true;
            }
            run = 0;
        }
    }
    if !current_broken {
        current = run;
    }

    Streak { current, best }
}

/// True when `day` has scheduled slots and every one of them, across all
/// medications active that day, resolves to taken.
pub fn day_fully_taken(meds: &[Medication], day: NaiveDate) -> bool {
    let mut scheduled = 0usize;
    for med in meds.iter().filter(|m| is_active_on(m, day)) {
        let statuses = effective_slot_statuses(med, day);
        scheduled += statuses.len();
        if statuses.iter().any(|s| *s != Some(DoseStatus::Taken)) {
            return false;
        }
    }
    scheduled > 0
}

/// A medication is active on every day from its creation day onward.
pub fn is_active_on(med: &Medication, day: NaiveDate) -> bool {
    med.created_at.date_naive() <= day
}

pub(crate) fn percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        0
    } else {
        (f64::from(part) * 100.0 / f64::from(whole)).round() as u32
    }
}
