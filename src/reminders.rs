//! Reminder view — upcoming doses and one-shot due notifications.
//!
//! Both computations consume the ledger's resolved slot statuses, so a dose
//! marked taken or skipped disappears from reminders the moment the mark
//! lands. The tracker is the only stateful piece: it remembers which
//! `(medication, slot, day)` notifications were already delivered so a
//! fixed-interval poller never fires twice for the same dose.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::ledger;
use crate::models::enums::SlotStatus;
use crate::models::Medication;

/// Fixed polling interval for the reminder loop.
pub const POLL_INTERVAL_SECS: u64 = 60;
/// Pending doses at most this many minutes out count as upcoming.
pub const UPCOMING_WINDOW_MIN: i64 = 15;

/// A pending dose inside the upcoming window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingDose {
    pub medication_id: Uuid,
    pub name: String,
    pub dosage: String,
    pub time: String,
    pub minutes_until: i64,
}

/// A dose that has crossed its due instant and should be announced once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueNotification {
    pub medication_id: Uuid,
    pub name: String,
    pub time: String,
    pub day: NaiveDate,
}

/// Pending doses due within the next [`UPCOMING_WINDOW_MIN`] minutes,
/// soonest first.
pub fn upcoming_doses(meds: &[Medication], now: DateTime<Utc>) -> Vec<UpcomingDose> {
    let today = now.date_naive();
    let mut upcoming = Vec::new();
    for med in meds {
        for slot in ledger::resolve_day_status(med, today, now) {
            if slot.status != SlotStatus::Pending {
                continue;
            }
            if (0..=UPCOMING_WINDOW_MIN).contains(&slot.minutes_until_due) {
                upcoming.push(UpcomingDose {
                    medication_id: med.id,
                    name: med.name.clone(),
                    dosage: med.dosage.clone(),
                    time: slot.time,
                    minutes_until: slot.minutes_until_due,
                });
            }
        }
    }
    upcoming.sort_by_key(|d| d.minutes_until);
    upcoming
}

/// One-shot delivery bookkeeping for due notifications.
#[derive(Debug, Default)]
pub struct ReminderTracker {
    delivered: HashSet<(Uuid, String, NaiveDate)>,
}

impl ReminderTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute today's slot statuses and return the notifications due at
    /// this instant (`minutes_until_due == 0`) that were not delivered yet.
    /// Slots already marked taken or skipped never fire. Keys from previous
    /// days are pruned on each poll.
    pub fn poll(&mut self, meds: &[Medication], now: DateTime<Utc>) -> Vec<DueNotification> {
        let today = now.date_naive();
        self.delivered.retain(|(_, _, day)| *day == today);

        let mut due = Vec::new();
        for med in meds {
            for slot in ledger::resolve_day_status(med, today, now) {
                if slot.status != SlotStatus::Pending || slot.minutes_until_due != 0 {
                    continue;
                }
                if self.delivered.insert((med.id, slot.time.clone(), today)) {
                    due.push(DueNotification {
                        medication_id: med.id,
                        name: med.name.clone(),
                        time: slot.time,
                        day: today,
                    });
                }
            }
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::DoseStatus;
    use crate::models::DoseEvent;
    use chrono::{Duration, NaiveTime, TimeZone};

    fn at(day: NaiveDate, time: &str) -> DateTime<Utc> {
        let t = NaiveTime::parse_from_str(time, "%H:%M").unwrap();
        Utc.from_utc_datetime(&day.and_time(t))
    }

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn med_with(schedule: &[&str], history: Vec<DoseEvent>) -> Medication {
        let created = at(day("2026-01-01"), "08:00");
        Medication {
            id: Uuid::new_v4(),
            name: "Metformin".into(),
            dosage: "500mg".into(),
            frequency: schedule.len() as u32,
            schedule: schedule.iter().map(|s| s.to_string()).collect(),
            total_stock: 30,
            current_stock: 30,
            low_stock_threshold: 3,
            dose_history: history,
            last_refill: created,
            created_at: created,
        }
    }

    // ── upcoming_doses ───────────────────────────────────────

    #[test]
    fn upcoming_window_is_inclusive_of_both_edges() {
        let today = day("2026-02-10");
        let med = med_with(&["10:00", "10:15", "10:16"], vec![]);
        let upcoming = upcoming_doses(&[med], at(today, "10:00"));
        let minutes: Vec<i64> = upcoming.iter().map(|d| d.minutes_until).collect();
        assert_eq!(minutes, vec![0, 15]);
    }

    #[test]
    fn past_slots_are_not_upcoming() {
        let today = day("2026-02-10");
        let med = med_with(&["09:59"], vec![]);
        assert!(upcoming_doses(&[med], at(today, "10:00")).is_empty());
    }

    #[test]
    fn marked_slots_are_not_upcoming() {
        let today = day("2026-02-10");
        let med = med_with(
            &["10:05", "10:10"],
            vec![DoseEvent {
                date: at(today, "10:00"),
                time: "10:05".into(),
                status: DoseStatus::Skipped,
            }],
        );
        let upcoming = upcoming_doses(&[med], at(today, "10:00"));
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].time, "10:10");
    }

    #[test]
    fn upcoming_sorted_soonest_first() {
        let today = day("2026-02-10");
        let a = med_with(&["10:12"], vec![]);
        let b = med_with(&["10:03"], vec![]);
        let upcoming = upcoming_doses(&[a, b], at(today, "10:00"));
        assert_eq!(upcoming[0].time, "10:03");
        assert_eq!(upcoming[1].time, "10:12");
    }

    // ── ReminderTracker ──────────────────────────────────────

    #[test]
    fn fires_exactly_at_due_instant() {
        let today = day("2026-02-10");
        let med = med_with(&["10:00"], vec![]);
        let mut tracker = ReminderTracker::new();

        assert!(tracker.poll(&[med.clone()], at(today, "09:59")).is_empty());
        let due = tracker.poll(&[med.clone()], at(today, "10:00"));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].time, "10:00");
    }

    #[test]
    fn does_not_refire_on_repeated_polls() {
        let today = day("2026-02-10");
        let med = med_with(&["10:00"], vec![]);
        let mut tracker = ReminderTracker::new();

        assert_eq!(tracker.poll(&[med.clone()], at(today, "10:00")).len(), 1);
        assert!(tracker.poll(&[med.clone()], at(today, "10:00")).is_empty());
    }

    #[test]
    fn marked_slot_never_fires() {
        let today = day("2026-02-10");
        let med = med_with(
            &["10:00"],
            vec![DoseEvent {
                date: at(today, "09:55"),
                time: "10:00".into(),
                status: DoseStatus::Taken,
            }],
        );
        let mut tracker = ReminderTracker::new();
        assert!(tracker.poll(&[med], at(today, "10:00")).is_empty());
    }

    #[test]
    fn same_slot_fires_again_on_the_next_day() {
        let today = day("2026-02-10");
        let med = med_with(&["10:00"], vec![]);
        let mut tracker = ReminderTracker::new();

        assert_eq!(tracker.poll(&[med.clone()], at(today, "10:00")).len(), 1);
        let tomorrow = today + Duration::days(1);
        let due = tracker.poll(&[med.clone()], at(tomorrow, "10:00"));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].day, tomorrow);
        // and yesterday's key was pruned
        assert_eq!(tracker.delivered.len(), 1);
    }

    #[test]
    fn two_medications_sharing_a_slot_both_fire() {
        let today = day("2026-02-10");
        let a = med_with(&["10:00"], vec![]);
        let b = med_with(&["10:00"], vec![]);
        let mut tracker = ReminderTracker::new();
        assert_eq!(tracker.poll(&[a, b], at(today, "10:00")).len(), 2);
    }
}
