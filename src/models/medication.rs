use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::DoseStatus;

/// Default low-stock threshold applied when a medication is created without one.
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 3;

/// A tracked medication: schedule, stock counters, and the append-only
/// dose history all derived state is computed from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub id: Uuid,
    pub name: String,
    pub dosage: String,
    /// Redundant derived metadata; always equals `schedule.len()`.
    pub frequency: u32,
    /// Ordered HH:MM time-of-day slots, length >= 1.
    pub schedule: Vec<String>,
    pub total_stock: u32,
    pub current_stock: u32,
    pub low_stock_threshold: u32,
    /// Append-only; append order is authoritative for last-write-wins.
    pub dose_history: Vec<DoseEvent>,
    pub last_refill: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Medication {
    pub fn low_stock(&self) -> bool {
        self.current_stock <= self.low_stock_threshold
    }
}

/// One recorded dose event against a slot label on a given day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoseEvent {
    pub date: DateTime<Utc>,
    pub time: String,
    pub status: DoseStatus,
}
