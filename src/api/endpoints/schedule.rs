//! Schedule endpoints.
//!
//! - `GET /api/schedule/today` — per-medication overview for today
//! - `GET /api/schedule/today/slots` — ledger-resolved slot statuses

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository;
use crate::ledger;
use crate::models::enums::{SlotStatus, SlotUrgency};

/// One medication's entry in the today overview.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayScheduleEntry {
    pub id: Uuid,
    pub name: String,
    pub dosage: String,
    pub schedule: Vec<String>,
    pub current_stock: u32,
    pub low_stock: bool,
}

/// `GET /api/schedule/today` — overview of every medication's slots and stock.
pub async fn today(
    State(ctx): State<ApiContext>,
) -> Result<Json<Vec<TodayScheduleEntry>>, ApiError> {
    let conn = ctx.open_db()?;
    let meds = repository::fetch_all_medications(&conn)?;

    let entries = meds
        .iter()
        .map(|med| TodayScheduleEntry {
            id: med.id,
            name: med.name.clone(),
            dosage: med.dosage.clone(),
            schedule: med.schedule.clone(),
            current_stock: med.current_stock,
            low_stock: med.low_stock(),
        })
        .collect();

    Ok(Json(entries))
}

/// One resolved slot in today's flattened schedule.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotScheduleItem {
    pub medication_id: Uuid,
    pub name: String,
    pub dosage: String,
    pub time: String,
    pub status: SlotStatus,
    pub minutes_until_due: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency: Option<SlotUrgency>,
    pub current_stock: u32,
    pub low_stock: bool,
}

/// `GET /api/schedule/today/slots` — every slot of every medication for
/// today, resolved by the ledger and sorted by slot time.
pub async fn today_slots(
    State(ctx): State<ApiContext>,
) -> Result<Json<Vec<SlotScheduleItem>>, ApiError> {
    let conn = ctx.open_db()?;
    let meds = repository::fetch_all_medications(&conn)?;

    let now = Utc::now();
    let today = now.date_naive();

    let mut items = Vec::new();
    for med in &meds {
        for slot in ledger::resolve_day_status(med, today, now) {
            items.push(SlotScheduleItem {
                medication_id: med.id,
                name: med.name.clone(),
                dosage: med.dosage.clone(),
                time: slot.time,
                status: slot.status,
                minutes_until_due: slot.minutes_until_due,
                urgency: slot.urgency,
                current_stock: med.current_stock,
                low_stock: med.low_stock(),
            });
        }
    }
    items.sort_by(|a, b| a.time.cmp(&b.time));

    Ok(Json(items))
}
