//! Reminders endpoint.
//!
//! `GET /api/reminders/upcoming` — pending doses due in the next 15 minutes.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository;
use crate::reminders::{self, UpcomingDose};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingResponse {
    pub upcoming: Vec<UpcomingDose>,
    pub last_checked: String,
}

pub async fn upcoming(State(ctx): State<ApiContext>) -> Result<Json<UpcomingResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let meds = repository::fetch_all_medications(&conn)?;
    let now = Utc::now();

    Ok(Json(UpcomingResponse {
        upcoming: reminders::upcoming_doses(&meds, now),
        last_checked: now.to_rfc3339(),
    }))
}
