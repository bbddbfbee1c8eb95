//! Analytics endpoint.
//!
//! `GET /api/analytics` — adherence trend, per-medication performance and
//! streaks, all derived through the ledger.

use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::analytics::{self, AnalyticsSummary};
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository;

pub async fn summary(State(ctx): State<ApiContext>) -> Result<Json<AnalyticsSummary>, ApiError> {
    let conn = ctx.open_db()?;
    let meds = repository::fetch_all_medications(&conn)?;
    Ok(Json(analytics::summarize(&meds, Utc::now().date_naive())))
}
