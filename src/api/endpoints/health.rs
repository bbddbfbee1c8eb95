//! Health endpoint.
//!
//! `GET /api/health` — liveness probe with a medication count.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::config;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub medication_count: i64,
}

pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let medication_count: i64 =
        conn.query_row("SELECT COUNT(*) FROM medications", [], |row| row.get(0))?;

    Ok(Json(HealthResponse {
        status: "ok",
        version: config::APP_VERSION,
        medication_count,
    }))
}
