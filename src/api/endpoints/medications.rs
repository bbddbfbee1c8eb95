//! Medication endpoints.
//!
//! CRUD over medication records plus the two ledger mutations:
//! - `GET /api/medications` — all records, newest-created first
//! - `GET /api/medications/:id` — single record
//! - `POST /api/medications` — create
//! - `PUT /api/medications/:id` — update mutable fields
//! - `DELETE /api/medications/:id` — hard delete
//! - `POST /api/medications/:id/dose` — record a taken/skipped dose
//! - `POST /api/medications/:id/refill` — reset stock

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::endpoints::parse_id;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository;
use crate::ledger;
use crate::models::enums::DoseStatus;
use crate::models::{Medication, DEFAULT_LOW_STOCK_THRESHOLD};

/// `GET /api/medications` — all records, newest-created first.
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<Medication>>, ApiError> {
    let conn = ctx.open_db()?;
    let meds = repository::fetch_all_medications(&conn)?;
    Ok(Json(meds))
}

/// `GET /api/medications/:id` — single record.
pub async fn get_one(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<Medication>, ApiError> {
    let id = parse_id(&id)?;
    let conn = ctx.open_db()?;
    let med = repository::fetch_medication(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Medication not found".into()))?;
    Ok(Json(med))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMedicationRequest {
    pub name: Option<String>,
    pub dosage: Option<String>,
    pub schedule: Option<Vec<String>>,
    pub total_stock: Option<u32>,
    pub low_stock_threshold: Option<u32>,
}

/// `POST /api/medications` — create a record with a full bottle.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(req): Json<CreateMedicationRequest>,
) -> Result<(StatusCode, Json<Medication>), ApiError> {
    let name = req
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::Validation("Name is required".into()))?
        .to_string();
    let schedule = req
        .schedule
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("At least one schedule time is required".into()))?;
    validate_schedule(&schedule)?;
    let total_stock = req
        .total_stock
        .filter(|q| *q >= 1)
        .ok_or_else(|| ApiError::Validation("Total stock must be a positive integer".into()))?;

    let now = Utc::now();
    let medication = Medication {
        id: Uuid::new_v4(),
        name,
        dosage: req.dosage.unwrap_or_default(),
        frequency: schedule.len() as u32,
        schedule,
        total_stock,
        current_stock: total_stock,
        low_stock_threshold: req.low_stock_threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD),
        dose_history: Vec::new(),
        last_refill: now,
        created_at: now,
    };

    let conn = ctx.open_db()?;
    repository::insert_medication(&conn, &medication)?;

    Ok((StatusCode::CREATED, Json(medication)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMedicationRequest {
    pub name: Option<String>,
    pub dosage: Option<String>,
    pub schedule: Option<Vec<String>>,
    pub total_stock: Option<u32>,
}

/// `PUT /api/medications/:id` — update mutable fields in place.
/// `frequency` is re-derived whenever the schedule changes.
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    Json(req): Json<UpdateMedicationRequest>,
) -> Result<Json<Medication>, ApiError> {
    let id = parse_id(&id)?;
    let conn = ctx.open_db()?;
    let mut med = repository::fetch_medication(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Medication not found".into()))?;

    if let Some(name) = req.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(ApiError::Validation("Name must not be empty".into()));
        }
        med.name = name;
    }
    if let Some(dosage) = req.dosage {
        med.dosage = dosage;
    }
    if let Some(schedule) = req.schedule {
        if schedule.is_empty() {
            return Err(ApiError::Validation(
                "At least one schedule time is required".into(),
            ));
        }
        validate_schedule(&schedule)?;
        med.frequency = schedule.len() as u32;
        med.schedule = schedule;
    }
    if let Some(total_stock) = req.total_stock {
        if total_stock < 1 {
            return Err(ApiError::Validation(
                "Total stock must be a positive integer".into(),
            ));
        }
        med.total_stock = total_stock;
    }

    repository::update_medication(&conn, &med)?;
    Ok(Json(med))
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub medication: Medication,
}

/// `DELETE /api/medications/:id` — hard delete, history included.
pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = parse_id(&id)?;
    let conn = ctx.open_db()?;
    let medication = repository::delete_medication(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Medication not found".into()))?;
    Ok(Json(DeleteResponse {
        message: "Medication deleted".into(),
        medication,
    }))
}

#[derive(Deserialize)]
pub struct MarkDoseRequest {
    pub status: Option<String>,
    pub time: Option<String>,
}

/// `POST /api/medications/:id/dose` — record a dose against a slot label.
/// The label defaults to the current HH:MM and is deliberately not checked
/// against the schedule.
pub async fn mark_dose(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    Json(req): Json<MarkDoseRequest>,
) -> Result<Json<Medication>, ApiError> {
    let id = parse_id(&id)?;
    let conn = ctx.open_db()?;
    let med = repository::fetch_medication(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Medication not found".into()))?;

    let raw_status = req.status.unwrap_or_default();
    let status: DoseStatus = raw_status
        .parse()
        .map_err(|_| ApiError::InvalidStatus(raw_status.clone()))?;

    let now = Utc::now();
    let time = req
        .time
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| now.format("%H:%M").to_string());

    let updated = ledger::mark_dose(&med, &time, status, now);
    repository::update_medication(&conn, &updated)?;
    if let Some(event) = updated.dose_history.last() {
        repository::append_dose_event(&conn, &updated.id, event)?;
    }

    Ok(Json(updated))
}

#[derive(Deserialize)]
pub struct RefillRequest {
    pub quantity: Option<i64>,
}

/// `POST /api/medications/:id/refill` — reset stock and stamp `lastRefill`.
/// A missing or non-positive quantity resets to the full-refill amount.
pub async fn refill(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    Json(req): Json<RefillRequest>,
) -> Result<Json<Medication>, ApiError> {
    let id = parse_id(&id)?;
    let conn = ctx.open_db()?;
    let med = repository::fetch_medication(&conn, &id)?
        .ok_or_else(|| ApiError::NotFound("Medication not found".into()))?;

    let quantity = req.quantity.and_then(|q| u32::try_from(q).ok());
    let updated = ledger::refill(&med, quantity, Utc::now());
    repository::update_medication(&conn, &updated)?;

    Ok(Json(updated))
}

fn validate_schedule(schedule: &[String]) -> Result<(), ApiError> {
    for slot in schedule {
        if NaiveTime::parse_from_str(slot, "%H:%M").is_err() {
            return Err(ApiError::Validation(format!(
                "Invalid schedule time {slot:?} (expected HH:MM)"
            )));
        }
    }
    Ok(())
}
