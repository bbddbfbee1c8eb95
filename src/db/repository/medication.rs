use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::repository::dose::fetch_dose_events;
use crate::db::DatabaseError;
use crate::models::Medication;

pub fn insert_medication(conn: &Connection, med: &Medication) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medications (id, name, dosage, frequency, schedule, total_stock,
         current_stock, low_stock_threshold, last_refill, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            med.id.to_string(),
            med.name,
            med.dosage,
            med.frequency,
            schedule_to_json(&med.schedule)?,
            med.total_stock,
            med.current_stock,
            med.low_stock_threshold,
            med.last_refill.to_rfc3339(),
            med.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// All medications, newest-created first, with dose histories attached.
pub fn fetch_all_medications(conn: &Connection) -> Result<Vec<Medication>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, dosage, frequency, schedule, total_stock, current_stock,
         low_stock_threshold, last_refill, created_at
         FROM medications ORDER BY created_at DESC, rowid DESC",
    )?;

    let rows = stmt.query_map([], |row| Ok(medication_row_from_rusqlite(row)))?;

    let mut meds = Vec::new();
    for row in rows {
        let mut med = medication_from_row(row??)?;
        med.dose_history = fetch_dose_events(conn, &med.id)?;
        meds.push(med);
    }
    Ok(meds)
}

/// Fetch one medication with its dose history. `None` when the id is unknown.
pub fn fetch_medication(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<Medication>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, name, dosage, frequency, schedule, total_stock, current_stock,
         low_stock_threshold, last_refill, created_at
         FROM medications WHERE id = ?1",
        params![id.to_string()],
        |row| Ok(medication_row_from_rusqlite(row)),
    );

    match result {
        Ok(row) => {
            let mut med = medication_from_row(row?)?;
            med.dose_history = fetch_dose_events(conn, &med.id)?;
            Ok(Some(med))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(DatabaseError::from(e)),
    }
}

/// Persist the record fields of a medication (everything except the dose
/// history, which only ever grows through `append_dose_event`).
pub fn update_medication(conn: &Connection, med: &Medication) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE medications SET name = ?2, dosage = ?3, frequency = ?4, schedule = ?5,
         total_stock = ?6, current_stock = ?7, low_stock_threshold = ?8, last_refill = ?9
         WHERE id = ?1",
        params![
            med.id.to_string(),
            med.name,
            med.dosage,
            med.frequency,
            schedule_to_json(&med.schedule)?,
            med.total_stock,
            med.current_stock,
            med.low_stock_threshold,
            med.last_refill.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// Hard-delete a medication and (via cascade) its entire dose history.
/// Returns the deleted record, or `None` when the id is unknown.
pub fn delete_medication(
    conn: &Connection,
    id: &Uuid,
) -> Result<Option<Medication>, DatabaseError> {
    let Some(med) = fetch_medication(conn, id)? else {
        return Ok(None);
    };
    conn.execute(
        "DELETE FROM medications WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(Some(med))
}

// Internal row type for Medication mapping
struct MedicationRow {
    id: String,
    name: String,
    dosage: String,
    frequency: u32,
    schedule: String,
    total_stock: u32,
    current_stock: u32,
    low_stock_threshold: u32,
    last_refill: String,
    created_at: String,
}

fn medication_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<MedicationRow, rusqlite::Error> {
    Ok(MedicationRow {
        id: row.get(0)?,
        name: row.get(1)?,
        dosage: row.get(2)?,
        frequency: row.get(3)?,
        schedule: row.get(4)?,
        total_stock: row.get(5)?,
        current_stock: row.get(6)?,
        low_stock_threshold: row.get(7)?,
        last_refill: row.get(8)?,
        created_at: row.get(9)?,
    })
}

fn medication_from_row(row: MedicationRow) -> Result<Medication, DatabaseError> {
    Ok(Medication {
        id: Uuid::parse_str(&row.id).map_err(|e| DatabaseError::CorruptValue(e.to_string()))?,
        name: row.name,
        dosage: row.dosage,
        frequency: row.frequency,
        schedule: serde_json::from_str(&row.schedule)
            .map_err(|e| DatabaseError::CorruptValue(e.to_string()))?,
        total_stock: row.total_stock,
        current_stock: row.current_stock,
        low_stock_threshold: row.low_stock_threshold,
        dose_history: Vec::new(), // attached by the caller
        last_refill: parse_timestamp(&row.last_refill)?,
        created_at: parse_timestamp(&row.created_at)?,
    })
}

fn schedule_to_json(schedule: &[String]) -> Result<String, DatabaseError> {
    serde_json::to_string(schedule).map_err(|e| DatabaseError::CorruptValue(e.to_string()))
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::CorruptValue(format!("{raw}: {e}")))
}
