use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::repository::medication::parse_timestamp;
use crate::db::DatabaseError;
use crate::models::enums::DoseStatus;
use crate::models::DoseEvent;

pub fn append_dose_event(
    conn: &Connection,
    medication_id: &Uuid,
    event: &DoseEvent,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO dose_events (medication_id, recorded_at, slot_time, status)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            medication_id.to_string(),
            event.date.to_rfc3339(),
            event.time,
            event.status.as_str(),
        ],
    )?;
    Ok(())
}

/// Dose events for one medication in append (rowid) order.
pub fn fetch_dose_events(
    conn: &Connection,
    medication_id: &Uuid,
) -> Result<Vec<DoseEvent>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT recorded_at, slot_time, status
         FROM dose_events WHERE medication_id = ?1 ORDER BY rowid ASC",
    )?;

    let rows = stmt.query_map(params![medication_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;

    let mut events = Vec::new();
    for row in rows {
        let (recorded_at, slot_time, status) = row?;
        events.push(DoseEvent {
            date: parse_timestamp(&recorded_at)?,
            time: slot_time,
            status: DoseStatus::from_str(&status)?,
        });
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::medication::insert_medication;
    use crate::db::sqlite::open_memory_database;
    use crate::models::Medication;
    use chrono::Utc;

    fn insert_test_medication(conn: &Connection) -> Uuid {
        let now = Utc::now();
        let med = Medication {
            id: Uuid::new_v4(),
            name: "Metformin".into(),
            dosage: String::new(),
            frequency: 1,
            schedule: vec!["09:00".into()],
            total_stock: 10,
            current_stock: 10,
            low_stock_threshold: 3,
            dose_history: Vec::new(),
            last_refill: now,
            created_at: now,
        };
        insert_medication(conn, &med).expect("insert medication");
        med.id
    }

    #[test]
    fn append_and_fetch_preserves_order() {
        let conn = open_memory_database().unwrap();
        let med_id = insert_test_medication(&conn);
        let now = Utc::now();

        for status in [DoseStatus::Taken, DoseStatus::Skipped, DoseStatus::Taken] {
            append_dose_event(
                &conn,
                &med_id,
                &DoseEvent {
                    date: now,
                    time: "09:00".into(),
                    status,
                },
            )
            .unwrap();
        }

        let events = fetch_dose_events(&conn, &med_id).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].status, DoseStatus::Taken);
        assert_eq!(events[1].status, DoseStatus::Skipped);
        assert_eq!(events[2].status, DoseStatus::Taken);
    }

    #[test]
    fn fetch_is_scoped_to_medication() {
        let conn = open_memory_database().unwrap();
        let med_a = insert_test_medication(&conn);
        let med_b = insert_test_medication(&conn);

        append_dose_event(
            &conn,
            &med_a,
            &DoseEvent {
                date: Utc::now(),
                time: "09:00".into(),
                status: DoseStatus::Taken,
            },
        )
        .unwrap();

        assert_eq!(fetch_dose_events(&conn, &med_a).unwrap().len(), 1);
        assert!(fetch_dose_events(&conn, &med_b).unwrap().is_empty());
    }

    #[test]
    fn unknown_medication_has_no_events() {
        let conn = open_memory_database().unwrap();
        assert!(fetch_dose_events(&conn, &Uuid::new_v4()).unwrap().is_empty());
    }
}
