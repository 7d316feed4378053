use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{format_ts, now_naive, DatabaseError};
use crate::models::{PatientContext, PatientRecord};

/// Insert or replace a patient record (the hospital system is the source of truth).
pub fn upsert_patient(conn: &Connection, record: &PatientRecord) -> Result<(), DatabaseError> {
    let ctx = &record.context;
    conn.execute(
        "INSERT OR REPLACE INTO patients
         (id, name, bed_number, language, medications, allergies,
          assigned_nurse_id, assigned_physician_id, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            ctx.id,
            record.name,
            record.bed_number,
            record.language,
            serde_json::to_string(&ctx.medications)?,
            serde_json::to_string(&ctx.allergies)?,
            ctx.assigned_nurse_id,
            ctx.assigned_physician_id,
            format_ts(&now_naive()),
        ],
    )?;
    Ok(())
}

pub fn get_patient(conn: &Connection, id: &str) -> Result<Option<PatientRecord>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT id, name, bed_number, language, medications, allergies,
                    assigned_nurse_id, assigned_physician_id
             FROM patients WHERE id = ?1",
            params![id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                    row.get::<_, String>(7)?,
                ))
            },
        )
        .optional()?;

    let Some((id, name, bed_number, language, meds_json, allergies_json, nurse, physician)) = row
    else {
        return Ok(None);
    };

    Ok(Some(PatientRecord {
        context: PatientContext {
            id,
            medications: serde_json::from_str(&meds_json)?,
            allergies: serde_json::from_str(&allergies_json)?,
            assigned_nurse_id: nurse,
            assigned_physician_id: physician,
        },
        name,
        bed_number,
        language,
    }))
}

/// Like `get_patient`, but a missing row is an error.
pub fn require_patient(conn: &Connection, id: &str) -> Result<PatientRecord, DatabaseError> {
    get_patient(conn, id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "patient".into(),
        id: id.into(),
    })
}
