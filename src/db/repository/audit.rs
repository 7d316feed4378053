use std::str::FromStr;

use rusqlite::{params, Connection};

use crate::db::{format_ts, now_naive, parse_ts, DatabaseError};
use crate::models::enums::{NotificationStatus, ResolutionStatus};
use crate::models::{log_id_for, AuditRecord, NewAuditRecord};

/// Append an audit entry. Returns the assigned log id.
///
/// Ids are strictly increasing and never reused. There is no update or
/// delete path; the schema's triggers reject both.
pub fn append_audit_record(
    conn: &Connection,
    record: &NewAuditRecord,
) -> Result<String, DatabaseError> {
    let tx = conn.unchecked_transaction()?;

    // Rows are never deleted, so MAX(seq) + 1 is the next AUTOINCREMENT value.
    let next_seq: i64 = tx.query_row(
        "SELECT COALESCE(MAX(seq), 0) + 1 FROM audit_log",
        [],
        |row| row.get(0),
    )?;
    let log_id = log_id_for(next_seq);

    tx.execute(
        "INSERT INTO audit_log
         (seq, log_id, patient_id, query_text, classification_json, distress_json,
          decision_json, escalation, notification_status, notification_id,
          staff_notified, approval_queue_id, resolution_status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            next_seq,
            log_id,
            record.patient_id,
            record.query_text,
            serde_json::to_string(&record.classification)?,
            serde_json::to_string(&record.distress)?,
            serde_json::to_string(&record.decision)?,
            record.decision.escalation.as_str(),
            record.notification_status.as_str(),
            record.notification_id,
            serde_json::to_string(&record.staff_notified)?,
            record.approval_queue_id,
            record.resolution_status().as_str(),
            format_ts(&now_naive()),
        ],
    )?;
    tx.commit()?;

    Ok(log_id)
}

/// Audit entries for a patient, newest first.
pub fn query_audit_by_patient(
    conn: &Connection,
    patient_id: &str,
    limit: usize,
) -> Result<Vec<AuditRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT seq, log_id, patient_id, query_text, classification_json, distress_json,
                decision_json, notification_status, notification_id, staff_notified,
                approval_queue_id, resolution_status, created_at
         FROM audit_log WHERE patient_id = ?1
         ORDER BY seq DESC LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![patient_id, limit as i64], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, String>(6)?,
            row.get::<_, String>(7)?,
            row.get::<_, Option<String>>(8)?,
            row.get::<_, String>(9)?,
            row.get::<_, Option<String>>(10)?,
            row.get::<_, String>(11)?,
            row.get::<_, String>(12)?,
        ))
    })?;

    let mut records = Vec::new();
    for row in rows {
        let (
            seq, log_id, patient_id, query_text, classification_json, distress_json,
            decision_json, notification_status, notification_id, staff_notified_json,
            approval_queue_id, resolution_status, created_at,
        ) = row?;

        records.push(AuditRecord {
            seq,
            log_id,
            entry: NewAuditRecord {
                patient_id,
                query_text,
                classification: serde_json::from_str(&classification_json)?,
                distress: serde_json::from_str(&distress_json)?,
                decision: serde_json::from_str(&decision_json)?,
                notification_status: NotificationStatus::from_str(&notification_status)?,
                notification_id,
                staff_notified: serde_json::from_str(&staff_notified_json)?,
                approval_queue_id,
            },
            resolution_status: ResolutionStatus::from_str(&resolution_status)?,
            created_at: parse_ts(&created_at)?,
        });
    }
    Ok(records)
}
