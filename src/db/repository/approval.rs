use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{format_ts, now_naive, parse_ts, DatabaseError};
use crate::models::enums::{ApprovalStatus, NotificationPriority};
use crate::models::ApprovalEntry;

const SELECT_COLUMNS: &str = "SELECT queue_id, patient_id, query_text, request_type, assigned_to,
        priority, sla_minutes, status, created_at, resolved_at, resolved_by, resolution_notes
     FROM approval_queue";

pub fn insert_approval(conn: &Connection, entry: &ApprovalEntry) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO approval_queue
         (queue_id, patient_id, query_text, request_type, assigned_to, priority,
          sla_minutes, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            entry.queue_id,
            entry.patient_id,
            entry.query_text,
            entry.request_type,
            entry.assigned_to,
            entry.priority.as_str(),
            entry.sla_minutes,
            entry.status.as_str(),
            format_ts(&entry.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_approval(conn: &Connection, queue_id: &str) -> Result<Option<ApprovalEntry>, DatabaseError> {
    let sql = format!("{SELECT_COLUMNS} WHERE queue_id = ?1");
    let raw = conn
        .query_row(&sql, params![queue_id], read_raw)
        .optional()?;
    raw.map(into_entry).transpose()
}

/// Queue entries in a given status, oldest first (review order).
pub fn list_approvals(
    conn: &Connection,
    status: ApprovalStatus,
    limit: usize,
) -> Result<Vec<ApprovalEntry>, DatabaseError> {
    let sql = format!("{SELECT_COLUMNS} WHERE status = ?1 ORDER BY seq ASC LIMIT ?2");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![status.as_str(), limit as i64], read_raw)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(into_entry(row?)?);
    }
    Ok(out)
}

/// Move a PENDING entry to APPROVED or REJECTED.
///
/// Only pending entries can be resolved; anything else is a constraint violation.
pub fn resolve_approval(
    conn: &Connection,
    queue_id: &str,
    status: ApprovalStatus,
    staff_id: &str,
    notes: Option<&str>,
) -> Result<ApprovalEntry, DatabaseError> {
    if status == ApprovalStatus::Pending {
        return Err(DatabaseError::ConstraintViolation(
            "cannot resolve an approval back to PENDING".into(),
        ));
    }

    let existing = get_approval(conn, queue_id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "approval".into(),
        id: queue_id.into(),
    })?;
    if existing.status != ApprovalStatus::Pending {
        return Err(DatabaseError::ConstraintViolation(format!(
            "approval {queue_id} already {}",
            existing.status
        )));
    }

    conn.execute(
        "UPDATE approval_queue
         SET status = ?1, resolved_at = ?2, resolved_by = ?3, resolution_notes = ?4
         WHERE queue_id = ?5 AND status = 'PENDING'",
        params![
            status.as_str(),
            format_ts(&now_naive()),
            staff_id,
            notes,
            queue_id
        ],
    )?;

    get_approval(conn, queue_id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "approval".into(),
        id: queue_id.into(),
    })
}

type RawApproval = (
    String,
    String,
    String,
    String,
    String,
    String,
    u32,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
);

fn read_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawApproval> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
        row.get(10)?,
        row.get(11)?,
    ))
}

fn into_entry(raw: RawApproval) -> Result<ApprovalEntry, DatabaseError> {
    let (
        queue_id, patient_id, query_text, request_type, assigned_to, priority, sla_minutes,
        status, created_at, resolved_at, resolved_by, resolution_notes,
    ) = raw;
    Ok(ApprovalEntry {
        queue_id,
        patient_id,
        query_text,
        request_type,
        assigned_to,
        priority: NotificationPriority::from_str(&priority)?,
        sla_minutes,
        status: ApprovalStatus::from_str(&status)?,
        created_at: parse_ts(&created_at)?,
        resolved_at: resolved_at.as_deref().map(parse_ts).transpose()?,
        resolved_by,
        resolution_notes,
    })
}
