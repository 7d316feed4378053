use std::str::FromStr;

use rusqlite::{params, Connection};

use crate::db::{format_ts, parse_ts, DatabaseError};
use crate::models::enums::{NotificationPriority, StaffRole};
use crate::models::Notification;

pub fn insert_notification(conn: &Connection, n: &Notification) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO notifications
         (notification_id, recipient_role, recipient_id, patient_id, message,
          priority, request_type, channels, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            n.notification_id,
            n.recipient_role.as_str(),
            n.recipient_id,
            n.patient_id,
            n.message,
            n.priority.as_str(),
            n.request_type,
            serde_json::to_string(&n.channels)?,
            format_ts(&n.created_at),
        ],
    )?;
    Ok(())
}

/// Dashboard notifications, newest first. `recipient` filters by staff id.
pub fn list_notifications(
    conn: &Connection,
    recipient: Option<&str>,
    limit: usize,
) -> Result<Vec<Notification>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT notification_id, recipient_role, recipient_id, patient_id, message,
                priority, request_type, channels, created_at
         FROM notifications
         WHERE (?1 IS NULL OR recipient_id = ?1)
         ORDER BY seq DESC LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![recipient, limit as i64], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, String>(6)?,
            row.get::<_, String>(7)?,
            row.get::<_, String>(8)?,
        ))
    })?;

    let mut out = Vec::new();
    for row in rows {
        let (id, role, recipient_id, patient_id, message, priority, request_type, channels, ts) =
            row?;
        out.push(Notification {
            notification_id: id,
            recipient_role: StaffRole::from_str(&role)?,
            recipient_id,
            patient_id,
            message,
            priority: NotificationPriority::from_str(&priority)?,
            request_type,
            channels: serde_json::from_str(&channels)?,
            created_at: parse_ts(&ts)?,
        });
    }
    Ok(out)
}
