use std::str::FromStr;

use rusqlite::{params, Connection};

use crate::db::{format_ts, parse_ts, DatabaseError};
use crate::models::enums::AlertKind;
use crate::models::OperationalAlert;

pub fn insert_operational_alert(
    conn: &Connection,
    alert: &OperationalAlert,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO operational_alerts (id, kind, patient_id, detail, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            alert.id,
            alert.kind.as_str(),
            alert.patient_id,
            alert.detail,
            format_ts(&alert.created_at),
        ],
    )?;
    Ok(())
}

/// Most recent operational alerts, newest first.
pub fn list_operational_alerts(
    conn: &Connection,
    limit: usize,
) -> Result<Vec<OperationalAlert>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, kind, patient_id, detail, created_at
         FROM operational_alerts ORDER BY seq DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit as i64], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;

    let mut alerts = Vec::new();
    for row in rows {
        let (id, kind, patient_id, detail, created_at) = row?;
        alerts.push(OperationalAlert {
            id,
            kind: AlertKind::from_str(&kind)?,
            patient_id,
            detail,
            created_at: parse_ts(&created_at)?,
        });
    }
    Ok(alerts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{now_naive, open_memory_database};

    #[test]
    fn alerts_round_trip() {
        let conn = open_memory_database().unwrap();
        let alert = OperationalAlert {
            id: "ALERT-1".into(),
            kind: AlertKind::EmergencyNotificationFailed,
            patient_id: "P1".into(),
            detail: "notifier timed out".into(),
            created_at: now_naive(),
        };
        insert_operational_alert(&conn, &alert).unwrap();
        let alerts = list_operational_alerts(&conn, 10).unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::EmergencyNotificationFailed);
        assert_eq!(alerts[0].detail, "notifier timed out");
    }

    #[test]
    fn corrupt_created_at_is_reported() {
        let conn = open_memory_database().unwrap();
        conn.execute(
            "INSERT INTO operational_alerts (id, kind, patient_id, detail, created_at)
             VALUES ('ALERT-2', 'emergency_notification_failed', 'P1', 'x', 'not a time')",
            [],
        )
        .unwrap();
        let err = list_operational_alerts(&conn, 10).unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidTimestamp(_)));
    }
}
