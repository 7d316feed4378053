use std::str::FromStr;

use rusqlite::{params, Connection};

use crate::db::{format_ts, parse_ts, DatabaseError};
use crate::models::enums::{EscalationLevel, Intent};
use crate::models::InteractionTurn;

/// Append a turn to the patient's interaction memory.
pub fn append_interaction(conn: &Connection, turn: &InteractionTurn) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO interactions (id, patient_id, query, response, intent, escalation, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            turn.id,
            turn.patient_id,
            turn.query,
            turn.response,
            turn.intent.as_str(),
            turn.escalation.as_str(),
            format_ts(&turn.created_at),
        ],
    )?;
    Ok(())
}

/// Most recent `limit` turns for a patient, newest first.
pub fn recent_interactions(
    conn: &Connection,
    patient_id: &str,
    limit: usize,
) -> Result<Vec<InteractionTurn>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, query, response, intent, escalation, created_at
         FROM interactions WHERE patient_id = ?1
         ORDER BY seq DESC LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![patient_id, limit as i64], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, String>(6)?,
        ))
    })?;

    let mut turns = Vec::new();
    for row in rows {
        let (id, patient_id, query, response, intent, escalation, created_at) = row?;
        turns.push(InteractionTurn {
            id,
            patient_id,
            query,
            response,
            intent: Intent::from_str(&intent)?,
            escalation: EscalationLevel::from_str(&escalation)?,
            created_at: parse_ts(&created_at)?,
        });
    }
    Ok(turns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{now_naive, open_memory_database};

    fn turn(patient: &str, n: usize) -> InteractionTurn {
        InteractionTurn {
            id: format!("INT-{patient}-{n}"),
            patient_id: patient.into(),
            query: format!("query {n}"),
            response: "ok".into(),
            intent: Intent::NonMedical,
            escalation: EscalationLevel::None,
            created_at: now_naive(),
        }
    }

    #[test]
    fn recent_returns_newest_first_within_limit() {
        let conn = open_memory_database().unwrap();
        for n in 0..5 {
            append_interaction(&conn, &turn("P1", n)).unwrap();
        }
        let recent = recent_interactions(&conn, "P1", 3).unwrap();
        let queries: Vec<_> = recent.iter().map(|t| t.query.as_str()).collect();
        assert_eq!(queries, vec!["query 4", "query 3", "query 2"]);
    }

    #[test]
    fn recent_is_scoped_to_patient() {
        let conn = open_memory_database().unwrap();
        append_interaction(&conn, &turn("P1", 0)).unwrap();
        append_interaction(&conn, &turn("P2", 0)).unwrap();
        let recent = recent_interactions(&conn, "P2", 10).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].patient_id, "P2");
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let conn = open_memory_database().unwrap();
        append_interaction(&conn, &turn("P1", 0)).unwrap();
        assert!(append_interaction(&conn, &turn("P1", 0)).is_err());
    }
}
