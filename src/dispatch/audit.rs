use async_trait::async_trait;
use thiserror::Error;

use crate::db::{repository, Database, DatabaseError};
use crate::models::NewAuditRecord;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Audit store error: {0}")]
    Store(#[from] DatabaseError),
}

/// Append-only audit trail: no update, no delete.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Persist one record and return its log id.
    async fn append(&self, record: &NewAuditRecord) -> Result<String, AuditError>;
}

pub struct SqliteAuditSink {
    db: Database,
}

impl SqliteAuditSink {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuditSink for SqliteAuditSink {
    async fn append(&self, record: &NewAuditRecord) -> Result<String, AuditError> {
        let log_id = self
            .db
            .with_conn(|conn| repository::append_audit_record(conn, record))?;
        tracing::debug!(log_id = %log_id, patient_id = %record.patient_id, "Audit record appended");
        Ok(log_id)
    }
}
