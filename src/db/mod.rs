pub mod repository;
pub mod sqlite;

pub use sqlite::*;

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use thiserror::Error;

use crate::models::enums::InvalidEnum;

/// Timestamp format for all TEXT datetime columns.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,
}

impl From<InvalidEnum> for DatabaseError {
    fn from(err: InvalidEnum) -> Self {
        DatabaseError::InvalidEnum {
            field: err.field,
            value: err.value,
        }
    }
}

/// Shared handle to the single SQLite connection.
///
/// The mutex is only held inside `with_conn`, never across an `.await`.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Open (and migrate) the database file at `path`.
    pub fn open(path: &std::path::Path) -> Result<Self, DatabaseError> {
        Ok(Self::new(open_database(path)?))
    }

    /// In-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Ok(Self::new(open_memory_database()?))
    }

    pub fn with_conn<T, F>(&self, f: F) -> Result<T, DatabaseError>
    where
        F: FnOnce(&Connection) -> Result<T, DatabaseError>,
    {
        let guard = self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
        f(&guard)
    }
}

pub(crate) fn now_naive() -> chrono::NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

pub(crate) fn format_ts(ts: &chrono::NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn parse_ts(raw: &str) -> Result<chrono::NaiveDateTime, DatabaseError> {
    chrono::NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map_err(|_| DatabaseError::InvalidTimestamp(raw.to_string()))
}
