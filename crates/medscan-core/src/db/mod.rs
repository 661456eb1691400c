//! Database layer for medscan.

mod audit;
mod records;
mod schema;

pub use audit::*;
pub use records::*;
pub use schema::*;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;

use crate::models::{NewRecord, PatientRecord};

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Not permitted: {0}")]
    Forbidden(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Anything that can persist a reviewed record.
pub trait RecordStore {
    /// Persist the payload and return the stored record.
    fn insert_record(&self, record: &NewRecord) -> DbResult<PatientRecord>;
}

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

impl RecordStore for Database {
    fn insert_record(&self, record: &NewRecord) -> DbResult<PatientRecord> {
        self.create_record(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn test_schema_initialized() {
        let db = Database::open_in_memory().unwrap();

        // Check that tables exist
        let tables: Vec<String> = db
            .conn()
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert!(tables.contains(&"patient_records".to_string()));
        assert!(tables.contains(&"audit_log".to_string()));
    }

    #[test]
    fn test_open_file_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("medscan.db");

        {
            let db = Database::open(&path).unwrap();
            db.append_audit("doc-1", "session.opened", "-", None).unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(db.list_audit(10).unwrap().len(), 1);
    }
}
