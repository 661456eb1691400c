//! SQLite schema definition.

/// Complete database schema for medscan.
pub const SCHEMA: &str = r#"
-- Enable foreign keys
PRAGMA foreign_keys = ON;

-- ============================================================================
-- Patient Records
-- ============================================================================

CREATE TABLE IF NOT EXISTS patient_records (
    record_id TEXT PRIMARY KEY,
    patient_id TEXT NOT NULL,                    -- derived from name + time, NOT unique
    patient_name TEXT NOT NULL CHECK (length(trim(patient_name)) > 0),
    age INTEGER CHECK (age IS NULL OR age >= 0),
    gender TEXT CHECK (gender IS NULL OR gender IN ('Male', 'Female', 'Other')),
    record_date TEXT NOT NULL,                   -- ISO yyyy-mm-dd
    diagnosis TEXT,
    prescription TEXT,
    image_url TEXT,
    doctor_id TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_records_doctor ON patient_records(doctor_id, created_at);
CREATE INDEX IF NOT EXISTS idx_records_patient_id ON patient_records(patient_id);
CREATE INDEX IF NOT EXISTS idx_records_name ON patient_records(patient_name);

-- ============================================================================
-- Audit Log (Append-Only, hash chained)
-- ============================================================================

CREATE TABLE IF NOT EXISTS audit_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    actor TEXT NOT NULL,
    action TEXT NOT NULL,
    subject TEXT NOT NULL,
    detail TEXT,
    prev_hash TEXT NOT NULL,                     -- entry_hash of previous row, zeros for the first
    entry_hash TEXT NOT NULL UNIQUE,             -- SHA-256 over prev_hash and this row
    created_at TEXT NOT NULL
);

CREATE TRIGGER IF NOT EXISTS audit_log_no_update BEFORE UPDATE ON audit_log
BEGIN
    SELECT RAISE(ABORT, 'Audit log is append-only');
END;

CREATE TRIGGER IF NOT EXISTS audit_log_no_delete BEFORE DELETE ON audit_log
BEGIN
    SELECT RAISE(ABORT, 'Audit log is append-only');
END;
"#;
