//! MedScan Core Library
//!
//! Digitizes paper medical records: OCR text is mapped onto a fixed field set,
//! reviewed by a doctor, and stored with a tamper-evident audit trail.
//!
//! # Architecture
//!
//! ```text
//! Image → OCR → FieldEnhancer ──────────────┐
//!                  │ remote model (optional) │
//!                  └─ falls back to ─► Pattern Extractor
//!                                            │
//!                                      [ReviewForm]
//!                                            │
//!                                    Doctor edits/saves
//!                                            │
//!                                       reconcile()
//!                                            │
//!                         ┌──────────────────▼──────────────────┐
//!                         │  SQLite: patient_records + audit_log │
//!                         └──────────────────┬──────────────────┘
//!                                            │
//!                                   List / Search / Export
//! ```
//!
//! # Core Principle
//!
//! **Extraction never fails and never saves.** Missing fields come back empty,
//! and only an explicit save by a signed-in doctor writes a record.
//!
//! # Modules
//!
//! - [`extractor`]: Regex rule table and name/age heuristics
//! - [`models`]: Domain types (ExtractedFields, PatientRecord, Session, etc.)
//! - [`review`]: Review form and field reconciliation
//! - [`pipeline`]: OCR and enhancer ports, scan pipeline
//! - [`db`]: SQLite record store and hash-chained audit log
//! - [`export`]: CSV/JSON record export
//! - [`config`]: File and environment configuration
//! - [`logging`]: Tracing subscriber setup

pub mod config;
pub mod db;
pub mod export;
pub mod extractor;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod review;

// Re-export commonly used types
pub use config::{AppConfig, EnhancementConfig};
pub use db::{Database, RecordStore};
pub use extractor::{extract_fields, PatternExtractor};
pub use models::{
    ExtractedFields, Field, Gender, NewRecord, PatientRecord, Role, Session, SessionContext,
};
pub use pipeline::{FieldEnhancer, OcrEngine, ScanOutcome, ScanPipeline};
pub use review::{generate_patient_id, reconcile, ReviewForm, SaveError, ValidationError};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum MedscanError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl From<db::DbError> for MedscanError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(id) => MedscanError::NotFound(id),
            db::DbError::Forbidden(reason) => MedscanError::Forbidden(reason),
            other => MedscanError::DatabaseError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for MedscanError {
    fn from(e: serde_json::Error) -> Self {
        MedscanError::SerializationError(e.to_string())
    }
}

impl From<models::SessionError> for MedscanError {
    fn from(e: models::SessionError) -> Self {
        match e {
            models::SessionError::NotSignedIn => MedscanError::NotSignedIn,
            other => MedscanError::InvalidInput(other.to_string()),
        }
    }
}

impl From<ValidationError> for MedscanError {
    fn from(e: ValidationError) -> Self {
        MedscanError::InvalidInput(e.to_string())
    }
}

impl From<SaveError> for MedscanError {
    fn from(e: SaveError) -> Self {
        match e {
            SaveError::Store(db_error) => db_error.into(),
            other => MedscanError::InvalidInput(other.to_string()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for MedscanError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        MedscanError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<MedscanCore>, MedscanError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(MedscanCore::new(db)))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<MedscanCore>, MedscanError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(MedscanCore::new(db)))
}

/// Load configuration, install logging and open the configured database.
///
/// Only the database and logging settings are applied here. A host that wants
/// remote enhancement loads the same file and passes `config.enhancement` to
/// `medscan_llm::enhancer_from_config`.
#[uniffi::export]
pub fn open_with_config(config_path: String) -> Result<Arc<MedscanCore>, MedscanError> {
    let config = AppConfig::load_or_default(&config_path)
        .map_err(|e| MedscanError::InvalidInput(format!("{:#}", e)))?;
    logging::init_tracing(&config.log_filter);

    tracing::info!(
        database = %config.database_path.display(),
        "MedScan starting v{}",
        env!("CARGO_PKG_VERSION")
    );

    let db = Database::open(&config.database_path)?;
    Ok(Arc::new(MedscanCore::new(db)))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database and session wrapper for FFI.
#[derive(uniffi::Object)]
pub struct MedscanCore {
    db: Arc<Mutex<Database>>,
    session: Arc<Mutex<SessionContext>>,
}

impl MedscanCore {
    fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            session: Arc::new(Mutex::new(SessionContext::new())),
        }
    }

    /// Snapshot of the signed-in user.
    fn current_session(&self) -> Result<Session, MedscanError> {
        let ctx = self.session.lock()?;
        Ok(ctx.current_user()?.clone())
    }
}

#[uniffi::export]
impl MedscanCore {
    // =========================================================================
    // Session Operations
    // =========================================================================

    /// Sign a user in, replacing any current session.
    pub fn sign_in(
        &self,
        doctor_id: String,
        display_name: String,
        role: FfiRole,
    ) -> Result<FfiSession, MedscanError> {
        let mut ctx = self.session.lock()?;
        let session = ctx.sign_in(&doctor_id, &display_name, role.into())?;
        Ok(session.clone().into())
    }

    /// Sign out. Returns whether a user was signed in.
    pub fn sign_out(&self) -> Result<bool, MedscanError> {
        let mut ctx = self.session.lock()?;
        Ok(ctx.sign_out())
    }

    /// The signed-in user, if any.
    pub fn current_user(&self) -> Result<Option<FfiSession>, MedscanError> {
        let ctx = self.session.lock()?;
        Ok(ctx.current_user().ok().map(|s| s.clone().into()))
    }

    // =========================================================================
    // Extraction & Review
    // =========================================================================

    /// Run the pattern extractor over OCR text.
    pub fn extract_fields(&self, text: String) -> FfiExtractedFields {
        extract_fields(&text).into()
    }

    /// Reconcile fields without saving.
    pub fn preview_record(
        &self,
        fields: FfiExtractedFields,
        image_url: Option<String>,
    ) -> Result<FfiNewRecord, MedscanError> {
        let session = self.current_session()?;
        let form = ReviewForm::from_scan(fields.into(), String::new(), image_url);
        Ok(form.preview(&session)?.into())
    }

    /// Reconcile and save reviewed fields.
    pub fn save_record(
        &self,
        fields: FfiExtractedFields,
        image_url: Option<String>,
    ) -> Result<FfiPatientRecord, MedscanError> {
        let session = self.current_session()?;
        let db = self.db.lock()?;
        let mut form = ReviewForm::from_scan(fields.into(), String::new(), image_url);
        let stored = form.save(&*db, &session)?;
        Ok(stored.clone().into())
    }

    // =========================================================================
    // Record Operations
    // =========================================================================

    /// Get a record by ID.
    pub fn get_record(&self, record_id: String) -> Result<Option<FfiPatientRecord>, MedscanError> {
        let session = self.current_session()?;
        let db = self.db.lock()?;
        let record = db
            .get_record(&record_id)?
            .filter(|r| session.is_admin() || r.record.doctor_id == session.doctor_id);
        Ok(record.map(|r| r.into()))
    }

    /// Records visible to the signed-in user, newest first.
    pub fn list_records(&self) -> Result<Vec<FfiPatientRecord>, MedscanError> {
        let session = self.current_session()?;
        let db = self.db.lock()?;
        let records = db.list_records(&session)?;
        Ok(records.into_iter().map(|r| r.into()).collect())
    }

    /// Fuzzy search by patient name or ID.
    pub fn search_records(
        &self,
        query: String,
        limit: u32,
    ) -> Result<Vec<FfiPatientRecord>, MedscanError> {
        let session = self.current_session()?;
        let db = self.db.lock()?;
        let records = db.search_records(&session, &query, limit as usize)?;
        Ok(records.into_iter().map(|r| r.into()).collect())
    }

    /// Delete a record. Returns whether it existed.
    pub fn delete_record(&self, record_id: String) -> Result<bool, MedscanError> {
        let session = self.current_session()?;
        let db = self.db.lock()?;
        Ok(db.delete_record(&session, &record_id)?)
    }

    /// Number of records visible to the signed-in user.
    pub fn count_records(&self) -> Result<u64, MedscanError> {
        let session = self.current_session()?;
        let db = self.db.lock()?;
        Ok(db.count_records(&session)? as u64)
    }

    // =========================================================================
    // Export & Audit
    // =========================================================================

    /// Export visible records as CSV.
    pub fn export_csv(&self) -> Result<String, MedscanError> {
        let session = self.current_session()?;
        let db = self.db.lock()?;
        Ok(export::RecordExporter::new(&db).export_csv(&session)?)
    }

    /// Export visible records as JSON.
    pub fn export_json(&self) -> Result<String, MedscanError> {
        let session = self.current_session()?;
        let db = self.db.lock()?;
        Ok(export::RecordExporter::new(&db).export_json(&session)?)
    }

    /// Check the audit log hash chain.
    pub fn verify_audit_chain(&self) -> Result<bool, MedscanError> {
        let db = self.db.lock()?;
        Ok(db.verify_audit_chain()?)
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiRole {
    Doctor,
    Admin,
}

impl From<FfiRole> for Role {
    fn from(role: FfiRole) -> Self {
        match role {
            FfiRole::Doctor => Role::Doctor,
            FfiRole::Admin => Role::Admin,
        }
    }
}

impl From<Role> for FfiRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Doctor => FfiRole::Doctor,
            Role::Admin => FfiRole::Admin,
        }
    }
}

/// FFI-safe session.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSession {
    pub doctor_id: String,
    pub display_name: String,
    pub role: FfiRole,
    pub signed_in_at: String,
}

impl From<Session> for FfiSession {
    fn from(session: Session) -> Self {
        Self {
            doctor_id: session.doctor_id,
            display_name: session.display_name,
            role: session.role.into(),
            signed_in_at: session.signed_in_at,
        }
    }
}

/// FFI-safe extracted fields.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiExtractedFields {
    pub patient_name: String,
    pub age: String,
    pub gender: String,
    pub date: String,
    pub diagnosis: String,
    pub prescription: String,
}

impl From<ExtractedFields> for FfiExtractedFields {
    fn from(fields: ExtractedFields) -> Self {
        Self {
            patient_name: fields.patient_name,
            age: fields.age,
            gender: fields.gender,
            date: fields.date,
            diagnosis: fields.diagnosis,
            prescription: fields.prescription,
        }
    }
}

impl From<FfiExtractedFields> for ExtractedFields {
    fn from(fields: FfiExtractedFields) -> Self {
        ExtractedFields {
            patient_name: fields.patient_name,
            age: fields.age,
            gender: fields.gender,
            date: fields.date,
            diagnosis: fields.diagnosis,
            prescription: fields.prescription,
        }
    }
}

/// FFI-safe record payload (preview).
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewRecord {
    pub patient_id: String,
    pub patient_name: String,
    pub age: Option<i64>,
    pub gender: Option<String>,
    pub date: String,
    pub diagnosis: Option<String>,
    pub prescription: Option<String>,
    pub image_url: Option<String>,
    pub doctor_id: String,
}

impl From<NewRecord> for FfiNewRecord {
    fn from(record: NewRecord) -> Self {
        Self {
            patient_id: record.patient_id,
            patient_name: record.patient_name,
            age: record.age,
            gender: record.gender.map(|g| g.as_str().to_string()),
            date: record.date.to_string(),
            diagnosis: record.diagnosis,
            prescription: record.prescription,
            image_url: record.image_url,
            doctor_id: record.doctor_id,
        }
    }
}

/// FFI-safe stored record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientRecord {
    pub record_id: String,
    pub record: FfiNewRecord,
    pub created_at: String,
}

impl From<PatientRecord> for FfiPatientRecord {
    fn from(stored: PatientRecord) -> Self {
        Self {
            record_id: stored.record_id,
            record: stored.record.into(),
            created_at: stored.created_at,
        }
    }
}
