//! Review form state between extraction and persistence.
//!
//! The form never auto-saves: every record goes through a doctor's explicit
//! save, and a form saves at most once.

mod reconcile;

pub use reconcile::*;

use chrono::{DateTime, Local, TimeZone};
use thiserror::Error;

use crate::db::{DbError, RecordStore};
use crate::models::{ExtractedFields, Field, NewRecord, PatientRecord, Session};

/// Save failures. The form keeps its fields in every case.
#[derive(Error, Debug)]
pub enum SaveError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Store error: {0}")]
    Store(#[from] DbError),

    #[error("Record already saved as {0}")]
    AlreadySaved(String),
}

/// Editable fields for one scanned document.
#[derive(Debug, Clone, Default)]
pub struct ReviewForm {
    fields: ExtractedFields,
    raw_text: String,
    image_url: Option<String>,
    saved: Option<PatientRecord>,
}

impl ReviewForm {
    pub fn new(fields: ExtractedFields) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    /// Form pre-filled from a scan.
    pub fn from_scan(fields: ExtractedFields, raw_text: String, image_url: Option<String>) -> Self {
        Self {
            fields,
            raw_text,
            image_url,
            saved: None,
        }
    }

    pub fn fields(&self) -> &ExtractedFields {
        &self.fields
    }

    /// OCR text the fields were extracted from.
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn set_image_url(&mut self, image_url: Option<String>) {
        self.image_url = image_url;
    }

    /// Apply a free-text edit.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.fields.set(field, value);
    }

    /// What would be stored if saved now.
    pub fn preview(&self, session: &Session) -> Result<NewRecord, ValidationError> {
        reconcile(&self.fields, session, self.image_url.as_deref(), Local::now())
    }

    /// Reconcile and persist.
    pub fn save<S: RecordStore + ?Sized>(
        &mut self,
        store: &S,
        session: &Session,
    ) -> Result<&PatientRecord, SaveError> {
        self.save_at(store, session, Local::now())
    }

    /// [`save`](Self::save) with an explicit clock.
    pub fn save_at<S: RecordStore + ?Sized, Tz: TimeZone>(
        &mut self,
        store: &S,
        session: &Session,
        now: DateTime<Tz>,
    ) -> Result<&PatientRecord, SaveError> {
        if let Some(existing) = &self.saved {
            return Err(SaveError::AlreadySaved(existing.record_id.clone()));
        }

        let record = reconcile(&self.fields, session, self.image_url.as_deref(), now)?;
        let stored = store.insert_record(&record).map_err(|e| {
            tracing::warn!(error = %e, doctor_id = %session.doctor_id, "Record save failed");
            e
        })?;

        Ok(&*self.saved.insert(stored))
    }

    /// The stored record after a successful save.
    pub fn saved_record(&self) -> Option<&PatientRecord> {
        self.saved.as_ref()
    }

    pub fn is_saved(&self) -> bool {
        self.saved.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{DbResult, Database};
    use crate::models::Role;
    use std::cell::Cell;

    /// Store that counts calls and optionally fails.
    #[derive(Default)]
    struct CountingStore {
        calls: Cell<usize>,
        fail: bool,
    }

    impl RecordStore for CountingStore {
        fn insert_record(&self, record: &NewRecord) -> DbResult<PatientRecord> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(DbError::Constraint("disk full".into()));
            }
            Ok(PatientRecord::new(record.clone()))
        }
    }

    fn session() -> Session {
        Session::new("doc-1".into(), "Dr. Rao".into(), Role::Doctor)
    }

    fn filled_form() -> ReviewForm {
        ReviewForm::from_scan(
            ExtractedFields {
                patient_name: "Alice Walker".into(),
                age: "34".into(),
                ..Default::default()
            },
            "Name: Alice Walker\nAge: 34".into(),
            None,
        )
    }

    #[test]
    fn test_whitespace_name_never_reaches_store() {
        let store = CountingStore::default();
        let mut form = filled_form();
        form.set(Field::PatientName, "   ");

        let result = form.save(&store, &session());

        assert!(matches!(
            result,
            Err(SaveError::Validation(ValidationError::MissingPatientName))
        ));
        assert_eq!(store.calls.get(), 0);
        assert!(!form.is_saved());
    }

    #[test]
    fn test_store_failure_keeps_edits() {
        let store = CountingStore {
            fail: true,
            ..Default::default()
        };
        let mut form = filled_form();
        form.set(Field::Diagnosis, "Migraine");

        assert!(matches!(form.save(&store, &session()), Err(SaveError::Store(_))));
        assert_eq!(form.fields().diagnosis, "Migraine");
        assert_eq!(form.fields().patient_name, "Alice Walker");
        assert!(!form.is_saved());
    }

    #[test]
    fn test_second_save_rejected() {
        let store = CountingStore::default();
        let mut form = filled_form();

        let record_id = form.save(&store, &session()).unwrap().record_id.clone();
        let second = form.save(&store, &session());

        assert!(matches!(second, Err(SaveError::AlreadySaved(id)) if id == record_id));
        assert_eq!(store.calls.get(), 1);
    }

    #[test]
    fn test_save_at_uses_clock() {
        let store = CountingStore::default();
        let mut form = filled_form();
        let now = Local.with_ymd_and_hms(2024, 2, 29, 9, 0, 0).unwrap();

        let record = form.save_at(&store, &session(), now).unwrap();

        assert_eq!(record.record.date.to_string(), "2024-02-29");
        assert!(record.record.patient_id.starts_with("ALI"));
    }

    #[test]
    fn test_save_to_database() {
        let db = Database::open_in_memory().unwrap();
        let mut form = filled_form();

        let record_id = form.save(&db, &session()).unwrap().record_id.clone();

        let stored = db.get_record(&record_id).unwrap().unwrap();
        assert_eq!(stored.record.age, Some(34));
        assert_eq!(form.saved_record().unwrap().record_id, record_id);
    }

    #[test]
    fn test_preview_does_not_save() {
        let form = filled_form();
        let preview = form.preview(&session()).unwrap();

        assert_eq!(preview.patient_name, "Alice Walker");
        assert!(!form.is_saved());
    }
}
