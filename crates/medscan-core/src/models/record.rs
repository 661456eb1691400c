//! Persisted patient record models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::gender::Gender;

/// Normalized payload handed to the record store on save.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
    /// Human-facing ID derived from the name at save time (not unique)
    pub patient_id: String,
    /// Trimmed, never empty
    pub patient_name: String,
    pub age: Option<i64>,
    pub gender: Option<Gender>,
    /// Visit date; today when the document had none
    pub date: NaiveDate,
    pub diagnosis: Option<String>,
    pub prescription: Option<String>,
    /// Where the scanned image was uploaded, if anywhere
    pub image_url: Option<String>,
    /// Doctor who saved the record
    pub doctor_id: String,
}

/// A record as stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    /// Store-assigned UUID
    pub record_id: String,
    #[serde(flatten)]
    pub record: NewRecord,
    /// Creation timestamp
    pub created_at: String,
}

impl PatientRecord {
    /// Wrap a payload with a fresh identity.
    pub fn new(record: NewRecord) -> Self {
        Self {
            record_id: uuid::Uuid::new_v4().to_string(),
            record,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
