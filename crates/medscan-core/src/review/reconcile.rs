//! Field reconciliation: reviewed text fields to a persistence payload.

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use thiserror::Error;

use crate::models::{parse_visit_date, ExtractedFields, Gender, NewRecord, Session};

/// Reconciliation failures. Nothing is written when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Patient name is required")]
    MissingPatientName,

    #[error("Unrecognized date: {0}")]
    InvalidDate(String),
}

/// Derive the human-facing patient ID.
///
/// First three characters of the name with whitespace removed, uppercased,
/// followed by the low six digits of the timestamp. Not unique.
pub fn generate_patient_id(name: &str, timestamp_millis: i64) -> String {
    let prefix: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .take(3)
        .collect::<String>()
        .to_uppercase();

    format!("{}{:06}", prefix, timestamp_millis.rem_euclid(1_000_000))
}

/// Parse a visit date. Empty input means `today`.
pub fn parse_record_date(value: &str, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(today);
    }

    parse_visit_date(trimmed).ok_or_else(|| ValidationError::InvalidDate(trimmed.to_string()))
}

/// Turn reviewed fields into a record ready for the store.
pub fn reconcile<Tz: TimeZone>(
    fields: &ExtractedFields,
    session: &Session,
    image_url: Option<&str>,
    now: DateTime<Tz>,
) -> Result<NewRecord, ValidationError> {
    let patient_name = fields.patient_name.trim();
    if patient_name.is_empty() {
        return Err(ValidationError::MissingPatientName);
    }

    let today = now.with_timezone(&Local).date_naive();
    let date = parse_record_date(&fields.date, today)?;

    Ok(NewRecord {
        patient_id: generate_patient_id(patient_name, now.timestamp_millis()),
        patient_name: patient_name.to_string(),
        age: fields.age.trim().parse::<i64>().ok().filter(|age| *age >= 0),
        gender: Gender::from_canonical(&fields.gender),
        date,
        diagnosis: non_empty(&fields.diagnosis),
        prescription: non_empty(&fields.prescription),
        image_url: image_url.and_then(non_empty),
        doctor_id: session.doctor_id.clone(),
    })
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
