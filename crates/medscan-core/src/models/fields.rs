//! Extracted field set shared by every extraction strategy.

use serde::{Deserialize, Serialize};

/// One of the six canonical fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    PatientName,
    Age,
    Gender,
    Date,
    Diagnosis,
    Prescription,
}

impl Field {
    /// All fields in form order.
    pub const ALL: [Field; 6] = [
        Field::PatientName,
        Field::Age,
        Field::Gender,
        Field::Date,
        Field::Diagnosis,
        Field::Prescription,
    ];

    /// Key used on the wire and in the review form.
    pub fn json_key(&self) -> &'static str {
        match self {
            Field::PatientName => "patientName",
            Field::Age => "age",
            Field::Gender => "gender",
            Field::Date => "date",
            Field::Diagnosis => "diagnosis",
            Field::Prescription => "prescription",
        }
    }

    /// snake_case spelling some models answer with.
    pub fn snake_key(&self) -> &'static str {
        match self {
            Field::PatientName => "patient_name",
            other => other.json_key(),
        }
    }

    /// Look up a field by its wire key (either spelling).
    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL
            .into_iter()
            .find(|f| f.json_key() == key || f.snake_key() == key)
    }
}

/// Best-effort structured record pulled out of OCR text.
///
/// Every field is a plain string and defaults to `""`, so the review form
/// always has a value to render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractedFields {
    pub patient_name: String,
    /// Digits only when extracted; free text once edited
    pub age: String,
    /// "Male", "Female" or "Other" when extracted
    pub gender: String,
    /// As found in the document; normalized to ISO at save time
    pub date: String,
    pub diagnosis: String,
    pub prescription: String,
}

impl ExtractedFields {
    /// Read a field.
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::PatientName => &self.patient_name,
            Field::Age => &self.age,
            Field::Gender => &self.gender,
            Field::Date => &self.date,
            Field::Diagnosis => &self.diagnosis,
            Field::Prescription => &self.prescription,
        }
    }

    /// Overwrite a field.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::PatientName => self.patient_name = value,
            Field::Age => self.age = value,
            Field::Gender => self.gender = value,
            Field::Date => self.date = value,
            Field::Diagnosis => self.diagnosis = value,
            Field::Prescription => self.prescription = value,
        }
    }

    /// True when the field holds nothing but whitespace.
    pub fn is_missing(&self, field: Field) -> bool {
        self.get(field).trim().is_empty()
    }

    /// Fields still waiting for a value.
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| self.is_missing(*f))
            .collect()
    }

    /// Number of fields holding a value.
    pub fn filled_count(&self) -> usize {
        Field::ALL.len() - self.missing_fields().len()
    }

    /// Copy values from `donor` into every field that is still missing.
    ///
    /// Fields that already hold a value are never overwritten.
    pub fn fill_missing_from(&mut self, donor: &ExtractedFields) {
        for field in self.missing_fields() {
            let value = donor.get(field);
            if !value.is_empty() {
                self.set(field, value);
            }
        }
    }
}
