//! Pattern extractor for OCR text.
//!
//! Pipeline: lines → labeled rules (first match wins) → name/age heuristics
//!
//! Pure and infallible: anything not found stays an empty string for the
//! reviewer to fill in.

mod rules;

pub use rules::*;

use crate::models::{ExtractedFields, Field};

/// Highest value the age heuristic accepts.
const MAX_HEURISTIC_AGE: u32 = 100;

/// Regex-driven extractor. Stateless; the rules are compiled once.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternExtractor;

impl PatternExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract the canonical field set from raw OCR text.
    pub fn extract(&self, text: &str) -> ExtractedFields {
        extract_fields(text)
    }
}

/// Extract the canonical field set from raw OCR text.
pub fn extract_fields(text: &str) -> ExtractedFields {
    let mut fields = scan_labeled_lines(text);

    if fields.is_missing(Field::PatientName) {
        if let Some(name) = find_capitalized_pair(text) {
            fields.patient_name = name;
        }
    }

    if fields.is_missing(Field::Age) {
        if let Some(age) = find_plausible_age(text) {
            fields.age = age;
        }
    }

    tracing::debug!(
        filled = fields.filled_count(),
        missing = ?fields.missing_fields(),
        "Pattern extraction complete"
    );

    fields
}

/// Labeled scan only: lines in reading order, first match per field.
pub fn scan_labeled_lines(text: &str) -> ExtractedFields {
    let mut fields = ExtractedFields::default();

    let lines = text.lines().map(str::trim).filter(|line| !line.is_empty());

    for line in lines {
        for rule in FIELD_RULES.iter() {
            if !fields.is_missing(rule.field) {
                continue;
            }
            if let Some(value) = rule.apply(line) {
                fields.set(rule.field, value);
            }
        }

        if fields.missing_fields().is_empty() {
            break;
        }
    }

    fields
}

/// First "Firstname Lastname"-looking pair anywhere in the text.
fn find_capitalized_pair(text: &str) -> Option<String> {
    CAPITALIZED_PAIR
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().split_whitespace().collect::<Vec<_>>().join(" "))
}

/// First standalone 1-3 digit number in [1, 100].
fn find_plausible_age(text: &str) -> Option<String> {
    STANDALONE_NUMBER
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .find(|m| {
            m.as_str()
                .parse::<u32>()
                .map(|n| (1..=MAX_HEURISTIC_AGE).contains(&n))
                .unwrap_or(false)
        })
        .map(|m| m.as_str().trim_start_matches('0').to_string())
}
