//! Labeled field rules.
//!
//! One rule per field: a case-insensitive label set, an optional separator and
//! a capture group for the value. Adding a field or a language means adding
//! labels here, not touching the scanner.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{normalize_gender_token, parse_visit_date, Field, DATE_TOKEN};

/// A compiled label pattern and the post-processor for its captured value.
pub struct FieldRule {
    pub field: Field,
    pub regex: Regex,
    /// Applied to the trimmed capture; `None` rejects it
    pub post: fn(&str) -> Option<String>,
}

impl FieldRule {
    /// Try the rule against one line.
    ///
    /// Returns `None` when the label is absent, nothing but separators
    /// follow it, or the post-processor rejects the value.
    pub fn apply(&self, line: &str) -> Option<String> {
        let captured = self.regex.captures(line)?.get(1)?.as_str();
        let value = captured
            .trim()
            .trim_start_matches([':', '-', '.', '='])
            .trim();
        if value.is_empty() {
            return None;
        }
        (self.post)(value)
    }
}

fn rule(field: Field, pattern: &str, post: fn(&str) -> Option<String>) -> FieldRule {
    FieldRule {
        field,
        regex: Regex::new(pattern).expect("valid regex"),
        post,
    }
}

fn keep(value: &str) -> Option<String> {
    Some(value.to_string())
}

fn gender(value: &str) -> Option<String> {
    Some(normalize_gender_token(value).to_string())
}

/// Keep the date as written, but only if it is a real calendar date.
fn date(value: &str) -> Option<String> {
    parse_visit_date(value).map(|_| value.to_string())
}

/// Rules in form order, one per field.
pub static FIELD_RULES: LazyLock<Vec<FieldRule>> = LazyLock::new(|| {
    vec![
        rule(
            Field::PatientName,
            r"(?i)\b(?:patient'?s?\s+name|pt\.?\s+name|patient|name|pt|mrs|mr|miss|dr)\b\.?\s*[:\-=]?\s*(.+)",
            keep,
        ),
        rule(
            Field::Age,
            r"(?i)\b(?:age|aged|yrs|years|y/o)\b\.?\s*[:\-=]?\s*(\d{1,3})\b",
            keep,
        ),
        rule(
            Field::Gender,
            r"(?i)\b(?:gender|sex)\b\.?\s*[:\-=/]?\s*([a-z]+)\b",
            gender,
        ),
        rule(
            Field::Date,
            &format!(r"(?i)\b(?:date|dated|dt)\b\.?\s*[:\-=]?\s*({})", DATE_TOKEN),
            date,
        ),
        rule(
            Field::Diagnosis,
            r"(?i)\b(?:diagnosis|diag|dx|impression|condition|complaints?|c/o)\b\.?\s*[:\-=]?\s*(.+)",
            keep,
        ),
        rule(
            Field::Prescription,
            r"(?i)\b(?:prescription|rx|medications?|meds|treatment|advice|advised)\b\.?\s*[:\-=]?\s*(.+)",
            keep,
        ),
    ]
});

/// Two capitalized words in a row, e.g. "Jane Doe".
pub static CAPITALIZED_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z][a-z]+[ \t]+[A-Z][a-z]+)\b").expect("valid regex"));

/// A standalone number of one to three digits.
pub static STANDALONE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,3})\b").expect("valid regex"));

/// Look up the rule for a field.
pub fn rule_for(field: Field) -> Option<&'static FieldRule> {
    FIELD_RULES.iter().find(|r| r.field == field)
}
