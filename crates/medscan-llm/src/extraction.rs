//! Field extraction from remote model output.

use serde_json::Value;
use thiserror::Error;

use medscan_core::models::{
    normalize_gender_token, parse_visit_date, ExtractedFields, Field, Gender,
};

/// Extraction errors.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid response format: {0}")]
    InvalidFormat(String),

    #[error("Response does not match field schema: {0}")]
    Schema(String),

    #[error("Cannot reach enhancement endpoint at {0}")]
    Connection(String),

    #[error("Enhancement request timed out after {0}s")]
    Timeout(u64),

    #[error("Enhancement endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("HTTP error: {0}")]
    Http(String),
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Envelope keys used by common text-generation servers.
const ENVELOPE_KEYS: &[&str] = &["generated_text", "response", "text"];

/// Pull the generated text out of a known response envelope.
///
/// Handles `[{"generated_text": ..}]`, `{"generated_text": ..}`,
/// `{"response": ..}` and `{"text": ..}`. Anything else is returned as is.
pub fn unwrap_envelope(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };

    let inner = match &value {
        Value::Array(items) => items.first().and_then(envelope_text),
        Value::Object(_) => envelope_text(&value),
        _ => None,
    };

    inner.unwrap_or_else(|| body.to_string())
}

fn envelope_text(value: &Value) -> Option<String> {
    let object = value.as_object()?;
    ENVELOPE_KEYS
        .iter()
        .find_map(|key| object.get(*key)?.as_str().map(str::to_string))
}

/// First balanced top-level `{...}` in the text.
///
/// Braces inside JSON strings are ignored, so a `}` in a diagnosis does not
/// end the object early.
pub fn find_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse generated text into a field set.
///
/// Fields the model left out stay empty; filling them is the caller's job.
pub fn parse_enhanced_fields(generated: &str) -> ExtractionResult<ExtractedFields> {
    let json = find_json_object(generated).ok_or_else(|| {
        ExtractionError::InvalidFormat("No JSON object found in response".into())
    })?;

    let value: Value = serde_json::from_str(json)?;
    narrow_fields(&value)
}

/// Check a parsed value against the field schema.
///
/// Each canonical key (camelCase or snake_case) may hold a string, a number or
/// null. Unknown keys are dropped.
pub fn narrow_fields(value: &Value) -> ExtractionResult<ExtractedFields> {
    let object = value
        .as_object()
        .ok_or_else(|| ExtractionError::Schema("expected a JSON object".into()))?;

    let mut fields = ExtractedFields::default();

    for (key, raw) in object {
        let Some(field) = Field::from_key(key) else {
            tracing::debug!(key = %key, "Dropping unknown key from enhancement response");
            continue;
        };

        let text = match raw {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Null => String::new(),
            other => {
                return Err(ExtractionError::Schema(format!(
                    "{} must be a string, number or null, got {}",
                    field.json_key(),
                    type_name(other)
                )))
            }
        };

        if !text.is_empty() {
            fields.set(field, text);
        }
    }

    if !fields.gender.is_empty() {
        fields.gender = canonical_gender(&fields.gender).to_string();
    }

    if !fields.date.is_empty() && parse_visit_date(&fields.date).is_none() {
        tracing::debug!(date = %fields.date, "Dropping unparseable date from enhancement response");
        fields.date.clear();
    }

    Ok(fields)
}

/// Canonical values pass through, loose tokens are normalized.
fn canonical_gender(value: &str) -> &'static str {
    match Gender::from_canonical(value) {
        Some(gender) => gender.as_str(),
        None => normalize_gender_token(value),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
