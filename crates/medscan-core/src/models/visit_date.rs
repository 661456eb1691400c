//! Visit dates as they appear on paper records.
//!
//! The extractor's date pattern and the parser share this module so that any
//! date the extractor captures is one the parser accepts.

use std::ops::RangeInclusive;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

/// Date-like token: `yyyy-mm-dd`, `dd/mm/yyyy`, `dd/mm/yy`, `5 Mar 2024`,
/// `Mar. 5th, 24`. Separators may be `/`, `-` or `.`.
pub const DATE_TOKEN: &str = concat!(
    r"(?:\d{4}[/\-.]\d{1,2}[/\-.]\d{1,2}",
    r"|\d{1,2}[/\-.]\d{1,2}[/\-.](?:\d{4}|\d{2})",
    r"|\d{1,2}(?:st|nd|rd|th)?\s+(?:",
    r"jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?",
    r")\.?,?\s+(?:\d{4}|\d{2})",
    r"|(?:",
    r"jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?",
    r")\.?\s+\d{1,2}(?:st|nd|rd|th)?,?\s+(?:\d{4}|\d{2}))\b",
);

/// Layouts tried in order on normalized text.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%d-%m-%Y", "%d-%m-%y", "%d %B %Y", "%d %B %y", "%B %d %Y", "%B %d %y",
];

/// Plausible visit years. Rejects `%Y` reading a two-digit year literally.
const YEAR_RANGE: RangeInclusive<i32> = 1900..=2100;

static ORDINAL_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b").expect("valid regex"));

static ABBREVIATION_DOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([a-z])\.").expect("valid regex"));

static SEPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bsept\b").expect("valid regex"));

/// Parse a written visit date. `None` when no layout fits.
pub fn parse_visit_date(value: &str) -> Option<NaiveDate> {
    let cleaned = ORDINAL_SUFFIX.replace_all(value.trim(), "$1");
    let cleaned = ABBREVIATION_DOT.replace_all(&cleaned, "$1");
    let cleaned = SEPT.replace_all(&cleaned, "Sep");
    let cleaned = cleaned.replace(',', " ").replace(['/', '.'], "-");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    DATE_FORMATS
        .iter()
        .filter_map(|format| NaiveDate::parse_from_str(&cleaned, format).ok())
        .find(|date| YEAR_RANGE.contains(&date.year()))
}
