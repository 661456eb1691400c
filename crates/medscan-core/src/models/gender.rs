//! Gender values and loose-token normalization.

use serde::{Deserialize, Serialize};

/// Canonical gender stored with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }

    /// Accept only the three canonical spellings (any case).
    pub fn from_canonical(value: &str) -> Option<Gender> {
        match value.trim().to_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a token captured next to a gender label onto a canonical string.
///
/// m / male / man become "Male", other stays "Other", everything else is
/// read as "Female". OCR often reads "m" as "rn", so "rnale" is "male".
pub fn normalize_gender_token(token: &str) -> &'static str {
    match token.trim().to_lowercase().replace("rn", "m").as_str() {
        "m" | "male" | "man" => Gender::Male.as_str(),
        "other" => Gender::Other.as_str(),
        _ => Gender::Female.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_male_tokens() {
        for token in ["m", "M", "male", "Male", "man", " MALE "] {
            assert_eq!(normalize_gender_token(token), "Male", "token {token:?}");
        }
    }

    #[test]
    fn test_female_tokens() {
        for token in ["f", "F", "female", "Female", "woman"] {
            assert_eq!(normalize_gender_token(token), "Female", "token {token:?}");
        }
    }

    #[test]
    fn test_ocr_confusions() {
        assert_eq!(normalize_gender_token("rnale"), "Male");
        assert_eq!(normalize_gender_token("RN"), "Male");
        assert_eq!(normalize_gender_token("Fernale"), "Female");
        assert_eq!(normalize_gender_token("Femal"), "Female");
    }

    #[test]
    fn test_from_canonical() {
        assert_eq!(Gender::from_canonical("Male"), Some(Gender::Male));
        assert_eq!(Gender::from_canonical("female"), Some(Gender::Female));
        assert_eq!(Gender::from_canonical("Other"), Some(Gender::Other));
        assert_eq!(Gender::from_canonical("m"), None);
        assert_eq!(Gender::from_canonical(""), None);
    }

    proptest! {
        #[test]
        fn normalization_is_total_and_canonical(token in ".*") {
            let out = normalize_gender_token(&token);
            prop_assert!(Gender::from_canonical(out).is_some());
        }

        #[test]
        fn normalization_is_idempotent(token in ".*") {
            let once = normalize_gender_token(&token);
            prop_assert_eq!(normalize_gender_token(once), once);
        }
    }
}
