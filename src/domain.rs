use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// The first 8 characters of a swift code identify the institution; anything
/// after that identifies the branch.
pub const INSTITUTION_PREFIX_LEN: usize = 8;

const HEADQUARTER_SUFFIX: &str = "XXX";

/// A single bank directory entry.
///
/// Serializes with the public API field names. All fields default on input so
/// a syntactically valid JSON body always binds; semantic rules (case
/// normalization, headquarter classification) are applied downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankRecord {
    #[serde(default)]
    pub address: String,
    #[serde(rename = "bankName", default)]
    pub name: String,
    #[serde(rename = "countryISO2", default)]
    pub country_code: String,
    #[serde(rename = "countryName", default, skip_serializing_if = "String::is_empty")]
    pub country_name: String,
    #[serde(rename = "isHeadquarter", default)]
    pub is_headquarter: bool,
    #[serde(rename = "swiftCode", default)]
    pub swift_code: String,
}

/// A code addresses a headquarters office when its branch suffix is "XXX".
///
/// Codes shorter than 9 characters have no branch suffix and are never
/// headquarters; this returns false for them rather than panicking.
pub fn is_headquarter_code(code: &str) -> bool {
    code.get(INSTITUTION_PREFIX_LEN..) == Some(HEADQUARTER_SUFFIX)
}

/// The 8-character institution prefix shared between a headquarters code and
/// its branch codes. Shorter codes are rejected so they can never widen into
/// a catch-all prefix match.
pub fn institution_prefix(code: &str) -> Result<&str, StoreError> {
    code.get(..INSTITUTION_PREFIX_LEN)
        .ok_or_else(|| StoreError::InvalidCode(code.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headquarter_iff_trailing_xxx() {
        assert!(is_headquarter_code("TESTPLPWXXX"));
        assert!(!is_headquarter_code("TESTPLPW123"));
        assert!(!is_headquarter_code("TESTPLPWXX1"));
    }

    #[test]
    fn eight_char_code_is_not_headquarter() {
        // No branch suffix at all.
        assert!(!is_headquarter_code("TESTPLPW"));
    }

    #[test]
    fn short_code_is_not_headquarter() {
        assert!(!is_headquarter_code(""));
        assert!(!is_headquarter_code("XXX"));
        assert!(!is_headquarter_code("SHORTXXX"));
    }

    #[test]
    fn institution_prefix_of_full_code() {
        assert_eq!(institution_prefix("TESTPLPWXXX").unwrap(), "TESTPLPW");
        assert_eq!(institution_prefix("TESTPLPW").unwrap(), "TESTPLPW");
    }

    #[test]
    fn institution_prefix_rejects_short_code() {
        assert!(matches!(
            institution_prefix("TEST"),
            Err(StoreError::InvalidCode(_))
        ));
    }

    #[test]
    fn serializes_with_api_field_names() {
        let record = BankRecord {
            address: "1 Main St".to_string(),
            name: "Test Bank".to_string(),
            country_code: "PL".to_string(),
            country_name: "POLAND".to_string(),
            is_headquarter: true,
            swift_code: "TESTPLPWXXX".to_string(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["bankName"], "Test Bank");
        assert_eq!(value["countryISO2"], "PL");
        assert_eq!(value["countryName"], "POLAND");
        assert_eq!(value["isHeadquarter"], true);
        assert_eq!(value["swiftCode"], "TESTPLPWXXX");
    }

    #[test]
    fn empty_country_name_is_omitted() {
        let record = BankRecord {
            address: String::new(),
            name: "Branch".to_string(),
            country_code: "PL".to_string(),
            country_name: String::new(),
            is_headquarter: false,
            swift_code: "TESTPLPW123".to_string(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("countryName").is_none());
    }
}
