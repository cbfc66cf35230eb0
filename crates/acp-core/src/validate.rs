//! Input validation for identifiers and selector strings
//!
//! Every check here is pure and runs before any remote call is made.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ValidationError;

pub const MAX_IDENTIFIER_LEN: usize = 63;

static DNS1123_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").unwrap());

static SELECTOR_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9=,_.\-/]+$").unwrap());

/// Validate a DNS-1123 label (session ids, project names, container names).
pub fn validate_identifier<'a>(value: &'a str, field: &str) -> Result<&'a str, ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::empty(field));
    }
    if value.len() > MAX_IDENTIFIER_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_IDENTIFIER_LEN,
            len: value.len(),
        });
    }
    if !DNS1123_LABEL.is_match(value) {
        return Err(ValidationError::invalid(
            field,
            value,
            "contains invalid characters. Must match DNS-1123 format",
        ));
    }
    Ok(value)
}

/// Validate a raw label selector string. Absent or empty means "no filter".
pub fn validate_label_selector(value: Option<&str>) -> Result<Option<&str>, ValidationError> {
    match value {
        None | Some("") => Ok(None),
        Some(selector) if SELECTOR_CHARS.is_match(selector) => Ok(Some(selector)),
        Some(selector) => Err(ValidationError::invalid(
            "label_selector",
            selector,
            "allowed characters are letters, digits, '=', ',', '_', '.', '-', '/'",
        )),
    }
}

/// Validate a required human-readable text field such as a display name.
pub fn validate_non_empty<'a>(value: &'a str, field: &str) -> Result<&'a str, ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::empty(field))
    } else {
        Ok(value)
    }
}
