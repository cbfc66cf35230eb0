//! Session labels
//!
//! Users work with bare keys (`env`, `team`). On the wire every user label is
//! stored under [`LABEL_PREFIX`] so it never collides with platform labels.
//! Keys coming back from the API without the prefix belong to the platform and
//! are hidden from users.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use crate::types::Session;
use crate::validate::validate_label_selector;
use crate::ValidationError;

pub const LABEL_PREFIX: &str = "acp.ambient-code.io/";
pub const MAX_LABEL_LEN: usize = 63;

pub type Labels = BTreeMap<String, String>;

static LABEL_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").unwrap());

fn validate_token(token: &str, field: &str) -> Result<(), ValidationError> {
    if token.is_empty() {
        return Err(ValidationError::empty(field));
    }
    if token.len() > MAX_LABEL_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_LABEL_LEN,
            len: token.len(),
        });
    }
    if !LABEL_TOKEN.is_match(token) {
        return Err(ValidationError::invalid(
            field,
            token,
            "must be 1-63 alphanumeric chars, dashes, dots, or underscores",
        ));
    }
    Ok(())
}

pub fn validate_label_key(key: &str) -> Result<(), ValidationError> {
    validate_token(key, "label key")
}

pub fn validate_label_value(key: &str, value: &str) -> Result<(), ValidationError> {
    validate_token(value, &format!("label value for '{key}'"))
}

/// Validate a user label map. Empty maps are rejected.
pub fn validate_labels(labels: &Labels) -> Result<(), ValidationError> {
    if labels.is_empty() {
        return Err(ValidationError::empty("labels"));
    }
    for (key, value) in labels {
        validate_label_key(key)?;
        validate_label_value(key, value)?;
    }
    Ok(())
}

pub fn prefixed_key(key: &str) -> String {
    format!("{LABEL_PREFIX}{key}")
}

/// Validate user labels and namespace their keys for the API.
pub fn build_labels(labels: &Labels) -> Result<Labels, ValidationError> {
    validate_labels(labels)?;
    Ok(labels
        .iter()
        .map(|(k, v)| (prefixed_key(k), v.clone()))
        .collect())
}

/// Strip the namespace from API labels, dropping platform-owned keys.
pub fn parse_labels(prefixed: &Labels) -> Labels {
    prefixed
        .iter()
        .filter_map(|(k, v)| {
            k.strip_prefix(LABEL_PREFIX)
                .filter(|bare| !bare.is_empty())
                .map(|bare| (bare.to_string(), v.clone()))
        })
        .collect()
}

/// Validate bare keys for removal and namespace them.
pub fn prefix_keys(keys: &[String]) -> Result<Vec<String>, ValidationError> {
    if keys.is_empty() {
        return Err(ValidationError::empty("label_keys"));
    }
    keys.iter()
        .map(|key| {
            validate_label_key(key)?;
            Ok(prefixed_key(key))
        })
        .collect()
}

/// Build the API selector (`prefix/k1=v1,prefix/k2=v2`), keys in ascending order.
pub fn build_selector(labels: &Labels) -> Result<String, ValidationError> {
    let prefixed = build_labels(labels)?;
    let selector = prefixed
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(",");
    Ok(selector)
}

/// Parse a user selector string (`env=test,team=qa`) into a label map.
///
/// Returns `None` for an absent or empty selector.
pub fn parse_selector(text: Option<&str>) -> Result<Option<Labels>, ValidationError> {
    let Some(selector) = validate_label_selector(text)? else {
        return Ok(None);
    };

    let mut labels = Labels::new();
    for pair in selector.split(',') {
        let (key, value) = pair.split_once('=').ok_or_else(|| {
            ValidationError::invalid("label_selector", selector, "expected key=value pairs")
        })?;
        if key.contains('/') {
            return Err(ValidationError::invalid(
                "label_selector",
                selector,
                "use bare label keys such as 'env=test'; the key prefix is added automatically",
            ));
        }
        validate_label_key(key)?;
        validate_label_value(key, value)?;
        labels.insert(key.to_string(), value.to_string());
    }
    Ok(Some(labels))
}

/// True when every selector pair is present on the session.
pub fn matches_selector(session: &Session, selector: &Labels) -> bool {
    selector
        .iter()
        .all(|(k, v)| session.labels.get(k) == Some(v))
}

/// Replace a session's API labels with their user-facing form.
pub fn user_facing(mut session: Session) -> Session {
    session.labels = parse_labels(&session.labels);
    session
}
