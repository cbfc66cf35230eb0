use serde_json::{Map, Value};

/// Argument keys that never reach the logs
pub const SENSITIVE_KEYS: &[&str] = &["token", "password", "secret"];

/// Copy of tool-call arguments with sensitive keys removed.
pub fn redact_arguments(arguments: &Value) -> Value {
    match arguments {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| !SENSITIVE_KEYS.contains(&key.as_str()))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect::<Map<_, _>>(),
        ),
        other => other.clone(),
    }
}
