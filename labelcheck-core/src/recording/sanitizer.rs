use serde_json::Value;
use std::collections::HashMap;

/// Headers whose values never reach a recording.
pub const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "set-cookie"];

const SENSITIVE_FIELDS: &[&str] = &["token", "secret", "password", "api_key"];

const REDACTED: &str = "[REDACTED]";

pub struct Sanitizer;

impl Sanitizer {
    pub fn is_sensitive_header(header_name: &str) -> bool {
        let lower = header_name.to_lowercase();
        SENSITIVE_HEADERS.contains(&lower.as_str())
    }

    pub fn sanitize_headers(headers: &HashMap<String, String>) -> HashMap<String, String> {
        headers
            .iter()
            .map(|(key, value)| {
                let value = if Self::is_sensitive_header(key) {
                    REDACTED.to_string()
                } else {
                    value.clone()
                };
                (key.clone(), value)
            })
            .collect()
    }

    /// Redact credential-like fields anywhere in a JSON body.
    pub fn sanitize_json(value: &Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, val)| {
                        let val = if SENSITIVE_FIELDS.contains(&key.as_str()) {
                            Value::String(REDACTED.to_string())
                        } else {
                            Self::sanitize_json(val)
                        };
                        (key.clone(), val)
                    })
                    .collect(),
            ),
            Value::Array(arr) => Value::Array(arr.iter().map(Self::sanitize_json).collect()),
            _ => value.clone(),
        }
    }
}
