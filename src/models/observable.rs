//! Observable model and request payload parsing

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use validator::Validate;

use crate::error::RelayError;

/// Typed value submitted by the platform for lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Observable {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl Observable {
    pub fn new(kind: &str, value: &str) -> Self {
        Self {
            kind: kind.to_string(),
            value: value.to_string(),
        }
    }

    /// Provider query string, `<type>:<value>`
    pub fn query(&self) -> String {
        format!("{}:{}", self.kind, self.value)
    }
}

/// Wire shape before validation
#[derive(Debug, Deserialize, Validate)]
struct ObservableInput {
    #[serde(rename = "type")]
    #[validate(required, length(min = 1))]
    kind: Option<String>,

    #[validate(required, length(min = 1))]
    value: Option<String>,
}

/// Parse and validate a request body holding a list of observables.
///
/// Errors are keyed by list index so the caller can see which entry failed.
pub fn parse_observables(body: &[u8]) -> Result<Vec<Observable>, RelayError> {
    let payload: Value = serde_json::from_slice(body)
        .map_err(|_| invalid(json!({ "_schema": ["Invalid input type."] })))?;

    let items = match payload {
        Value::Array(items) => items,
        _ => return Err(invalid(json!({ "_schema": ["Invalid input type."] }))),
    };

    let mut errors = BTreeMap::new();
    let mut observables = Vec::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        let input: ObservableInput = match serde_json::from_value(item) {
            Ok(input) => input,
            Err(e) => {
                errors.insert(index.to_string(), json!({ "_schema": [e.to_string()] }));
                continue;
            }
        };

        if let Err(e) = input.validate() {
            errors.insert(index.to_string(), serde_json::to_value(&e).unwrap_or(Value::Null));
            continue;
        }

        if let (Some(kind), Some(value)) = (input.kind, input.value) {
            observables.push(Observable::new(&kind, &value));
        }
    }

    if !errors.is_empty() {
        return Err(invalid(serde_json::to_value(errors).unwrap_or(Value::Null)));
    }

    Ok(observables)
}

fn invalid(details: Value) -> RelayError {
    RelayError::InvalidPayload(details.to_string())
}

/// Lower-case types, keep supported ones, drop exact duplicates.
///
/// First occurrence wins and relative order is preserved.
pub fn normalize(observables: Vec<Observable>, supported_types: &[String]) -> Vec<Observable> {
    let mut filtered: Vec<Observable> = Vec::with_capacity(observables.len());

    for mut observable in observables {
        observable.kind = observable.kind.to_lowercase();

        if !supported_types.iter().any(|t| *t == observable.kind) {
            continue;
        }
        if filtered.contains(&observable) {
            continue;
        }
        filtered.push(observable);
    }

    filtered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supported() -> Vec<String> {
        ["email", "domain", "ip", "url"].iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_normalize_lowercases_and_filters() {
        let input = vec![
            Observable::new("EMAIL", "a@b.com"),
            Observable::new("sha256", "deadbeef"),
            Observable::new("Domain", "example.com"),
        ];

        let output = normalize(input, &supported());

        assert_eq!(
            output,
            vec![
                Observable::new("email", "a@b.com"),
                Observable::new("domain", "example.com"),
            ]
        );
    }

    #[test]
    fn test_normalize_dedupes_after_lowercasing() {
        let input = vec![
            Observable::new("ip", "1.2.3.4"),
            Observable::new("email", "a@b.com"),
            Observable::new("IP", "1.2.3.4"),
            Observable::new("email", "A@b.com"),
            Observable::new("Email", "a@b.com"),
        ];

        let output = normalize(input, &supported());

        // Values are case-sensitive; only the type is normalized.
        assert_eq!(
            output,
            vec![
                Observable::new("ip", "1.2.3.4"),
                Observable::new("email", "a@b.com"),
                Observable::new("email", "A@b.com"),
            ]
        );
    }

    #[test]
    fn test_normalize_empty() {
        assert!(normalize(vec![], &supported()).is_empty());
        assert!(normalize(vec![Observable::new("email", "a@b.com")], &[]).is_empty());
    }

    #[test]
    fn test_query_format() {
        assert_eq!(Observable::new("email", "a@b.com").query(), "email:a@b.com");
    }

    #[test]
    fn test_parse_valid_payload() {
        let body = br#"[{"type": "EMAIL", "value": "a@b.com"}, {"type": "ip", "value": "1.1.1.1"}]"#;
        let observables = parse_observables(body).unwrap();
        assert_eq!(observables.len(), 2);
        assert_eq!(observables[0], Observable::new("EMAIL", "a@b.com"));
    }

    #[test]
    fn test_parse_rejects_non_list() {
        let err = parse_observables(br#"{"type": "email", "value": "a@b.com"}"#).unwrap_err();
        assert_eq!(err.code(), "invalid payload received");
        assert!(err.to_string().contains("Invalid input type."));

        let err = parse_observables(b"not json").unwrap_err();
        assert_eq!(err.code(), "invalid payload received");
    }

    #[test]
    fn test_parse_reports_failing_index() {
        let body = br#"[{"type": "email", "value": "a@b.com"}, {"type": "email"}, {"type": "", "value": "x"}]"#;
        let err = parse_observables(body).unwrap_err();
        let message = err.to_string();

        assert!(message.starts_with("Invalid JSON payload received. "));
        assert!(message.contains("\"1\""));
        assert!(message.contains("\"2\""));
        assert!(!message.contains("\"0\""));
    }

    #[test]
    fn test_parse_rejects_wrong_field_type() {
        let err = parse_observables(br#"[{"type": 5, "value": "a"}]"#).unwrap_err();
        assert!(err.to_string().contains("\"0\""));
    }
}
