use serde_json::{Map, Value};

use crate::errors::AppError;

/// Rejects the request unless `key` matches the configured editor token.
/// An empty configured token locks editing entirely.
pub fn require_editor(configured: &str, key: Option<&str>) -> Result<(), AppError> {
    let key = key.map(str::trim).unwrap_or_default();
    if configured.is_empty() || key != configured {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// Lenient body parse: malformed or missing JSON reads as an empty object.
pub fn parse_body(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap_or_else(|_| Value::Object(Map::new()))
}

/// `{name, content}` → trimmed name and the content object.
pub fn validate_save(payload: &Value) -> Result<(String, Value), AppError> {
    let name = payload
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();
    if name.is_empty() {
        return Err(AppError::Validation("name is required".into()));
    }

    match payload.get("content") {
        Some(content @ Value::Object(_)) => Ok((name.to_string(), content.clone())),
        _ => Err(AppError::Validation("content must be an object".into())),
    }
}

/// `{names: [...]}` → trimmed names; every item must be a non-blank string.
/// An empty array is accepted and renumbers the current order.
pub fn validate_names(payload: &Value) -> Result<Vec<String>, AppError> {
    let invalid = || AppError::Validation("names must be a non-empty string array".into());

    let items = payload
        .get("names")
        .and_then(Value::as_array)
        .ok_or_else(invalid)?;

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .ok_or_else(invalid)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_editor_token() {
        assert!(require_editor("secret", Some("secret")).is_ok());
        assert!(require_editor("secret", Some(" secret ")).is_ok());
        assert!(matches!(
            require_editor("secret", Some("wrong")),
            Err(AppError::Forbidden)
        ));
        assert!(require_editor("secret", None).is_err());
        assert!(require_editor("", Some("")).is_err());
    }

    #[test]
    fn test_save_payload() {
        let (name, content) = validate_save(&json!({"name": " soup ", "content": {"a": 1}})).unwrap();
        assert_eq!(name, "soup");
        assert_eq!(content, json!({"a": 1}));

        let err = validate_save(&json!({"name": "  ", "content": {}})).unwrap_err();
        assert_eq!(err.to_string(), "name is required");

        let err = validate_save(&json!({"name": "soup", "content": "not an object"})).unwrap_err();
        assert_eq!(err.to_string(), "content must be an object");
    }

    #[test]
    fn test_names_payload() {
        assert_eq!(
            validate_names(&json!({"names": [" c ", "a"]})).unwrap(),
            vec!["c", "a"]
        );
        assert!(validate_names(&json!({"names": []})).unwrap().is_empty());
        for bad in [
            json!({}),
            json!({"names": "a"}),
            json!({"names": ["a", 1]}),
            json!({"names": ["a", " "]}),
        ] {
            assert!(validate_names(&bad).is_err());
        }
    }

    #[test]
    fn test_malformed_body_reads_as_empty_object() {
        assert_eq!(parse_body(b"not json"), json!({}));
    }
}
