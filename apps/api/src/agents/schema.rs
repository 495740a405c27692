//! Shared normalization helpers for the stage validators.

use serde_json::Value;

use crate::agents::Stage;
use crate::errors::AppError;
use crate::extract::JsonObject;

/// Collapses internal whitespace runs to one space and trims the ends.
pub fn normalize_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Case-insensitive dedup key for a normalized name.
pub fn dedup_key(name: &str) -> String {
    name.to_lowercase()
}

/// Fetches `key` and insists it is a JSON array.
pub fn require_list<'a>(
    stage: Stage,
    data: &'a JsonObject,
    key: &str,
) -> Result<&'a Vec<Value>, AppError> {
    data.get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::validation(stage, format!("{key} must be a list")))
}

/// Integer coercion for model-supplied numbers: integers pass, finite floats
/// truncate toward zero, booleans map to 0/1 and numeric strings are parsed.
pub fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  Power \t  BI\n"), "Power BI");
        assert_eq!(normalize_whitespace("   "), "");
    }

    #[test]
    fn test_coerce_integer() {
        assert_eq!(coerce_integer(&json!(4)), Some(4));
        assert_eq!(coerce_integer(&json!(3.9)), Some(3));
        assert_eq!(coerce_integer(&json!(" 5 ")), Some(5));
        assert_eq!(coerce_integer(&json!("7")), Some(7));
        assert_eq!(coerce_integer(&json!(true)), Some(1));
        assert_eq!(coerce_integer(&json!("high")), None);
        assert_eq!(coerce_integer(&json!("2.5")), None);
        assert_eq!(coerce_integer(&json!(null)), None);
        assert_eq!(coerce_integer(&json!([1])), None);
    }

    #[test]
    fn test_require_list_rejects_non_list() {
        let data = json!({"skill_vector": "Rust, SQL"});
        let object = data.as_object().unwrap();
        let err = require_list(Stage::Analyst, object, "skill_vector").unwrap_err();
        assert_eq!(err.to_string(), "Analyst output invalid: skill_vector must be a list");
    }

    #[test]
    fn test_require_list_rejects_missing_key() {
        let data = json!({});
        let object = data.as_object().unwrap();
        assert!(require_list(Stage::Editor, object, "rewritten_bullets").is_err());
    }
}
