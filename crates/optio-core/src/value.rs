//! Answer values

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A value held by an answered question slot, a questionnaire constant, or a
/// per-option constant.
///
/// The renderer hands values over as JSON. Scalars and arrays of scalars map
/// directly; anything else (in practice: malformed payload entries) collapses
/// to [`AnswerValue::Null`] rather than failing the whole evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<AnswerValue>),
}

impl AnswerValue {
    /// Build from an arbitrary JSON value, never failing.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => AnswerValue::Null,
            Value::Bool(b) => AnswerValue::Bool(*b),
            Value::Number(n) => n
                .as_f64()
                .map(AnswerValue::Number)
                .unwrap_or(AnswerValue::Null),
            Value::String(s) => AnswerValue::Text(s.clone()),
            Value::Array(items) => {
                AnswerValue::List(items.iter().map(Self::from_json).collect())
            }
            Value::Object(_) => AnswerValue::Null,
        }
    }

    /// True for the null (unanswered / malformed) value
    pub fn is_null(&self) -> bool {
        matches!(self, AnswerValue::Null)
    }

    /// Numeric view, if this is a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AnswerValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text view, if this is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// List view, if this is a list
    pub fn as_list(&self) -> Option<&[AnswerValue]> {
        match self {
            AnswerValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl Default for AnswerValue {
    fn default() -> Self {
        AnswerValue::Null
    }
}

impl From<bool> for AnswerValue {
    fn from(b: bool) -> Self {
        AnswerValue::Bool(b)
    }
}

impl From<f64> for AnswerValue {
    fn from(n: f64) -> Self {
        AnswerValue::Number(n)
    }
}

impl From<i64> for AnswerValue {
    fn from(n: i64) -> Self {
        AnswerValue::Number(n as f64)
    }
}

impl From<&str> for AnswerValue {
    fn from(s: &str) -> Self {
        AnswerValue::Text(s.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(s: String) -> Self {
        AnswerValue::Text(s)
    }
}

impl From<Vec<AnswerValue>> for AnswerValue {
    fn from(items: Vec<AnswerValue>) -> Self {
        AnswerValue::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(AnswerValue::from_json(&json!(null)), AnswerValue::Null);
        assert_eq!(AnswerValue::from_json(&json!(true)), AnswerValue::Bool(true));
        assert_eq!(AnswerValue::from_json(&json!(5)), AnswerValue::Number(5.0));
        assert_eq!(
            AnswerValue::from_json(&json!("Red")),
            AnswerValue::Text("Red".into())
        );
    }

    #[test]
    fn test_from_json_list() {
        let value = AnswerValue::from_json(&json!(["A", "B"]));
        assert_eq!(
            value,
            AnswerValue::List(vec!["A".into(), "B".into()])
        );
    }

    #[test]
    fn test_from_json_object_collapses_to_null() {
        assert_eq!(
            AnswerValue::from_json(&json!({"nested": 1})),
            AnswerValue::Null
        );
    }

    #[test]
    fn test_untagged_roundtrip() {
        let value: AnswerValue = serde_json::from_str("[1,\"x\",null]").unwrap();
        assert_eq!(
            value,
            AnswerValue::List(vec![
                AnswerValue::Number(1.0),
                AnswerValue::Text("x".into()),
                AnswerValue::Null,
            ])
        );
    }
}
