//! Question records

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single question definition as delivered by the questionnaire backend.
///
/// Only the fields the engine reads by name are typed. Every other field the
/// backend sends is kept in `extra` so formulas can still reach it through
/// the read-only `qobj` binding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// Identifier of the answer slot this question fills
    #[serde(rename = "AttributeID", default)]
    pub attribute_id: String,

    /// Declared answer type (e.g. "Text", "Decimal", "Option")
    #[serde(rename = "DataType", default)]
    pub data_type: String,

    /// Selectable options, present only for option questions
    #[serde(rename = "Options", default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<Value>,

    /// Remaining backend fields, untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QuestionRecord {
    /// Full JSON view of the record, exactly as a formula sees `qobj`
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
