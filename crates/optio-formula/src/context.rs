//! Evaluation contexts
//!
//! Turns the renderer's raw answer/constant payloads into the keyed lookup
//! tables the evaluator binds as `att`, `cst` and `cstatt`. Tables are built
//! fresh for every evaluation call; the engine never keeps them.

use ahash::AHashMap;
use optio_core::{AnswerValue, QuestionRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lookup table keyed by attribute or constant identifier
pub type Table = AHashMap<String, AnswerValue>;

/// Raw evaluation payload exactly as the questionnaire renderer sends it.
///
/// Every list is a JSON array of single-key records (`{"Qty": 5}`); absent
/// lists default to empty. Malformed elements are tolerated and skipped
/// during table construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawEvaluationContext {
    /// Answers given so far, in answer order
    pub all_answers: Vec<Value>,
    /// Questionnaire-level constants
    pub constants: Vec<Value>,
    /// Option-scoped constants, keyed by attribute:
    /// `{"Color": [{"Surcharge": 10}, ...]}`
    pub attribute_constants: Vec<Value>,
}

/// The three lookup tables plus the question under evaluation. Owned by
/// exactly one evaluation call.
#[derive(Debug, Clone, Default)]
pub struct EvaluationContext {
    /// `att` - attribute identifier to current answer value
    pub attributes: Table,
    /// `cst` - constant identifier to value
    pub constants: Table,
    /// `cstatt` - attribute identifier to its option's constants, populated
    /// only for answered attributes whose option carries constants
    pub option_constants: AHashMap<String, Table>,
    /// `qobj` - the question record, read-only to the formula
    pub question: QuestionRecord,
}

impl EvaluationContext {
    /// Build fresh tables from the raw payload.
    pub fn build(question: &QuestionRecord, raw: &RawEvaluationContext) -> Self {
        let attributes = collect_table(&raw.all_answers);
        let constants = collect_table(&raw.constants);
        let option_constants =
            collect_option_constants(&attributes, &raw.attribute_constants);

        Self {
            attributes,
            constants,
            option_constants,
            question: question.clone(),
        }
    }
}

/// First key/value pair of a single-key record, or `None` for anything that
/// is not a non-empty JSON object.
fn first_entry(record: &Value) -> Option<(&String, &Value)> {
    record.as_object().and_then(|map| map.iter().next())
}

fn collect_table(records: &[Value]) -> Table {
    let mut table = Table::new();
    for record in records {
        if let Some((key, value)) = first_entry(record) {
            // Later entries overwrite earlier ones
            table.insert(key.clone(), AnswerValue::from_json(value));
        }
    }
    table
}

/// Per-attribute constants exist only for attributes that are currently
/// answered. An entry whose constant list is not an array is skipped,
/// leaving that attribute absent from the table.
fn collect_option_constants(
    attributes: &Table,
    records: &[Value],
) -> AHashMap<String, Table> {
    let mut out = AHashMap::new();
    for record in records {
        let Some((attribute_id, constants)) = first_entry(record) else {
            continue;
        };
        if !attributes.contains_key(attribute_id) {
            continue;
        }
        let Some(entries) = constants.as_array() else {
            continue;
        };
        let mut nested = Table::new();
        for entry in entries {
            if let Some((name, value)) = first_entry(entry) {
                nested.insert(name.clone(), AnswerValue::from_json(value));
            }
        }
        out.insert(attribute_id.clone(), nested);
    }
    out
}
