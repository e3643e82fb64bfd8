//! Evaluation facades
//!
//! The renderer-facing entry points. Each mode runs the full pipeline
//! (build tables, sanitize, parse, evaluate) on fresh state and converts
//! any failure into its mode-specific value. No error ever crosses this
//! boundary, so the caller needs no error handling around an evaluation.

use crate::context::{EvaluationContext, RawEvaluationContext};
use crate::error::FormulaResult;
use crate::evaluator::{self, FormulaValue};
use crate::functions::FunctionRegistry;
use crate::parser::parse_formula;
use crate::sanitize::sanitize_formula;
use optio_core::QuestionRecord;

/// Message the validation facade returns when a formula evaluates falsy
pub const INVALID_ANSWER_MESSAGE: &str =
    "The answer is not valid for the rule defined on this question.";

/// The formula engine: a function registry plus the three evaluation modes.
///
/// Shareable across threads; every call builds its own context, so
/// concurrent evaluations never touch shared mutable state.
pub struct FormulaEngine {
    registry: FunctionRegistry,
}

impl FormulaEngine {
    /// Engine backed by an explicit function registry
    pub fn new(registry: FunctionRegistry) -> Self {
        Self { registry }
    }

    /// Engine with the full built-in spreadsheet-style library
    pub fn with_builtins() -> Self {
        Self::new(FunctionRegistry::with_builtins())
    }

    /// The registry backing this engine
    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Run the full pipeline and surface the error, for callers that want
    /// to distinguish failure causes. The facades below route through this.
    pub fn evaluate_raw(
        &self,
        formula: &str,
        question: &QuestionRecord,
        raw: &RawEvaluationContext,
    ) -> FormulaResult<FormulaValue> {
        let context = EvaluationContext::build(question, raw);
        let sanitized = sanitize_formula(formula, &context.attributes, &context.constants)?;
        let ast = parse_formula(&sanitized)?;
        evaluator::evaluate(&ast, &context, &self.registry)
    }

    /// Visibility/condition mode: the result coerced to a boolean, `false`
    /// on any failure.
    pub fn evaluate_condition(
        &self,
        formula: &str,
        question: &QuestionRecord,
        raw: &RawEvaluationContext,
    ) -> bool {
        match self.evaluate_raw(formula, question, raw) {
            Ok(value) => value.is_truthy(),
            Err(error) => {
                tracing::warn!("Condition formula failed: {:?}: {}", formula, error);
                false
            }
        }
    }

    /// Default/derived-value mode: the raw result value, null on any
    /// failure.
    pub fn evaluate_value(
        &self,
        formula: &str,
        question: &QuestionRecord,
        raw: &RawEvaluationContext,
    ) -> FormulaValue {
        match self.evaluate_raw(formula, question, raw) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!("Value formula failed: {:?}: {}", formula, error);
                FormulaValue::Null
            }
        }
    }

    /// Validation mode: `None` when the answer is accepted, otherwise a
    /// human-readable message. A failing formula reports its own error
    /// text rather than silently accepting the answer.
    pub fn evaluate_validation(
        &self,
        formula: &str,
        question: &QuestionRecord,
        raw: &RawEvaluationContext,
    ) -> Option<String> {
        match self.evaluate_raw(formula, question, raw) {
            Ok(value) if value.is_truthy() => None,
            Ok(_) => Some(INVALID_ANSWER_MESSAGE.to_string()),
            Err(error) => {
                tracing::warn!("Validation formula failed: {:?}: {}", formula, error);
                Some(format!("Validation error: {error}"))
            }
        }
    }
}

impl Default for FormulaEngine {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn question() -> QuestionRecord {
        serde_json::from_value(json!({
            "AttributeID": "Qty",
            "DataType": "Decimal",
        }))
        .unwrap()
    }

    fn raw() -> RawEvaluationContext {
        serde_json::from_value(json!({
            "allAnswers": [{"Qty": 5}, {"Color": "Red"}],
            "constants": [{"MaxQty": 10}],
        }))
        .unwrap()
    }

    #[test]
    fn test_condition_success_and_failure() {
        let engine = FormulaEngine::default();
        assert!(engine.evaluate_condition("att.Qty = 5", &question(), &raw()));
        assert!(!engine.evaluate_condition("att.Qty = 6", &question(), &raw()));
        // Sanitization failure degrades to hidden, never panics
        assert!(!engine.evaluate_condition("att.Missing = 5", &question(), &raw()));
        assert!(!engine.evaluate_condition("att.Qty === 5", &question(), &raw()));
    }

    #[test]
    fn test_empty_condition_is_visible() {
        let engine = FormulaEngine::default();
        assert!(engine.evaluate_condition("", &question(), &raw()));
        assert!(engine.evaluate_condition("   ", &question(), &raw()));
    }

    #[test]
    fn test_value_mode() {
        let engine = FormulaEngine::default();
        assert_eq!(
            engine.evaluate_value("att.Qty * 2", &question(), &raw()),
            FormulaValue::Number(10.0)
        );
        // Failure yields null, not false
        assert_eq!(
            engine.evaluate_value("BROKEN(", &question(), &raw()),
            FormulaValue::Null
        );
    }

    #[test]
    fn test_validation_mode() {
        let engine = FormulaEngine::default();
        assert_eq!(
            engine.evaluate_validation("att.Qty <= cst.MaxQty", &question(), &raw()),
            None
        );
        assert_eq!(
            engine.evaluate_validation("att.Qty > cst.MaxQty", &question(), &raw()),
            Some(INVALID_ANSWER_MESSAGE.to_string())
        );

        let message = engine
            .evaluate_validation("att.Missing = 1", &question(), &raw())
            .unwrap();
        assert!(message.starts_with("Validation error:"));
        assert!(message.contains("Missing"));
    }

    #[test]
    fn test_degraded_engine_still_has_exist() {
        let engine = FormulaEngine::new(FunctionRegistry::new());
        let raw: RawEvaluationContext = serde_json::from_value(json!({
            "allAnswers": [{"Options": ["A", "B"]}],
        }))
        .unwrap();
        assert!(engine.evaluate_condition("EXIST('B', att.Options)", &question(), &raw));
        // Library functions are absent, so the call fails and degrades
        assert!(!engine.evaluate_condition("SUM(1, 2) == 3", &question(), &raw));
    }
}
