//! Formula evaluator
//!
//! Walks a parsed formula AST against the bound tables and the function
//! registry. Every name a formula can resolve is handed in explicitly; there
//! is no ambient scope to fall back to, which is the core of the sandboxing
//! strategy.

use crate::ast::{BinaryOperator, FormulaExpr, PathRoot, UnaryOperator};
use crate::context::EvaluationContext;
use crate::error::{FormulaError, FormulaResult};
use crate::functions::FunctionRegistry;
use ahash::AHashMap;
use optio_core::AnswerValue;
use serde_json::Value;
use std::cmp::Ordering;

/// Maximum number of AST nodes a single call may evaluate. The grammar has
/// no loops, so this only trips on pathological expression sizes.
const STEP_BUDGET: usize = 100_000;

/// Value types during formula evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaValue {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Array(Vec<FormulaValue>),
    Object(AHashMap<String, FormulaValue>),
}

impl FormulaValue {
    /// Convert to number, if possible
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FormulaValue::Number(n) => Some(*n),
            FormulaValue::Boolean(true) => Some(1.0),
            FormulaValue::Boolean(false) => Some(0.0),
            FormulaValue::String(s) => s.trim().parse().ok(),
            FormulaValue::Null => Some(0.0),
            _ => None,
        }
    }

    /// Force conversion to number for arithmetic
    pub fn to_number(&self) -> FormulaResult<f64> {
        self.as_number().ok_or_else(|| {
            FormulaError::Evaluation(format!("Cannot convert {} to a number", self.type_name()))
        })
    }

    /// Source-language truthiness: null, false, 0, NaN and "" are falsy,
    /// everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            FormulaValue::Null => false,
            FormulaValue::Boolean(b) => *b,
            FormulaValue::Number(n) => *n != 0.0 && !n.is_nan(),
            FormulaValue::String(s) => !s.is_empty(),
            FormulaValue::Array(_) | FormulaValue::Object(_) => true,
        }
    }

    /// Convert to string for concatenation
    pub fn as_string(&self) -> String {
        match self {
            FormulaValue::Null => String::new(),
            FormulaValue::Boolean(true) => "true".to_string(),
            FormulaValue::Boolean(false) => "false".to_string(),
            FormulaValue::Number(n) => {
                // No trailing ".0" on integral values
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            FormulaValue::String(s) => s.clone(),
            FormulaValue::Array(items) => items
                .iter()
                .map(|v| v.as_string())
                .collect::<Vec<_>>()
                .join(","),
            FormulaValue::Object(_) => "[object]".to_string(),
        }
    }

    /// Short name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            FormulaValue::Null => "null",
            FormulaValue::Boolean(_) => "boolean",
            FormulaValue::Number(_) => "number",
            FormulaValue::String(_) => "string",
            FormulaValue::Array(_) => "array",
            FormulaValue::Object(_) => "object",
        }
    }

    /// Build from an arbitrary JSON value
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FormulaValue::Null,
            Value::Bool(b) => FormulaValue::Boolean(*b),
            Value::Number(n) => n
                .as_f64()
                .map(FormulaValue::Number)
                .unwrap_or(FormulaValue::Null),
            Value::String(s) => FormulaValue::String(s.clone()),
            Value::Array(items) => {
                FormulaValue::Array(items.iter().map(Self::from_json).collect())
            }
            Value::Object(map) => FormulaValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&AnswerValue> for FormulaValue {
    fn from(value: &AnswerValue) -> Self {
        match value {
            AnswerValue::Null => FormulaValue::Null,
            AnswerValue::Bool(b) => FormulaValue::Boolean(*b),
            AnswerValue::Number(n) => FormulaValue::Number(*n),
            AnswerValue::Text(s) => FormulaValue::String(s.clone()),
            AnswerValue::List(items) => {
                FormulaValue::Array(items.iter().map(FormulaValue::from).collect())
            }
        }
    }
}

/// Loose equality, matching how authors expect `==` to behave: numbers and
/// numeric strings compare equal, booleans coerce to numbers, null equals
/// only null. Arrays and objects never compare equal.
pub fn loose_eq(left: &FormulaValue, right: &FormulaValue) -> bool {
    match (left, right) {
        (FormulaValue::Null, FormulaValue::Null) => true,
        (FormulaValue::Null, _) | (_, FormulaValue::Null) => false,

        (FormulaValue::Number(l), FormulaValue::Number(r)) => l == r,
        (FormulaValue::String(l), FormulaValue::String(r)) => l == r,
        (FormulaValue::Boolean(l), FormulaValue::Boolean(r)) => l == r,

        // Cross-type: both sides coerce to numbers; a non-numeric string
        // compares unequal to everything but an identical string.
        (FormulaValue::Array(_) | FormulaValue::Object(_), _)
        | (_, FormulaValue::Array(_) | FormulaValue::Object(_)) => false,
        (l, r) => match (l.as_number(), r.as_number()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    }
}

/// Ordering for `<`, `<=`, `>`, `>=`. Strings compare lexicographically,
/// everything else numerically; `None` (incomparable, e.g. NaN) makes every
/// comparison false, as in the source language.
fn compare_values(left: &FormulaValue, right: &FormulaValue) -> Option<Ordering> {
    match (left, right) {
        (FormulaValue::String(l), FormulaValue::String(r)) => Some(l.cmp(r)),
        (l, r) => {
            let l = l.as_number()?;
            let r = r.as_number()?;
            l.partial_cmp(&r)
        }
    }
}

/// Evaluate a formula expression against a context and function registry
pub fn evaluate(
    expr: &FormulaExpr,
    context: &EvaluationContext,
    registry: &FunctionRegistry,
) -> FormulaResult<FormulaValue> {
    Evaluator::new(context, registry).evaluate(expr)
}

/// One evaluation call: the bound tables, the function registry and the
/// remaining step budget. Not retained across calls.
pub struct Evaluator<'a> {
    context: &'a EvaluationContext,
    registry: &'a FunctionRegistry,
    steps: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(context: &'a EvaluationContext, registry: &'a FunctionRegistry) -> Self {
        Self {
            context,
            registry,
            steps: STEP_BUDGET,
        }
    }

    pub fn evaluate(&mut self, expr: &FormulaExpr) -> FormulaResult<FormulaValue> {
        if self.steps == 0 {
            return Err(FormulaError::Evaluation(
                "Formula exceeded the evaluation step budget".into(),
            ));
        }
        self.steps -= 1;

        match expr {
            // === Literals ===
            FormulaExpr::Null => Ok(FormulaValue::Null),
            FormulaExpr::Number(n) => Ok(FormulaValue::Number(*n)),
            FormulaExpr::String(s) => Ok(FormulaValue::String(s.clone())),
            FormulaExpr::Boolean(b) => Ok(FormulaValue::Boolean(*b)),

            FormulaExpr::Array(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.evaluate(item)?);
                }
                Ok(FormulaValue::Array(values))
            }

            // === References ===
            FormulaExpr::Path { root, segments } => self.resolve_path(*root, segments),

            // === Operators ===
            FormulaExpr::UnaryOp { op, operand } => {
                let value = self.evaluate(operand)?;
                match op {
                    UnaryOperator::Not => Ok(FormulaValue::Boolean(!value.is_truthy())),
                    UnaryOperator::Negate => Ok(FormulaValue::Number(-value.to_number()?)),
                }
            }

            FormulaExpr::BinaryOp { op, left, right } => {
                // Logical operators short-circuit and return the deciding
                // operand's value, as authors coming from the source
                // language expect (`att.Color || 'Red'`).
                match op {
                    BinaryOperator::And => {
                        let left_val = self.evaluate(left)?;
                        if !left_val.is_truthy() {
                            return Ok(left_val);
                        }
                        return self.evaluate(right);
                    }
                    BinaryOperator::Or => {
                        let left_val = self.evaluate(left)?;
                        if left_val.is_truthy() {
                            return Ok(left_val);
                        }
                        return self.evaluate(right);
                    }
                    _ => {}
                }

                let left_val = self.evaluate(left)?;
                let right_val = self.evaluate(right)?;
                evaluate_binary_op(*op, &left_val, &right_val)
            }

            // === Functions ===
            FormulaExpr::Function { name, args } => self.evaluate_function(name, args),
        }
    }

    /// Resolve a namespace path. The first segment looks up its table; a
    /// missing key is null. Further segments require an object value;
    /// member access on anything else is an evaluation error.
    fn resolve_path(&mut self, root: PathRoot, segments: &[String]) -> FormulaResult<FormulaValue> {
        let (mut value, rest) = match root {
            PathRoot::Attribute => {
                let first = path_head(root, segments)?;
                let value = self
                    .context
                    .attributes
                    .get(first)
                    .map(FormulaValue::from)
                    .unwrap_or(FormulaValue::Null);
                (value, &segments[1..])
            }
            PathRoot::Constant => {
                let first = path_head(root, segments)?;
                let value = self
                    .context
                    .constants
                    .get(first)
                    .map(FormulaValue::from)
                    .unwrap_or(FormulaValue::Null);
                (value, &segments[1..])
            }
            PathRoot::OptionConstant => {
                let first = path_head(root, segments)?;
                let value = self
                    .context
                    .option_constants
                    .get(first)
                    .map(|table| {
                        FormulaValue::Object(
                            table
                                .iter()
                                .map(|(k, v)| (k.clone(), FormulaValue::from(v)))
                                .collect(),
                        )
                    })
                    .unwrap_or(FormulaValue::Null);
                (value, &segments[1..])
            }
            PathRoot::Question => (
                FormulaValue::from_json(&self.context.question.to_json()),
                segments,
            ),
        };

        for segment in rest {
            value = match value {
                FormulaValue::Object(mut map) => {
                    map.remove(segment.as_str()).unwrap_or(FormulaValue::Null)
                }
                other => {
                    return Err(FormulaError::Evaluation(format!(
                        "Cannot read '{}' of {} in '{}.{}'",
                        segment,
                        other.type_name(),
                        root.as_str(),
                        segments.join(".")
                    )))
                }
            };
        }

        Ok(value)
    }

    fn evaluate_function(
        &mut self,
        name: &str,
        args: &[FormulaExpr],
    ) -> FormulaResult<FormulaValue> {
        let func = self
            .registry
            .get(name)
            .ok_or_else(|| FormulaError::UnknownFunction(name.to_string()))?;

        // Check argument count
        if args.len() < func.min_args {
            return Err(FormulaError::ArgumentCount {
                function: name.to_string(),
                expected: format!("at least {}", func.min_args),
                actual: args.len(),
            });
        }

        if let Some(max) = func.max_args {
            if args.len() > max {
                return Err(FormulaError::ArgumentCount {
                    function: name.to_string(),
                    expected: format!("at most {}", max),
                    actual: args.len(),
                });
            }
        }

        // Evaluate arguments
        let mut evaluated_args = Vec::with_capacity(args.len());
        for arg in args {
            evaluated_args.push(self.evaluate(arg)?);
        }

        // Call the function
        (func.implementation)(&evaluated_args)
    }
}

fn path_head(root: PathRoot, segments: &[String]) -> FormulaResult<&String> {
    segments.first().ok_or_else(|| {
        FormulaError::Evaluation(format!("'{}' used without a member", root.as_str()))
    })
}

/// Evaluate a non-short-circuiting binary operation on two values
fn evaluate_binary_op(
    op: BinaryOperator,
    left: &FormulaValue,
    right: &FormulaValue,
) -> FormulaResult<FormulaValue> {
    match op {
        // `+` concatenates as soon as either side is a string
        BinaryOperator::Add => match (left, right) {
            (FormulaValue::String(l), r) => Ok(FormulaValue::String(format!("{l}{}", r.as_string()))),
            (l, FormulaValue::String(r)) => Ok(FormulaValue::String(format!("{}{r}", l.as_string()))),
            (l, r) => Ok(FormulaValue::Number(l.to_number()? + r.to_number()?)),
        },
        BinaryOperator::Subtract => Ok(FormulaValue::Number(
            left.to_number()? - right.to_number()?,
        )),
        BinaryOperator::Multiply => Ok(FormulaValue::Number(
            left.to_number()? * right.to_number()?,
        )),
        // Division by zero yields an infinity, NaN propagates; neither is
        // an error, matching the source language.
        BinaryOperator::Divide => Ok(FormulaValue::Number(
            left.to_number()? / right.to_number()?,
        )),
        BinaryOperator::Modulo => Ok(FormulaValue::Number(
            left.to_number()? % right.to_number()?,
        )),

        BinaryOperator::Equal => Ok(FormulaValue::Boolean(loose_eq(left, right))),
        BinaryOperator::NotEqual => Ok(FormulaValue::Boolean(!loose_eq(left, right))),

        BinaryOperator::LessThan => Ok(FormulaValue::Boolean(matches!(
            compare_values(left, right),
            Some(Ordering::Less)
        ))),
        BinaryOperator::LessEqual => Ok(FormulaValue::Boolean(matches!(
            compare_values(left, right),
            Some(Ordering::Less) | Some(Ordering::Equal)
        ))),
        BinaryOperator::GreaterThan => Ok(FormulaValue::Boolean(matches!(
            compare_values(left, right),
            Some(Ordering::Greater)
        ))),
        BinaryOperator::GreaterEqual => Ok(FormulaValue::Boolean(matches!(
            compare_values(left, right),
            Some(Ordering::Greater) | Some(Ordering::Equal)
        ))),

        // And/Or are handled by the evaluator's short-circuit path
        BinaryOperator::And | BinaryOperator::Or => Err(FormulaError::Evaluation(
            "Logical operators must be evaluated with short-circuiting".into(),
        )),
    }
}
