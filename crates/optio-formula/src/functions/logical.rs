//! Logical functions

use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::FormulaValue;

/// IF(condition, if_true, [if_false])
pub fn fn_if(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let condition = args
        .first()
        .ok_or_else(|| FormulaError::Argument("IF requires at least 2 arguments".into()))?;

    let if_true = args
        .get(1)
        .ok_or_else(|| FormulaError::Argument("IF requires at least 2 arguments".into()))?;

    if condition.is_truthy() {
        Ok(if_true.clone())
    } else {
        Ok(args.get(2).cloned().unwrap_or(FormulaValue::Boolean(false)))
    }
}

/// AND(value1, [value2], ...) - true when every argument is truthy.
/// Array arguments are flattened one level.
pub fn fn_and(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    for arg in args {
        match arg {
            FormulaValue::Array(items) => {
                if items.iter().any(|item| !item.is_truthy()) {
                    return Ok(FormulaValue::Boolean(false));
                }
            }
            other => {
                if !other.is_truthy() {
                    return Ok(FormulaValue::Boolean(false));
                }
            }
        }
    }

    Ok(FormulaValue::Boolean(true))
}

/// OR(value1, [value2], ...) - true when any argument is truthy.
/// Array arguments are flattened one level.
pub fn fn_or(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    for arg in args {
        match arg {
            FormulaValue::Array(items) => {
                if items.iter().any(FormulaValue::is_truthy) {
                    return Ok(FormulaValue::Boolean(true));
                }
            }
            other => {
                if other.is_truthy() {
                    return Ok(FormulaValue::Boolean(true));
                }
            }
        }
    }

    Ok(FormulaValue::Boolean(false))
}

/// NOT(value)
pub fn fn_not(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let arg = args
        .first()
        .ok_or_else(|| FormulaError::Argument("NOT requires 1 argument".into()))?;

    Ok(FormulaValue::Boolean(!arg.is_truthy()))
}
