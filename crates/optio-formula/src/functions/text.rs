//! Text functions

use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::FormulaValue;

fn to_int_trunc(v: &FormulaValue) -> Option<i64> {
    v.as_number().map(|n| n.trunc() as i64)
}

fn single_text(args: &[FormulaValue], function: &str) -> FormulaResult<String> {
    let v = args
        .first()
        .ok_or_else(|| FormulaError::Argument(format!("{function} requires 1 argument")))?;
    Ok(v.as_string())
}

fn take_left(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

fn take_right(s: &str, n: usize) -> String {
    let len = s.chars().count();
    if n >= len {
        return s.to_string();
    }
    s.chars().skip(len - n).collect()
}

/// CONCATENATE(value1, [value2], ...)
pub fn fn_concatenate(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let mut out = String::new();
    for arg in args {
        out.push_str(&arg.as_string());
    }
    Ok(FormulaValue::String(out))
}

/// UPPER(text)
pub fn fn_upper(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::String(
        single_text(args, "UPPER")?.to_uppercase(),
    ))
}

/// LOWER(text)
pub fn fn_lower(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::String(
        single_text(args, "LOWER")?.to_lowercase(),
    ))
}

/// LEN(text)
pub fn fn_len(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::Number(
        single_text(args, "LEN")?.chars().count() as f64,
    ))
}

/// TRIM(text)
pub fn fn_trim(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::String(
        single_text(args, "TRIM")?.trim().to_string(),
    ))
}

/// LEFT(text, [num_chars])
pub fn fn_left(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let s = single_text(args, "LEFT")?;
    let num_chars = match args.get(1) {
        None => 1,
        Some(v) => to_int_trunc(v).unwrap_or(0),
    };

    if num_chars < 0 {
        return Err(FormulaError::Argument(
            "LEFT length must not be negative".into(),
        ));
    }

    Ok(FormulaValue::String(take_left(&s, num_chars as usize)))
}

/// RIGHT(text, [num_chars])
pub fn fn_right(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let s = single_text(args, "RIGHT")?;
    let num_chars = match args.get(1) {
        None => 1,
        Some(v) => to_int_trunc(v).unwrap_or(0),
    };

    if num_chars < 0 {
        return Err(FormulaError::Argument(
            "RIGHT length must not be negative".into(),
        ));
    }

    Ok(FormulaValue::String(take_right(&s, num_chars as usize)))
}

/// MID(text, start_num, num_chars) - 1-based start
pub fn fn_mid(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let s = single_text(args, "MID")?;
    let start = args
        .get(1)
        .and_then(to_int_trunc)
        .ok_or_else(|| FormulaError::Argument("MID requires a numeric start".into()))?;
    let num_chars = args
        .get(2)
        .and_then(to_int_trunc)
        .ok_or_else(|| FormulaError::Argument("MID requires a numeric length".into()))?;

    if start < 1 || num_chars < 0 {
        return Err(FormulaError::Argument("MID arguments out of range".into()));
    }

    let out: String = s
        .chars()
        .skip((start - 1) as usize)
        .take(num_chars as usize)
        .collect();
    Ok(FormulaValue::String(out))
}
