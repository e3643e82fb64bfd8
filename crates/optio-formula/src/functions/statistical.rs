//! Statistical functions

use super::math::collect_numbers;
use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::FormulaValue;

/// AVERAGE function
pub fn fn_average(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let mut numbers = Vec::new();
    collect_numbers(args, &mut numbers);

    if numbers.is_empty() {
        return Err(FormulaError::Argument(
            "AVERAGE requires at least one numeric value".into(),
        ));
    }

    let sum: f64 = numbers.iter().sum();
    Ok(FormulaValue::Number(sum / numbers.len() as f64))
}

/// MIN function
pub fn fn_min(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let mut numbers = Vec::new();
    collect_numbers(args, &mut numbers);

    // No numeric values at all yields 0, as spreadsheets do
    if numbers.is_empty() {
        return Ok(FormulaValue::Number(0.0));
    }

    Ok(FormulaValue::Number(
        numbers.iter().copied().fold(f64::INFINITY, f64::min),
    ))
}

/// MAX function
pub fn fn_max(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let mut numbers = Vec::new();
    collect_numbers(args, &mut numbers);

    if numbers.is_empty() {
        return Ok(FormulaValue::Number(0.0));
    }

    Ok(FormulaValue::Number(
        numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    ))
}

/// COUNT - counts numeric values, descending into arrays
pub fn fn_count(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let mut numbers = Vec::new();
    collect_numbers(args, &mut numbers);
    Ok(FormulaValue::Number(numbers.len() as f64))
}

/// COUNTA - counts non-null values, descending into arrays
pub fn fn_counta(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    fn count(values: &[FormulaValue]) -> usize {
        values
            .iter()
            .map(|v| match v {
                FormulaValue::Null => 0,
                FormulaValue::String(s) if s.is_empty() => 0,
                FormulaValue::Array(items) => count(items),
                _ => 1,
            })
            .sum()
    }

    Ok(FormulaValue::Number(count(args) as f64))
}

/// MEDIAN function
pub fn fn_median(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let mut numbers = Vec::new();
    collect_numbers(args, &mut numbers);

    if numbers.is_empty() {
        return Err(FormulaError::Argument(
            "MEDIAN requires at least one numeric value".into(),
        ));
    }

    numbers.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = numbers.len() / 2;
    let median = if numbers.len() % 2 == 0 {
        (numbers[mid - 1] + numbers[mid]) / 2.0
    } else {
        numbers[mid]
    };

    Ok(FormulaValue::Number(median))
}
