//! Math functions

use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::FormulaValue;

/// Collect the numeric values of the arguments, descending into arrays.
/// Non-numeric values are ignored, as spreadsheet aggregates do.
pub(super) fn collect_numbers(args: &[FormulaValue], out: &mut Vec<f64>) {
    for arg in args {
        match arg {
            FormulaValue::Number(n) => out.push(*n),
            FormulaValue::Array(items) => collect_numbers(items, out),
            _ => {}
        }
    }
}

fn single_number(args: &[FormulaValue], function: &str) -> FormulaResult<f64> {
    args.first()
        .ok_or_else(|| FormulaError::Argument(format!("{function} requires 1 argument")))?
        .to_number()
}

/// SUM function
pub fn fn_sum(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let mut numbers = Vec::new();
    collect_numbers(args, &mut numbers);
    Ok(FormulaValue::Number(numbers.iter().sum()))
}

/// ABS function
pub fn fn_abs(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::Number(single_number(args, "ABS")?.abs()))
}

/// ROUND(number, [digits])
pub fn fn_round(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let n = single_number(args, "ROUND")?;
    let digits = match args.get(1) {
        Some(v) => v.to_number()?.trunc() as i32,
        None => 0,
    };

    let factor = 10f64.powi(digits);
    Ok(FormulaValue::Number((n * factor).round() / factor))
}

/// INT function - rounds down to the nearest integer
pub fn fn_int(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    Ok(FormulaValue::Number(single_number(args, "INT")?.floor()))
}

/// MOD(number, divisor)
pub fn fn_mod(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let n = single_number(args, "MOD")?;
    let divisor = args
        .get(1)
        .ok_or_else(|| FormulaError::Argument("MOD requires 2 arguments".into()))?
        .to_number()?;

    if divisor == 0.0 {
        return Err(FormulaError::Argument("MOD divisor must not be zero".into()));
    }

    // Sign follows the divisor, as in spreadsheets
    Ok(FormulaValue::Number(n.rem_euclid(divisor.abs()) * divisor.signum()))
}

/// SQRT function
pub fn fn_sqrt(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let n = single_number(args, "SQRT")?;
    if n < 0.0 {
        return Err(FormulaError::Argument(
            "SQRT argument must not be negative".into(),
        ));
    }
    Ok(FormulaValue::Number(n.sqrt()))
}

/// POWER(base, exponent)
pub fn fn_power(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let base = single_number(args, "POWER")?;
    let exponent = args
        .get(1)
        .ok_or_else(|| FormulaError::Argument("POWER requires 2 arguments".into()))?
        .to_number()?;

    let result = base.powf(exponent);
    if result.is_nan() || result.is_infinite() {
        return Err(FormulaError::Argument(format!(
            "POWER({base}, {exponent}) is not representable"
        )));
    }
    Ok(FormulaValue::Number(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_flattens_and_skips_non_numeric() {
        let result = fn_sum(&[
            FormulaValue::Number(1.0),
            FormulaValue::Array(vec![FormulaValue::Number(2.0), FormulaValue::String("x".into())]),
            FormulaValue::Null,
        ])
        .unwrap();
        assert_eq!(result, FormulaValue::Number(3.0));
    }

    #[test]
    fn test_round() {
        assert_eq!(
            fn_round(&[FormulaValue::Number(2.345), FormulaValue::Number(2.0)]).unwrap(),
            FormulaValue::Number(2.35)
        );
        assert_eq!(
            fn_round(&[FormulaValue::Number(2.5)]).unwrap(),
            FormulaValue::Number(3.0)
        );
    }

    #[test]
    fn test_int_floors() {
        assert_eq!(
            fn_int(&[FormulaValue::Number(-1.5)]).unwrap(),
            FormulaValue::Number(-2.0)
        );
    }

    #[test]
    fn test_mod_sign_follows_divisor() {
        assert_eq!(
            fn_mod(&[FormulaValue::Number(-3.0), FormulaValue::Number(2.0)]).unwrap(),
            FormulaValue::Number(1.0)
        );
        assert!(fn_mod(&[FormulaValue::Number(1.0), FormulaValue::Number(0.0)]).is_err());
    }

    #[test]
    fn test_sqrt_negative_is_error() {
        assert!(fn_sqrt(&[FormulaValue::Number(-1.0)]).is_err());
        assert_eq!(
            fn_sqrt(&[FormulaValue::Number(9.0)]).unwrap(),
            FormulaValue::Number(3.0)
        );
    }

    #[test]
    fn test_power() {
        assert_eq!(
            fn_power(&[FormulaValue::Number(2.0), FormulaValue::Number(10.0)]).unwrap(),
            FormulaValue::Number(1024.0)
        );
    }
}
