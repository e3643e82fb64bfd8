//! Lookup functions, including the engine-native EXIST membership test

use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::{loose_eq, FormulaValue};

fn to_i64_trunc(v: &FormulaValue) -> Option<i64> {
    v.as_number().map(|n| n.trunc() as i64)
}

fn expect_array(v: &FormulaValue) -> FormulaResult<&[FormulaValue]> {
    match v {
        FormulaValue::Array(items) => Ok(items),
        other => Err(FormulaError::Argument(format!(
            "Expected an array, got {}",
            other.type_name()
        ))),
    }
}

/// EXIST(value, array) - true iff the array contains the value, by loose
/// value equality. Always available, even without a function library.
pub fn fn_exist(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let needle = args
        .first()
        .ok_or_else(|| FormulaError::Argument("EXIST requires 2 arguments".into()))?;
    let haystack = args
        .get(1)
        .ok_or_else(|| FormulaError::Argument("EXIST requires 2 arguments".into()))?;

    let items = expect_array(haystack)?;
    Ok(FormulaValue::Boolean(
        items.iter().any(|item| loose_eq(item, needle)),
    ))
}

/// CHOOSE(index, value1, [value2], ...) - 1-based selection
pub fn fn_choose(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let index = args
        .first()
        .and_then(to_i64_trunc)
        .ok_or_else(|| FormulaError::Argument("CHOOSE requires a numeric index".into()))?;

    if index < 1 || (index as usize) >= args.len() {
        return Err(FormulaError::Argument(format!(
            "CHOOSE index {index} is out of range"
        )));
    }

    Ok(args[index as usize].clone())
}

/// MATCH(value, array) - 1-based position of the first loose-equal element,
/// or null when absent
pub fn fn_match(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let needle = args
        .first()
        .ok_or_else(|| FormulaError::Argument("MATCH requires 2 arguments".into()))?;
    let haystack = args
        .get(1)
        .ok_or_else(|| FormulaError::Argument("MATCH requires 2 arguments".into()))?;

    let items = expect_array(haystack)?;
    let position = items.iter().position(|item| loose_eq(item, needle));
    Ok(position
        .map(|p| FormulaValue::Number((p + 1) as f64))
        .unwrap_or(FormulaValue::Null))
}

/// INDEX(array, position) - 1-based element access, null when out of range
pub fn fn_index(args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
    let array = args
        .first()
        .ok_or_else(|| FormulaError::Argument("INDEX requires 2 arguments".into()))?;
    let position = args
        .get(1)
        .and_then(to_i64_trunc)
        .ok_or_else(|| FormulaError::Argument("INDEX requires a numeric position".into()))?;

    let items = expect_array(array)?;
    if position < 1 {
        return Err(FormulaError::Argument(format!(
            "INDEX position {position} is out of range"
        )));
    }

    Ok(items
        .get((position - 1) as usize)
        .cloned()
        .unwrap_or(FormulaValue::Null))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> FormulaValue {
        FormulaValue::Array(
            items
                .iter()
                .map(|s| FormulaValue::String(s.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_exist() {
        let options = strings(&["A", "B"]);
        assert_eq!(
            fn_exist(&[FormulaValue::String("B".into()), options.clone()]).unwrap(),
            FormulaValue::Boolean(true)
        );
        assert_eq!(
            fn_exist(&[FormulaValue::String("Z".into()), options]).unwrap(),
            FormulaValue::Boolean(false)
        );
    }

    #[test]
    fn test_exist_loose_equality() {
        let numbers = FormulaValue::Array(vec![FormulaValue::Number(5.0)]);
        assert_eq!(
            fn_exist(&[FormulaValue::String("5".into()), numbers]).unwrap(),
            FormulaValue::Boolean(true)
        );
    }

    #[test]
    fn test_exist_non_array_is_error() {
        assert!(fn_exist(&[FormulaValue::Number(1.0), FormulaValue::Number(2.0)]).is_err());
    }

    #[test]
    fn test_choose() {
        let result = fn_choose(&[
            FormulaValue::Number(2.0),
            FormulaValue::String("a".into()),
            FormulaValue::String("b".into()),
        ])
        .unwrap();
        assert_eq!(result, FormulaValue::String("b".into()));

        assert!(fn_choose(&[FormulaValue::Number(3.0), FormulaValue::Number(1.0)]).is_err());
    }

    #[test]
    fn test_match_and_index() {
        let options = strings(&["A", "B", "C"]);
        assert_eq!(
            fn_match(&[FormulaValue::String("B".into()), options.clone()]).unwrap(),
            FormulaValue::Number(2.0)
        );
        assert_eq!(
            fn_match(&[FormulaValue::String("Z".into()), options.clone()]).unwrap(),
            FormulaValue::Null
        );
        assert_eq!(
            fn_index(&[options.clone(), FormulaValue::Number(3.0)]).unwrap(),
            FormulaValue::String("C".into())
        );
        assert_eq!(
            fn_index(&[options, FormulaValue::Number(9.0)]).unwrap(),
            FormulaValue::Null
        );
    }
}
