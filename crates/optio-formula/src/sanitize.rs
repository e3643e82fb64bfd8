//! Formula sanitization
//!
//! Rewrites author shorthand (`<>`, single `=`, single `|` / `&`) into the
//! evaluation grammar and refuses formula text that tries to reach outside
//! it. Runs before parsing; every rejection is a distinct error and leaves
//! no residual state.

use crate::context::Table;
use crate::error::{FormulaError, FormulaResult};
use lazy_regex::regex;

/// Sanitize a raw author formula against the current tables.
///
/// An empty or all-whitespace formula sanitizes to the literal `true`
/// expression, the default "always visible / always valid" condition.
///
/// Every `att.X` / `cst.Y` reference in the result is guaranteed to resolve
/// in the corresponding table; otherwise this fails closed before any parse
/// or evaluation is attempted.
pub fn sanitize_formula(
    formula: &str,
    attributes: &Table,
    constants: &Table,
) -> FormulaResult<String> {
    if formula.trim().is_empty() {
        return Ok("true".to_string());
    }

    let rewritten = rewrite_operators(formula);

    // The strict-equality operator is never legal, not even inside an
    // otherwise valid formula.
    if rewritten.contains("===") {
        return Err(FormulaError::StrictEquality);
    }

    // Prototype-chain property access, dotted or bracket-subscripted.
    if regex!(
        r#"(?i)\.\s*(?:__proto__|constructor|prototype)\b|\[\s*["'](?:__proto__|constructor|prototype)["']\s*\]"#
    )
    .is_match(&rewritten)
    {
        return Err(FormulaError::PrototypeAccess);
    }

    // Capability/identity/timer/evaluation primitives, as whole words.
    if let Some(found) = regex!(
        r"(?i)\b(?:var|let|const|function|new|window|document|globalThis|alert|eval|setTimeout|setInterval|clearTimeout|clearInterval|constructor|prototype|__proto__|this|import|require|process)\b"
    )
    .find(&rewritten)
    {
        return Err(FormulaError::ForbiddenWord(found.as_str().to_string()));
    }

    for capture in regex!(r"\batt\.(\w+)").captures_iter(&rewritten) {
        let name = &capture[1];
        if !attributes.contains_key(name) {
            return Err(FormulaError::UnknownAttribute(name.to_string()));
        }
    }

    for capture in regex!(r"\bcst\.(\w+)").captures_iter(&rewritten) {
        let name = &capture[1];
        if !constants.contains_key(name) {
            return Err(FormulaError::UnknownConstant(name.to_string()));
        }
    }

    Ok(rewritten)
}

/// Single quote-aware pass over the formula text:
/// - `<>` becomes `!=`
/// - a lone `=` (not part of `==`, `!=`, `<=`, `>=`) becomes `==`
/// - a lone `|` becomes `||`, a lone `&` becomes `&&`
///
/// Text inside single- or double-quoted string literals is copied verbatim.
/// A `=` with no preceding character is left alone for the parser to refuse.
/// The pass is idempotent on its own output.
fn rewrite_operators(formula: &str) -> String {
    let chars: Vec<char> = formula.chars().collect();
    let mut out = String::with_capacity(formula.len() + 8);
    let mut in_string: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if let Some(quote) = in_string {
            out.push(c);
            if c == '\\' && i + 1 < chars.len() {
                out.push(chars[i + 1]);
                i += 2;
                continue;
            }
            if c == quote {
                in_string = None;
            }
            i += 1;
            continue;
        }

        match c {
            '"' | '\'' => {
                in_string = Some(c);
                out.push(c);
                i += 1;
            }
            '<' if chars.get(i + 1) == Some(&'>') => {
                out.push_str("!=");
                i += 2;
            }
            '=' => {
                let part_of_operator = matches!(
                    out.chars().last(),
                    Some('=') | Some('!') | Some('<') | Some('>')
                ) || chars.get(i + 1) == Some(&'=');
                if part_of_operator || out.is_empty() {
                    out.push('=');
                } else {
                    out.push_str("==");
                }
                i += 1;
            }
            '|' => {
                out.push_str("||");
                i += if chars.get(i + 1) == Some(&'|') { 2 } else { 1 };
            }
            '&' => {
                out.push_str("&&");
                i += if chars.get(i + 1) == Some(&'&') { 2 } else { 1 };
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(keys: &[&str]) -> Table {
        keys.iter()
            .map(|k| (k.to_string(), optio_core::AnswerValue::Number(1.0)))
            .collect()
    }

    fn sanitize(formula: &str) -> FormulaResult<String> {
        sanitize_formula(formula, &table(&["Qty", "Color"]), &table(&["MaxQty"]))
    }

    #[test]
    fn test_empty_formula_is_true() {
        assert_eq!(sanitize("").unwrap(), "true");
        assert_eq!(sanitize("   \t ").unwrap(), "true");
    }

    #[test]
    fn test_single_equal_becomes_double() {
        assert_eq!(sanitize("att.Qty = 5").unwrap(), "att.Qty == 5");
        assert_eq!(sanitize("att.Qty=5").unwrap(), "att.Qty==5");
    }

    #[test]
    fn test_existing_operators_untouched() {
        assert_eq!(sanitize("att.Qty == 5").unwrap(), "att.Qty == 5");
        assert_eq!(sanitize("att.Qty != 5").unwrap(), "att.Qty != 5");
        assert_eq!(sanitize("att.Qty >= 5").unwrap(), "att.Qty >= 5");
        assert_eq!(sanitize("att.Qty <= 5").unwrap(), "att.Qty <= 5");
    }

    #[test]
    fn test_not_equal_digraph() {
        assert_eq!(sanitize("att.Qty <> 5").unwrap(), "att.Qty != 5");
    }

    #[test]
    fn test_single_pipe_and_ampersand() {
        assert_eq!(sanitize("1 | 2").unwrap(), "1 || 2");
        assert_eq!(sanitize("1 & 2").unwrap(), "1 && 2");
        assert_eq!(sanitize("1 || 2").unwrap(), "1 || 2");
        assert_eq!(sanitize("1 && 2").unwrap(), "1 && 2");
    }

    #[test]
    fn test_string_literals_untouched() {
        assert_eq!(sanitize("'a=b' == \"c|d\"").unwrap(), "'a=b' == \"c|d\"");
    }

    #[test]
    fn test_leading_equal_left_alone() {
        assert_eq!(sanitize("= 5").unwrap(), "= 5");
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let once = sanitize("att.Qty = 5 & att.Color <> 'Red' | 1").unwrap();
        let twice = sanitize(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_strict_equality_rejected() {
        assert!(matches!(
            sanitize("att.Qty === 5"),
            Err(FormulaError::StrictEquality)
        ));
    }

    #[test]
    fn test_forbidden_words_rejected() {
        for formula in ["window.open(1)", "eval(1)", "setTimeout", "ALERT(1)"] {
            assert!(
                matches!(sanitize(formula), Err(FormulaError::ForbiddenWord(_))),
                "{formula} should be rejected"
            );
        }
    }

    #[test]
    fn test_prototype_access_rejected() {
        for formula in [
            "this.constructor",
            "att.Qty.__proto__",
            "att.Qty[\"constructor\"]",
            "x . prototype",
        ] {
            assert!(
                matches!(
                    sanitize(formula),
                    Err(FormulaError::PrototypeAccess) | Err(FormulaError::ForbiddenWord(_))
                ),
                "{formula} should be rejected"
            );
        }
    }

    #[test]
    fn test_unknown_attribute_rejected() {
        match sanitize("att.Missing == 5") {
            Err(FormulaError::UnknownAttribute(name)) => assert_eq!(name, "Missing"),
            other => panic!("expected UnknownAttribute, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_constant_rejected() {
        match sanitize("cst.Missing == 5") {
            Err(FormulaError::UnknownConstant(name)) => assert_eq!(name, "Missing"),
            other => panic!("expected UnknownConstant, got {other:?}"),
        }
    }

    #[test]
    fn test_cstatt_not_scanned_as_att_or_cst() {
        // `cstatt.` paths are resolved at evaluation time, not here
        assert!(sanitize("cstatt.Anything.Surcharge == 1").is_ok());
    }

    #[test]
    fn test_known_references_pass() {
        assert!(sanitize("att.Qty > cst.MaxQty").is_ok());
    }
}
