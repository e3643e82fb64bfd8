//! Property tests for the sanitizer rewriting pass.

use optio_formula::{sanitize_formula, Table};
use proptest::prelude::*;

fn empty_tables() -> (Table, Table) {
    (Table::new(), Table::new())
}

proptest! {
    // Re-sanitizing already-sanitized text must be a no-op: the rewriting
    // pass may only produce operator forms it leaves untouched.
    #[test]
    fn sanitization_is_idempotent(formula in r"[a-z0-9 ()=<>|&!+*']{0,40}") {
        let (att, cst) = empty_tables();
        if let Ok(once) = sanitize_formula(&formula, &att, &cst) {
            let twice = sanitize_formula(&once, &att, &cst)
                .expect("sanitized output must sanitize again");
            prop_assert_eq!(once, twice);
        }
    }

    // The rewriting pass never invents letters, so a formula that passes
    // the word denylist still passes it after rewriting.
    #[test]
    fn rewriting_preserves_words(formula in r"[a-z ]{0,30}") {
        let (att, cst) = empty_tables();
        let first = sanitize_formula(&formula, &att, &cst);
        if let Ok(once) = first {
            let second = sanitize_formula(&once, &att, &cst);
            prop_assert!(second.is_ok());
        }
    }

    // Whatever the input, sanitization either fails with an error or
    // produces non-empty output; it never panics.
    #[test]
    fn sanitization_never_panics(formula in r"\PC{0,60}") {
        let (att, cst) = empty_tables();
        if let Ok(out) = sanitize_formula(&formula, &att, &cst) {
            prop_assert!(!out.is_empty());
        }
    }
}
