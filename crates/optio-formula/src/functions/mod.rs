//! Built-in formula functions
//!
//! The spreadsheet-style library authors call from formulas, exposed through
//! an explicit registry handed to the engine at construction. There is no
//! process-wide function state.

pub mod logical;
pub mod lookup;
pub mod math;
pub mod statistical;
pub mod text;

use crate::error::FormulaResult;
use crate::evaluator::FormulaValue;
use ahash::AHashMap;
use lazy_regex::regex_is_match;

/// Function implementation signature
///
/// Functions see only their already-evaluated arguments; the evaluation
/// context is deliberately out of reach.
pub type FunctionImpl = fn(&[FormulaValue]) -> FormulaResult<FormulaValue>;

/// Names the evaluator binds itself. A library function with one of these
/// names can never be registered; the engine's binding wins.
pub const RESERVED_NAMES: &[&str] = &["att", "cst", "cstatt", "qobj", "EXIST"];

/// Function definition
pub struct FunctionDef {
    /// Function name as authors write it
    pub name: &'static str,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Implementation
    pub implementation: FunctionImpl,
}

/// Function registry
pub struct FunctionRegistry {
    functions: AHashMap<String, FunctionDef>,
}

impl FunctionRegistry {
    /// Registry holding only the engine-native `EXIST` membership test.
    ///
    /// This is the degraded mode when no spreadsheet library is supplied;
    /// a missing library is not an error.
    pub fn new() -> Self {
        let mut registry = Self {
            functions: AHashMap::new(),
        };
        registry.functions.insert(
            "EXIST".to_string(),
            FunctionDef {
                name: "EXIST",
                min_args: 2,
                max_args: Some(2),
                implementation: lookup::fn_exist,
            },
        );
        registry
    }

    /// Registry with `EXIST` plus the full built-in library
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        registry.register_math_functions();
        registry.register_statistical_functions();
        registry.register_logical_functions();
        registry.register_lookup_functions();
        registry.register_text_functions();

        registry
    }

    /// Look up a function by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(&name.to_uppercase())
    }

    /// Register a library function, applying the filter rules: the name
    /// must be a legal bare identifier (so it cannot start with a digit)
    /// and must not collide with a reserved engine name. Filtered
    /// candidates are skipped silently.
    pub fn register(&mut self, def: FunctionDef) {
        if !is_legal_name(def.name) {
            return;
        }
        if RESERVED_NAMES
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(def.name))
        {
            return;
        }
        self.functions.insert(def.name.to_uppercase(), def);
    }

    /// Names of every registered function, the enumerable surface an
    /// authoring UI can present
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    /// Number of registered functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// True when no function is registered
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    fn register_math_functions(&mut self) {
        // SUM
        self.register(FunctionDef {
            name: "SUM",
            min_args: 1,
            max_args: None,
            implementation: math::fn_sum,
        });

        // ABS
        self.register(FunctionDef {
            name: "ABS",
            min_args: 1,
            max_args: Some(1),
            implementation: math::fn_abs,
        });

        // ROUND
        self.register(FunctionDef {
            name: "ROUND",
            min_args: 1,
            max_args: Some(2),
            implementation: math::fn_round,
        });

        // INT
        self.register(FunctionDef {
            name: "INT",
            min_args: 1,
            max_args: Some(1),
            implementation: math::fn_int,
        });

        // MOD
        self.register(FunctionDef {
            name: "MOD",
            min_args: 2,
            max_args: Some(2),
            implementation: math::fn_mod,
        });

        // SQRT
        self.register(FunctionDef {
            name: "SQRT",
            min_args: 1,
            max_args: Some(1),
            implementation: math::fn_sqrt,
        });

        // POWER
        self.register(FunctionDef {
            name: "POWER",
            min_args: 2,
            max_args: Some(2),
            implementation: math::fn_power,
        });
    }

    fn register_statistical_functions(&mut self) {
        // AVERAGE
        self.register(FunctionDef {
            name: "AVERAGE",
            min_args: 1,
            max_args: None,
            implementation: statistical::fn_average,
        });

        // MIN
        self.register(FunctionDef {
            name: "MIN",
            min_args: 1,
            max_args: None,
            implementation: statistical::fn_min,
        });

        // MAX
        self.register(FunctionDef {
            name: "MAX",
            min_args: 1,
            max_args: None,
            implementation: statistical::fn_max,
        });

        // COUNT
        self.register(FunctionDef {
            name: "COUNT",
            min_args: 1,
            max_args: None,
            implementation: statistical::fn_count,
        });

        // COUNTA
        self.register(FunctionDef {
            name: "COUNTA",
            min_args: 1,
            max_args: None,
            implementation: statistical::fn_counta,
        });

        // MEDIAN
        self.register(FunctionDef {
            name: "MEDIAN",
            min_args: 1,
            max_args: None,
            implementation: statistical::fn_median,
        });
    }

    fn register_logical_functions(&mut self) {
        // IF
        self.register(FunctionDef {
            name: "IF",
            min_args: 2,
            max_args: Some(3),
            implementation: logical::fn_if,
        });

        // AND
        self.register(FunctionDef {
            name: "AND",
            min_args: 1,
            max_args: None,
            implementation: logical::fn_and,
        });

        // OR
        self.register(FunctionDef {
            name: "OR",
            min_args: 1,
            max_args: None,
            implementation: logical::fn_or,
        });

        // NOT
        self.register(FunctionDef {
            name: "NOT",
            min_args: 1,
            max_args: Some(1),
            implementation: logical::fn_not,
        });
    }

    fn register_lookup_functions(&mut self) {
        // CHOOSE
        self.register(FunctionDef {
            name: "CHOOSE",
            min_args: 2,
            max_args: None,
            implementation: lookup::fn_choose,
        });

        // MATCH
        self.register(FunctionDef {
            name: "MATCH",
            min_args: 2,
            max_args: Some(2),
            implementation: lookup::fn_match,
        });

        // INDEX
        self.register(FunctionDef {
            name: "INDEX",
            min_args: 2,
            max_args: Some(2),
            implementation: lookup::fn_index,
        });
    }

    fn register_text_functions(&mut self) {
        // CONCATENATE
        self.register(FunctionDef {
            name: "CONCATENATE",
            min_args: 1,
            max_args: None,
            implementation: text::fn_concatenate,
        });

        // UPPER
        self.register(FunctionDef {
            name: "UPPER",
            min_args: 1,
            max_args: Some(1),
            implementation: text::fn_upper,
        });

        // LOWER
        self.register(FunctionDef {
            name: "LOWER",
            min_args: 1,
            max_args: Some(1),
            implementation: text::fn_lower,
        });

        // LEN
        self.register(FunctionDef {
            name: "LEN",
            min_args: 1,
            max_args: Some(1),
            implementation: text::fn_len,
        });

        // TRIM
        self.register(FunctionDef {
            name: "TRIM",
            min_args: 1,
            max_args: Some(1),
            implementation: text::fn_trim,
        });

        // LEFT
        self.register(FunctionDef {
            name: "LEFT",
            min_args: 1,
            max_args: Some(2),
            implementation: text::fn_left,
        });

        // RIGHT
        self.register(FunctionDef {
            name: "RIGHT",
            min_args: 1,
            max_args: Some(2),
            implementation: text::fn_right,
        });

        // MID
        self.register(FunctionDef {
            name: "MID",
            min_args: 3,
            max_args: Some(3),
            implementation: text::fn_mid,
        });
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

fn is_legal_name(name: &str) -> bool {
    regex_is_match!(r"^[A-Za-z_][A-Za-z0-9_]*$", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_args: &[FormulaValue]) -> FormulaResult<FormulaValue> {
        Ok(FormulaValue::Null)
    }

    #[test]
    fn test_degraded_registry_has_only_exist() {
        let registry = FunctionRegistry::new();
        assert_eq!(registry.len(), 1);
        assert!(registry.get("EXIST").is_some());
        assert!(registry.get("SUM").is_none());
    }

    #[test]
    fn test_builtins_present() {
        let registry = FunctionRegistry::with_builtins();
        for name in ["SUM", "IF", "AND", "MATCH", "CONCATENATE", "EXIST"] {
            assert!(registry.get(name).is_some(), "{name} missing");
        }
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = FunctionRegistry::with_builtins();
        assert!(registry.get("sum").is_some());
        assert!(registry.get("Exist").is_some());
    }

    #[test]
    fn test_reserved_names_win() {
        let mut registry = FunctionRegistry::new();
        for name in ["att", "CST", "qobj", "exist"] {
            registry.register(FunctionDef {
                name: Box::leak(name.to_string().into_boxed_str()),
                min_args: 0,
                max_args: None,
                implementation: noop,
            });
        }
        // Only the native EXIST remains, and it kept its implementation
        assert_eq!(registry.len(), 1);
        let exist = registry.get("EXIST").unwrap();
        assert_eq!(exist.min_args, 2);
    }

    #[test]
    fn test_illegal_names_skipped() {
        let mut registry = FunctionRegistry::new();
        for name in ["1ST", "BAD-NAME", "WITH SPACE", ""] {
            registry.register(FunctionDef {
                name: Box::leak(name.to_string().into_boxed_str()),
                min_args: 0,
                max_args: None,
                implementation: noop,
            });
        }
        assert_eq!(registry.len(), 1);
    }
}
