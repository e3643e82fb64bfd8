//! # optio-formula
//!
//! Sandboxed formula parser and evaluator for optio questionnaires.
//!
//! This crate provides:
//! - Context building (renderer payload → `att`/`cst`/`cstatt` tables)
//! - Formula sanitization (author shorthand → grammar, fail-closed checks)
//! - Formula parsing (text → AST)
//! - Formula evaluation (AST → value)
//! - Built-in spreadsheet-style functions behind an explicit registry
//! - The three renderer-facing evaluation facades
//!
//! Formulas are compiled to an AST whose grammar can only name the four
//! bound namespaces and registered functions, so formula text structurally
//! cannot reach host capabilities. A failing formula degrades that one
//! question (hidden / no default / invalid), never the questionnaire.
//!
//! ## Example
//!
//! ```rust,ignore
//! use optio_formula::FormulaEngine;
//!
//! let engine = FormulaEngine::default();
//! let visible = engine.evaluate_condition("att.Qty > 3", &question, &context);
//! let default = engine.evaluate_value("att.Qty * cst.UnitPrice", &question, &context);
//! let problem = engine.evaluate_validation("att.Qty <= cst.MaxQty", &question, &context);
//! ```

pub mod ast;
pub mod context;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod parser;
pub mod sanitize;

pub use ast::{BinaryOperator, FormulaExpr, PathRoot, UnaryOperator};
pub use context::{EvaluationContext, RawEvaluationContext, Table};
pub use engine::{FormulaEngine, INVALID_ANSWER_MESSAGE};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, FormulaValue};
pub use functions::{FunctionDef, FunctionRegistry};
pub use parser::parse_formula;
pub use sanitize::sanitize_formula;
