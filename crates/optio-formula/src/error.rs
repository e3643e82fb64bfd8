//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur during formula sanitization, parsing or evaluation
#[derive(Debug, Error)]
pub enum FormulaError {
    /// The author typed the strict-equality operator
    #[error("Formulas may not contain the '===' operator")]
    StrictEquality,

    /// A denylisted host/identity/timer word appeared in the formula
    #[error("Forbidden word in formula: '{0}'")]
    ForbiddenWord(String),

    /// Property access targeting the prototype chain
    #[error("Access to '__proto__', 'constructor' or 'prototype' is not allowed")]
    PrototypeAccess,

    /// An `att.` reference did not resolve in the attribute table
    #[error("Attribute '{0}' not found in context")]
    UnknownAttribute(String),

    /// A `cst.` reference did not resolve in the constant table
    #[error("Constant '{0}' not found in context")]
    UnknownConstant(String),

    /// Formula parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Formula evaluation error
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// Unknown function
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Wrong number of arguments
    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}")]
    ArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },
}

impl FormulaError {
    /// True for errors raised by the static checks, before any parse or
    /// evaluation has happened.
    pub fn is_sanitization(&self) -> bool {
        matches!(
            self,
            Self::StrictEquality
                | Self::ForbiddenWord(_)
                | Self::PrototypeAccess
                | Self::UnknownAttribute(_)
                | Self::UnknownConstant(_)
        )
    }
}
