//! # optio-core
//!
//! Core data structures for the optio questionnaire engine.
//!
//! This crate provides the fundamental types shared between the formula
//! engine and its callers:
//! - [`AnswerValue`] - Values held by answer slots, constants and per-option
//!   constants (null, booleans, numbers, text, lists)
//! - [`QuestionRecord`] - A question definition as delivered by the
//!   questionnaire backend
//!
//! ## Example
//!
//! ```rust
//! use optio_core::AnswerValue;
//!
//! let qty = AnswerValue::from(5.0);
//! assert_eq!(qty.as_number(), Some(5.0));
//!
//! let color = AnswerValue::from("Red");
//! assert_eq!(color.as_text(), Some("Red"));
//! ```

pub mod question;
pub mod value;

// Re-exports for convenience
pub use question::QuestionRecord;
pub use value::AnswerValue;
