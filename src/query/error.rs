//! Error types for selector construction and sub-expression evaluation.
//!
//! Evaluating a selector chain never fails: type mismatches, missing keys and
//! out-of-range indices simply select nothing. The only errors are raised
//! while building a chain ([`SelectorError`]) and by the scalar sub-language
//! used inside filters, computed indices and function calls
//! ([`ExpressionError`]), which the selectors swallow locally.

use thiserror::Error;

/// Errors that can occur while constructing a selector chain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// A slice was given a step of zero.
    #[error("Slice step cannot be zero")]
    ZeroSliceStep,
}

/// Errors reported by a sub-expression evaluator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    /// An operand had the wrong type.
    #[error("Type error: expected {expected}, found {found}")]
    Type { expected: String, found: String },

    /// A function name was not recognised.
    #[error("Unknown function '{0}'")]
    UnknownFunction(String),

    /// A function failed on its arguments.
    #[error("Function '{function}' error: {message}")]
    Function { function: String, message: String },

    /// Any other evaluation failure.
    #[error("Evaluation error: {0}")]
    Evaluation(String),
}
