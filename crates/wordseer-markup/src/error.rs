//! Error types for the markup layer

use thiserror::Error;

/// Errors raised while parsing markup or evaluating path expressions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarkupError {
    /// The source is not well-formed XML
    #[error("Parse error: {0}")]
    Parse(String),

    /// The source could not be read
    #[error("I/O error: {0}")]
    Io(String),

    /// A path expression could not be compiled, failed to evaluate, or
    /// yielded something other than a node set
    #[error("Invalid path expression '{expr}': {reason}")]
    InvalidPath {
        /// The offending expression
        expr: String,
        /// What went wrong
        reason: String,
    },

    /// A path was evaluated from a text, comment or attribute node
    #[error("Cannot evaluate '{0}' against a non-element node")]
    NonElementContext(String),
}

impl From<std::io::Error> for MarkupError {
    fn from(e: std::io::Error) -> Self {
        MarkupError::Io(e.to_string())
    }
}
