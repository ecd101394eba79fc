//! Error types for the Extractor

use thiserror::Error;
use wordseer_markup::MarkupError;

/// Errors that can occur during extraction
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Source markup could not be parsed, or a path expression is invalid
    #[error("Markup error: {0}")]
    Markup(#[from] MarkupError),

    /// Structure specification could not be decoded
    #[error("Structure specification error: {0}")]
    Structure(String),

    /// File could not be read
    #[error("I/O error: {0}")]
    Io(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage collaborator rejected a document
    #[error("Store error: {0}")]
    Store(String),
}

impl From<serde_json::Error> for ExtractorError {
    fn from(e: serde_json::Error) -> Self {
        ExtractorError::Structure(e.to_string())
    }
}

impl From<std::io::Error> for ExtractorError {
    fn from(e: std::io::Error) -> Self {
        ExtractorError::Io(e.to_string())
    }
}
