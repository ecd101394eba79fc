//! Sentence module

use crate::Property;
use serde::{Deserialize, Serialize};

/// A sentence of text together with the metadata of the unit it came from
///
/// Segmenters produce sentences with empty metadata; the extractor attaches
/// the unit-level metadata afterwards, replicated across every sentence.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sentence {
    /// Sentence text
    pub text: String,

    /// Metadata of the enclosing unit
    #[serde(default)]
    pub metadata: Vec<Property>,
}

impl Sentence {
    /// Create a sentence without metadata
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: Vec::new(),
        }
    }

    /// Create a sentence carrying the given metadata
    pub fn with_metadata(text: impl Into<String>, metadata: Vec<Property>) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }
}
