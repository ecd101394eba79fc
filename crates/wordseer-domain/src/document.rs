//! Document module - the root of every extracted tree

use crate::{Property, Sentence, Unit};
use serde::{Deserialize, Serialize};

/// A document extracted from one top-level match of the root specification
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Document {
    /// Document title (the root unit's name)
    pub title: String,

    /// Metadata extracted for the document
    #[serde(default)]
    pub properties: Vec<Property>,

    /// Sentences, when the root specification is itself a leaf
    #[serde(default)]
    pub sentences: Vec<Sentence>,

    /// Top-level units of the document
    #[serde(default)]
    pub children: Vec<Unit>,
}

impl Document {
    /// Count the sentences in the document, including nested units
    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
            + self
                .children
                .iter()
                .map(Unit::sentence_count)
                .sum::<usize>()
    }
}

impl From<Unit> for Document {
    fn from(unit: Unit) -> Self {
        Self {
            title: unit.name,
            properties: unit.properties,
            sentences: unit.sentences,
            children: unit.children,
        }
    }
}
