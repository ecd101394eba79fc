//! Unit module - structural divisions of a document

use crate::{Property, Sentence};
use serde::{Deserialize, Serialize};

/// A structural unit of a document
///
/// Units built from an internal specification hold `children`; units built
/// from a leaf specification hold `sentences`. Ownership is strictly
/// tree-shaped: every unit belongs to exactly one parent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Unit {
    /// Unit name, from the specification's `structureName`
    pub name: String,

    /// Metadata extracted for this unit
    #[serde(default)]
    pub properties: Vec<Property>,

    /// Sentences (leaf units only)
    #[serde(default)]
    pub sentences: Vec<Sentence>,

    /// Nested units (internal units only)
    #[serde(default)]
    pub children: Vec<Unit>,
}

impl Unit {
    /// Create a unit that contains nested units
    pub fn with_children(
        name: impl Into<String>,
        properties: Vec<Property>,
        children: Vec<Unit>,
    ) -> Self {
        Self {
            name: name.into(),
            properties,
            sentences: Vec::new(),
            children,
        }
    }

    /// Create a leaf unit that contains sentences
    pub fn with_sentences(
        name: impl Into<String>,
        properties: Vec<Property>,
        sentences: Vec<Sentence>,
    ) -> Self {
        Self {
            name: name.into(),
            properties,
            sentences,
            children: Vec::new(),
        }
    }

    /// Whether this unit holds sentences rather than nested units
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Count the sentences in this unit and all of its descendants
    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
            + self
                .children
                .iter()
                .map(Unit::sentence_count)
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentence_count_is_recursive() {
        let leaf = Unit::with_sentences(
            "p",
            Vec::new(),
            vec![Sentence::new("One."), Sentence::new("Two.")],
        );
        let chapter = Unit::with_children("chapter", Vec::new(), vec![leaf.clone(), leaf]);

        assert!(!chapter.is_leaf());
        assert_eq!(chapter.sentence_count(), 4);
    }
}
