//! Trait definitions for external collaborators
//!
//! The extractor depends on these boundaries only; implementations live in
//! other crates (a rule-based segmenter in `wordseer-extractor`, reference
//! stores in `wordseer-store`).

use crate::{Document, Sentence};

/// Trait for splitting raw text into sentences
///
/// Implementations return sentences with empty metadata. The returned
/// sequence must be finite, and calling `tokenize` again on the same text
/// must produce the same sentences.
pub trait Segmenter {
    /// Split `text` into sentences
    fn tokenize(&self, text: &str) -> Vec<Sentence>;
}

impl<T: Segmenter + ?Sized> Segmenter for &T {
    fn tokenize(&self, text: &str) -> Vec<Sentence> {
        (**self).tokenize(text)
    }
}

impl<T: Segmenter + ?Sized> Segmenter for Box<T> {
    fn tokenize(&self, text: &str) -> Vec<Sentence> {
        (**self).tokenize(text)
    }
}

/// Trait for persisting extracted documents
///
/// Implemented by the infrastructure layer (wordseer-store). The extractor
/// only hands documents over; it never reads them back.
pub trait DocumentStore {
    /// Error type for store operations
    type Error;

    /// Persist a completed document tree
    fn store_document(&mut self, document: Document) -> Result<(), Self::Error>;
}
