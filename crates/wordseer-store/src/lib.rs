//! WordSeer Storage Layer
//!
//! Reference implementations of the `DocumentStore` trait.
//!
//! # Architecture
//!
//! - [`MemoryStore`] keeps documents in insertion order (useful for testing)
//! - [`JsonLinesStore`] writes one serialized document per line to any writer
//!
//! # Examples
//!
//! ```
//! use wordseer_domain::{Document, DocumentStore};
//! use wordseer_store::JsonLinesStore;
//!
//! let mut store = JsonLinesStore::new(Vec::new());
//! store.store_document(Document { title: "book".to_string(), ..Default::default() }).unwrap();
//!
//! let output = String::from_utf8(store.into_inner()).unwrap();
//! assert!(output.starts_with("{\"title\":\"book\""));
//! ```

#![warn(missing_docs)]

use std::io::Write;
use thiserror::Error;
use tracing::debug;
use wordseer_domain::{Document, DocumentStore};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Writer failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// In-memory document store
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Vec<Document>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored documents, in insertion order
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether nothing has been stored
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Consume the store, returning its documents
    pub fn into_documents(self) -> Vec<Document> {
        self.documents
    }
}

impl DocumentStore for MemoryStore {
    type Error = StoreError;

    fn store_document(&mut self, document: Document) -> Result<(), Self::Error> {
        self.documents.push(document);
        Ok(())
    }
}

/// Document store writing JSON lines
///
/// Each document becomes one line of JSON; the writer is flushed after
/// every document so partial runs leave complete lines behind.
pub struct JsonLinesStore<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> JsonLinesStore<W> {
    /// Create a store over `writer`
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Number of documents written so far
    pub fn written(&self) -> usize {
        self.written
    }

    /// Consume the store, returning the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DocumentStore for JsonLinesStore<W> {
    type Error = StoreError;

    fn store_document(&mut self, document: Document) -> Result<(), Self::Error> {
        serde_json::to_writer(&mut self.writer, &document)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.written += 1;
        debug!("Wrote document '{}' ({} so far)", document.title, self.written);
        Ok(())
    }
}
