//! WordSeer Domain Layer
//!
//! This crate contains the domain model produced by structure extraction and
//! the trait interfaces for the collaborators the extraction engine talks to.
//! Apart from `serde` derives it has no external dependencies; parsing,
//! path evaluation and storage live in other crates.
//!
//! ## Key Concepts
//!
//! - **Document**: One top-level match of the root structure specification
//! - **Unit**: A structural division (chapter, section, speech...) that either
//!   holds nested units or, at the leaves, sentences
//! - **Sentence**: A span of text plus the metadata of the unit it came from
//! - **Property**: A named metadata value, tagged with the rule that produced it
//! - **StructureSpec**: The externally authored description of how to walk the
//!   markup, resolved once into leaf and internal variants
//!
//! ## Architecture
//!
//! ```text
//! markup + StructureSpec → extractor → Document → DocumentStore
//!                              ↘ Segmenter ↗
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod property;
pub mod sentence;
pub mod structure;
pub mod traits;
pub mod unit;

// Re-exports for convenience
pub use document::Document;
pub use property::Property;
pub use sentence::Sentence;
pub use structure::{InternalSpec, LeafSpec, MetadataRule, StructureSpec};
pub use traits::{DocumentStore, Segmenter};
pub use unit::Unit;
