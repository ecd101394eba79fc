//! WordSeer Extractor
//!
//! Converts marked-up documents into documents, units and sentences, guided
//! by a declarative structure specification.
//!
//! # Overview
//!
//! The Extractor is the ingestion pathway for XML corpora. The structure
//! specification says which markup nodes become units, which units nest, and
//! which attributes or text become metadata. Nothing is hard-coded per
//! document type.
//!
//! # Architecture
//!
//! ```text
//! Markup → MarkupTree → UnitBuilder ─┬─ match_nodes
//!                                    ├─ MetadataExtractor
//!                                    └─ SentenceCollector → Segmenter
//!        → Documents → DocumentStore
//! ```
//!
//! # Example Usage
//!
//! ```
//! use wordseer_extractor::{parse_structure, RuleSegmenter, StructureExtractor};
//!
//! # fn example() -> Result<(), wordseer_extractor::ExtractorError> {
//! let structure = parse_structure(
//!     r#"{"structureName": "book", "xpaths": ["/book"],
//!         "units": [{"structureName": "chapter", "xpaths": ["chapter"],
//!                    "xpaths-for-sentences": ["p"]}]}"#,
//! )?;
//!
//! let extractor = StructureExtractor::new(RuleSegmenter::default(), structure);
//! let documents =
//!     extractor.extract_str("<book><chapter><p>Hello. World.</p></chapter></book>")?;
//!
//! assert_eq!(documents.len(), 1);
//! assert_eq!(documents[0].children[0].sentences.len(), 2);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;
mod matcher;
mod metadata;
mod segmenter;
mod sentences;
mod structure;
mod units;


pub use config::{ExtractorConfig, SegmenterConfig};
pub use error::ExtractorError;
pub use extractor::StructureExtractor;
pub use matcher::match_nodes;
pub use metadata::{extract_metadata, MetadataExtractor};
pub use segmenter::RuleSegmenter;
pub use sentences::SentenceCollector;
pub use structure::{load_structure, parse_structure, read_structure};
pub use units::UnitBuilder;
