//! WordSeer Markup Layer
//!
//! Parses XML into an immutable document and evaluates XPath 1.0
//! expressions against it.
//!
//! # Overview
//!
//! The extraction engine never walks raw XML events. It parses a source once
//! into a [`MarkupTree`], then asks the tree for node sets:
//!
//! ```
//! use wordseer_markup::MarkupTree;
//!
//! let tree = MarkupTree::parse("<book><chapter n='1'><p>Hi.</p></chapter></book>").unwrap();
//! let chapters = tree.select(tree.root(), "/book/chapter[@n='1']").unwrap();
//! assert_eq!(chapters.len(), 1);
//! assert_eq!(tree.text_content(chapters[0]), "Hi.");
//! ```
//!
//! # Parsing
//!
//! quick-xml reads the source. Adjacent text, CDATA and entity references
//! merge into single text nodes, general entities declared in the DOCTYPE
//! internal subset are expanded, and namespace declarations become prefix
//! bindings rather than attributes. The document is held as an
//! `sxd-document` DOM so that `sxd-xpath` can evaluate paths over it.

#![warn(missing_docs)]

mod error;
mod parser;
mod tree;

pub use error::MarkupError;
pub use tree::{MarkupNode, MarkupTree};
