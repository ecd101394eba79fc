//! Sentence collection for leaf units

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::matcher::match_nodes;
use crate::metadata::MetadataExtractor;
use tracing::{debug, warn};
use wordseer_domain::{Property, Segmenter, Sentence, StructureSpec};
use wordseer_markup::{MarkupError, MarkupNode, MarkupTree};

/// Gathers the text under a leaf unit and turns it into sentences
pub struct SentenceCollector<'a, S: Segmenter> {
    tree: &'a MarkupTree,
    segmenter: &'a S,
    metadata: MetadataExtractor<'a>,
}

impl<'a, S: Segmenter> SentenceCollector<'a, S> {
    /// Create a collector over a parsed tree
    pub fn new(tree: &'a MarkupTree, segmenter: &'a S, config: &'a ExtractorConfig) -> Self {
        Self {
            tree,
            segmenter,
            metadata: MetadataExtractor::new(tree, config),
        }
    }

    /// Collect the sentences of `spec` under `parent`
    ///
    /// Every node matched by the sentence paths of `spec` contributes its
    /// trimmed text plus a newline to one buffer, and its metadata to one
    /// shared list. With `tokenize` the buffer is segmented and each
    /// sentence gets a copy of the whole list; without it the buffer
    /// becomes a single sentence.
    pub fn collect_sentences(
        &self,
        spec: &StructureSpec,
        parent: MarkupNode<'a>,
        tokenize: bool,
    ) -> Result<Vec<Sentence>, ExtractorError> {
        let mut buffer = String::new();
        let mut metadata: Vec<Property> = Vec::new();

        for xpath in spec.sentence_xpaths() {
            for node in self.sentence_nodes(xpath, parent)? {
                buffer.push_str(self.tree.text_content(node).trim());
                buffer.push('\n');
                metadata.extend(self.metadata.extract(spec, node)?);
            }
        }

        let sentences = if tokenize {
            self.segmenter
                .tokenize(&buffer)
                .into_iter()
                .map(|sentence| Sentence::with_metadata(sentence.text, metadata.clone()))
                .collect()
        } else {
            vec![Sentence::with_metadata(buffer, metadata)]
        };

        debug!(
            "Collected {} sentences for '{}' at {}",
            sentences.len(),
            spec.name(),
            self.tree.locate(parent)
        );
        Ok(sentences)
    }

    /// Nodes holding sentence text
    ///
    /// A raw text node cannot be queried; its parent's elements stand in.
    fn sentence_nodes(
        &self,
        xpath: &str,
        parent: MarkupNode<'a>,
    ) -> Result<Vec<MarkupNode<'a>>, ExtractorError> {
        match match_nodes(self.tree, xpath, parent) {
            Ok(nodes) => Ok(nodes),
            Err(MarkupError::NonElementContext(expr)) => {
                let fallback = self
                    .tree
                    .parent(parent)
                    .map(|p| self.tree.elements(p))
                    .unwrap_or_default();
                warn!(
                    "Cannot apply '{}' to text at {}; reading {} elements of its parent",
                    expr,
                    self.tree.locate(parent),
                    fallback.len()
                );
                Ok(fallback)
            }
            Err(e) => Err(e.into()),
        }
    }
}
