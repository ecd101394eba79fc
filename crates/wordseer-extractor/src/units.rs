//! Unit building - the recursive walk over the structure specification

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::matcher::match_nodes;
use crate::metadata::MetadataExtractor;
use crate::sentences::SentenceCollector;
use tracing::debug;
use wordseer_domain::{Segmenter, StructureSpec, Unit};
use wordseer_markup::{MarkupNode, MarkupTree};

/// Builds unit trees from a structure specification
pub struct UnitBuilder<'a, S: Segmenter> {
    tree: &'a MarkupTree,
    config: &'a ExtractorConfig,
    metadata: MetadataExtractor<'a>,
    sentences: SentenceCollector<'a, S>,
}

impl<'a, S: Segmenter> UnitBuilder<'a, S> {
    /// Create a builder over a parsed tree
    pub fn new(tree: &'a MarkupTree, segmenter: &'a S, config: &'a ExtractorConfig) -> Self {
        Self {
            tree,
            config,
            metadata: MetadataExtractor::new(tree, config),
            sentences: SentenceCollector::new(tree, segmenter, config),
        }
    }

    /// Build one unit per node that `spec` matches under `parent`
    ///
    /// Units follow `xpaths` order, then document order within each path.
    /// Internal units hold the concatenated units of their child specs;
    /// leaf units hold sentences. A spec matching nothing yields no units.
    pub fn build(
        &self,
        spec: &StructureSpec,
        parent: MarkupNode<'a>,
    ) -> Result<Vec<Unit>, ExtractorError> {
        let mut units = Vec::new();

        for xpath in spec.xpaths() {
            for node in match_nodes(self.tree, xpath, parent)? {
                let properties = self.metadata.extract(spec, node)?;

                let unit = match spec {
                    StructureSpec::Internal(internal) => {
                        let mut children = Vec::new();
                        for child in &internal.children {
                            children.extend(self.build(child, node)?);
                        }
                        Unit::with_children(spec.name(), properties, children)
                    }
                    StructureSpec::Leaf(_) => {
                        let sentences =
                            self.sentences
                                .collect_sentences(spec, node, self.config.tokenize)?;
                        Unit::with_sentences(spec.name(), properties, sentences)
                    }
                };

                debug!(
                    "Built '{}' at {} ({} children, {} sentences)",
                    unit.name,
                    self.tree.locate(node),
                    unit.children.len(),
                    unit.sentences.len()
                );
                units.push(unit);
            }
        }

        Ok(units)
    }
}
