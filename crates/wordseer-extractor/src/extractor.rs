//! Core Extractor implementation

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::segmenter::RuleSegmenter;
use crate::sentences::SentenceCollector;
use crate::structure::load_structure;
use crate::units::UnitBuilder;
use std::fmt::Display;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};
use wordseer_domain::{Document, DocumentStore, Segmenter, Sentence, StructureSpec};
use wordseer_markup::{MarkupNode, MarkupTree};

/// The Extractor turns marked-up sources into documents
///
/// The structure specification and configuration are fixed per instance;
/// each source is parsed once and then walked without further I/O.
pub struct StructureExtractor<S: Segmenter> {
    segmenter: S,
    structure: StructureSpec,
    config: ExtractorConfig,
}

impl StructureExtractor<RuleSegmenter> {
    /// Create a new Extractor whose segmenter follows `config.segmenter`
    pub fn from_config(structure: StructureSpec, config: ExtractorConfig) -> Self {
        Self {
            segmenter: RuleSegmenter::new(&config.segmenter),
            structure,
            config,
        }
    }
}

impl<S: Segmenter> StructureExtractor<S> {
    /// Create a new Extractor with the default configuration
    pub fn new(segmenter: S, structure: StructureSpec) -> Self {
        Self {
            segmenter,
            structure,
            config: ExtractorConfig::default(),
        }
    }

    /// Create a new Extractor from a structure specification file
    pub fn from_structure_file(segmenter: S, path: impl AsRef<Path>) -> Result<Self, ExtractorError> {
        Ok(Self::new(segmenter, load_structure(path)?))
    }

    /// Replace the configuration
    ///
    /// The segmenter is kept as given, so `config.segmenter` has no effect
    /// here; use [`StructureExtractor::from_config`] to build a segmenter
    /// from it.
    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    /// The structure specification in use
    pub fn structure(&self) -> &StructureSpec {
        &self.structure
    }

    /// The configuration in use
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// The segmenter in use
    pub fn segmenter(&self) -> &S {
        &self.segmenter
    }

    /// Extract documents from a readable source
    pub fn extract<R: Read>(&self, source: R) -> Result<Vec<Document>, ExtractorError> {
        let tree = self.bind_namespaces(MarkupTree::from_reader(source)?);
        self.extract_tree(&tree)
    }

    /// Extract documents from a markup file
    pub fn extract_path(&self, path: impl AsRef<Path>) -> Result<Vec<Document>, ExtractorError> {
        let path = path.as_ref();
        debug!("Parsing {}", path.display());
        let tree = self.bind_namespaces(MarkupTree::from_path(path)?);
        self.extract_tree(&tree)
    }

    /// Extract documents from a markup string
    pub fn extract_str(&self, markup: &str) -> Result<Vec<Document>, ExtractorError> {
        let tree = self.bind_namespaces(MarkupTree::parse(markup)?);
        self.extract_tree(&tree)
    }

    /// Extract documents from an already parsed tree
    ///
    /// One document is produced per unit the root specification matches
    /// from the document node. Namespaces from the configuration are not
    /// applied here; bind them on the tree beforehand.
    pub fn extract_tree(&self, tree: &MarkupTree) -> Result<Vec<Document>, ExtractorError> {
        let root_element = tree
            .document_element()
            .and_then(|element| tree.name(element))
            .unwrap_or_default();
        info!(
            "Starting extraction with structure '{}' on <{}>",
            self.structure.name(),
            root_element
        );

        let units = UnitBuilder::new(tree, &self.segmenter, &self.config)
            .build(&self.structure, tree.root())?;
        let documents: Vec<Document> = units.into_iter().map(Document::from).collect();

        info!(
            "Extracted {} documents ({} sentences)",
            documents.len(),
            documents.iter().map(Document::sentence_count).sum::<usize>()
        );
        Ok(documents)
    }

    /// Collect the sentences of `spec` under `node`, ignoring `config.tokenize`
    pub fn collect_sentences<'a>(
        &'a self,
        tree: &'a MarkupTree,
        spec: &StructureSpec,
        node: MarkupNode<'a>,
        tokenize: bool,
    ) -> Result<Vec<Sentence>, ExtractorError> {
        SentenceCollector::new(tree, &self.segmenter, &self.config).collect_sentences(spec, node, tokenize)
    }

    /// Extract documents from a source and hand each one to `store`
    ///
    /// Returns the number of documents stored. Documents are handed over in
    /// order; the first store failure stops the run.
    pub fn extract_into<R, D>(&self, source: R, store: &mut D) -> Result<usize, ExtractorError>
    where
        R: Read,
        D: DocumentStore,
        D::Error: Display,
    {
        let documents = self.extract(source)?;
        let count = documents.len();
        for document in documents {
            store
                .store_document(document)
                .map_err(|e| ExtractorError::Store(e.to_string()))?;
        }
        info!("Stored {} documents", count);
        Ok(count)
    }

    fn bind_namespaces(&self, mut tree: MarkupTree) -> MarkupTree {
        for (prefix, uri) in &self.config.namespaces {
            tree.bind_namespace(prefix.as_str(), uri.as_str());
        }
        tree
    }
}
