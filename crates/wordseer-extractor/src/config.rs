//! Configuration for the Extractor

use crate::error::ExtractorError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Configuration for the rule-based sentence segmenter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Words that end in a period without ending the sentence (matched
    /// case-insensitively, without the trailing period)
    pub abbreviations: Vec<String>,

    /// Read a lone capital letter (other than `I`) followed by a period and
    /// a capitalized word as an initial rather than a sentence end
    pub initials: bool,

    /// Treat every line break as a sentence boundary
    ///
    /// Collected text spans are newline-terminated, so this keeps text from
    /// separate markup nodes in separate sentences.
    pub split_on_newlines: bool,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            abbreviations: [
                "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "e.g", "i.e",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            initials: true,
            split_on_newlines: true,
        }
    }
}

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Segment leaf-unit text into sentences (otherwise one sentence per unit)
    pub tokenize: bool,

    /// Separator for multi-valued attributes
    pub attribute_delimiter: char,

    /// Keep empty tokens produced by repeated delimiters
    pub keep_empty_attribute_tokens: bool,

    /// Settings for the rule-based segmenter built by
    /// [`StructureExtractor::from_config`](crate::StructureExtractor::from_config)
    pub segmenter: SegmenterConfig,

    /// Namespace prefixes bound for path expressions (prefix to URI)
    ///
    /// Elements in a default namespace can only be selected through a
    /// prefix bound here.
    pub namespaces: BTreeMap<String, String>,
}

impl ExtractorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.attribute_delimiter.is_control() && self.attribute_delimiter != '\t' {
            return Err(format!(
                "attribute_delimiter {:?} must not be a control character",
                self.attribute_delimiter
            ));
        }
        if let Some(empty) = self
            .segmenter
            .abbreviations
            .iter()
            .position(|a| a.trim().is_empty())
        {
            return Err(format!("abbreviation #{} is empty", empty + 1));
        }
        for (prefix, uri) in &self.namespaces {
            if prefix.is_empty() || prefix.contains(':') {
                return Err(format!("namespace prefix {:?} is not a valid prefix", prefix));
            }
            if uri.trim().is_empty() {
                return Err(format!("namespace prefix '{}' has an empty URI", prefix));
            }
        }
        Ok(())
    }

    /// Untokenized preset: every leaf unit becomes a single sentence
    pub fn untokenized() -> Self {
        Self {
            tokenize: false,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }

    /// Read, parse and validate a TOML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ExtractorError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ExtractorError::Io(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml(&contents).map_err(ExtractorError::Config)?;
        config.validate().map_err(ExtractorError::Config)?;
        Ok(config)
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            tokenize: true,
            attribute_delimiter: ' ',
            keep_empty_attribute_tokens: false,
            segmenter: SegmenterConfig::default(),
            namespaces: BTreeMap::new(),
        }
    }
}
