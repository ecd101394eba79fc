//! Metadata extraction - turns metadata rules into properties

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::matcher::match_nodes;
use tracing::{debug, trace};
use wordseer_domain::{MetadataRule, Property, StructureSpec};
use wordseer_markup::{MarkupError, MarkupNode, MarkupTree};

/// Extract the properties `spec` declares for `node`
///
/// Shorthand for [`MetadataExtractor::extract`].
pub fn extract_metadata<'a>(
    tree: &'a MarkupTree,
    spec: &StructureSpec,
    node: MarkupNode<'a>,
    config: &'a ExtractorConfig,
) -> Result<Vec<Property>, ExtractorError> {
    MetadataExtractor::new(tree, config).extract(spec, node)
}

/// Applies a specification's metadata rules to markup nodes
pub struct MetadataExtractor<'a> {
    tree: &'a MarkupTree,
    config: &'a ExtractorConfig,
}

impl<'a> MetadataExtractor<'a> {
    /// Create an extractor over a parsed tree
    pub fn new(tree: &'a MarkupTree, config: &'a ExtractorConfig) -> Self {
        Self { tree, config }
    }

    /// Extract the properties `spec` declares for `node`
    ///
    /// A specification without `metadata` yields no properties. Properties
    /// follow rule order, then match order; duplicates are kept.
    pub fn extract(
        &self,
        spec: &StructureSpec,
        node: MarkupNode<'a>,
    ) -> Result<Vec<Property>, ExtractorError> {
        let Some(rules) = spec.metadata() else {
            return Ok(Vec::new());
        };

        let mut properties = Vec::new();
        for rule in rules {
            properties.extend(self.extract_rule(rule, node)?);
        }

        if !properties.is_empty() {
            trace!(
                "Extracted {} properties for '{}' at {}",
                properties.len(),
                spec.name(),
                self.tree.locate(node)
            );
        }
        Ok(properties)
    }

    /// Extract the values of a single rule for `node`
    pub fn extract_rule(
        &self,
        rule: &MetadataRule,
        node: MarkupNode<'a>,
    ) -> Result<Vec<Property>, ExtractorError> {
        let mut properties = Vec::new();
        for xpath in &rule.xpaths {
            let values = match &rule.attr {
                Some(attribute) => self.attribute_values(xpath, attribute, node)?,
                None => self.text_values(xpath, node)?,
            };
            properties.extend(values.into_iter().map(|value| Property::from_rule(value, rule)));
        }
        Ok(properties)
    }

    /// Attribute tokens of every node matched by `xpath`
    ///
    /// Markup cannot repeat an attribute, so multiple values are written
    /// delimiter-separated in one attribute and split here.
    pub fn attribute_values(
        &self,
        xpath: &str,
        attribute: &str,
        node: MarkupNode<'a>,
    ) -> Result<Vec<String>, ExtractorError> {
        let mut values = Vec::new();
        for matched in self.candidates(xpath, node)? {
            let Some(raw) = self.tree.attribute(matched, attribute) else {
                continue;
            };
            values.extend(
                raw.split(self.config.attribute_delimiter)
                    .filter(|token| self.config.keep_empty_attribute_tokens || !token.is_empty())
                    .map(str::to_string),
            );
        }
        Ok(values)
    }

    /// Text values of the nodes matched by `xpath`
    ///
    /// A blank path yields the node's own text. A non-blank path yields the
    /// trimmed text of each match's parent, so `"title/text()"` or
    /// `"@type"` read the enclosing element. Values that are blank after
    /// trimming are dropped.
    pub fn text_values(
        &self,
        xpath: &str,
        node: MarkupNode<'a>,
    ) -> Result<Vec<String>, ExtractorError> {
        if xpath.trim().is_empty() {
            let text = self.tree.text_content(node);
            return Ok(if text.trim().is_empty() { Vec::new() } else { vec![text] });
        }

        let mut values = Vec::new();
        for matched in self.candidates(xpath, node)? {
            let context = self.tree.parent(matched).unwrap_or(matched);
            let text = self.tree.text_content(context);
            let text = text.trim();
            if !text.is_empty() {
                values.push(text.to_string());
            }
        }
        Ok(values)
    }

    /// Nodes matched by `xpath`; a text-node context simply has no metadata
    fn candidates(
        &self,
        xpath: &str,
        node: MarkupNode<'a>,
    ) -> Result<Vec<MarkupNode<'a>>, ExtractorError> {
        match match_nodes(self.tree, xpath, node) {
            Ok(nodes) => Ok(nodes),
            Err(MarkupError::NonElementContext(expr)) => {
                debug!("Skipping metadata path '{}' under a text node", expr);
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use wordseer_domain::LeafSpec;

    const SPEECH: &str = r#"<sp who="HAMLET PRINCE" ana="a  b"><speaker>Ham.</speaker><l>To be, or not to be</l></sp>"#;

    fn rule(xpaths: &[&str], attr: Option<&str>, name: &str) -> MetadataRule {
        MetadataRule {
            xpaths: xpaths.iter().map(|s| s.to_string()).collect(),
            attr: attr.map(str::to_string),
            property_name: name.to_string(),
        }
    }

    fn leaf(metadata: Option<Vec<MetadataRule>>) -> StructureSpec {
        StructureSpec::Leaf(LeafSpec {
            name: "speech".to_string(),
            xpaths: vec!["/sp".to_string()],
            metadata,
            sentence_xpaths: None,
        })
    }

    fn values(properties: &[Property]) -> Vec<&str> {
        properties.iter().map(|p| p.value.as_str()).collect()
    }

    #[test]
    fn test_no_metadata_yields_nothing() {
        let tree = MarkupTree::parse(SPEECH).unwrap();
        let config = ExtractorConfig::default();
        let extractor = MetadataExtractor::new(&tree, &config);

        let sp = tree.document_element().unwrap();
        assert!(extractor.extract(&leaf(None), sp).unwrap().is_empty());
        assert!(extract_metadata(&tree, &leaf(Some(Vec::new())), sp, &config).unwrap().is_empty());
    }

    #[test]
    fn test_attribute_values_are_split() {
        let tree = MarkupTree::parse(SPEECH).unwrap();
        let config = ExtractorConfig::default();
        let extractor = MetadataExtractor::new(&tree, &config);

        let spec = leaf(Some(vec![rule(&[""], Some("who"), "speaker")]));
        let sp = tree.document_element().unwrap();
        let properties = extractor.extract(&spec, sp).unwrap();

        assert_eq!(values(&properties), vec!["HAMLET", "PRINCE"]);
        assert!(properties.iter().all(|p| p.name == "speaker"));
        assert_eq!(properties[0].specification, rule(&[""], Some("who"), "speaker"));
    }

    #[test]
    fn test_empty_tokens_after_split() {
        let tree = MarkupTree::parse(SPEECH).unwrap();
        let sp = tree.document_element().unwrap();

        let config = ExtractorConfig::default();
        let extractor = MetadataExtractor::new(&tree, &config);
        assert_eq!(extractor.attribute_values("", "ana", sp).unwrap(), vec!["a", "b"]);

        let keep = ExtractorConfig {
            keep_empty_attribute_tokens: true,
            ..ExtractorConfig::default()
        };
        let extractor = MetadataExtractor::new(&tree, &keep);
        assert_eq!(extractor.attribute_values("", "ana", sp).unwrap(), vec!["a", "", "b"]);
    }

    #[test]
    fn test_missing_attribute_is_skipped() {
        let tree = MarkupTree::parse(SPEECH).unwrap();
        let config = ExtractorConfig::default();
        let extractor = MetadataExtractor::new(&tree, &config);
        let sp = tree.document_element().unwrap();

        assert!(extractor.attribute_values("l", "n", sp).unwrap().is_empty());
    }

    #[test]
    fn test_text_of_blank_path_is_the_node_text() {
        let tree = MarkupTree::parse(SPEECH).unwrap();
        let config = ExtractorConfig::default();
        let extractor = MetadataExtractor::new(&tree, &config);
        let speaker = tree.select(tree.root(), "//speaker").unwrap()[0];

        assert_eq!(extractor.text_values("", speaker).unwrap(), vec!["Ham."]);
    }

    #[test]
    fn test_text_of_path_reads_the_parent() {
        let tree = MarkupTree::parse(SPEECH).unwrap();
        let config = ExtractorConfig::default();
        let extractor = MetadataExtractor::new(&tree, &config);
        let sp = tree.document_element().unwrap();

        let via_text = extractor.text_values("speaker/text()", sp).unwrap();
        assert_eq!(via_text, vec!["Ham."]);

        // The parent of <speaker> is the whole speech
        let via_element = extractor.text_values("speaker", sp).unwrap();
        assert_eq!(via_element, vec!["Ham.To be, or not to be"]);
    }

    #[test]
    fn test_blank_text_is_dropped() {
        let tree = MarkupTree::parse("<div><note>  </note><pb/></div>").unwrap();
        let config = ExtractorConfig::default();
        let extractor = MetadataExtractor::new(&tree, &config);
        let note = tree.select(tree.root(), "//note").unwrap()[0];

        assert!(extractor.text_values("", note).unwrap().is_empty());
        assert!(extractor.text_values("text()", note).unwrap().is_empty());
    }

    #[test]
    fn test_rule_order_then_match_order() {
        let tree = MarkupTree::parse(SPEECH).unwrap();
        let config = ExtractorConfig::default();
        let extractor = MetadataExtractor::new(&tree, &config);

        let spec = leaf(Some(vec![
            rule(&["speaker/text()"], None, "label"),
            rule(&["", ""], Some("who"), "speaker"),
        ]));
        let sp = tree.document_element().unwrap();
        let properties = extractor.extract(&spec, sp).unwrap();

        let names: Vec<_> = properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["label", "speaker", "speaker", "speaker", "speaker"]);
        assert_eq!(values(&properties), vec!["Ham.", "HAMLET", "PRINCE", "HAMLET", "PRINCE"]);
    }

    #[test]
    fn test_rule_without_xpaths_yields_nothing() {
        let tree = MarkupTree::parse(SPEECH).unwrap();
        let config = ExtractorConfig::default();
        let extractor = MetadataExtractor::new(&tree, &config);
        let sp = tree.document_element().unwrap();

        assert!(extractor.extract_rule(&rule(&[], Some("who"), "speaker"), sp).unwrap().is_empty());
    }

    #[test]
    fn test_text_node_context_has_no_metadata() {
        let tree = MarkupTree::parse(SPEECH).unwrap();
        let config = ExtractorConfig::default();
        let extractor = MetadataExtractor::new(&tree, &config);
        let text = tree.select(tree.root(), "//l/text()").unwrap()[0];

        assert!(extractor.text_values("speaker", text).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_path_is_an_error() {
        let tree = MarkupTree::parse(SPEECH).unwrap();
        let config = ExtractorConfig::default();
        let extractor = MetadataExtractor::new(&tree, &config);
        let sp = tree.document_element().unwrap();

        assert!(matches!(
            extractor.text_values("l[", sp),
            Err(ExtractorError::Markup(MarkupError::InvalidPath { .. }))
        ));
    }

    proptest! {
        /// Property: a space-joined attribute yields one property per token, in order
        #[test]
        fn test_attribute_split_preserves_tokens(
            tokens in prop::collection::vec("[a-zA-Z0-9#_-]{1,8}", 1..6),
        ) {
            let markup = format!("<w ana=\"{}\"/>", tokens.join(" "));
            let tree = MarkupTree::parse(&markup).unwrap();
            let config = ExtractorConfig::default();
            let extractor = MetadataExtractor::new(&tree, &config);

            let spec = leaf(Some(vec![rule(&[""], Some("ana"), "ana")]));
            let w = tree.document_element().unwrap();
            let properties = extractor.extract(&spec, w).unwrap();

            let extracted: Vec<String> = properties.into_iter().map(|p| p.value).collect();
            prop_assert_eq!(extracted, tokens);
        }

        /// Property: a spec without metadata yields nothing at any node
        #[test]
        fn test_absent_metadata_is_empty_everywhere(pick in 0usize..32) {
            let tree = MarkupTree::parse(SPEECH).unwrap();
            let config = ExtractorConfig::default();
            let nodes = tree.descendants_or_self(tree.root());
            let node = nodes[pick % nodes.len()];

            prop_assert!(extract_metadata(&tree, &leaf(None), node, &config).unwrap().is_empty());
        }
    }
}
