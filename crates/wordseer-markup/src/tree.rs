//! Parsed markup and XPath selection over it

use crate::error::MarkupError;
use crate::parser::{self, XML_NAMESPACE};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::io::Read;
use std::path::Path;
use std::rc::Rc;
use sxd_document::dom::Attribute;
use sxd_document::Package;
use sxd_xpath::nodeset::Node;
use sxd_xpath::{Context, Factory, Value, XPath};
use tracing::trace;

/// A node of a [`MarkupTree`], valid while the tree is borrowed
///
/// Nodes are small copyable handles; equality is node identity.
pub type MarkupNode<'d> = Node<'d>;

/// An immutable, parsed markup document
///
/// Path expressions are full XPath 1.0. Namespace prefixes the source
/// declares are bound for every query; more can be added with
/// [`bind_namespace`](Self::bind_namespace).
#[derive(Debug)]
pub struct MarkupTree {
    package: Package,
    namespaces: BTreeMap<String, String>,
    compiled: RefCell<HashMap<String, Rc<XPath>>>,
}

impl MarkupTree {
    /// Parse markup from a string
    pub fn parse(markup: &str) -> Result<Self, MarkupError> {
        parser::parse_markup(markup)
    }

    /// Read and parse markup from a reader
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, MarkupError> {
        let mut markup = String::new();
        reader.read_to_string(&mut markup)?;
        Self::parse(&markup)
    }

    /// Read and parse a markup file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MarkupError> {
        let path = path.as_ref();
        let markup = std::fs::read_to_string(path)
            .map_err(|e| MarkupError::Io(format!("{}: {}", path.display(), e)))?;
        Self::parse(&markup)
    }

    pub(crate) fn new(package: Package, mut namespaces: BTreeMap<String, String>) -> Self {
        namespaces.insert("xml".to_string(), XML_NAMESPACE.to_string());
        Self {
            package,
            namespaces,
            compiled: RefCell::new(HashMap::new()),
        }
    }

    /// Bind `prefix` to `uri` for path expressions
    ///
    /// Needed for documents in a default namespace, whose elements have no
    /// prefix of their own. Replaces any binding the source declared.
    pub fn bind_namespace(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.namespaces.insert(prefix.into(), uri.into());
    }

    /// Prefix bindings available to path expressions
    pub fn namespaces(&self) -> &BTreeMap<String, String> {
        &self.namespaces
    }

    /// The document node
    pub fn root(&self) -> MarkupNode<'_> {
        Node::Root(self.package.as_document().root())
    }

    /// The single top-level element
    pub fn document_element(&self) -> Option<MarkupNode<'_>> {
        self.root().children().into_iter().find(|node| self.is_element(*node))
    }

    /// Parent of a node; an attribute's parent is its element
    pub fn parent<'d>(&'d self, node: MarkupNode<'d>) -> Option<MarkupNode<'d>> {
        node.parent()
    }

    /// Child nodes in document order (attributes excluded)
    pub fn children<'d>(&'d self, node: MarkupNode<'d>) -> Vec<MarkupNode<'d>> {
        node.children()
    }

    /// Value of the named attribute of an element
    ///
    /// `name` is matched against the qualified name as written in the
    /// source, so `"xml:id"` finds `xml:id="..."`.
    pub fn attribute<'d>(&'d self, node: MarkupNode<'d>, name: &str) -> Option<&'d str> {
        node.element()?
            .attributes()
            .into_iter()
            .find(|attribute| qualified_attribute_name(*attribute) == name)
            .map(|attribute| attribute.value())
    }

    /// Qualified element or attribute name
    pub fn name(&self, node: MarkupNode<'_>) -> Option<String> {
        match node {
            Node::Element(element) => {
                let name = element.name();
                Some(match (name.namespace_uri(), element.preferred_prefix()) {
                    (Some(_), Some(prefix)) => format!("{}:{}", prefix, name.local_part()),
                    _ => name.local_part().to_string(),
                })
            }
            Node::Attribute(attribute) => Some(qualified_attribute_name(attribute)),
            _ => None,
        }
    }

    /// Whether the node is an element
    pub fn is_element(&self, node: MarkupNode<'_>) -> bool {
        matches!(node, Node::Element(_))
    }

    /// Whether path expressions may be evaluated relative to this node
    pub fn is_queryable(&self, node: MarkupNode<'_>) -> bool {
        matches!(node, Node::Element(_) | Node::Root(_))
    }

    /// The node followed by all of its descendants, in document order
    pub fn descendants_or_self<'d>(&'d self, node: MarkupNode<'d>) -> Vec<MarkupNode<'d>> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(current.children().into_iter().rev());
        }
        out
    }

    /// Element descendants-or-self of a node, in document order
    pub fn elements<'d>(&'d self, node: MarkupNode<'d>) -> Vec<MarkupNode<'d>> {
        self.descendants_or_self(node)
            .into_iter()
            .filter(|current| self.is_element(*current))
            .collect()
    }

    /// Plain-text serialization of a node (its XPath string value)
    ///
    /// Elements and the document concatenate every descendant text node;
    /// other nodes yield their own content.
    pub fn text_content(&self, node: MarkupNode<'_>) -> String {
        node.string_value()
    }

    /// Slash-separated position of a node, for diagnostics (`/book[1]/p[2]`)
    pub fn locate(&self, node: MarkupNode<'_>) -> String {
        let mut segments = Vec::new();
        let mut current = Some(node);
        while let Some(step) = current {
            let parent = step.parent();
            let segment = match (step, parent) {
                (Node::Root(_), _) => break,
                (Node::Attribute(attribute), _) => format!("@{}", qualified_attribute_name(attribute)),
                (_, Some(parent)) => {
                    let label = self.step_label(step);
                    let position = parent
                        .children()
                        .into_iter()
                        .filter(|sibling| self.step_label(*sibling) == label)
                        .position(|sibling| sibling == step)
                        .map_or(1, |p| p + 1);
                    format!("{}[{}]", label, position)
                }
                (_, None) => self.step_label(step),
            };
            segments.push(segment);
            current = parent;
        }
        segments.reverse();
        format!("/{}", segments.join("/"))
    }

    fn step_label(&self, node: MarkupNode<'_>) -> String {
        match node {
            Node::Element(_) => self.name(node).unwrap_or_default(),
            Node::Text(_) => "text()".to_string(),
            Node::Comment(_) => "comment()".to_string(),
            Node::ProcessingInstruction(_) => "processing-instruction()".to_string(),
            _ => "node()".to_string(),
        }
    }

    /// Evaluate an XPath 1.0 expression against `context`
    ///
    /// The result must be a node set; it is returned in document order.
    /// Text, attribute and comment nodes cannot serve as the context.
    pub fn select<'d>(
        &'d self,
        context: MarkupNode<'d>,
        expr: &str,
    ) -> Result<Vec<MarkupNode<'d>>, MarkupError> {
        if !self.is_queryable(context) {
            return Err(MarkupError::NonElementContext(expr.to_string()));
        }

        let xpath = self.compile(expr)?;
        let mut bindings = Context::new();
        for (prefix, uri) in &self.namespaces {
            bindings.set_namespace(prefix, uri);
        }

        match xpath.evaluate(&bindings, context) {
            Ok(Value::Nodeset(nodes)) => Ok(nodes.document_order()),
            Ok(Value::Boolean(_)) => Err(invalid(expr, "yields a boolean rather than nodes")),
            Ok(Value::Number(_)) => Err(invalid(expr, "yields a number rather than nodes")),
            Ok(Value::String(_)) => Err(invalid(expr, "yields a string rather than nodes")),
            Err(e) => Err(invalid(expr, e)),
        }
    }

    /// Compiled form of `expr`, cached per tree
    fn compile(&self, expr: &str) -> Result<Rc<XPath>, MarkupError> {
        if let Some(xpath) = self.compiled.borrow().get(expr) {
            return Ok(Rc::clone(xpath));
        }

        if let Some(prefix) = unbound_prefix(expr, &self.namespaces) {
            return Err(invalid(expr, format!("namespace prefix '{}' is not bound", prefix)));
        }
        let xpath = Factory::new()
            .build(expr)
            .map_err(|e| invalid(expr, e))?
            .ok_or_else(|| invalid(expr, "empty expression"))?;
        let xpath = Rc::new(xpath);
        self.compiled
            .borrow_mut()
            .insert(expr.to_string(), Rc::clone(&xpath));
        trace!("Compiled path '{}'", expr);
        Ok(xpath)
    }
}

/// First namespace prefix in `expr` that has no binding
///
/// The evaluator cannot report an unknown prefix in a name test, so
/// prefixes are checked before compiling. String literals are skipped, as
/// are axis separators (`::`).
fn unbound_prefix<'e>(expr: &'e str, namespaces: &BTreeMap<String, String>) -> Option<&'e str> {
    let bytes = expr.as_bytes();
    let is_name_start = |b: u8| b.is_ascii_alphabetic() || b == b'_' || !b.is_ascii();
    let is_name_char = |b: u8| is_name_start(b) || b.is_ascii_digit() || b == b'-' || b == b'.';

    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'"' || b == b'\'' {
            i = expr[i + 1..]
                .find(b as char)
                .map_or(bytes.len(), |end| i + end + 2);
        } else if b.is_ascii_digit() {
            while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                i += 1;
            }
        } else if is_name_start(b) {
            let start = i;
            while i < bytes.len() && is_name_char(bytes[i]) {
                i += 1;
            }
            let prefixed = bytes.get(i) == Some(&b':') && bytes.get(i + 1) != Some(&b':');
            if prefixed && !namespaces.contains_key(&expr[start..i]) {
                return Some(&expr[start..i]);
            }
        } else {
            i += 1;
        }
    }
    None
}

fn qualified_attribute_name(attribute: Attribute<'_>) -> String {
    let name = attribute.name();
    match (name.namespace_uri(), attribute.preferred_prefix()) {
        (Some(_), Some(prefix)) => format!("{}:{}", prefix, name.local_part()),
        _ => name.local_part().to_string(),
    }
}

fn invalid(expr: &str, reason: impl Display) -> MarkupError {
    MarkupError::InvalidPath {
        expr: expr.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BOOK: &str = "<book lang=\"en\"><chapter><p>Hello. </p><p>World.</p></chapter><!-- end --></book>";

    const PLAY: &str = r#"<play>
  <title>Hamlet</title>
  <act n="1">
    <scene n="1">
      <sp who="BERNARDO"><l>Who's there?</l></sp>
      <sp who="FRANCISCO"><l>Nay, answer me.</l><l>Stand, and unfold yourself.</l></sp>
      <!-- stage direction -->
    </scene>
    <scene n="2" type="court">
      <sp who="CLAUDIUS KING"><l>Though yet of Hamlet our dear brother's death</l></sp>
    </scene>
  </act>
</play>"#;

    fn texts(tree: &MarkupTree, nodes: &[MarkupNode<'_>]) -> Vec<String> {
        nodes.iter().map(|n| tree.text_content(*n)).collect()
    }

    fn names(tree: &MarkupTree, nodes: &[MarkupNode<'_>]) -> Vec<String> {
        nodes
            .iter()
            .map(|n| tree.name(*n).unwrap_or_else(|| "#text".to_string()))
            .collect()
    }

    #[test]
    fn test_document_element() {
        let tree = MarkupTree::parse(BOOK).unwrap();
        let book = tree.document_element().unwrap();
        assert_eq!(tree.name(book).as_deref(), Some("book"));
        assert_eq!(tree.parent(book), Some(tree.root()));
    }

    #[test]
    fn test_attribute_lookup() {
        let tree = MarkupTree::parse(BOOK).unwrap();
        let book = tree.document_element().unwrap();
        assert_eq!(tree.attribute(book, "lang"), Some("en"));
        assert_eq!(tree.attribute(book, "missing"), None);

        let attr = tree.select(book, "@lang").unwrap()[0];
        assert_eq!(tree.parent(attr), Some(book));
        assert_eq!(tree.text_content(attr), "en");
    }

    #[test]
    fn test_text_content_concatenates_descendants() {
        let tree = MarkupTree::parse(BOOK).unwrap();
        let book = tree.document_element().unwrap();
        assert_eq!(tree.text_content(book), "Hello. World.");
        assert_eq!(tree.text_content(tree.root()), "Hello. World.");
    }

    #[test]
    fn test_elements_skips_text_and_comments() {
        let tree = MarkupTree::parse(BOOK).unwrap();
        let book = tree.document_element().unwrap();
        assert_eq!(names(&tree, &tree.elements(book)), vec!["book", "chapter", "p", "p"]);
        assert_eq!(tree.descendants_or_self(tree.root()).len(), 8);
    }

    #[test]
    fn test_locate() {
        let tree = MarkupTree::parse(BOOK).unwrap();
        let second_p = tree.select(tree.root(), "//p[2]").unwrap()[0];
        assert_eq!(tree.locate(second_p), "/book[1]/chapter[1]/p[2]");

        let lang = tree.select(tree.root(), "/book/@lang").unwrap()[0];
        assert_eq!(tree.locate(lang), "/book[1]/@lang");
    }

    #[test]
    fn test_absolute_and_relative_paths() {
        let tree = MarkupTree::parse(PLAY).unwrap();
        let play = tree.select(tree.root(), "/play").unwrap();
        assert_eq!(names(&tree, &play), vec!["play"]);

        // Relative from the document node reaches the document element too
        assert_eq!(tree.select(tree.root(), "play").unwrap(), play);

        let scenes = tree.select(play[0], "act/scene").unwrap();
        assert_eq!(scenes.len(), 2);
    }

    #[test]
    fn test_descendant_search_is_in_document_order() {
        let tree = MarkupTree::parse(PLAY).unwrap();
        let lines = tree.select(tree.root(), "//l").unwrap();
        assert_eq!(lines.len(), 4);
        assert_eq!(tree.text_content(lines[0]), "Who's there?");
        assert_eq!(tree.text_content(lines[3]), "Though yet of Hamlet our dear brother's death");
    }

    #[test]
    fn test_attribute_selection_and_predicates() {
        let tree = MarkupTree::parse(PLAY).unwrap();
        let who = tree.select(tree.root(), "//sp/@who").unwrap();
        assert_eq!(texts(&tree, &who), vec!["BERNARDO", "FRANCISCO", "CLAUDIUS KING"]);

        let court = tree.select(tree.root(), "//scene[@type='court']").unwrap();
        assert_eq!(tree.select(tree.root(), "//scene[@n > 1]").unwrap(), court);
        assert_eq!(tree.select(tree.root(), "//scene[not(@type)]").unwrap().len(), 1);
    }

    #[test]
    fn test_core_functions() {
        let tree = MarkupTree::parse(PLAY).unwrap();

        let by_local_name = tree.select(tree.root(), "//*[local-name()='scene']").unwrap();
        assert_eq!(by_local_name.len(), 2);
        assert_eq!(tree.select(tree.root(), "//scene[name()='scene']").unwrap(), by_local_name);

        let long = tree.select(tree.root(), "//l[string-length(.) > 20]").unwrap();
        assert_eq!(long.len(), 2);

        let odd = tree.select(tree.root(), "//l[position() mod 2 = 1]").unwrap();
        assert_eq!(
            texts(&tree, &odd),
            vec!["Who's there?", "Nay, answer me.", "Though yet of Hamlet our dear brother's death"]
        );

        let halved = tree.select(tree.root(), "//scene[@n div 2 = 1]").unwrap();
        assert_eq!(halved.len(), 1);

        let contains = tree.select(tree.root(), "//l[contains(., 'Hamlet')]").unwrap();
        assert_eq!(contains.len(), 1);
    }

    #[test]
    fn test_parenthesized_and_document_axes() {
        let tree = MarkupTree::parse(PLAY).unwrap();

        let first = tree.select(tree.root(), "(//scene)[1]").unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(tree.attribute(first[0], "n"), Some("1"));

        let after = tree.select(first[0], "following::l").unwrap();
        assert_eq!(texts(&tree, &after), vec!["Though yet of Hamlet our dear brother's death"]);

        let last_line = tree.select(tree.root(), "(//l)[last()]").unwrap()[0];
        let before = tree.select(last_line, "preceding::sp").unwrap();
        assert_eq!(before.len(), 2);

        let scene = tree.select(last_line, "ancestor::scene").unwrap();
        assert_eq!(tree.attribute(scene[0], "type"), Some("court"));
    }

    #[test]
    fn test_union_is_in_document_order() {
        let tree = MarkupTree::parse(PLAY).unwrap();
        let nodes = tree.select(tree.root(), "//scene | //title | //scene").unwrap();
        assert_eq!(names(&tree, &nodes), vec!["title", "scene", "scene"]);
    }

    #[test]
    fn test_text_and_comment_nodes() {
        let tree = MarkupTree::parse(PLAY).unwrap();
        let text = tree.select(tree.root(), "//sp[2]/l[2]/text()").unwrap();
        assert_eq!(texts(&tree, &text), vec!["Stand, and unfold yourself."]);

        let comments = tree.select(tree.root(), "//comment()").unwrap();
        assert_eq!(texts(&tree, &comments), vec![" stage direction "]);
    }

    #[test]
    fn test_namespaced_documents() {
        let markup = r#"<TEI xmlns="http://www.tei-c.org/ns/1.0"><text><l>Hi.</l></text></TEI>"#;
        let mut tree = MarkupTree::parse(markup).unwrap();

        // Default-namespace elements need a bound prefix
        assert!(tree.select(tree.root(), "/TEI").unwrap().is_empty());
        assert_eq!(tree.select(tree.root(), "//*[local-name()='l']").unwrap().len(), 1);

        tree.bind_namespace("tei", "http://www.tei-c.org/ns/1.0");
        let lines = tree.select(tree.root(), "/tei:TEI/tei:text/tei:l").unwrap();
        assert_eq!(texts(&tree, &lines), vec!["Hi."]);
    }

    #[test]
    fn test_declared_prefixes_are_bound() {
        let markup = r#"<doc xmlns:w="urn:w"><w:p w:n="1">a</w:p><p>b</p></doc>"#;
        let tree = MarkupTree::parse(markup).unwrap();
        let prefixed = tree.select(tree.root(), "//w:p[@w:n='1']").unwrap();
        assert_eq!(texts(&tree, &prefixed), vec!["a"]);
        assert_eq!(tree.name(prefixed[0]).as_deref(), Some("w:p"));
        assert_eq!(tree.attribute(prefixed[0], "w:n"), Some("1"));
    }

    #[test]
    fn test_no_match_is_empty() {
        let tree = MarkupTree::parse(PLAY).unwrap();
        assert!(tree.select(tree.root(), "//epilogue").unwrap().is_empty());
    }

    #[test]
    fn test_text_node_context_fails() {
        let tree = MarkupTree::parse(PLAY).unwrap();
        let text = tree.select(tree.root(), "//title/text()").unwrap()[0];
        assert!(matches!(
            tree.select(text, "l"),
            Err(MarkupError::NonElementContext(_))
        ));
        assert!(matches!(
            tree.select(text, "/play"),
            Err(MarkupError::NonElementContext(_))
        ));
    }

    #[test]
    fn test_invalid_expressions_fail() {
        let tree = MarkupTree::parse(PLAY).unwrap();
        for expr in ["//l[", "/play[@", "", "//l[unknown-fn()]", "count(//l)", "//x:l"] {
            assert!(
                matches!(tree.select(tree.root(), expr), Err(MarkupError::InvalidPath { .. })),
                "{expr} should be rejected"
            );
        }
    }

    #[test]
    fn test_prefix_check_ignores_literals_and_axes() {
        let tree = MarkupTree::parse(PLAY).unwrap();
        assert!(tree.select(tree.root(), "//l[. = 'x:y']").unwrap().is_empty());
        assert_eq!(tree.select(tree.root(), "/child::play/descendant::l").unwrap().len(), 4);
        assert_eq!(
            tree.select(tree.root(), "//scene[@n = 2.0]/attribute::type").unwrap().len(),
            1
        );
        assert!(matches!(
            tree.select(tree.root(), "/play/tei:act"),
            Err(MarkupError::InvalidPath { reason, .. }) if reason.contains("'tei'")
        ));
    }

    proptest! {
        /// Property: selections come back in document order without duplicates
        #[test]
        fn test_selection_is_in_document_order(expr in prop::sample::select(vec![
            "//l | //sp",
            "//sp/@who | //scene",
            "//l/ancestor::*",
            "//text()",
            "(//l)[last()]/preceding::*",
            "//*",
        ])) {
            let tree = MarkupTree::parse(PLAY).unwrap();
            let selected = tree.select(tree.root(), expr).unwrap();

            let order: Vec<String> = selected.iter().map(|n| tree.locate(*n)).collect();
            let mut seen = std::collections::HashSet::new();
            prop_assert!(selected.iter().all(|n| seen.insert(*n)));

            let all = tree.descendants_or_self(tree.root());
            let positions: Vec<usize> = selected
                .iter()
                .map(|n| match n {
                    Node::Attribute(_) => n.parent().and_then(|p| all.iter().position(|a| *a == p)).unwrap_or(0),
                    _ => all.iter().position(|a| a == n).unwrap_or(0),
                })
                .collect();
            prop_assert!(positions.windows(2).all(|w| w[0] <= w[1]), "{:?}", order);
        }
    }
}
