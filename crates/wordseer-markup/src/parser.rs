//! Build a [`MarkupTree`] from quick-xml events

use crate::error::MarkupError;
use crate::tree::MarkupTree;
use quick_xml::escape::unescape_with;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{PrefixDeclaration, ResolveResult};
use quick_xml::NsReader;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use sxd_document::dom::{Document, Element};
use sxd_document::{Package, QName};
use tracing::trace;

/// Namespace of the reserved `xml` prefix
pub(crate) const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Parse a complete XML document
pub(crate) fn parse_markup(xml: &str) -> Result<MarkupTree, MarkupError> {
    let package = Package::new();
    let namespaces = build_document(package.as_document(), xml)?;
    Ok(MarkupTree::new(package, namespaces))
}

/// Fill `document` from `xml`, returning the prefixes the source declares
fn build_document(
    document: Document<'_>,
    xml: &str,
) -> Result<BTreeMap<String, String>, MarkupError> {
    let mut reader = NsReader::from_str(xml);
    reader.trim_text(false);
    reader.check_end_names(true);

    let mut builder = Builder::new(document);

    loop {
        let position = reader.buffer_position();
        let (resolved, event) = reader
            .read_resolved_event()
            .map_err(|e| syntax(position, e))?;
        let namespace = namespace_uri(resolved).map_err(|e| syntax(position, e))?;

        match event {
            Event::Start(ref e) => {
                let element = builder.open_element(&reader, e, namespace, position)?;
                builder.open.push(element);
            }
            Event::Empty(ref e) => {
                builder.open_element(&reader, e, namespace, position)?;
            }
            Event::End(ref e) => {
                builder.flush_text();
                if builder.open.pop().is_none() {
                    return Err(syntax(
                        position,
                        format!(
                            "unexpected closing tag </{}>",
                            String::from_utf8_lossy(e.name().as_ref())
                        ),
                    ));
                }
            }
            Event::Text(e) => {
                let text = e
                    .unescape_with(|entity| builder.entities.get(entity).map(String::as_str))
                    .map_err(|e| syntax(position, e))?;
                builder.push_text(&text, position)?;
            }
            Event::CData(e) => {
                let text = String::from_utf8(e.into_inner().into_owned())
                    .map_err(|e| syntax(position, e))?;
                if builder.open.is_empty() {
                    return Err(syntax(position, "CDATA outside the document element"));
                }
                builder.pending.push_str(&text);
            }
            Event::Comment(e) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                builder.flush_text();
                let comment = builder.document.create_comment(&text);
                match builder.open.last() {
                    Some(parent) => parent.append_child(comment),
                    None => builder.document.root().append_child(comment),
                }
            }
            Event::PI(e) => {
                let content = String::from_utf8_lossy(&e).into_owned();
                let (target, value) = match content.split_once(char::is_whitespace) {
                    Some((target, value)) => (target, Some(value.trim_start())),
                    None => (content.as_str(), None),
                };
                builder.flush_text();
                let instruction = builder.document.create_processing_instruction(target, value);
                match builder.open.last() {
                    Some(parent) => parent.append_child(instruction),
                    None => builder.document.root().append_child(instruction),
                }
            }
            Event::DocType(e) => {
                let declaration = String::from_utf8_lossy(&e).into_owned();
                builder
                    .declare_entities(&declaration)
                    .map_err(|e| syntax(position, e))?;
            }
            Event::Decl(_) => {}
            Event::Eof => break,
        }
    }

    if let Some(open) = builder.open.last() {
        return Err(MarkupError::Parse(format!(
            "unexpected end of input: <{}> is not closed",
            open.name().local_part()
        )));
    }
    if !builder.seen_document_element {
        return Err(MarkupError::Parse("document is empty".to_string()));
    }

    trace!(
        "Parsed markup ({} namespace prefixes, {} declared entities)",
        builder.namespaces.len(),
        builder.entities.len()
    );
    Ok(builder.namespaces)
}

/// Tree-building state for one parse
struct Builder<'d> {
    document: Document<'d>,
    open: Vec<Element<'d>>,
    /// Character data not yet attached; adjacent text and CDATA merge here
    pending: String,
    entities: HashMap<String, String>,
    namespaces: BTreeMap<String, String>,
    seen_document_element: bool,
}

impl<'d> Builder<'d> {
    fn new(document: Document<'d>) -> Self {
        Self {
            document,
            open: Vec::new(),
            pending: String::new(),
            entities: HashMap::new(),
            namespaces: BTreeMap::new(),
            seen_document_element: false,
        }
    }

    /// Create an element with its attributes and namespace declarations
    fn open_element(
        &mut self,
        reader: &NsReader<&[u8]>,
        start: &BytesStart<'_>,
        namespace: Option<String>,
        position: usize,
    ) -> Result<Element<'d>, MarkupError> {
        self.flush_text();
        if self.open.is_empty() {
            if self.seen_document_element {
                return Err(syntax(position, "extra content after the document element"));
            }
            self.seen_document_element = true;
        }

        let qualified = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let local = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let element = self
            .document
            .create_element(QName::with_namespace_uri(namespace.as_deref(), &local));
        if let Some(prefix) = start.name().prefix() {
            element.set_preferred_prefix(Some(&String::from_utf8_lossy(prefix.as_ref())));
        }
        if self.open.is_empty() {
            element.register_prefix("xml", XML_NAMESPACE);
        }

        for attr in start.attributes() {
            let attr = attr.map_err(|e| syntax(position, format!("in <{}>: {}", qualified, e)))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value_with(|entity| self.entities.get(entity).map(String::as_str))
                .map_err(|e| {
                    syntax(position, format!("in <{}> attribute {}: {}", qualified, key, e))
                })?;

            match attr.key.as_namespace_binding() {
                Some(PrefixDeclaration::Default) => {
                    let uri: &str = &value;
                    element.set_default_namespace_uri(Some(uri).filter(|uri| !uri.is_empty()));
                }
                Some(PrefixDeclaration::Named(prefix)) => {
                    if value.is_empty() {
                        continue;
                    }
                    let prefix = String::from_utf8_lossy(prefix).into_owned();
                    element.register_prefix(&prefix, &value);
                    self.namespaces.entry(prefix).or_insert_with(|| value.into_owned());
                }
                None => {
                    let (resolved, local) = reader.resolve_attribute(attr.key);
                    let namespace = namespace_uri(resolved).map_err(|e| syntax(position, e))?;
                    let local = String::from_utf8_lossy(local.as_ref()).into_owned();
                    let attribute = element.set_attribute_value(
                        QName::with_namespace_uri(namespace.as_deref(), &local),
                        &value,
                    );
                    if let Some(prefix) = attr.key.prefix() {
                        attribute.set_preferred_prefix(Some(&String::from_utf8_lossy(prefix.as_ref())));
                    }
                }
            }
        }

        match self.open.last() {
            Some(parent) => parent.append_child(element),
            None => self.document.root().append_child(element),
        }
        Ok(element)
    }

    /// Buffer character data for the open element
    fn push_text(&mut self, text: &str, position: usize) -> Result<(), MarkupError> {
        if self.open.is_empty() {
            if !text.trim().is_empty() {
                return Err(syntax(position, "text outside the document element"));
            }
            return Ok(());
        }
        self.pending.push_str(text);
        Ok(())
    }

    /// Attach buffered character data as a single text node
    fn flush_text(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        if let Some(parent) = self.open.last() {
            parent.append_child(self.document.create_text(&self.pending));
        }
        self.pending.clear();
    }

    /// Record the general entities of a DOCTYPE internal subset
    ///
    /// Only internal entities (`<!ENTITY name "value">`) are bound. Parameter
    /// entities and `SYSTEM`/`PUBLIC` entities are skipped, so references to
    /// them still fail. A redeclared entity keeps its first value.
    fn declare_entities(&mut self, doctype: &str) -> Result<(), String> {
        let Some(start) = doctype.find('[') else {
            return Ok(());
        };
        let mut rest = &doctype[start + 1..];

        while let Some(at) = rest.find("<!ENTITY") {
            rest = rest[at + "<!ENTITY".len()..].trim_start();
            if rest.starts_with('%') {
                continue;
            }

            let name_end = rest.find(char::is_whitespace).unwrap_or(rest.len());
            let name = &rest[..name_end];
            rest = rest[name_end..].trim_start();

            let Some(quote) = rest.chars().next().filter(|c| *c == '"' || *c == '\'') else {
                continue;
            };
            let Some(close) = rest[1..].find(quote) else {
                return Err(format!("unterminated value for entity '{}'", name));
            };
            let raw = &rest[1..1 + close];
            rest = &rest[close + 2..];

            let value = unescape_with(raw, |entity| self.entities.get(entity).map(String::as_str))
                .map_err(|e| format!("in entity '{}': {}", name, e))?
                .into_owned();
            self.entities.entry(name.to_string()).or_insert(value);
        }
        Ok(())
    }
}

/// Namespace URI of a resolved name; `xml` is always bound
fn namespace_uri(resolved: ResolveResult<'_>) -> Result<Option<String>, String> {
    match resolved {
        ResolveResult::Bound(namespace) => {
            Ok(Some(String::from_utf8_lossy(namespace.into_inner()).into_owned()))
        }
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) if prefix == b"xml" => Ok(Some(XML_NAMESPACE.to_string())),
        ResolveResult::Unknown(prefix) => Err(format!(
            "unbound namespace prefix '{}'",
            String::from_utf8_lossy(&prefix)
        )),
    }
}

fn syntax(position: usize, e: impl Display) -> MarkupError {
    MarkupError::Parse(format!("at byte {}: {}", position, e))
}
