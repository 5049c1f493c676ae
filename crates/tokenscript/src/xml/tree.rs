//! Namespace-resolved element tree built with quick-xml.
//!
//! The parser in [`crate::parse`] walks this tree with mutually recursive
//! visit functions, dispatching on each element's local name.

use std::fmt::Display;

use quick_xml::escape::{escape, partial_escape, resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use rustc_hash::FxHashMap;

use crate::error::ParseError;
use crate::limits::MAX_ATTRIBUTES_PER_ELEMENT;

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// A parsed document: the root element and everything below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub root: Element,
}

impl Document {
    /// Iterates over every element in document order, root first.
    pub fn elements(&self) -> Descendants<'_> {
        Descendants { stack: vec![&self.root] }
    }
}

/// A child of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    /// Serializes this node the same way as [`Element::inner_markup`].
    pub fn markup(&self) -> String {
        let mut out = String::new();
        write_markup(std::slice::from_ref(self), &mut out);
        out
    }
}

/// An attribute, split into prefix and local name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub prefix: Option<String>,
    pub local: String,
    pub value: String,
}

impl Attribute {
    /// Returns true for `xmlns` and `xmlns:*` declarations.
    pub fn is_namespace_declaration(&self) -> bool {
        match &self.prefix {
            Some(prefix) => prefix == "xmlns",
            None => self.local == "xmlns",
        }
    }
}

/// An element with its resolved namespace URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub prefix: Option<String>,
    pub local: String,
    /// Namespace URI bound to the element's prefix, if any.
    pub namespace: Option<String>,
    /// All attributes in document order, namespace declarations included.
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Element {
    /// Looks up a non-declaration attribute by local name.
    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| !a.is_namespace_declaration() && a.local == local)
            .map(|a| a.value.as_str())
    }

    /// Looks up an attribute, treating an empty value as absent.
    pub fn non_empty_attr(&self, local: &str) -> Option<&str> {
        self.attr(local).filter(|v| !v.is_empty())
    }

    /// Returns the `lang` attribute (usually `xml:lang`), or "" if absent.
    pub fn lang(&self) -> &str {
        self.attr("lang").unwrap_or("")
    }

    /// Returns true for elements of the XML digital signature vocabulary.
    pub fn is_signature(&self) -> bool {
        self.prefix
            .as_deref()
            .is_some_and(|p| p.eq_ignore_ascii_case("ds"))
            || self.namespace.as_deref() == Some(crate::XMLDSIG_NAMESPACE)
    }

    /// Iterates over child elements, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Iterates over child elements with the given local name.
    pub fn elements_named(&self, local: &str) -> impl Iterator<Item = &Element> {
        self.elements().filter(move |e| e.local == local)
    }

    /// Returns the first child element, whatever its name.
    pub fn first_element(&self) -> Option<&Element> {
        self.elements().next()
    }

    /// Concatenated text of this element and all its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// Serializes the children back to markup, as used for views and styles.
    ///
    /// Namespace prefixes and declarations are dropped and `iframe` elements
    /// are removed.
    pub fn inner_markup(&self) -> String {
        let mut out = String::new();
        write_markup(&self.children, &mut out);
        out
    }
}

/// Pre-order iterator over elements.
#[derive(Debug, Clone)]
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        let start = self.stack.len();
        self.stack.extend(element.elements());
        self.stack[start..].reverse();
        Some(element)
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Element(e) => collect_text(&e.children, out),
            Node::Text(t) => out.push_str(t),
        }
    }
}

fn write_markup(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Element(e) => {
                if e.local == "iframe" {
                    continue;
                }
                out.push('<');
                out.push_str(&e.local);
                for attr in e.attributes.iter().filter(|a| !a.is_namespace_declaration()) {
                    out.push(' ');
                    out.push_str(&attr.local);
                    out.push_str("=\"");
                    out.push_str(&escape(&attr.value));
                    out.push('"');
                }
                out.push('>');
                write_markup(&e.children, out);
                out.push_str("</");
                out.push_str(&e.local);
                out.push('>');
            }
            Node::Text(t) => out.push_str(&partial_escape(t).replace('\u{2019}', "&#x2019;")),
        }
    }
}

// =============================================================================
// BUILDING
// =============================================================================

/// Parses XML text into a [`Document`].
///
/// Comments and processing instructions are dropped; CDATA is merged into
/// the surrounding text. General entities declared in the DOCTYPE internal
/// subset are expanded in text and attribute values.
pub fn parse_document(xml: &str, max_depth: usize) -> Result<Document, ParseError> {
    let mut reader = Reader::from_str(xml);
    let mut entities = Entities::default();
    let mut stack: Vec<(Element, usize)> = Vec::new();
    let mut scopes: Vec<(String, String)> = vec![("xml".to_string(), XML_NAMESPACE.to_string())];
    let mut root: Option<Element> = None;

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader.read_event().map_err(|e| malformed(position, e))?;
        match event {
            Event::Start(start) => {
                check_depth(stack.len() + 1, max_depth)?;
                let scope_len = scopes.len();
                let element = open_element(&start, &mut scopes, &entities, position)?;
                stack.push((element, scope_len));
            }
            Event::Empty(start) => {
                check_depth(stack.len() + 1, max_depth)?;
                let scope_len = scopes.len();
                let element = open_element(&start, &mut scopes, &entities, position)?;
                scopes.truncate(scope_len);
                attach(&mut stack, &mut root, element, position)?;
            }
            Event::End(_) => {
                let (element, scope_len) = stack
                    .pop()
                    .ok_or_else(|| malformed(position, "unexpected closing tag"))?;
                scopes.truncate(scope_len);
                attach(&mut stack, &mut root, element, position)?;
            }
            Event::Text(text) => {
                if let Some((parent, _)) = stack.last_mut() {
                    let text = text
                        .unescape_with(|name| entities.resolve(name))
                        .map_err(|e| malformed(position, e))?;
                    push_text(parent, &text);
                }
            }
            Event::CData(data) => {
                if let Some((parent, _)) = stack.last_mut() {
                    let text = std::str::from_utf8(&data).map_err(|_| ParseError::InvalidUtf8)?;
                    push_text(parent, text);
                }
            }
            Event::DocType(doctype) => {
                let doctype = std::str::from_utf8(&doctype).map_err(|_| ParseError::InvalidUtf8)?;
                entities.declare_from(doctype);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(malformed(
            reader.buffer_position() as u64,
            "unexpected end of document",
        ));
    }
    root.map(|root| Document { root })
        .ok_or_else(|| malformed(0, "document has no root element"))
}

/// General entities declared in the DOCTYPE internal subset.
#[derive(Debug, Default)]
struct Entities {
    declared: FxHashMap<String, String>,
}

impl Entities {
    /// Collects `<!ENTITY name "value">` declarations. Parameter entities
    /// and external (`SYSTEM`/`PUBLIC`) entities are skipped. The first
    /// declaration of a name is binding.
    fn declare_from(&mut self, doctype: &str) {
        let mut rest = doctype;
        while let Some(start) = rest.find("<!ENTITY") {
            rest = &rest[start + "<!ENTITY".len()..];
            let declaration = rest.trim_start();
            if declaration.starts_with('%') {
                continue;
            }
            let name_end = declaration
                .find(char::is_whitespace)
                .unwrap_or(declaration.len());
            let (name, tail) = declaration.split_at(name_end);
            let tail = tail.trim_start();
            let Some(quote) = tail.chars().next().filter(|c| *c == '"' || *c == '\'') else {
                continue;
            };
            let Some(end) = tail[1..].find(quote) else {
                continue;
            };
            let raw = &tail[1..1 + end];
            let value = unescape(raw).map_or_else(|_| raw.to_string(), |v| v.into_owned());
            self.declared.entry(name.to_string()).or_insert(value);
        }
    }

    fn resolve(&self, name: &str) -> Option<&str> {
        resolve_predefined_entity(name).or_else(|| self.declared.get(name).map(String::as_str))
    }
}

fn check_depth(depth: usize, max_depth: usize) -> Result<(), ParseError> {
    if depth > max_depth {
        return Err(ParseError::LimitExceeded {
            field: "element depth",
            len: depth,
            max: max_depth,
        });
    }
    Ok(())
}

fn malformed(position: u64, err: impl Display) -> ParseError {
    ParseError::Malformed {
        position,
        message: err.to_string(),
    }
}

fn split_qname(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

fn open_element(
    start: &BytesStart<'_>,
    scopes: &mut Vec<(String, String)>,
    entities: &Entities,
    position: u64,
) -> Result<Element, ParseError> {
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| malformed(position, e))?;
        if attributes.len() >= MAX_ATTRIBUTES_PER_ELEMENT {
            return Err(ParseError::LimitExceeded {
                field: "attributes per element",
                len: attributes.len() + 1,
                max: MAX_ATTRIBUTES_PER_ELEMENT,
            });
        }
        let key = std::str::from_utf8(attr.key.as_ref()).map_err(|_| ParseError::InvalidUtf8)?;
        let value = attr
            .unescape_value_with(|name| entities.resolve(name))
            .map_err(|e| malformed(position, e))?
            .into_owned();
        let (prefix, local) = split_qname(key);
        match prefix {
            None if local == "xmlns" => scopes.push((String::new(), value.clone())),
            Some("xmlns") => scopes.push((local.to_string(), value.clone())),
            _ => {}
        }
        attributes.push(Attribute {
            prefix: prefix.map(str::to_string),
            local: local.to_string(),
            value,
        });
    }

    let qname = start.name();
    let name = std::str::from_utf8(qname.as_ref()).map_err(|_| ParseError::InvalidUtf8)?;
    let (prefix, local) = split_qname(name);
    let namespace = scopes
        .iter()
        .rev()
        .find(|(p, _)| p == prefix.unwrap_or(""))
        .map(|(_, uri)| uri.clone())
        .filter(|uri| !uri.is_empty());

    Ok(Element {
        prefix: prefix.map(str::to_string),
        local: local.to_string(),
        namespace,
        attributes,
        children: Vec::new(),
    })
}

fn attach(
    stack: &mut [(Element, usize)],
    root: &mut Option<Element>,
    element: Element,
    position: u64,
) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some((parent, _)) => {
            parent.children.push(Node::Element(element));
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(malformed(position, "multiple root elements")),
    }
}

fn push_text(parent: &mut Element, text: &str) {
    if let Some(Node::Text(last)) = parent.children.last_mut() {
        last.push_str(text);
    } else {
        parent.children.push(Node::Text(text.to_string()));
    }
}
