//! Mutable XML document tree
//!
//! This module provides the owned element tree the ticket editor works on.
//! Documents are parsed with quick-xml, element names are resolved against
//! their in-scope namespace declarations at parse time, and the tree is
//! serialized back with quick-xml's writer. Namespace declarations stay on
//! the element that carries them so a save reproduces them in place.

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::names::split_qname;
use crate::namespaces::{NamespaceContext, QName};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

/// Non-namespace attribute, kept with its raw (possibly prefixed) name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Raw attribute name as written, e.g. `name` or `xsi:type`
    pub name: String,
    /// Unescaped attribute value
    pub value: String,
}

/// Child node of an element
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Nested element
    Element(Element),
    /// Character data
    Text(String),
    /// Comment
    Comment(String),
}

/// XML Element in the document tree
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Resolved element name
    pub qname: QName,
    /// Prefix the element name is written with
    pub prefix: Option<String>,
    /// Element attributes, in document order
    pub attributes: Vec<Attribute>,
    /// Namespace declarations made on this element
    pub namespaces: NamespaceContext,
    /// Child nodes
    pub children: Vec<Node>,
}

impl Element {
    /// Create a new element
    pub fn new(prefix: Option<&str>, qname: QName) -> Self {
        Self {
            qname,
            prefix: prefix.map(str::to_string),
            attributes: Vec::new(),
            namespaces: NamespaceContext::new(),
            children: Vec::new(),
        }
    }

    /// Create `{uri}local_name` using the prefix `scope` binds to `uri`
    pub fn in_scope(scope: &NamespaceContext, uri: &str, local_name: &str) -> Result<Self> {
        let qualified = scope.qualified_name(uri, local_name)?;
        let prefix = split_qname(&qualified).0;
        Ok(Self::new(prefix, QName::namespaced(uri, local_name)))
    }

    /// Get the local name of the element
    pub fn local_name(&self) -> &str {
        &self.qname.local_name
    }

    /// Get the namespace of the element
    pub fn namespace(&self) -> Option<&str> {
        self.qname.namespace.as_deref()
    }

    /// Whether the element is `{namespace}local_name`
    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.qname.is(namespace, local_name)
    }

    /// Name as written in the document, e.g. `psf:Feature`
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.qname.local_name),
            None => self.qname.local_name.clone(),
        }
    }

    /// In-scope namespaces of this element given the scope of its parent
    pub fn scope(&self, inherited: &NamespaceContext) -> NamespaceContext {
        inherited.extended(&self.namespaces)
    }

    /// Get an attribute value by its raw name
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set (or replace) an attribute value
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = value,
            None => self.attributes.push(Attribute { name, value }),
        }
    }

    /// Remove an attribute, returning its value
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|a| a.name == name)?;
        Some(self.attributes.remove(index).value)
    }

    /// Concatenated direct text content, `None` when there is none
    pub fn text(&self) -> Option<String> {
        let mut text = String::new();
        for child in &self.children {
            if let Node::Text(t) = child {
                text.push_str(t);
            }
        }
        (!text.is_empty()).then_some(text)
    }

    /// Replace the direct text content, keeping child elements
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children.retain(|c| !matches!(c, Node::Text(_)));
        self.children.push(Node::Text(text.into()));
    }

    /// Child elements
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|c| match c {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Child elements, mutably
    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|c| match c {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Append a child element and return it
    pub fn append_child(&mut self, child: Element) -> &mut Element {
        self.children.push(Node::Element(child));
        match self.children.last_mut() {
            Some(Node::Element(e)) => e,
            _ => unreachable!("element was just pushed"),
        }
    }

    /// Child node at `index` as an element
    pub fn child_element(&self, index: usize) -> Option<&Element> {
        match self.children.get(index) {
            Some(Node::Element(e)) => Some(e),
            _ => None,
        }
    }

    /// Child node at `index` as a mutable element
    pub fn child_element_mut(&mut self, index: usize) -> Option<&mut Element> {
        match self.children.get_mut(index) {
            Some(Node::Element(e)) => Some(e),
            _ => None,
        }
    }
}

/// XML Document representation
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Root element of the document
    pub root: Element,
}

impl Document {
    /// Create a document from its root element
    pub fn new(root: Element) -> Self {
        Self { root }
    }

    /// Parse an XML document from a string
    pub fn from_string(xml: &str) -> Result<Self> {
        Self::parse(xml.as_bytes())
    }

    /// Parse an XML document from bytes with default limits
    pub fn parse(xml: &[u8]) -> Result<Self> {
        Self::parse_with_limits(xml, &Limits::default())
    }

    /// Parse an XML document from bytes
    pub fn parse_with_limits(xml: &[u8], limits: &Limits) -> Result<Self> {
        limits.check_xml_size(xml.len())?;
        let text = std::str::from_utf8(xml)
            .map_err(|e| Error::MalformedXml(format!("Invalid UTF-8: {}", e)))?;

        let mut reader = Reader::from_str(text);
        reader.trim_text(true);

        // each open element travels with its full in-scope namespace context
        let mut stack: Vec<(Element, NamespaceContext)> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    let parent_scope = stack.last().map(|(_, s)| s.clone()).unwrap_or_default();
                    let (element, scope) = Self::parse_element(&e, &parent_scope, limits)?;
                    stack.push((element, scope));
                    limits.check_xml_depth(stack.len())?;
                }
                Ok(Event::Empty(e)) => {
                    let parent_scope = stack.last().map(|(_, s)| s.clone()).unwrap_or_default();
                    let (element, _) = Self::parse_element(&e, &parent_scope, limits)?;
                    limits.check_xml_depth(stack.len() + 1)?;
                    Self::attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::End(_)) => {
                    if let Some((element, _)) = stack.pop() {
                        Self::attach(&mut stack, &mut root, element)?;
                    }
                }
                Ok(Event::Text(e)) => {
                    let text = e
                        .unescape()
                        .map_err(|e| Error::MalformedXml(format!("Failed to unescape text: {}", e)))?;
                    match stack.last_mut() {
                        Some((current, _)) => {
                            if !text.is_empty() {
                                current.children.push(Node::Text(text.into_owned()));
                            }
                        }
                        None if !text.trim().is_empty() => {
                            return Err(Error::MalformedXml(
                                "Text content outside of the root element".to_string(),
                            ));
                        }
                        None => {}
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some((current, _)) = stack.last_mut() {
                        let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                        current.children.push(Node::Text(text));
                    }
                }
                Ok(Event::Comment(e)) => {
                    if let Some((current, _)) = stack.last_mut() {
                        current
                            .children
                            .push(Node::Comment(String::from_utf8_lossy(&e).into_owned()));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::MalformedXml(format!(
                        "Error parsing XML at position {}: {}",
                        reader.buffer_position(),
                        e
                    )))
                }
                _ => {} // declarations, processing instructions, doctype
            }
        }

        if let Some((open, _)) = stack.last() {
            return Err(Error::MalformedXml(format!(
                "Unexpected end of document: element <{}> is not closed",
                open.qualified_name()
            )));
        }

        root.map(Document::new)
            .ok_or_else(|| Error::MalformedXml("Document has no root element".to_string()))
    }

    fn attach(
        stack: &mut [(Element, NamespaceContext)],
        root: &mut Option<Element>,
        element: Element,
    ) -> Result<()> {
        if let Some((parent, _)) = stack.last_mut() {
            parent.children.push(Node::Element(element));
        } else if root.is_some() {
            return Err(Error::MalformedXml(
                "Document has more than one root element".to_string(),
            ));
        } else {
            *root = Some(element);
        }
        Ok(())
    }

    /// Parse element from a start tag, returning it with its in-scope namespaces
    fn parse_element(
        start: &BytesStart,
        parent_scope: &NamespaceContext,
        limits: &Limits,
    ) -> Result<(Element, NamespaceContext)> {
        let raw_name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| Error::MalformedXml(format!("Invalid element name: {}", e)))?
            .to_string();

        let mut namespaces = NamespaceContext::new();
        let mut attributes = Vec::new();

        for attr_result in start.attributes() {
            let attr = attr_result
                .map_err(|e| Error::MalformedXml(format!("Failed to parse attribute: {}", e)))?;

            let attr_name = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| Error::MalformedXml(format!("Invalid attribute name: {}", e)))?
                .to_string();

            let attr_value = attr
                .unescape_value()
                .map_err(|e| {
                    Error::MalformedXml(format!("Failed to unescape attribute value: {}", e))
                })?
                .into_owned();

            if attr_name == "xmlns" {
                namespaces.set_default_namespace(attr_value);
            } else if let Some(prefix) = attr_name.strip_prefix("xmlns:") {
                namespaces.add_prefix(prefix, attr_value);
            } else {
                attributes.push(Attribute {
                    name: attr_name,
                    value: attr_value,
                });
            }
        }
        limits.check_attributes(attributes.len())?;

        let scope = parent_scope.extended(&namespaces);
        let (prefix, local) = split_qname(&raw_name);
        let namespace = match prefix {
            Some(p) => Some(scope.get_namespace(p).ok_or_else(|| {
                Error::MalformedXml(format!(
                    "Undeclared namespace prefix '{}' on element <{}>",
                    p, raw_name
                ))
            })?),
            None => scope.get_default_namespace(),
        }
        .filter(|ns| !ns.is_empty());

        let mut element = Element::new(prefix, QName::new(namespace, local));
        element.attributes = attributes;
        element.namespaces = namespaces;

        Ok((element, scope))
    }

    /// Namespace declarations in scope at the root element
    pub fn root_scope(&self) -> NamespaceContext {
        self.root.namespaces.clone()
    }

    /// Serialize the document with an XML declaration and indentation
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(serialize_error)?;
        Self::write_element(&mut writer, &self.root)?;
        Ok(writer.into_inner())
    }

    /// Serialize the document to a string
    pub fn to_xml_string(&self) -> Result<String> {
        let bytes = self.to_bytes()?;
        String::from_utf8(bytes)
            .map_err(|e| Error::Resource(format!("Serialized XML is not UTF-8: {}", e)))
    }

    fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<()> {
        let name = element.qualified_name();
        let mut start = BytesStart::new(name.as_str());

        if let Some(default) = element.namespaces.get_default_namespace() {
            start.push_attribute(("xmlns", default));
        }
        for (prefix, uri) in element.namespaces.iter() {
            let key = format!("xmlns:{}", prefix);
            start.push_attribute((key.as_str(), uri.as_str()));
        }
        for attr in &element.attributes {
            start.push_attribute((attr.name.as_str(), attr.value.as_str()));
        }

        if element.children.is_empty() {
            return writer.write_event(Event::Empty(start)).map_err(serialize_error);
        }

        writer.write_event(Event::Start(start)).map_err(serialize_error)?;
        for child in &element.children {
            match child {
                Node::Element(e) => Self::write_element(writer, e)?,
                Node::Text(t) => writer
                    .write_event(Event::Text(BytesText::new(t)))
                    .map_err(serialize_error)?,
                Node::Comment(c) => writer
                    .write_event(Event::Comment(BytesText::from_escaped(c.as_str())))
                    .map_err(serialize_error)?,
            }
        }
        writer
            .write_event(Event::End(BytesEnd::new(name.as_str())))
            .map_err(serialize_error)
    }
}

fn serialize_error(e: quick_xml::Error) -> Error {
    Error::Resource(format!("Failed to serialize XML: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_xml() {
        let xml = r#"<root><child>text</child></root>"#;
        let doc = Document::from_string(xml).unwrap();

        assert_eq!(doc.root.local_name(), "root");
        let children: Vec<_> = doc.root.elements().collect();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].local_name(), "child");
        assert_eq!(children[0].text().as_deref(), Some("text"));
    }

    #[test]
    fn test_parse_resolves_namespaces() {
        let xml = r#"<p:root xmlns:p="urn:p" xmlns="urn:d"><child/><p:other xmlns:p="urn:q"/></p:root>"#;
        let doc = Document::from_string(xml).unwrap();

        assert!(doc.root.is("urn:p", "root"));
        let children: Vec<_> = doc.root.elements().collect();
        assert!(children[0].is("urn:d", "child"));
        assert!(children[1].is("urn:q", "other"));
    }

    #[test]
    fn test_parse_with_attributes() {
        let xml = r#"<root attr1="value1" attr2="a &amp; b"><child/></root>"#;
        let doc = Document::from_string(xml).unwrap();

        assert_eq!(doc.root.get_attribute("attr1"), Some("value1"));
        assert_eq!(doc.root.get_attribute("attr2"), Some("a & b"));
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(
            Document::from_string("<root><child></root>"),
            Err(Error::MalformedXml(_))
        ));
        assert!(matches!(
            Document::from_string("<root><child/>"),
            Err(Error::MalformedXml(_))
        ));
        assert!(matches!(
            Document::from_string("<x:root/>"),
            Err(Error::MalformedXml(_))
        ));
        assert!(matches!(Document::parse(&[0x3c, 0xff, 0xfe]), Err(Error::MalformedXml(_))));
        assert!(matches!(Document::from_string(""), Err(Error::MalformedXml(_))));
    }

    #[test]
    fn test_depth_limit() {
        let limits = Limits {
            max_xml_depth: 2,
            ..Limits::default()
        };
        let result = Document::parse_with_limits(b"<a><b><c/></b></a>", &limits);
        assert!(matches!(result, Err(Error::LimitExceeded(_))));
    }

    #[test]
    fn test_serialize_roundtrip() {
        let xml = r#"<p:root xmlns:p="urn:p" version="1"><p:v a="&lt;x&gt;">42</p:v><!--note--></p:root>"#;
        let doc = Document::from_string(xml).unwrap();

        let saved = doc.to_xml_string().unwrap();
        assert!(saved.starts_with("<?xml"));
        assert!(saved.contains(r#"xmlns:p="urn:p""#));

        let reparsed = Document::from_string(&saved).unwrap();
        assert_eq!(reparsed, doc);
    }

    #[test]
    fn test_element_in_scope() {
        let mut scope = NamespaceContext::new();
        scope.add_prefix("psf", "urn:psf");

        let element = Element::in_scope(&scope, "urn:psf", "Feature").unwrap();
        assert_eq!(element.qualified_name(), "psf:Feature");
        assert!(Element::in_scope(&scope, "urn:none", "Feature").is_err());
    }
}
