//! Forward-only schema element cursor
//!
//! The reader flattens a parsed document into its elements in document
//! order, each tagged with its depth (root = 0), and walks them with
//! [`SchemaReader::move_to_next_schema_element`]. A call yields the next
//! framework element of an accepted kind at exactly the requested depth;
//! deeper elements and other kinds are skipped, and the first element
//! shallower than the requested depth ends the level without being
//! consumed, so the enclosing loop sees it next.

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::names::split_qname;
use crate::namespaces::QName;
use crate::schema::{attrs, elements, parse_int, parse_non_negative, NodeKind, NodeKinds};
use crate::{PSF_NAMESPACE, PSK_NAMESPACE};

/// Parse XML text with roxmltree, mapping failures to [`Error::MalformedXml`]
pub fn parse_xml(text: &str) -> Result<roxmltree::Document<'_>> {
    roxmltree::Document::parse(text).map_err(|e| Error::MalformedXml(e.to_string()))
}

/// Decode bytes as UTF-8 document text
pub fn decode_utf8(xml: &[u8]) -> Result<&str> {
    std::str::from_utf8(xml).map_err(|e| Error::MalformedXml(format!("Invalid UTF-8: {}", e)))
}

/// Resolve a QName-valued string in the scope of `node`
///
/// An undeclared prefix yields `None`; an unprefixed value takes the
/// in-scope default namespace.
pub fn resolve_qname(node: roxmltree::Node<'_, '_>, value: &str) -> Option<QName> {
    match split_qname(value.trim()) {
        (Some(prefix), local) => node
            .lookup_namespace_uri(Some(prefix))
            .map(|ns| QName::namespaced(ns, local)),
        (None, local) => Some(QName::new(
            node.lookup_namespace_uri(None).filter(|ns| !ns.is_empty()),
            local,
        )),
    }
}

fn framework_child<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    local_name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    node.children().find(|c| {
        c.is_element()
            && c.tag_name().namespace() == Some(PSF_NAMESPACE)
            && c.tag_name().name() == local_name
    })
}

/// Classify an element; `None` for anything outside the framework vocabulary
pub fn classify(node: roxmltree::Node<'_, '_>) -> Option<NodeKind> {
    if node.tag_name().namespace() != Some(PSF_NAMESPACE) {
        return None;
    }
    NodeKind::from_local_name(node.tag_name().name())
}

/// One visited schema element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaNode {
    /// Element kind
    pub kind: NodeKind,
    /// Resolved `name` attribute
    pub name: Option<QName>,
    /// Text of the `Value` child (or own text for a `Value` element)
    pub text_value: Option<String>,
    /// `text_value` resolved as a QName in the scope of the value element
    pub value_qname: Option<QName>,
    /// Resolved `name` of a `ParameterRef` child
    pub parameter_ref: Option<QName>,
    /// Resolved `constrained` attribute
    pub constrained: Option<QName>,
    /// Element depth, root = 0
    pub depth: usize,
}

impl SchemaNode {
    fn from_node(node: roxmltree::Node<'_, '_>, kind: NodeKind, depth: usize) -> Self {
        let name = node
            .attribute(attrs::NAME)
            .and_then(|v| resolve_qname(node, v));
        let constrained = node
            .attribute(attrs::CONSTRAINED)
            .and_then(|v| resolve_qname(node, v));

        let value_node = if kind == NodeKind::Value {
            Some(node)
        } else {
            framework_child(node, elements::VALUE)
        };
        let text_value = value_node
            .and_then(|v| v.text())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let value_qname = match (value_node, text_value.as_deref()) {
            (Some(v), Some(text)) => resolve_qname(v, text),
            _ => None,
        };

        let parameter_ref = framework_child(node, elements::PARAMETER_REF).and_then(|r| {
            r.attribute(attrs::NAME)
                .and_then(|v| resolve_qname(r, v))
        });

        Self {
            kind,
            name,
            text_value,
            value_qname,
            parameter_ref,
            constrained,
            depth,
        }
    }

    /// Name when it is a keyword (keyword namespace)
    pub fn keyword(&self) -> Option<&str> {
        self.name.as_ref().and_then(|n| n.local_in(PSK_NAMESPACE))
    }

    /// Name when it is a framework name (framework namespace)
    pub fn framework_name(&self) -> Option<&str> {
        self.name.as_ref().and_then(|n| n.local_in(PSF_NAMESPACE))
    }

    /// Keyword carried by the value, e.g. `psk:High`
    pub fn value_keyword(&self) -> Option<&str> {
        self.value_qname
            .as_ref()
            .and_then(|n| n.local_in(PSK_NAMESPACE))
    }

    /// Value decoded as an integer
    pub fn int_value(&self) -> Option<i32> {
        self.text_value.as_deref().and_then(parse_int)
    }

    /// Value decoded as a non-negative integer
    pub fn non_negative_value(&self) -> Option<i32> {
        self.text_value.as_deref().and_then(parse_non_negative)
    }

    /// Keyword of the referenced parameter
    pub fn parameter_ref_keyword(&self) -> Option<&str> {
        self.parameter_ref
            .as_ref()
            .and_then(|n| n.local_in(PSK_NAMESPACE))
    }
}

/// Forward-only cursor over the elements of one document
#[derive(Debug)]
pub struct SchemaReader<'a, 'input> {
    entries: Vec<(roxmltree::Node<'a, 'input>, usize)>,
    position: usize,
}

impl<'a, 'input> SchemaReader<'a, 'input> {
    /// Create a cursor positioned on the root element
    pub fn new(document: &'a roxmltree::Document<'input>, limits: &Limits) -> Result<Self> {
        let mut entries = Vec::new();
        Self::collect(document.root_element(), 0, limits, &mut entries)?;
        Ok(Self {
            entries,
            // the root itself is not yielded by element walks
            position: 1,
        })
    }

    fn collect(
        node: roxmltree::Node<'a, 'input>,
        depth: usize,
        limits: &Limits,
        entries: &mut Vec<(roxmltree::Node<'a, 'input>, usize)>,
    ) -> Result<()> {
        limits.check_xml_depth(depth + 1)?;
        entries.push((node, depth));
        for child in node.children().filter(|c| c.is_element()) {
            Self::collect(child, depth + 1, limits, entries)?;
        }
        Ok(())
    }

    /// Root element of the document
    pub fn root(&self) -> roxmltree::Node<'a, 'input> {
        self.entries[0].0
    }

    /// Rewind to the first element below the root
    pub fn reset(&mut self) {
        self.position = 1;
    }

    /// Depth of the element the next call would look at
    pub fn peek_depth(&self) -> Option<usize> {
        self.entries.get(self.position).map(|(_, d)| *d)
    }

    /// Advance to the next accepted element at exactly `depth`
    ///
    /// Returns `None` once the next element is shallower than `depth` (it is
    /// left for the enclosing level) or the document is exhausted.
    pub fn move_to_next_schema_element(
        &mut self,
        depth: usize,
        accepted: NodeKinds,
    ) -> Option<SchemaNode> {
        while let Some(&(node, node_depth)) = self.entries.get(self.position) {
            if node_depth < depth {
                return None;
            }
            self.position += 1;
            if node_depth > depth {
                continue;
            }
            if let Some(kind) = classify(node) {
                if accepted.contains(kind.mask()) {
                    return Some(SchemaNode::from_node(node, kind, depth));
                }
            }
        }
        None
    }
}
