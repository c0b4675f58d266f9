//! PrintTicket DOM editing
//!
//! Structural checks and subtree operations on the mutable document model.
//! Elements are located by walking the children of one parent forward and
//! matching on the framework element name and, optionally, on the `name`
//! attribute resolved as a QName in the child's own scope.

use tracing::{debug, info};

use crate::documents::{Document, Element, Node};
use crate::error::{Error, FormatError, Result};
use crate::limits::Limits;
use crate::names::validate_qname;
use crate::namespaces::{NamespaceContext, QName};
use crate::schema::{attrs, elements, parse_int, SCHEMA_VERSION};
use crate::{PSF_NAMESPACE, PSK_NAMESPACE, XSD_NAMESPACE, XSI_NAMESPACE};

/// Namespaces every ticket must declare, with their generated prefix headers
pub const STANDARD_NAMESPACES: [(&str, &str); 3] = [
    (PSK_NAMESPACE, "psk"),
    (XSI_NAMESPACE, "xsi"),
    (XSD_NAMESPACE, "xsd"),
];

/// Check the root structure of a PrintTicket document
pub fn check_is_well_formed_print_ticket(document: &Document) -> Result<()> {
    let root = &document.root;
    if !root.is(PSF_NAMESPACE, elements::PRINT_TICKET) {
        return Err(FormatError::new(format!(
            "root element {} is not {{{}}}{}",
            root.qname,
            PSF_NAMESPACE,
            elements::PRINT_TICKET
        ))
        .with_element(root.qualified_name())
        .into());
    }

    let version = root.get_attribute(attrs::VERSION).ok_or_else(|| {
        FormatError::new("missing version attribute")
            .with_element(root.qualified_name())
            .with_attribute(attrs::VERSION)
    })?;
    if parse_int(version) != Some(SCHEMA_VERSION) {
        return Err(FormatError::new(format!(
            "unsupported schema version '{}', expected {}",
            version, SCHEMA_VERSION
        ))
        .with_element(root.qualified_name())
        .with_attribute(attrs::VERSION)
        .into());
    }

    for child in root.elements() {
        if child.namespace() != Some(PSF_NAMESPACE) {
            // private extensions are allowed at the root
            continue;
        }
        match child.local_name() {
            elements::FEATURE | elements::PARAMETER_INIT | elements::PROPERTY => {}
            other => {
                return Err(FormatError::new(format!(
                    "unexpected framework element '{}' under the ticket root",
                    other
                ))
                .with_element(child.qualified_name())
                .into())
            }
        }
        let has_name = child
            .get_attribute(attrs::NAME)
            .is_some_and(|n| !n.trim().is_empty());
        if !has_name {
            return Err(FormatError::new("missing or empty name attribute")
                .with_element(child.qualified_name())
                .with_attribute(attrs::NAME)
                .into());
        }
    }

    Ok(())
}

/// Declare the keyword, xsi and xsd namespaces at the root if missing
///
/// A namespace counts as declared when the root binds it to a prefix.
/// Generated prefixes are `<header><NNNN>`, the first free one wins.
/// Returns the prefixes added.
pub fn check_and_add_missing_std_namespaces(
    document: &mut Document,
    limits: &Limits,
) -> Result<Vec<String>> {
    let root = &mut document.root;
    let mut added = Vec::new();

    for (uri, header) in STANDARD_NAMESPACES {
        let declared = root.namespaces.iter().any(|(_, ns)| ns == uri);
        if declared {
            continue;
        }
        let prefix = (0..limits.max_prefix_probes)
            .map(|n| format!("{}{:04}", header, n))
            .find(|candidate| !root.namespaces.has_prefix(candidate))
            .ok_or_else(|| {
                Error::NamespaceInjection(format!(
                    "no free '{}' prefix for {} after {} probes",
                    header, uri, limits.max_prefix_probes
                ))
            })?;
        info!(%prefix, uri, "declaring missing namespace");
        root.namespaces.add_prefix(prefix.clone(), uri);
        added.push(prefix);
    }

    Ok(added)
}

/// Whether `element` is the framework element `local_name` whose `name`
/// attribute (if `name` is given) resolves to `name` in `scope`
fn matches(element: &Element, scope: &NamespaceContext, local_name: &str, name: Option<&QName>) -> bool {
    if !element.is(PSF_NAMESPACE, local_name) {
        return false;
    }
    match name {
        None => true,
        Some(target) => element
            .get_attribute(attrs::NAME)
            .and_then(|value| element.scope(scope).resolve_value(value))
            .is_some_and(|resolved| &resolved == target),
    }
}

/// Child index of the first matching schema element under `parent`
///
/// `scope` is the namespace scope in effect at `parent`.
pub fn find_schema_element_with_name_attr(
    parent: &Element,
    scope: &NamespaceContext,
    local_name: &str,
    name: Option<&QName>,
) -> Option<usize> {
    parent.children.iter().position(|child| match child {
        Node::Element(e) => matches(e, scope, local_name, name),
        _ => false,
    })
}

/// First matching schema element under `parent`
pub fn get_schema_element_with_name_attr<'e>(
    parent: &'e Element,
    scope: &NamespaceContext,
    local_name: &str,
    name: Option<&QName>,
) -> Option<&'e Element> {
    find_schema_element_with_name_attr(parent, scope, local_name, name)
        .and_then(|index| parent.child_element(index))
}

/// Remove every matching schema element under `parent`, returning the count
pub fn remove_all_schema_elements_with_name_attr(
    parent: &mut Element,
    scope: &NamespaceContext,
    local_name: &str,
    name: Option<&QName>,
) -> usize {
    let before = parent.children.len();
    parent.children.retain(|child| match child {
        Node::Element(e) => !matches(e, scope, local_name, name),
        _ => true,
    });
    let removed = before - parent.children.len();
    if removed > 0 {
        debug!(element = local_name, name = ?name.map(|n| n.to_string()), removed, "removed schema elements");
    }
    removed
}

/// Append `<psf:local_name name="prefix:local">` to `parent`
///
/// Both the element and its `name` value are qualified with prefixes
/// declared in `scope`.
pub fn add_schema_element_with_name_attr<'e>(
    parent: &'e mut Element,
    scope: &NamespaceContext,
    local_name: &str,
    name: Option<&QName>,
) -> Result<&'e mut Element> {
    let mut element = Element::in_scope(scope, PSF_NAMESPACE, local_name)?;
    if let Some(name) = name {
        element.set_attribute(attrs::NAME, qualify(scope, name)?);
    }
    Ok(parent.append_child(element))
}

/// `prefix:local` form of a namespaced QName in `scope`
pub fn qualify(scope: &NamespaceContext, name: &QName) -> Result<String> {
    let qualified = match &name.namespace {
        Some(ns) => scope.qualified_name(ns, &name.local_name)?,
        None => name.local_name.clone(),
    };
    validate_qname(&qualified)?;
    Ok(qualified)
}

/// Keyword QName, `{psk}keyword`
pub fn keyword_qname(keyword: &str) -> QName {
    QName::namespaced(PSK_NAMESPACE, keyword)
}
