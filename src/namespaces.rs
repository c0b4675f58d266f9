//! XML namespace handling
//!
//! This module provides qualified names (QNames), in-scope namespace
//! contexts and the two directions of QName mapping used by the ticket
//! editor: resolving a `prefix:local` attribute value into a namespace URI,
//! and building a `prefix:local` string for a URI that is in scope.
//!
//! An undeclared prefix and an unprefixed name are different cases. An
//! unprefixed name takes the in-scope default namespace (or no namespace);
//! a name with an undeclared prefix does not resolve at all.

use crate::error::{Error, Result};
use crate::names::split_qname;
use indexmap::IndexMap;
use std::fmt;

/// XML Namespace URI
pub type NamespaceUri = String;

/// Namespace prefix
pub type Prefix = String;

/// Qualified name (QName) - combination of namespace and local name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace URI (None for no namespace)
    pub namespace: Option<NamespaceUri>,
    /// Local name
    pub local_name: String,
}

impl QName {
    /// Create a new QName
    pub fn new(namespace: Option<impl Into<String>>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(|s| s.into()),
            local_name: local_name.into(),
        }
    }

    /// Create a QName without a namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
        }
    }

    /// Create a QName with a namespace
    pub fn namespaced(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local_name: local_name.into(),
        }
    }

    /// Check whether this name is `local_name` in namespace `namespace`
    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.local_name == local_name
    }

    /// Local name when the QName lives in `namespace`
    pub fn local_in(&self, namespace: &str) -> Option<&str> {
        if self.namespace.as_deref() == Some(namespace) {
            Some(&self.local_name)
        } else {
            None
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}

/// How a namespace URI is bound in a context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding<'a> {
    /// Bound to an explicit prefix
    Prefix(&'a str),
    /// The URI is the default namespace
    Default,
}

/// Namespace context for resolving prefixes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceContext {
    /// Mapping from prefix to namespace URI, in declaration order
    prefixes: IndexMap<Prefix, NamespaceUri>,
    /// Default namespace (no prefix)
    default_namespace: Option<NamespaceUri>,
}

impl NamespaceContext {
    /// Create a new empty namespace context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a namespace prefix mapping
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Set the default namespace
    pub fn set_default_namespace(&mut self, namespace: impl Into<String>) {
        self.default_namespace = Some(namespace.into());
    }

    /// Get the namespace for a prefix
    pub fn get_namespace(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(|s| s.as_str())
    }

    /// Get the default namespace
    pub fn get_default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// Whether `prefix` is declared in this context
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.prefixes.contains_key(prefix)
    }

    /// Iterate over `(prefix, uri)` declarations in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&Prefix, &NamespaceUri)> {
        self.prefixes.iter()
    }

    /// Whether no declaration at all is present
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty() && self.default_namespace.is_none()
    }

    /// Context of a child scope: this context overlaid with `inner`
    pub fn extended(&self, inner: &NamespaceContext) -> NamespaceContext {
        if inner.is_empty() {
            return self.clone();
        }
        let mut scope = self.clone();
        for (prefix, uri) in inner.iter() {
            scope.add_prefix(prefix.clone(), uri.clone());
        }
        if let Some(default) = inner.get_default_namespace() {
            scope.set_default_namespace(default);
        }
        scope
    }

    /// Find how `uri` is bound; explicit prefixes win over the default namespace
    pub fn binding_for(&self, uri: &str) -> Option<Binding<'_>> {
        self.prefixes
            .iter()
            .find(|(_, ns)| ns.as_str() == uri)
            .map(|(prefix, _)| Binding::Prefix(prefix.as_str()))
            .or_else(|| {
                (self.default_namespace.as_deref() == Some(uri)).then_some(Binding::Default)
            })
    }

    /// Resolve a prefixed element name to a QName
    pub fn resolve(&self, prefixed_name: &str) -> Result<QName> {
        self.resolve_value(prefixed_name).ok_or_else(|| {
            let prefix = split_qname(prefixed_name).0.unwrap_or_default();
            Error::Namespace(format!("Unknown prefix: {}", prefix))
        })
    }

    /// Resolve a QName-valued attribute or text, `None` for an undeclared prefix
    pub fn resolve_value(&self, value: &str) -> Option<QName> {
        match split_qname(value.trim()) {
            (Some(prefix), local) => self
                .get_namespace(prefix)
                .map(|ns| QName::namespaced(ns, local)),
            (None, local) => Some(QName::new(self.default_namespace.clone(), local)),
        }
    }

    /// Build the `prefix:local` form of `{uri}local` for this context
    pub fn qualified_name(&self, uri: &str, local_name: &str) -> Result<String> {
        match self.binding_for(uri) {
            Some(Binding::Prefix(prefix)) => Ok(format!("{}:{}", prefix, local_name)),
            Some(Binding::Default) => Ok(local_name.to_string()),
            None => Err(Error::Namespace(format!(
                "Namespace '{}' is not declared in scope",
                uri
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PSK: &str = "http://schemas.microsoft.com/windows/2003/08/printing/printschemakeywords";

    #[test]
    fn test_qname_creation() {
        let qname = QName::namespaced(PSK, "JobDuplex");
        assert!(qname.is(PSK, "JobDuplex"));
        assert_eq!(qname.local_in(PSK), Some("JobDuplex"));
        assert_eq!(qname.local_in("urn:other"), None);
    }

    #[test]
    fn test_qname_display() {
        let qname = QName::namespaced("http://example.com", "element");
        assert_eq!(qname.to_string(), "{http://example.com}element");

        let qname_local = QName::local("element");
        assert_eq!(qname_local.to_string(), "element");
    }

    #[test]
    fn test_resolve_prefixed_value() {
        let mut ctx = NamespaceContext::new();
        ctx.add_prefix("psk", PSK);

        let qname = ctx.resolve_value("psk:TwoSidedLongEdge").unwrap();
        assert!(qname.is(PSK, "TwoSidedLongEdge"));
    }

    #[test]
    fn test_undeclared_prefix_differs_from_default() {
        let mut ctx = NamespaceContext::new();
        ctx.set_default_namespace(PSK);

        // unprefixed takes the default namespace
        let qname = ctx.resolve_value("Portrait").unwrap();
        assert!(qname.is(PSK, "Portrait"));

        // an unknown prefix never silently falls back to the default
        assert!(ctx.resolve_value("nope:Portrait").is_none());
        assert!(ctx.resolve("nope:Portrait").is_err());
    }

    #[test]
    fn test_unprefixed_without_default_has_no_namespace() {
        let ctx = NamespaceContext::new();
        let qname = ctx.resolve_value("Portrait").unwrap();
        assert_eq!(qname.namespace, None);
    }

    #[test]
    fn test_qualified_name_roundtrip() {
        let mut ctx = NamespaceContext::new();
        ctx.add_prefix("k", PSK);
        ctx.set_default_namespace("urn:framework");

        let name = ctx.qualified_name(PSK, "PageOrientation").unwrap();
        assert_eq!(name, "k:PageOrientation");
        assert!(ctx.resolve_value(&name).unwrap().is(PSK, "PageOrientation"));

        assert_eq!(
            ctx.qualified_name("urn:framework", "Feature").unwrap(),
            "Feature"
        );
        assert!(ctx.qualified_name("urn:missing", "X").is_err());
    }

    #[test]
    fn test_extended_scope_overrides() {
        let mut outer = NamespaceContext::new();
        outer.add_prefix("p", "urn:one");
        let mut inner = NamespaceContext::new();
        inner.add_prefix("p", "urn:two");

        let scope = outer.extended(&inner);
        assert_eq!(scope.get_namespace("p"), Some("urn:two"));
        assert_eq!(outer.get_namespace("p"), Some("urn:one"));
    }
}
