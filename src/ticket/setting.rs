//! Live feature views over a ticket document
//!
//! A [`FeatureSetting`] holds a handle to the shared document and the static
//! definition of its feature. It keeps no element handle: every read and
//! write locates the feature element again, so any number of views may
//! alias one subtree.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use super::property_map::{FeatureDef, PropertyKey, PropertyMapEntry, TicketFeature, ValueKind};
use crate::capabilities::ParameterName;
use crate::documents::{Document, Element, Node};
use crate::editor::{
    add_schema_element_with_name_attr, find_schema_element_with_name_attr,
    get_schema_element_with_name_attr, keyword_qname, qualify,
    remove_all_schema_elements_with_name_attr,
};
use crate::error::{Error, Result};
use crate::namespaces::{NamespaceContext, QName};
use crate::schema::enums::EnumKind;
use crate::schema::{attrs, elements, parse_int, UNSPECIFIED_INT};
use crate::{PSF_NAMESPACE, PSK_NAMESPACE, XSD_NAMESPACE, XSI_NAMESPACE};

/// Document shared by a ticket and all of its views
pub type SharedDocument = Rc<RefCell<Document>>;

/// Keyword the `name` attribute of `element` resolves to
fn keyword_of(element: &Element, scope: &NamespaceContext) -> Option<String> {
    let value = element.get_attribute(attrs::NAME)?;
    element
        .scope(scope)
        .resolve_value(value)
        .and_then(|q| q.local_in(PSK_NAMESPACE).map(str::to_string))
}

pub(crate) fn is_feature_of(
    element: &Element,
    scope: &NamespaceContext,
    def: &FeatureDef,
) -> bool {
    element.is(PSF_NAMESPACE, elements::FEATURE)
        && keyword_of(element, scope).is_some_and(|k| def.names().any(|n| n == k))
}

fn find_feature_index(parent: &Element, scope: &NamespaceContext, def: &FeatureDef) -> Option<usize> {
    parent.children.iter().position(|child| match child {
        Node::Element(e) => is_feature_of(e, scope, def),
        _ => false,
    })
}

/// Feature element of `def` under `root`, with its in-scope namespaces
fn locate<'d>(root: &'d Element, def: &FeatureDef) -> Option<(&'d Element, NamespaceContext)> {
    let mut element = root;
    let mut scope = root.scope(&NamespaceContext::new());
    let chain = match def.parent {
        Some(parent) => vec![parent.def(), def],
        None => vec![def],
    };
    for def in chain {
        let index = find_feature_index(element, &scope, def)?;
        element = element.child_element(index)?;
        scope = element.scope(&scope);
    }
    Some((element, scope))
}

/// Follow child indices from `element`, tracking the namespace scope
fn descend<'e>(
    mut element: &'e mut Element,
    mut scope: NamespaceContext,
    path: &[usize],
) -> Option<(&'e mut Element, NamespaceContext)> {
    for &index in path {
        let child = element.child_element_mut(index)?;
        scope = child.scope(&scope);
        element = child;
    }
    Some((element, scope))
}

/// Index of the feature element of `def` under `parent`, created if missing
fn ensure_feature(parent: &mut Element, scope: &NamespaceContext, def: &FeatureDef) -> Result<usize> {
    if let Some(index) = find_feature_index(parent, scope, def) {
        return Ok(index);
    }
    debug!(feature = def.keyword, "adding feature element");
    add_schema_element_with_name_attr(
        parent,
        scope,
        elements::FEATURE,
        Some(&keyword_qname(def.keyword)),
    )?;
    Ok(parent.children.len() - 1)
}

fn ensure_child(parent: &mut Element, scope: &NamespaceContext, local_name: &str) -> Result<usize> {
    if let Some(index) = find_schema_element_with_name_attr(parent, scope, local_name, None) {
        return Ok(index);
    }
    add_schema_element_with_name_attr(parent, scope, local_name, None)?;
    Ok(parent.children.len() - 1)
}

fn lost_element(what: &str) -> Error {
    Error::Resource(format!("{} element disappeared during an edit", what))
}

/// Append `<psf:Value xsi:type="...">text</psf:Value>` to `parent`
fn append_value(
    parent: &mut Element,
    scope: &NamespaceContext,
    xsd_type: &str,
    text: String,
) -> Result<()> {
    let mut value = Element::in_scope(scope, PSF_NAMESPACE, elements::VALUE)?;
    value.set_attribute(
        scope.qualified_name(XSI_NAMESPACE, attrs::TYPE)?,
        scope.qualified_name(XSD_NAMESPACE, xsd_type)?,
    );
    value.set_text(text);
    parent.append_child(value);
    Ok(())
}

/// Text of the first `Value` child and the scope it is written in
fn value_text(element: &Element, scope: &NamespaceContext) -> Option<(String, NamespaceContext)> {
    let value = get_schema_element_with_name_attr(element, scope, elements::VALUE, None)?;
    Some((value.text()?.trim().to_string(), value.scope(scope)))
}

fn decode_positive(element: &Element, scope: &NamespaceContext) -> Option<i32> {
    let (text, _) = value_text(element, scope)?;
    parse_int(&text).filter(|v| *v > 0)
}

fn decode_keyword(kind: EnumKind, element: &Element, scope: &NamespaceContext) -> Option<i32> {
    let (text, value_scope) = value_text(element, scope)?;
    let keyword = value_scope.resolve_value(&text)?;
    Some(kind.table().name_to_enum(keyword.local_in(PSK_NAMESPACE)?))
}

fn parameter_qname(parameter: ParameterName) -> QName {
    keyword_qname(parameter.keyword())
}

/// Value of the root `ParameterInit` for `parameter`
pub(crate) fn read_parameter_init(root: &Element, parameter: ParameterName) -> Option<i32> {
    let scope = root.scope(&NamespaceContext::new());
    let init = get_schema_element_with_name_attr(
        root,
        &scope,
        elements::PARAMETER_INIT,
        Some(&parameter_qname(parameter)),
    )?;
    decode_positive(init, &init.scope(&scope))
}

/// Replace the root `ParameterInit` for `parameter`
pub(crate) fn write_parameter_init(root: &mut Element, parameter: ParameterName, value: i32) -> Result<()> {
    let scope = root.scope(&NamespaceContext::new());
    let name = parameter_qname(parameter);
    remove_all_schema_elements_with_name_attr(root, &scope, elements::PARAMETER_INIT, Some(&name));
    let init =
        add_schema_element_with_name_attr(root, &scope, elements::PARAMETER_INIT, Some(&name))?;
    append_value(init, &scope, "integer", value.to_string())
}

/// Remove the root `ParameterInit` for `parameter`
pub(crate) fn remove_parameter_init(root: &mut Element, parameter: ParameterName) -> usize {
    let scope = root.scope(&NamespaceContext::new());
    remove_all_schema_elements_with_name_attr(
        root,
        &scope,
        elements::PARAMETER_INIT,
        Some(&parameter_qname(parameter)),
    )
}

/// Check `value` against the domain of `entry`
pub(crate) fn validate_entry(entry: &PropertyMapEntry, value: i32) -> Result<()> {
    match entry.kind {
        ValueKind::EnumString(kind) => {
            let table = kind.table();
            if !table.in_range(value) {
                return Err(Error::out_of_range(
                    "value",
                    format!(
                        "{:?} code must be within [{}, {}], got {}",
                        kind,
                        table.min(),
                        table.max(),
                        value
                    ),
                ));
            }
        }
        ValueKind::PositiveInt | ValueKind::IntParamRef(_) => {
            if value <= 0 {
                return Err(Error::out_of_range(
                    "value",
                    format!("psk:{} must be positive, got {}", entry.xml_property, value),
                ));
            }
        }
    }
    Ok(())
}

fn enum_keyword(kind: EnumKind, value: i32) -> Result<&'static str> {
    kind.table()
        .enum_to_name(value)
        .ok_or_else(|| Error::out_of_range("value", format!("{:?} has no code {}", kind, value)))
}

/// Live view of one ticket feature
#[derive(Clone)]
pub struct FeatureSetting {
    document: SharedDocument,
    def: &'static FeatureDef,
}

impl fmt::Debug for FeatureSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureSetting")
            .field("feature", &self.def.feature)
            .finish()
    }
}

impl FeatureSetting {
    pub(crate) fn new(document: SharedDocument, def: &'static FeatureDef) -> Self {
        Self { document, def }
    }

    /// Static definition of the feature
    pub fn def(&self) -> &'static FeatureDef {
        self.def
    }

    /// Feature tag
    pub fn feature(&self) -> TicketFeature {
        self.def.feature
    }

    /// Whether the ticket contains the feature
    pub fn is_present(&self) -> bool {
        let document = self.document.borrow();
        locate(&document.root, self.def).is_some()
    }

    /// Keyword of the selected option, whatever its enumeration says
    pub fn option_keyword(&self) -> Option<String> {
        let document = self.document.borrow();
        let (feature, scope) = locate(&document.root, self.def)?;
        let option = get_schema_element_with_name_attr(feature, &scope, elements::OPTION, None)?;
        keyword_of(option, &scope)
    }

    /// Read a property; absent values read as the kind's sentinel
    pub fn get(&self, key: PropertyKey) -> i32 {
        let Some(entry) = self.def.entry(key) else {
            return UNSPECIFIED_INT;
        };
        let document = self.document.borrow();
        self.read_entry(&document.root, entry)
            .unwrap_or_else(|| entry.kind.unspecified())
    }

    fn read_entry(&self, root: &Element, entry: &PropertyMapEntry) -> Option<i32> {
        let (feature, scope) = locate(root, self.def)?;
        let option = get_schema_element_with_name_attr(feature, &scope, elements::OPTION, None)?;

        if entry.is_option_name() {
            let ValueKind::EnumString(kind) = entry.kind else {
                return None;
            };
            let keyword = keyword_of(option, &scope)?;
            return Some(kind.table().name_to_enum(&keyword));
        }

        let option_scope = option.scope(&scope);
        let property = get_schema_element_with_name_attr(
            option,
            &option_scope,
            elements::SCORED_PROPERTY,
            Some(&keyword_qname(entry.xml_property)),
        )?;
        let property_scope = property.scope(&option_scope);

        match entry.kind {
            ValueKind::EnumString(kind) => decode_keyword(kind, property, &property_scope),
            ValueKind::PositiveInt => decode_positive(property, &property_scope),
            ValueKind::IntParamRef(parameter) => {
                get_schema_element_with_name_attr(
                    property,
                    &property_scope,
                    elements::PARAMETER_REF,
                    Some(&parameter_qname(parameter)),
                )?;
                read_parameter_init(root, parameter)
            }
        }
    }

    /// Check a value without touching the document
    pub fn validate(&self, key: PropertyKey, value: i32) -> Result<&'static PropertyMapEntry> {
        let entry = self.def.entry(key).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "{:?} is not a property of psk:{}",
                key, self.def.keyword
            ))
        })?;
        validate_entry(entry, value)?;
        Ok(entry)
    }

    /// Write a property
    ///
    /// The value is validated before the document is touched; the old nodes
    /// of the property are replaced.
    pub fn set(&self, key: PropertyKey, value: i32) -> Result<()> {
        let entry = self.validate(key, value)?;
        let mut document = self.document.borrow_mut();
        self.write_entry(&mut document.root, entry, value)?;
        debug!(feature = self.def.keyword, ?key, value, "property set");
        Ok(())
    }

    fn write_entry(&self, root: &mut Element, entry: &PropertyMapEntry, value: i32) -> Result<()> {
        let root_scope = root.scope(&NamespaceContext::new());

        let mut path = vec![ensure_feature(root, &root_scope, self.parent_or_self())?];
        if self.def.parent.is_some() {
            let (parent, parent_scope) =
                descend(root, root_scope.clone(), &path).ok_or_else(|| lost_element("feature"))?;
            path.push(ensure_feature(parent, &parent_scope, self.def)?);
        }

        let (feature, scope) =
            descend(root, root_scope, &path).ok_or_else(|| lost_element("feature"))?;
        let option_index = ensure_child(feature, &scope, elements::OPTION)?;
        let (option, option_scope) =
            descend(feature, scope, &[option_index]).ok_or_else(|| lost_element("option"))?;

        if entry.is_option_name() {
            let ValueKind::EnumString(kind) = entry.kind else {
                return Err(Error::InvalidArgument(format!(
                    "psk:{} option name is not a keyword",
                    self.def.keyword
                )));
            };
            let keyword = keyword_qname(enum_keyword(kind, value)?);
            option.set_attribute(attrs::NAME, qualify(&option_scope, &keyword)?);
            return Ok(());
        }

        let name = keyword_qname(entry.xml_property);
        remove_all_schema_elements_with_name_attr(
            option,
            &option_scope,
            elements::SCORED_PROPERTY,
            Some(&name),
        );
        let property = add_schema_element_with_name_attr(
            option,
            &option_scope,
            elements::SCORED_PROPERTY,
            Some(&name),
        )?;

        match entry.kind {
            ValueKind::EnumString(kind) => {
                let keyword = keyword_qname(enum_keyword(kind, value)?);
                append_value(property, &option_scope, "QName", qualify(&option_scope, &keyword)?)
            }
            ValueKind::PositiveInt => {
                append_value(property, &option_scope, "integer", value.to_string())
            }
            ValueKind::IntParamRef(parameter) => {
                add_schema_element_with_name_attr(
                    property,
                    &option_scope,
                    elements::PARAMETER_REF,
                    Some(&parameter_qname(parameter)),
                )?;
                write_parameter_init(root, parameter, value)
            }
        }
    }

    fn parent_or_self(&self) -> &'static FeatureDef {
        self.def.parent.map_or(self.def, TicketFeature::def)
    }

    /// Remove every node the feature owns
    ///
    /// Covers all feature elements carrying the keyword or an alias and the
    /// root `ParameterInit` elements of its parameters. Other features are
    /// left alone.
    pub fn clear(&self) {
        let mut document = self.document.borrow_mut();
        let root = &mut document.root;
        let scope = root.scope(&NamespaceContext::new());

        let removed = match self.def.parent {
            None => {
                let before = root.children.len();
                root.children.retain(|child| match child {
                    Node::Element(e) => !is_feature_of(e, &scope, self.def),
                    _ => true,
                });
                before - root.children.len()
            }
            Some(parent) => {
                let mut removed = 0;
                for child in root.elements_mut() {
                    if is_feature_of(child, &scope, parent.def()) {
                        let child_scope = child.scope(&scope);
                        let before = child.children.len();
                        child.children.retain(|c| match c {
                            Node::Element(e) => !is_feature_of(e, &child_scope, self.def),
                            _ => true,
                        });
                        removed += before - child.children.len();
                    }
                }
                removed
            }
        };

        let parameters: usize = self
            .def
            .parameters()
            .map(|p| remove_parameter_init(root, p))
            .sum();
        debug!(feature = self.def.keyword, removed, parameters, "feature cleared");
    }
}

/// Root `ParameterInit`-only setting of the job copy count
#[derive(Clone)]
pub struct JobCopiesSetting {
    document: SharedDocument,
}

impl fmt::Debug for JobCopiesSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobCopiesSetting").finish()
    }
}

impl JobCopiesSetting {
    pub(crate) fn new(document: SharedDocument) -> Self {
        Self { document }
    }

    /// Copy count, `UNSPECIFIED_INT` when absent
    pub fn value(&self) -> i32 {
        let document = self.document.borrow();
        read_parameter_init(&document.root, ParameterName::JobCopiesAllDocuments)
            .unwrap_or(UNSPECIFIED_INT)
    }

    /// Set the copy count; it must be positive
    pub fn set_value(&self, copies: i32) -> Result<()> {
        if copies <= 0 {
            return Err(Error::out_of_range(
                "copies",
                format!("copy count must be positive, got {}", copies),
            ));
        }
        let mut document = self.document.borrow_mut();
        write_parameter_init(&mut document.root, ParameterName::JobCopiesAllDocuments, copies)
    }

    /// Remove the copy count
    pub fn clear(&self) {
        let mut document = self.document.borrow_mut();
        remove_parameter_init(&mut document.root, ParameterName::JobCopiesAllDocuments);
    }
}
