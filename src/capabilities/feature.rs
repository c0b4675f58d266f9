//! Generic capability feature builder
//!
//! A capability feature is read by one generic loop driven by the schema
//! reader. Everything feature specific lives behind [`FeatureHandler`]: the
//! option factory, the attribute and property callbacks, the completeness
//! check deciding whether an option is committed, and the validity rule of
//! the finished feature.
//!
//! Options are built in isolation and pushed only once complete, so a
//! [`Feature`] never exposes a half-read option. Parameter references seen
//! while reading an option are collected in an [`OptionScope`] and only
//! become requirements when that option is committed.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use indexmap::IndexSet;
use tracing::{debug, trace};

use super::parameters::ParameterName;
use crate::schema::{NodeKind, NodeKinds, SchemaNode, SchemaReader};

/// Access to the keyword that names an option
pub trait NamedOption {
    /// Option keyword, `None` for unnamed options
    fn option_name(&self) -> Option<&str>;
}

/// Option type of features that carry no options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOption {}

impl NamedOption for NoOption {
    fn option_name(&self) -> Option<&str> {
        match *self {}
    }
}

/// Builds a boxed sub-feature from its `Feature` element
pub type FeatureFactory = fn(&mut BuildContext<'_, '_>, &SchemaNode) -> Box<dyn CapabilityFeature>;

/// Callbacks that specialize the generic builder for one feature kind
pub trait FeatureHandler: fmt::Debug + Sized + 'static {
    /// Typed option of the feature
    type Option: NamedOption + Clone + fmt::Debug + 'static;

    /// Feature-level property state
    type Properties: Default + Clone + fmt::Debug + 'static;

    /// Feature keyword
    const KEYWORD: &'static str;

    /// Create an option for an `Option` element; `None` discards it
    fn new_option(node: &SchemaNode) -> Option<Self::Option>;

    /// Apply the attributes of the `Option` element
    fn option_attribute(_option: &mut Self::Option, _node: &SchemaNode) {}

    /// Apply one (possibly nested) property of an option
    fn option_property(_option: &mut Self::Option, _parent: Option<&str>, _node: &SchemaNode) {}

    /// Whether every required property of the option has been read
    fn option_complete(_option: &Self::Option) -> bool {
        true
    }

    /// Apply one (possibly nested) feature-level property
    fn feature_property(
        _properties: &mut Self::Properties,
        _parent: Option<&str>,
        _node: &SchemaNode,
    ) {
    }

    /// Builder for a nested feature with the given keyword
    fn build_sub_feature(_keyword: &str) -> Option<FeatureFactory> {
        None
    }

    /// Validity of the finished feature
    fn is_valid(feature: &Feature<Self>) -> bool {
        !feature.options().is_empty() && feature.sub_feature_valid()
    }
}

/// Object-safe view of any built feature
pub trait CapabilityFeature: fmt::Debug + 'static {
    /// Feature keyword
    fn keyword(&self) -> &'static str;

    /// Whether the feature is usable
    fn is_valid(&self) -> bool;

    /// Number of committed options
    fn option_count(&self) -> usize;

    /// Keywords of the named options, in document order
    fn option_names(&self) -> Vec<&str>;

    /// Downcasting hook
    fn as_any(&self) -> &dyn Any;
}

/// A built capability feature
pub struct Feature<H: FeatureHandler> {
    options: Vec<H::Option>,
    properties: H::Properties,
    sub_feature: Option<Box<dyn CapabilityFeature>>,
    _handler: PhantomData<H>,
}

impl<H: FeatureHandler> fmt::Debug for Feature<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Feature")
            .field("keyword", &H::KEYWORD)
            .field("options", &self.options)
            .field("properties", &self.properties)
            .field("sub_feature", &self.sub_feature)
            .finish()
    }
}

impl<H: FeatureHandler> Feature<H> {
    fn new() -> Self {
        Self {
            options: Vec::new(),
            properties: H::Properties::default(),
            sub_feature: None,
            _handler: PhantomData,
        }
    }

    /// Committed options, in document order
    pub fn options(&self) -> &[H::Option] {
        &self.options
    }

    /// Option with the given keyword
    pub fn option(&self, name: &str) -> Option<&H::Option> {
        self.options.iter().find(|o| o.option_name() == Some(name))
    }

    /// Feature-level properties
    pub fn properties(&self) -> &H::Properties {
        &self.properties
    }

    /// The nested feature, if the document had one
    pub fn sub_feature(&self) -> Option<&dyn CapabilityFeature> {
        self.sub_feature.as_deref()
    }

    /// The nested feature as a typed feature
    pub fn sub_feature_as<S: FeatureHandler>(&self) -> Option<&Feature<S>> {
        self.sub_feature
            .as_deref()
            .and_then(|f| f.as_any().downcast_ref())
    }

    /// `true` without a sub-feature, otherwise the sub-feature's validity
    pub fn sub_feature_valid(&self) -> bool {
        self.sub_feature.as_ref().map_or(true, |f| f.is_valid())
    }

    /// Whether the feature is usable
    pub fn is_valid(&self) -> bool {
        H::is_valid(self)
    }
}

impl<H: FeatureHandler> CapabilityFeature for Feature<H> {
    fn keyword(&self) -> &'static str {
        H::KEYWORD
    }

    fn is_valid(&self) -> bool {
        H::is_valid(self)
    }

    fn option_count(&self) -> usize {
        self.options.len()
    }

    fn option_names(&self) -> Vec<&str> {
        self.options.iter().filter_map(|o| o.option_name()).collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Parameter references of the option being read
#[derive(Debug, Default)]
pub struct OptionScope {
    referenced: Vec<ParameterName>,
}

impl OptionScope {
    fn reference(&mut self, name: ParameterName) {
        if !self.referenced.contains(&name) {
            self.referenced.push(name);
        }
    }
}

/// Reader plus the document-wide bookkeeping of one capabilities parse
#[derive(Debug)]
pub struct BuildContext<'a, 'input> {
    pub(crate) reader: SchemaReader<'a, 'input>,
    required: IndexSet<ParameterName>,
}

impl<'a, 'input> BuildContext<'a, 'input> {
    pub(crate) fn new(reader: SchemaReader<'a, 'input>) -> Self {
        Self {
            reader,
            required: IndexSet::new(),
        }
    }

    /// Local parameters required by committed options
    pub(crate) fn required(&self) -> impl Iterator<Item = ParameterName> + '_ {
        self.required.iter().copied()
    }

    fn commit(&mut self, scope: OptionScope) {
        for name in scope.referenced {
            if name.is_local() && self.required.insert(name) {
                trace!(parameter = %name, "parameter required by committed option");
            }
        }
    }
}

/// Box a freshly built feature; usable as a [`FeatureFactory`]
pub fn build_boxed<H: FeatureHandler>(
    ctx: &mut BuildContext<'_, '_>,
    node: &SchemaNode,
) -> Box<dyn CapabilityFeature> {
    Box::new(build_feature::<H>(ctx, node))
}

/// Read the children of a `Feature` (or root `Property`) element
pub fn build_feature<H: FeatureHandler>(
    ctx: &mut BuildContext<'_, '_>,
    node: &SchemaNode,
) -> Feature<H> {
    let mut feature = Feature::<H>::new();
    let depth = node.depth + 1;
    let accepted = NodeKinds::FEATURE | NodeKinds::OPTION | NodeKinds::PROPERTY;

    while let Some(child) = ctx.reader.move_to_next_schema_element(depth, accepted) {
        match child.kind {
            NodeKind::Option => {
                let Some(mut option) = H::new_option(&child) else {
                    debug!(feature = H::KEYWORD, name = ?child.name, "ignoring unrecognized option");
                    continue;
                };
                H::option_attribute(&mut option, &child);

                let mut scope = OptionScope::default();
                read_option_properties::<H>(ctx, &mut option, &mut scope, depth + 1, None);

                if H::option_complete(&option) {
                    ctx.commit(scope);
                    feature.options.push(option);
                } else {
                    debug!(feature = H::KEYWORD, ?option, "discarding incomplete option");
                }
            }
            NodeKind::Feature => {
                let factory = child.keyword().and_then(H::build_sub_feature);
                match factory {
                    Some(factory) if feature.sub_feature.is_none() => {
                        feature.sub_feature = Some(factory(ctx, &child));
                    }
                    _ => debug!(feature = H::KEYWORD, name = ?child.name, "skipping sub-feature"),
                }
            }
            _ => read_feature_properties::<H>(ctx, &mut feature.properties, &child, None),
        }
    }

    trace!(feature = H::KEYWORD, options = feature.options.len(), "feature built");
    feature
}

fn read_option_properties<H: FeatureHandler>(
    ctx: &mut BuildContext<'_, '_>,
    option: &mut H::Option,
    scope: &mut OptionScope,
    depth: usize,
    parent: Option<&str>,
) {
    let accepted = NodeKinds::SCORED_PROPERTY | NodeKinds::PROPERTY;
    while let Some(prop) = ctx.reader.move_to_next_schema_element(depth, accepted) {
        H::option_property(option, parent, &prop);
        if let Some(name) = prop
            .parameter_ref_keyword()
            .and_then(ParameterName::from_keyword)
        {
            scope.reference(name);
        }
        let keyword = prop.keyword().map(str::to_string);
        read_option_properties::<H>(ctx, option, scope, depth + 1, keyword.as_deref());
    }
}

fn read_feature_properties<H: FeatureHandler>(
    ctx: &mut BuildContext<'_, '_>,
    properties: &mut H::Properties,
    node: &SchemaNode,
    parent: Option<&str>,
) {
    H::feature_property(properties, parent, node);
    let keyword = node.keyword().map(str::to_string);
    let accepted = NodeKinds::SCORED_PROPERTY | NodeKinds::PROPERTY;
    while let Some(child) = ctx.reader.move_to_next_schema_element(node.depth + 1, accepted) {
        read_feature_properties::<H>(ctx, properties, &child, keyword.as_deref());
    }
}
