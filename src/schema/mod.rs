//! Print Schema vocabulary
//!
//! Element and attribute names of the Print Schema framework, the node-kind
//! classification the schema reader works with, and the keyword enum
//! registry.

use bitflags::bitflags;

pub mod enums;
pub mod reader;

pub use enums::{EnumKind, EnumTable, SchemaEnum};
pub use reader::{SchemaNode, SchemaReader};

/// The only Print Schema version this crate reads and writes
pub const SCHEMA_VERSION: i32 = 1;

/// Sentinel for an integer property that is absent or failed to decode
pub const UNSPECIFIED_INT: i32 = i32::MIN;

/// Framework element local names
pub mod elements {
    pub const PRINT_TICKET: &str = "PrintTicket";
    pub const PRINT_CAPABILITIES: &str = "PrintCapabilities";
    pub const FEATURE: &str = "Feature";
    pub const OPTION: &str = "Option";
    pub const SCORED_PROPERTY: &str = "ScoredProperty";
    pub const PROPERTY: &str = "Property";
    pub const PARAMETER_DEF: &str = "ParameterDef";
    pub const PARAMETER_INIT: &str = "ParameterInit";
    pub const PARAMETER_REF: &str = "ParameterRef";
    pub const VALUE: &str = "Value";
    pub const ATTRIBUTE: &str = "Attribute";
    pub const ATTRIBUTE_SET: &str = "AttributeSet";
}

/// Framework attribute names
pub mod attrs {
    pub const NAME: &str = "name";
    pub const VERSION: &str = "version";
    pub const CONSTRAINED: &str = "constrained";
    /// Local name of `xsi:type`
    pub const TYPE: &str = "type";
}

/// Classification of a framework element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// `Feature`
    Feature,
    /// `Option`
    Option,
    /// `ScoredProperty`
    ScoredProperty,
    /// `Property`
    Property,
    /// `ParameterDef`
    ParameterDef,
    /// `ParameterRef`
    ParameterRef,
    /// `ParameterInit`
    ParameterInit,
    /// `Value`
    Value,
    /// `Attribute`
    Attribute,
    /// `AttributeSet`
    AttributeSet,
}

bitflags! {
    /// Set of node kinds a reader call accepts
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NodeKinds: u16 {
        const FEATURE = 1 << 0;
        const OPTION = 1 << 1;
        const SCORED_PROPERTY = 1 << 2;
        const PROPERTY = 1 << 3;
        const PARAMETER_DEF = 1 << 4;
        const PARAMETER_REF = 1 << 5;
        const PARAMETER_INIT = 1 << 6;
        const VALUE = 1 << 7;
        const ATTRIBUTE = 1 << 8;
        const ATTRIBUTE_SET = 1 << 9;
    }
}

impl NodeKind {
    /// Classify a framework element local name
    pub fn from_local_name(local_name: &str) -> Option<Self> {
        let kind = match local_name {
            elements::FEATURE => NodeKind::Feature,
            elements::OPTION => NodeKind::Option,
            elements::SCORED_PROPERTY => NodeKind::ScoredProperty,
            elements::PROPERTY => NodeKind::Property,
            elements::PARAMETER_DEF => NodeKind::ParameterDef,
            elements::PARAMETER_REF => NodeKind::ParameterRef,
            elements::PARAMETER_INIT => NodeKind::ParameterInit,
            elements::VALUE => NodeKind::Value,
            elements::ATTRIBUTE => NodeKind::Attribute,
            elements::ATTRIBUTE_SET => NodeKind::AttributeSet,
            _ => return None,
        };
        Some(kind)
    }

    /// Single-kind mask
    pub fn mask(self) -> NodeKinds {
        match self {
            NodeKind::Feature => NodeKinds::FEATURE,
            NodeKind::Option => NodeKinds::OPTION,
            NodeKind::ScoredProperty => NodeKinds::SCORED_PROPERTY,
            NodeKind::Property => NodeKinds::PROPERTY,
            NodeKind::ParameterDef => NodeKinds::PARAMETER_DEF,
            NodeKind::ParameterRef => NodeKinds::PARAMETER_REF,
            NodeKind::ParameterInit => NodeKinds::PARAMETER_INIT,
            NodeKind::Value => NodeKinds::VALUE,
            NodeKind::Attribute => NodeKinds::ATTRIBUTE,
            NodeKind::AttributeSet => NodeKinds::ATTRIBUTE_SET,
        }
    }
}

/// Parse a Print Schema integer value; `None` for anything not a decimal integer
pub fn parse_int(text: &str) -> Option<i32> {
    text.trim().parse::<i32>().ok()
}

/// Parse a non-negative integer value; negative values count as absent
pub fn parse_non_negative(text: &str) -> Option<i32> {
    parse_int(text).filter(|v| *v >= 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_kind_classification() {
        assert_eq!(NodeKind::from_local_name("Feature"), Some(NodeKind::Feature));
        assert_eq!(
            NodeKind::from_local_name("ParameterInit"),
            Some(NodeKind::ParameterInit)
        );
        assert_eq!(NodeKind::from_local_name("feature"), None);
    }

    #[test]
    fn test_masks() {
        let accepted = NodeKinds::OPTION | NodeKinds::FEATURE;
        assert!(accepted.contains(NodeKind::Option.mask()));
        assert!(!accepted.contains(NodeKind::Property.mask()));
    }

    #[test]
    fn test_parse_values() {
        assert_eq!(parse_int(" 210000 "), Some(210000));
        assert_eq!(parse_int("-5"), Some(-5));
        assert_eq!(parse_int("12.5"), None);
        assert_eq!(parse_non_negative("-5"), None);
        assert_eq!(parse_non_negative("0"), Some(0));
    }
}
