//! Parameter definitions
//!
//! A `ParameterDef` describes a value an option leaves open (copy count,
//! custom media dimensions, custom scale). Options point at definitions
//! with `ParameterRef`; tickets bind values with `ParameterInit`.

use std::fmt;

use tracing::debug;

use crate::schema::{NodeKinds, SchemaNode, SchemaReader};
use crate::XSD_NAMESPACE;

/// Parameters this crate knows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParameterName {
    /// Number of copies of the whole job
    JobCopiesAllDocuments,
    /// Custom media width in microns
    PageMediaSizeMediaSizeWidth,
    /// Custom media height in microns
    PageMediaSizeMediaSizeHeight,
    /// Uniform custom scale in percent
    PageScalingScale,
    /// Horizontal custom scale in percent
    PageScalingScaleWidth,
    /// Vertical custom scale in percent
    PageScalingScaleHeight,
}

impl ParameterName {
    /// Number of parameter names
    pub const COUNT: usize = 6;

    /// Every parameter name, in index order
    pub const ALL: [ParameterName; Self::COUNT] = [
        ParameterName::JobCopiesAllDocuments,
        ParameterName::PageMediaSizeMediaSizeWidth,
        ParameterName::PageMediaSizeMediaSizeHeight,
        ParameterName::PageScalingScale,
        ParameterName::PageScalingScaleWidth,
        ParameterName::PageScalingScaleHeight,
    ];

    /// Keyword of the parameter
    pub fn keyword(self) -> &'static str {
        match self {
            ParameterName::JobCopiesAllDocuments => "JobCopiesAllDocuments",
            ParameterName::PageMediaSizeMediaSizeWidth => "PageMediaSizeMediaSizeWidth",
            ParameterName::PageMediaSizeMediaSizeHeight => "PageMediaSizeMediaSizeHeight",
            ParameterName::PageScalingScale => "PageScalingScale",
            ParameterName::PageScalingScaleWidth => "PageScalingScaleWidth",
            ParameterName::PageScalingScaleHeight => "PageScalingScaleHeight",
        }
    }

    /// Parameter for a keyword
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.keyword() == keyword)
    }

    /// Whether the parameter only exists for options that reference it
    pub fn is_local(self) -> bool {
        !matches!(self, ParameterName::JobCopiesAllDocuments)
    }

    /// Slot of the parameter in [`ParameterName::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ParameterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "psk:{}", self.keyword())
    }
}

/// Value domain of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    /// `xsd:integer` restricted to values >= 0
    NonNegativeInt,
    /// Any other data type; carried but not range checked
    Other,
}

/// One accepted `ParameterDef`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDefinition {
    /// Parameter name
    pub name: ParameterName,
    /// Value domain
    pub kind: ParameterKind,
    /// `psf:DefaultValue`
    pub default_value: Option<i32>,
    /// `psf:MinValue`
    pub min_value: Option<i32>,
    /// `psf:MaxValue`
    pub max_value: Option<i32>,
    /// `psf:Multiple`, 1 when absent
    pub multiple: i32,
    /// `psf:UnitType`
    pub unit_type: Option<String>,
    /// `psf:Mandatory` keyword
    pub mandatory: Option<String>,
}

impl ParameterDefinition {
    fn empty(name: ParameterName) -> Self {
        Self {
            name,
            kind: ParameterKind::Other,
            default_value: None,
            min_value: None,
            max_value: None,
            multiple: 1,
            unit_type: None,
            mandatory: None,
        }
    }

    /// Read the `Property` children of a `ParameterDef` element
    ///
    /// Returns `None` when the definition is unusable and must be treated as
    /// absent.
    pub(crate) fn read(
        reader: &mut SchemaReader<'_, '_>,
        name: ParameterName,
        node: &SchemaNode,
    ) -> Option<Self> {
        let mut def = Self::empty(name);
        let depth = node.depth + 1;
        while let Some(prop) = reader.move_to_next_schema_element(depth, NodeKinds::PROPERTY) {
            match prop.framework_name() {
                Some("DataType") => {
                    let integer = prop
                        .value_qname
                        .as_ref()
                        .is_some_and(|q| q.is(XSD_NAMESPACE, "integer"));
                    def.kind = if integer {
                        ParameterKind::NonNegativeInt
                    } else {
                        ParameterKind::Other
                    };
                }
                Some("DefaultValue") => def.default_value = prop.int_value(),
                Some("MinValue") => def.min_value = prop.int_value(),
                Some("MaxValue") => def.max_value = prop.int_value(),
                Some("Multiple") => def.multiple = prop.int_value().unwrap_or(1),
                Some("UnitType") => def.unit_type = prop.text_value.clone(),
                Some("Mandatory") => {
                    def.mandatory = prop
                        .value_keyword()
                        .map(str::to_string)
                        .or_else(|| prop.text_value.clone())
                }
                _ => {}
            }
        }

        if def.is_valid() {
            Some(def)
        } else {
            debug!(parameter = %name, ?def, "dropping invalid parameter definition");
            None
        }
    }

    /// Whether the definition is usable
    ///
    /// Integer definitions need `0 <= min <= default <= max`.
    pub fn is_valid(&self) -> bool {
        match self.kind {
            ParameterKind::Other => true,
            ParameterKind::NonNegativeInt => {
                match (self.min_value, self.default_value, self.max_value) {
                    (Some(min), Some(default), Some(max)) => {
                        min >= 0 && min <= default && default <= max
                    }
                    _ => false,
                }
            }
        }
    }

    /// Whether `value` is inside `[min, max]`
    pub fn contains(&self, value: i32) -> bool {
        self.min_value.map_or(true, |min| value >= min)
            && self.max_value.map_or(true, |max| value <= max)
    }

    /// `value` clamped into `[min, max]`
    pub fn clamp(&self, value: i32) -> i32 {
        let value = self.min_value.map_or(value, |min| value.max(min));
        self.max_value.map_or(value, |max| value.min(max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn integer_def(min: i32, default: i32, max: i32) -> ParameterDefinition {
        ParameterDefinition {
            kind: ParameterKind::NonNegativeInt,
            default_value: Some(default),
            min_value: Some(min),
            max_value: Some(max),
            ..ParameterDefinition::empty(ParameterName::JobCopiesAllDocuments)
        }
    }

    #[test]
    fn test_keywords() {
        for name in ParameterName::ALL {
            assert_eq!(ParameterName::from_keyword(name.keyword()), Some(name));
            assert_eq!(ParameterName::ALL[name.index()], name);
        }
        assert_eq!(ParameterName::from_keyword("PageScalingOffsetWidth"), None);
        assert!(!ParameterName::JobCopiesAllDocuments.is_local());
        assert!(ParameterName::PageScalingScale.is_local());
    }

    #[test]
    fn test_validity() {
        assert!(integer_def(1, 1, 999).is_valid());
        assert!(!integer_def(5, 1, 999).is_valid());
        assert!(!integer_def(1, 1000, 999).is_valid());
        assert!(!integer_def(-1, 0, 10).is_valid());

        let mut missing = integer_def(1, 1, 999);
        missing.max_value = None;
        assert!(!missing.is_valid());
    }

    #[test]
    fn test_clamp() {
        let def = integer_def(1, 1, 999);
        assert_eq!(def.clamp(0), 1);
        assert_eq!(def.clamp(5000), 999);
        assert_eq!(def.clamp(12), 12);
        assert!(def.contains(999));
        assert!(!def.contains(1000));
    }
}
