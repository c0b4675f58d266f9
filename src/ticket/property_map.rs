//! Declarative property maps of the ticket features
//!
//! Each feature setting is described once by a static [`FeatureDef`]: its
//! keyword, accepted aliases, parent feature and the ordered list of
//! properties it exposes. Reads and writes of every setting are driven by
//! these tables.

use crate::capabilities::ParameterName;
use crate::schema::enums::{EnumKind, UNKNOWN_ENUM};
use crate::schema::UNSPECIFIED_INT;

/// XML property name standing for the `name` attribute of the `Option`
pub const OPTION_NAME: &str = "OptionName";

/// Features a ticket exposes settings for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TicketFeature {
    /// `psk:JobDuplexAllDocumentsContiguously`
    JobDuplex,
    /// `psk:JobCollateAllDocuments`
    JobCollate,
    /// `psk:PageOrientation`
    PageOrientation,
    /// `psk:PageOutputColor`
    PageOutputColor,
    /// `psk:JobStapleAllDocuments`
    JobStaple,
    /// `psk:PageMediaType`
    PageMediaType,
    /// `psk:JobNUpAllDocumentsContiguously`
    JobNUp,
    /// `psk:PresentationDirection` inside the N-up feature
    NUpPresentationDirection,
    /// `psk:PageMediaSize`
    PageMediaSize,
    /// `psk:PageResolution`
    PageResolution,
    /// `psk:PageScaling`
    PageScaling,
}

impl TicketFeature {
    /// Every ticket feature
    pub const ALL: [TicketFeature; 11] = [
        TicketFeature::JobDuplex,
        TicketFeature::JobCollate,
        TicketFeature::PageOrientation,
        TicketFeature::PageOutputColor,
        TicketFeature::JobStaple,
        TicketFeature::PageMediaType,
        TicketFeature::JobNUp,
        TicketFeature::NUpPresentationDirection,
        TicketFeature::PageMediaSize,
        TicketFeature::PageResolution,
        TicketFeature::PageScaling,
    ];

    /// Static definition of the feature
    pub fn def(self) -> &'static FeatureDef {
        match self {
            TicketFeature::JobDuplex => &JOB_DUPLEX,
            TicketFeature::JobCollate => &JOB_COLLATE,
            TicketFeature::PageOrientation => &PAGE_ORIENTATION,
            TicketFeature::PageOutputColor => &PAGE_OUTPUT_COLOR,
            TicketFeature::JobStaple => &JOB_STAPLE,
            TicketFeature::PageMediaType => &PAGE_MEDIA_TYPE,
            TicketFeature::JobNUp => &JOB_NUP,
            TicketFeature::NUpPresentationDirection => &NUP_PRESENTATION_DIRECTION,
            TicketFeature::PageMediaSize => &PAGE_MEDIA_SIZE,
            TicketFeature::PageResolution => &PAGE_RESOLUTION,
            TicketFeature::PageScaling => &PAGE_SCALING,
        }
    }

    /// Root feature for a keyword or alias
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| {
            let def = f.def();
            def.parent.is_none() && def.names().any(|n| n == keyword)
        })
    }
}

/// Key of a setting property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    /// The selected option
    Value,
    /// `psk:PagesPerSheet`
    PagesPerSheet,
    /// Fixed `psk:MediaSizeWidth`
    MediaSizeWidth,
    /// Fixed `psk:MediaSizeHeight`
    MediaSizeHeight,
    /// `psk:MediaSizeWidth` through its parameter
    CustomMediaSizeWidth,
    /// `psk:MediaSizeHeight` through its parameter
    CustomMediaSizeHeight,
    /// `psk:ResolutionX`
    ResolutionX,
    /// `psk:ResolutionY`
    ResolutionY,
    /// `psk:QualitativeResolution`
    QualitativeResolution,
    /// `psk:ScaleWidth` through its parameter
    ScaleWidth,
    /// `psk:ScaleHeight` through its parameter
    ScaleHeight,
    /// `psk:Scale` through its parameter
    Scale,
}

/// How a property value is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Keyword of an enumeration
    EnumString(EnumKind),
    /// Positive integer in a `Value`
    PositiveInt,
    /// Positive integer held by a root `ParameterInit`
    IntParamRef(ParameterName),
}

impl ValueKind {
    /// Value reported when the property is absent
    pub fn unspecified(self) -> i32 {
        match self {
            ValueKind::EnumString(_) => UNKNOWN_ENUM,
            ValueKind::PositiveInt | ValueKind::IntParamRef(_) => UNSPECIFIED_INT,
        }
    }
}

/// One row of a property map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyMapEntry {
    /// Property key
    pub key: PropertyKey,
    /// ScoredProperty keyword, or [`OPTION_NAME`]
    pub xml_property: &'static str,
    /// Storage kind
    pub kind: ValueKind,
}

impl PropertyMapEntry {
    /// Whether the entry is the option name
    pub fn is_option_name(&self) -> bool {
        self.xml_property == OPTION_NAME
    }
}

/// Static description of a feature setting
#[derive(Debug, PartialEq, Eq)]
pub struct FeatureDef {
    /// Feature tag
    pub feature: TicketFeature,
    /// Canonical keyword, used for writes
    pub keyword: &'static str,
    /// Other keywords accepted on read and clear
    pub aliases: &'static [&'static str],
    /// Enclosing feature of a sub-feature
    pub parent: Option<TicketFeature>,
    /// Properties, in declaration order
    pub properties: &'static [PropertyMapEntry],
}

impl FeatureDef {
    /// Canonical keyword followed by the aliases
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        std::iter::once(self.keyword).chain(self.aliases.iter().copied())
    }

    /// Entry for `key`
    pub fn entry(&self, key: PropertyKey) -> Option<&'static PropertyMapEntry> {
        self.properties.iter().find(|e| e.key == key)
    }

    /// Parameters referenced by the property map
    pub fn parameters(&self) -> impl Iterator<Item = ParameterName> + '_ {
        self.properties.iter().filter_map(|e| match e.kind {
            ValueKind::IntParamRef(p) => Some(p),
            _ => None,
        })
    }
}

const fn option_name(kind: EnumKind) -> PropertyMapEntry {
    PropertyMapEntry {
        key: PropertyKey::Value,
        xml_property: OPTION_NAME,
        kind: ValueKind::EnumString(kind),
    }
}

const fn entry(key: PropertyKey, xml_property: &'static str, kind: ValueKind) -> PropertyMapEntry {
    PropertyMapEntry {
        key,
        xml_property,
        kind,
    }
}

const fn keyword_def(
    feature: TicketFeature,
    keyword: &'static str,
    properties: &'static [PropertyMapEntry],
) -> FeatureDef {
    FeatureDef {
        feature,
        keyword,
        aliases: &[],
        parent: None,
        properties,
    }
}

const ENUM_DUPLEX: &[PropertyMapEntry] = &[option_name(EnumKind::Duplexing)];
const ENUM_COLLATE: &[PropertyMapEntry] = &[option_name(EnumKind::Collation)];
const ENUM_ORIENTATION: &[PropertyMapEntry] = &[option_name(EnumKind::PageOrientation)];
const ENUM_OUTPUT_COLOR: &[PropertyMapEntry] = &[option_name(EnumKind::OutputColor)];
const ENUM_STAPLE: &[PropertyMapEntry] = &[option_name(EnumKind::Stapling)];
const ENUM_MEDIA_TYPE: &[PropertyMapEntry] = &[option_name(EnumKind::PageMediaType)];
const ENUM_PRESENTATION_DIRECTION: &[PropertyMapEntry] =
    &[option_name(EnumKind::NUpPresentationDirection)];

const NUP_PROPERTIES: &[PropertyMapEntry] = &[entry(
    PropertyKey::PagesPerSheet,
    "PagesPerSheet",
    ValueKind::PositiveInt,
)];

const MEDIA_SIZE_PROPERTIES: &[PropertyMapEntry] = &[
    option_name(EnumKind::PageMediaSizeName),
    entry(PropertyKey::MediaSizeWidth, "MediaSizeWidth", ValueKind::PositiveInt),
    entry(PropertyKey::MediaSizeHeight, "MediaSizeHeight", ValueKind::PositiveInt),
    entry(
        PropertyKey::CustomMediaSizeWidth,
        "MediaSizeWidth",
        ValueKind::IntParamRef(ParameterName::PageMediaSizeMediaSizeWidth),
    ),
    entry(
        PropertyKey::CustomMediaSizeHeight,
        "MediaSizeHeight",
        ValueKind::IntParamRef(ParameterName::PageMediaSizeMediaSizeHeight),
    ),
];

const RESOLUTION_PROPERTIES: &[PropertyMapEntry] = &[
    entry(PropertyKey::ResolutionX, "ResolutionX", ValueKind::PositiveInt),
    entry(PropertyKey::ResolutionY, "ResolutionY", ValueKind::PositiveInt),
    entry(
        PropertyKey::QualitativeResolution,
        "QualitativeResolution",
        ValueKind::EnumString(EnumKind::PageQualitativeResolution),
    ),
];

const SCALING_PROPERTIES: &[PropertyMapEntry] = &[
    option_name(EnumKind::PageScaling),
    entry(
        PropertyKey::ScaleWidth,
        "ScaleWidth",
        ValueKind::IntParamRef(ParameterName::PageScalingScaleWidth),
    ),
    entry(
        PropertyKey::ScaleHeight,
        "ScaleHeight",
        ValueKind::IntParamRef(ParameterName::PageScalingScaleHeight),
    ),
    entry(
        PropertyKey::Scale,
        "Scale",
        ValueKind::IntParamRef(ParameterName::PageScalingScale),
    ),
];

static JOB_DUPLEX: FeatureDef = FeatureDef {
    aliases: &["JobDuplex"],
    ..keyword_def(
        TicketFeature::JobDuplex,
        "JobDuplexAllDocumentsContiguously",
        ENUM_DUPLEX,
    )
};
static JOB_COLLATE: FeatureDef =
    keyword_def(TicketFeature::JobCollate, "JobCollateAllDocuments", ENUM_COLLATE);
static PAGE_ORIENTATION: FeatureDef =
    keyword_def(TicketFeature::PageOrientation, "PageOrientation", ENUM_ORIENTATION);
static PAGE_OUTPUT_COLOR: FeatureDef =
    keyword_def(TicketFeature::PageOutputColor, "PageOutputColor", ENUM_OUTPUT_COLOR);
static JOB_STAPLE: FeatureDef =
    keyword_def(TicketFeature::JobStaple, "JobStapleAllDocuments", ENUM_STAPLE);
static PAGE_MEDIA_TYPE: FeatureDef =
    keyword_def(TicketFeature::PageMediaType, "PageMediaType", ENUM_MEDIA_TYPE);
static JOB_NUP: FeatureDef = keyword_def(
    TicketFeature::JobNUp,
    "JobNUpAllDocumentsContiguously",
    NUP_PROPERTIES,
);
static NUP_PRESENTATION_DIRECTION: FeatureDef = FeatureDef {
    parent: Some(TicketFeature::JobNUp),
    ..keyword_def(
        TicketFeature::NUpPresentationDirection,
        "PresentationDirection",
        ENUM_PRESENTATION_DIRECTION,
    )
};
static PAGE_MEDIA_SIZE: FeatureDef =
    keyword_def(TicketFeature::PageMediaSize, "PageMediaSize", MEDIA_SIZE_PROPERTIES);
static PAGE_RESOLUTION: FeatureDef =
    keyword_def(TicketFeature::PageResolution, "PageResolution", RESOLUTION_PROPERTIES);
static PAGE_SCALING: FeatureDef =
    keyword_def(TicketFeature::PageScaling, "PageScaling", SCALING_PROPERTIES);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defs_are_consistent() {
        for feature in TicketFeature::ALL {
            let def = feature.def();
            assert_eq!(def.feature, feature);
            assert!(!def.properties.is_empty(), "{:?}", feature);
            if let Some(parent) = def.parent {
                assert!(parent.def().parent.is_none());
            }
        }
    }

    #[test]
    fn test_keyword_lookup() {
        assert_eq!(
            TicketFeature::from_keyword("JobDuplex"),
            Some(TicketFeature::JobDuplex)
        );
        assert_eq!(
            TicketFeature::from_keyword("JobDuplexAllDocumentsContiguously"),
            Some(TicketFeature::JobDuplex)
        );
        // sub-features are not root features
        assert_eq!(TicketFeature::from_keyword("PresentationDirection"), None);
    }

    #[test]
    fn test_media_size_entries() {
        let def = TicketFeature::PageMediaSize.def();
        let custom = def.entry(PropertyKey::CustomMediaSizeWidth).unwrap();
        assert_eq!(custom.xml_property, "MediaSizeWidth");
        assert_eq!(custom.kind.unspecified(), UNSPECIFIED_INT);
        assert!(def.entry(PropertyKey::Value).unwrap().is_option_name());
        assert_eq!(def.parameters().count(), 2);
        assert_eq!(def.entry(PropertyKey::Scale), None);
    }
}
