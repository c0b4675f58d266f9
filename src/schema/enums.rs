//! Keyword <-> enum code mapping
//!
//! Every Print Schema keyword enumeration is declared once with
//! `schema_enum!`, which produces the Rust enum and its two index-aligned
//! tables (`NAMES[i]` is the keyword of `CODES[i]`). Codes start at 1; `0`
//! is reserved for "unspecified or unknown keyword". All tables are
//! reachable through [`EnumKind::table`], which also owns the valid code
//! range used by ticket setters.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/// Code returned for a keyword no table knows
pub const UNKNOWN_ENUM: i32 = 0;

/// Typed view of a keyword enumeration
pub trait SchemaEnum: Copy + fmt::Debug + Sized + 'static {
    /// Registry tag of this enumeration
    const KIND: EnumKind;

    /// Integer code of the value
    fn code(self) -> i32;

    /// Value for `code`, if it is a standard code
    fn from_code(code: i32) -> Option<Self>;

    /// Print Schema keyword of the value
    fn keyword(self) -> &'static str {
        Self::KIND
            .table()
            .enum_to_name(self.code())
            .unwrap_or_default()
    }

    /// Value for a keyword (local name in the keyword namespace)
    fn from_keyword(keyword: &str) -> Option<Self> {
        Self::from_code(Self::KIND.table().name_to_enum(keyword))
    }
}

macro_rules! schema_enum {
    (
        $(#[$meta:meta])*
        $name:ident : $kind:ident {
            $( $variant:ident = $code:literal => $keyword:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(i32)]
        pub enum $name {
            $(
                #[doc = concat!("`psk:", $keyword, "`")]
                $variant = $code,
            )+
        }

        impl $name {
            /// Keywords, index aligned with `CODES`
            pub const NAMES: &'static [&'static str] = &[$($keyword),+];
            /// Codes, index aligned with `NAMES`
            pub const CODES: &'static [i32] = &[$($code),+];
        }

        impl SchemaEnum for $name {
            const KIND: EnumKind = EnumKind::$kind;

            fn code(self) -> i32 {
                self as i32
            }

            fn from_code(code: i32) -> Option<Self> {
                match code {
                    $( $code => Some($name::$variant), )+
                    _ => None,
                }
            }
        }
    };
}

schema_enum! {
    /// Duplex printing mode
    Duplexing: Duplexing {
        OneSided = 1 => "OneSided",
        TwoSidedShortEdge = 2 => "TwoSidedShortEdge",
        TwoSidedLongEdge = 3 => "TwoSidedLongEdge",
    }
}

schema_enum! {
    /// Collation of multiple copies
    Collation: Collation {
        Collated = 1 => "Collated",
        Uncollated = 2 => "Uncollated",
    }
}

schema_enum! {
    /// Page orientation
    PageOrientation: PageOrientation {
        Landscape = 1 => "Landscape",
        Portrait = 2 => "Portrait",
        ReverseLandscape = 3 => "ReverseLandscape",
        ReversePortrait = 4 => "ReversePortrait",
    }
}

schema_enum! {
    /// Output color mode
    OutputColor: OutputColor {
        Color = 1 => "Color",
        Grayscale = 2 => "Grayscale",
        Monochrome = 3 => "Monochrome",
    }
}

schema_enum! {
    /// Stapling position
    Stapling: Stapling {
        StapleTopLeft = 1 => "StapleTopLeft",
        StapleTopRight = 2 => "StapleTopRight",
        StapleBottomLeft = 3 => "StapleBottomLeft",
        StapleBottomRight = 4 => "StapleBottomRight",
        StapleDualLeft = 5 => "StapleDualLeft",
        StapleDualRight = 6 => "StapleDualRight",
        StapleDualTop = 7 => "StapleDualTop",
        StapleDualBottom = 8 => "StapleDualBottom",
        SaddleStitch = 9 => "SaddleStitch",
        NoStaple = 10 => "None",
    }
}

schema_enum! {
    /// Order in which logical pages are placed on an N-up sheet
    PagesPresentationDirection: NUpPresentationDirection {
        RightBottom = 1 => "RightBottom",
        BottomRight = 2 => "BottomRight",
        LeftBottom = 3 => "LeftBottom",
        BottomLeft = 4 => "BottomLeft",
        RightTop = 5 => "RightTop",
        TopRight = 6 => "TopRight",
        LeftTop = 7 => "LeftTop",
        TopLeft = 8 => "TopLeft",
    }
}

schema_enum! {
    /// Standard media size names
    PageMediaSizeName: PageMediaSizeName {
        IsoA3 = 1 => "ISOA3",
        IsoA4 = 2 => "ISOA4",
        IsoA5 = 3 => "ISOA5",
        IsoA6 = 4 => "ISOA6",
        JisB4 = 5 => "JISB4",
        JisB5 = 6 => "JISB5",
        NorthAmericaLetter = 7 => "NorthAmericaLetter",
        NorthAmericaLegal = 8 => "NorthAmericaLegal",
        NorthAmericaTabloid = 9 => "NorthAmericaTabloid",
        NorthAmericaExecutive = 10 => "NorthAmericaExecutive",
        IsoDlEnvelope = 11 => "ISODLEnvelope",
        NorthAmericaNumber10Envelope = 12 => "NorthAmericaNumber10Envelope",
        CustomMediaSize = 13 => "CustomMediaSize",
    }
}

schema_enum! {
    /// Media type
    PageMediaType: PageMediaType {
        AutoSelect = 1 => "AutoSelect",
        Plain = 2 => "Plain",
        PhotographicGlossy = 3 => "PhotographicGlossy",
        Transparency = 4 => "Transparency",
        Label = 5 => "Label",
        CardStock = 6 => "CardStock",
        EnvelopePlain = 7 => "EnvelopePlain",
    }
}

schema_enum! {
    /// Qualitative resolution label
    PageQualitativeResolution: PageQualitativeResolution {
        Default = 1 => "Default",
        Draft = 2 => "Draft",
        High = 3 => "High",
        Normal = 4 => "Normal",
        Other = 5 => "Other",
    }
}

schema_enum! {
    /// Page scaling mode
    PageScaling: PageScaling {
        NoScaling = 1 => "None",
        Custom = 2 => "Custom",
        CustomSquare = 3 => "CustomSquare",
    }
}

/// Registry tag for each keyword enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumKind {
    /// [`Duplexing`]
    Duplexing,
    /// [`Collation`]
    Collation,
    /// [`PageOrientation`]
    PageOrientation,
    /// [`OutputColor`]
    OutputColor,
    /// [`Stapling`]
    Stapling,
    /// [`PagesPresentationDirection`]
    NUpPresentationDirection,
    /// [`PageMediaSizeName`]
    PageMediaSizeName,
    /// [`PageMediaType`]
    PageMediaType,
    /// [`PageQualitativeResolution`]
    PageQualitativeResolution,
    /// [`PageScaling`]
    PageScaling,
}

impl EnumKind {
    /// Every registered enumeration
    pub const ALL: [EnumKind; 10] = [
        EnumKind::Duplexing,
        EnumKind::Collation,
        EnumKind::PageOrientation,
        EnumKind::OutputColor,
        EnumKind::Stapling,
        EnumKind::NUpPresentationDirection,
        EnumKind::PageMediaSizeName,
        EnumKind::PageMediaType,
        EnumKind::PageQualitativeResolution,
        EnumKind::PageScaling,
    ];

    /// Mapping table of this enumeration
    pub fn table(self) -> EnumTable {
        let (names, codes) = match self {
            EnumKind::Duplexing => (Duplexing::NAMES, Duplexing::CODES),
            EnumKind::Collation => (Collation::NAMES, Collation::CODES),
            EnumKind::PageOrientation => (PageOrientation::NAMES, PageOrientation::CODES),
            EnumKind::OutputColor => (OutputColor::NAMES, OutputColor::CODES),
            EnumKind::Stapling => (Stapling::NAMES, Stapling::CODES),
            EnumKind::NUpPresentationDirection => (
                PagesPresentationDirection::NAMES,
                PagesPresentationDirection::CODES,
            ),
            EnumKind::PageMediaSizeName => (PageMediaSizeName::NAMES, PageMediaSizeName::CODES),
            EnumKind::PageMediaType => (PageMediaType::NAMES, PageMediaType::CODES),
            EnumKind::PageQualitativeResolution => (
                PageQualitativeResolution::NAMES,
                PageQualitativeResolution::CODES,
            ),
            EnumKind::PageScaling => (PageScaling::NAMES, PageScaling::CODES),
        };
        EnumTable {
            kind: self,
            names,
            codes,
        }
    }
}

static NAME_INDEX: Lazy<HashMap<(EnumKind, &'static str), i32>> = Lazy::new(|| {
    let mut index = HashMap::new();
    for kind in EnumKind::ALL {
        let table = kind.table();
        for (name, code) in table.names.iter().zip(table.codes) {
            index.insert((kind, *name), *code);
        }
    }
    index
});

/// Keyword/code table of one enumeration
#[derive(Debug, Clone, Copy)]
pub struct EnumTable {
    /// Registry tag
    pub kind: EnumKind,
    /// Keywords
    pub names: &'static [&'static str],
    /// Codes, index aligned with `names`
    pub codes: &'static [i32],
}

impl EnumTable {
    /// Smallest valid code
    pub fn min(&self) -> i32 {
        self.codes.iter().copied().min().unwrap_or(UNKNOWN_ENUM)
    }

    /// Largest valid code
    pub fn max(&self) -> i32 {
        self.codes.iter().copied().max().unwrap_or(UNKNOWN_ENUM)
    }

    /// Whether `code` is inside `[min, max]`
    pub fn in_range(&self, code: i32) -> bool {
        code >= self.min() && code <= self.max()
    }

    /// Code for a keyword, `0` when unknown
    pub fn name_to_enum(&self, name: &str) -> i32 {
        NAME_INDEX
            .get(&(self.kind, name))
            .copied()
            .unwrap_or(UNKNOWN_ENUM)
    }

    /// Keyword for a code
    pub fn enum_to_name(&self, code: i32) -> Option<&'static str> {
        enum_to_name(self.names, self.codes, code)
    }
}

/// Code of `name` in a pair of parallel tables, `0` when absent
pub fn name_to_enum(names: &[&str], codes: &[i32], name: &str) -> i32 {
    names
        .iter()
        .position(|n| *n == name)
        .and_then(|i| codes.get(i).copied())
        .unwrap_or(UNKNOWN_ENUM)
}

/// Keyword of `code` in a pair of parallel tables
pub fn enum_to_name(names: &[&'static str], codes: &[i32], code: i32) -> Option<&'static str> {
    codes
        .iter()
        .position(|c| *c == code)
        .and_then(|i| names.get(i).copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tables_are_aligned() {
        for kind in EnumKind::ALL {
            let table = kind.table();
            assert_eq!(table.names.len(), table.codes.len(), "{:?}", kind);
            assert!(table.codes.iter().all(|c| *c > 0), "{:?}", kind);
            assert_eq!(table.min(), 1, "{:?}", kind);
            assert_eq!(table.max() as usize, table.codes.len(), "{:?}", kind);
        }
    }

    #[test]
    fn test_typed_lookup() {
        assert_eq!(
            Duplexing::from_keyword("TwoSidedLongEdge"),
            Some(Duplexing::TwoSidedLongEdge)
        );
        assert_eq!(Stapling::NoStaple.keyword(), "None");
        assert_eq!(PageMediaSizeName::IsoA4.keyword(), "ISOA4");
        assert_eq!(Duplexing::from_keyword("Sideways"), None);
    }

    #[test]
    fn test_unknown_name_is_zero() {
        let table = EnumKind::Duplexing.table();
        assert_eq!(table.name_to_enum("NotAKeyword"), UNKNOWN_ENUM);
        assert_eq!(
            name_to_enum(Duplexing::NAMES, Duplexing::CODES, "NotAKeyword"),
            UNKNOWN_ENUM
        );
        assert_eq!(table.enum_to_name(0), None);
    }

    #[test]
    fn test_range() {
        let table = EnumKind::PageOrientation.table();
        assert!(table.in_range(1));
        assert!(table.in_range(4));
        assert!(!table.in_range(0));
        assert!(!table.in_range(5));
    }

    fn table_entry() -> impl Strategy<Value = (EnumKind, usize)> {
        (0..EnumKind::ALL.len()).prop_flat_map(|k| {
            let kind = EnumKind::ALL[k];
            (Just(kind), 0..kind.table().names.len())
        })
    }

    proptest! {
        #[test]
        fn prop_name_code_roundtrip((kind, index) in table_entry()) {
            let table = kind.table();
            let name = table.names[index];
            let code = table.codes[index];

            prop_assert_eq!(table.enum_to_name(table.name_to_enum(name)), Some(name));
            prop_assert_eq!(table.name_to_enum(table.enum_to_name(code).unwrap()), code);
            prop_assert_eq!(name_to_enum(table.names, table.codes, name), code);
        }

        #[test]
        fn prop_unknown_names_map_to_zero(name in "[a-z]{1,12}") {
            // keywords are PascalCase, lower-case strings never match
            for kind in EnumKind::ALL {
                prop_assert_eq!(kind.table().name_to_enum(&name), UNKNOWN_ENUM);
            }
        }
    }
}
