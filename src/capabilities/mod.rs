//! PrintCapabilities object model
//!
//! [`PrintCapabilities::parse`] walks a capabilities document once with the
//! schema reader, dispatches every root `Feature` (and the root
//! `PageImageableSize` property) to the builder selected by its
//! [`CapabilityName`], and collects the parameter definitions. The result is
//! read-only.
//!
//! # Example
//!
//! ```
//! use printschema::capabilities::PrintCapabilities;
//! use printschema::schema::enums::Duplexing;
//!
//! let xml = r#"<psf:PrintCapabilities version="1"
//!     xmlns:psf="http://schemas.microsoft.com/windows/2003/08/printing/printschemaframework"
//!     xmlns:psk="http://schemas.microsoft.com/windows/2003/08/printing/printschemakeywords">
//!   <psf:Feature name="psk:JobDuplexAllDocumentsContiguously">
//!     <psf:Option name="psk:OneSided"/>
//!     <psf:Option name="psk:TwoSidedLongEdge"/>
//!   </psf:Feature>
//! </psf:PrintCapabilities>"#;
//!
//! let caps = PrintCapabilities::parse(xml.as_bytes()).unwrap();
//! let duplex = caps.duplex().unwrap();
//! assert!(duplex.is_valid());
//! assert_eq!(duplex.options()[1].value, Duplexing::TwoSidedLongEdge);
//! ```

pub mod feature;
pub mod features;
pub mod parameters;

pub use feature::{CapabilityFeature, Feature, FeatureHandler, NamedOption};
pub use features::{
    CollateHandler, DuplexHandler, ImageableSizeHandler, MediaSizeHandler, MediaTypeHandler,
    NUpHandler, OrientationHandler, OutputColorHandler, PresentationDirectionHandler,
    ResolutionHandler, ScalingHandler, StapleHandler,
};
pub use parameters::{ParameterDefinition, ParameterKind, ParameterName};

use tracing::{debug, warn};

use crate::error::{Error, FormatError, Result};
use crate::limits::Limits;
use crate::schema::reader::{decode_utf8, parse_xml};
use crate::schema::{attrs, elements, parse_int, NodeKind, NodeKinds, SchemaReader, SCHEMA_VERSION};
use crate::PSF_NAMESPACE;
use feature::{build_boxed, BuildContext, FeatureFactory};

/// Root features of a capabilities document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityName {
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
    /// `psk:PageMediaSize`
    PageMediaSize,
    /// `psk:PageResolution`
    PageResolution,
    /// `psk:PageScaling`
    PageScaling,
    /// `psk:PageImageableSize`
    PageImageableSize,
}

impl CapabilityName {
    /// Number of root features
    pub const COUNT: usize = 11;

    /// Every root feature, in slot order
    pub const ALL: [CapabilityName; Self::COUNT] = [
        CapabilityName::JobDuplex,
        CapabilityName::JobCollate,
        CapabilityName::PageOrientation,
        CapabilityName::PageOutputColor,
        CapabilityName::JobStaple,
        CapabilityName::PageMediaType,
        CapabilityName::JobNUp,
        CapabilityName::PageMediaSize,
        CapabilityName::PageResolution,
        CapabilityName::PageScaling,
        CapabilityName::PageImageableSize,
    ];

    /// Canonical keyword
    pub fn keyword(self) -> &'static str {
        match self {
            CapabilityName::JobDuplex => DuplexHandler::KEYWORD,
            CapabilityName::JobCollate => CollateHandler::KEYWORD,
            CapabilityName::PageOrientation => OrientationHandler::KEYWORD,
            CapabilityName::PageOutputColor => OutputColorHandler::KEYWORD,
            CapabilityName::JobStaple => StapleHandler::KEYWORD,
            CapabilityName::PageMediaType => MediaTypeHandler::KEYWORD,
            CapabilityName::JobNUp => NUpHandler::KEYWORD,
            CapabilityName::PageMediaSize => MediaSizeHandler::KEYWORD,
            CapabilityName::PageResolution => ResolutionHandler::KEYWORD,
            CapabilityName::PageScaling => ScalingHandler::KEYWORD,
            CapabilityName::PageImageableSize => ImageableSizeHandler::KEYWORD,
        }
    }

    /// Alternative keywords accepted on read
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            CapabilityName::JobDuplex => &["JobDuplex"],
            _ => &[],
        }
    }

    /// Feature for a keyword or alias
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|n| n.keyword() == keyword || n.aliases().contains(&keyword))
    }

    /// Builder of the feature
    fn factory(self) -> FeatureFactory {
        match self {
            CapabilityName::JobDuplex => build_boxed::<DuplexHandler>,
            CapabilityName::JobCollate => build_boxed::<CollateHandler>,
            CapabilityName::PageOrientation => build_boxed::<OrientationHandler>,
            CapabilityName::PageOutputColor => build_boxed::<OutputColorHandler>,
            CapabilityName::JobStaple => build_boxed::<StapleHandler>,
            CapabilityName::PageMediaType => build_boxed::<MediaTypeHandler>,
            CapabilityName::JobNUp => build_boxed::<NUpHandler>,
            CapabilityName::PageMediaSize => build_boxed::<MediaSizeHandler>,
            CapabilityName::PageResolution => build_boxed::<ResolutionHandler>,
            CapabilityName::PageScaling => build_boxed::<ScalingHandler>,
            CapabilityName::PageImageableSize => build_boxed::<ImageableSizeHandler>,
        }
    }
}

/// Parsed capabilities document
#[derive(Debug)]
pub struct PrintCapabilities {
    features: [Option<Box<dyn CapabilityFeature>>; CapabilityName::COUNT],
    parameters: [Option<ParameterDefinition>; ParameterName::COUNT],
}

impl PrintCapabilities {
    /// Parse a capabilities document with default limits
    pub fn parse(xml: &[u8]) -> Result<Self> {
        Self::parse_with_limits(xml, &Limits::default())
    }

    /// Parse a capabilities document
    pub fn parse_with_limits(xml: &[u8], limits: &Limits) -> Result<Self> {
        limits.check_xml_size(xml.len())?;
        let text = decode_utf8(xml)?;
        let document = parse_xml(text)?;
        let reader = SchemaReader::new(&document, limits)?;
        check_root(reader.root())?;

        let mut caps = Self {
            features: std::array::from_fn(|_| None),
            parameters: std::array::from_fn(|_| None),
        };
        let mut ctx = BuildContext::new(reader);
        let accepted = NodeKinds::FEATURE | NodeKinds::PARAMETER_DEF | NodeKinds::PROPERTY;

        while let Some(node) = ctx.reader.move_to_next_schema_element(1, accepted) {
            let Some(keyword) = node.keyword() else {
                debug!(name = ?node.name, "skipping element without a keyword name");
                continue;
            };
            match node.kind {
                NodeKind::ParameterDef => {
                    let Some(name) = ParameterName::from_keyword(keyword) else {
                        debug!(keyword, "skipping unknown parameter definition");
                        continue;
                    };
                    if let Some(def) = ParameterDefinition::read(&mut ctx.reader, name, &node) {
                        caps.parameters[name.index()] = Some(def);
                    }
                }
                NodeKind::Feature | NodeKind::Property => {
                    // the imageable size is the only root property
                    let capability = CapabilityName::from_keyword(keyword).filter(|c| {
                        node.kind == NodeKind::Feature || *c == CapabilityName::PageImageableSize
                    });
                    let Some(capability) = capability else {
                        debug!(keyword, "skipping unrecognized feature");
                        continue;
                    };
                    let slot = &mut caps.features[capability as usize];
                    if slot.is_some() {
                        warn!(keyword, "duplicate feature ignored");
                        continue;
                    }
                    *slot = Some((capability.factory())(&mut ctx, &node));
                }
                _ => {}
            }
        }

        for name in ctx.required() {
            if caps.parameters[name.index()].is_none() {
                return Err(FormatError::new(format!(
                    "required parameter definition {} is missing",
                    name
                ))
                .with_element("psf:ParameterDef")
                .into());
            }
        }

        debug!(
            features = caps.features.iter().flatten().count(),
            parameters = caps.parameters.iter().flatten().count(),
            "capabilities parsed"
        );
        Ok(caps)
    }

    /// Feature by name
    pub fn get(&self, name: CapabilityName) -> Option<&dyn CapabilityFeature> {
        self.features[name as usize].as_deref()
    }

    /// Feature as its typed form
    pub fn feature<H: FeatureHandler>(&self) -> Option<&Feature<H>> {
        CapabilityName::from_keyword(H::KEYWORD)
            .and_then(|name| self.get(name))
            .and_then(|f| f.as_any().downcast_ref())
    }

    /// Whether the feature is present and valid
    pub fn supports(&self, name: CapabilityName) -> bool {
        self.get(name).is_some_and(|f| f.is_valid())
    }

    /// Present features, in slot order
    pub fn features(&self) -> impl Iterator<Item = &dyn CapabilityFeature> {
        self.features.iter().filter_map(|f| f.as_deref())
    }

    /// Parameter definition by name
    pub fn parameter(&self, name: ParameterName) -> Option<&ParameterDefinition> {
        self.parameters[name.index()].as_ref()
    }

    /// Duplex feature
    pub fn duplex(&self) -> Option<&Feature<DuplexHandler>> {
        self.feature()
    }

    /// Collate feature
    pub fn collate(&self) -> Option<&Feature<CollateHandler>> {
        self.feature()
    }

    /// Orientation feature
    pub fn orientation(&self) -> Option<&Feature<OrientationHandler>> {
        self.feature()
    }

    /// Output color feature
    pub fn output_color(&self) -> Option<&Feature<OutputColorHandler>> {
        self.feature()
    }

    /// Staple feature
    pub fn staple(&self) -> Option<&Feature<StapleHandler>> {
        self.feature()
    }

    /// Media type feature
    pub fn media_type(&self) -> Option<&Feature<MediaTypeHandler>> {
        self.feature()
    }

    /// N-up feature
    pub fn nup(&self) -> Option<&Feature<NUpHandler>> {
        self.feature()
    }

    /// Media size feature
    pub fn media_size(&self) -> Option<&Feature<MediaSizeHandler>> {
        self.feature()
    }

    /// Resolution feature
    pub fn resolution(&self) -> Option<&Feature<ResolutionHandler>> {
        self.feature()
    }

    /// Scaling feature
    pub fn scaling(&self) -> Option<&Feature<ScalingHandler>> {
        self.feature()
    }

    /// Imageable size
    pub fn imageable_size(&self) -> Option<&Feature<ImageableSizeHandler>> {
        self.feature()
    }

    /// Copy count definition
    pub fn copies(&self) -> Option<&ParameterDefinition> {
        self.parameter(ParameterName::JobCopiesAllDocuments)
    }
}

fn check_root(root: roxmltree::Node<'_, '_>) -> Result<()> {
    let tag = root.tag_name();
    if tag.namespace() != Some(PSF_NAMESPACE) || tag.name() != elements::PRINT_CAPABILITIES {
        return Err(Error::Format(
            FormatError::new("root element is not psf:PrintCapabilities")
                .with_element(tag.name()),
        ));
    }
    let version = root.attribute(attrs::VERSION).ok_or_else(|| {
        FormatError::new("missing version attribute")
            .with_element(elements::PRINT_CAPABILITIES)
            .with_attribute(attrs::VERSION)
    })?;
    match parse_int(version) {
        Some(SCHEMA_VERSION) => Ok(()),
        _ => Err(FormatError::new(format!("unsupported schema version '{}'", version))
            .with_element(elements::PRINT_CAPABILITIES)
            .with_attribute(attrs::VERSION)
            .into()),
    }
}
