//! Capability feature kinds
//!
//! One handler type per feature. Most features are a plain list of keyword
//! options and are declared with `keyword_feature!`; the rest carry scored
//! properties, parameter references or feature-level properties.

use tracing::trace;

use super::feature::{build_boxed, Feature, FeatureFactory, FeatureHandler, NamedOption, NoOption};
use super::parameters::ParameterName;
use crate::schema::enums::{
    Collation, Duplexing, OutputColor, PageMediaSizeName, PageMediaType, PageOrientation,
    PageQualitativeResolution, PageScaling, PagesPresentationDirection, Stapling,
};
use crate::schema::{SchemaEnum, SchemaNode, UNSPECIFIED_INT};
use crate::units::micron_to_dip;

fn specified(value: i32) -> Option<i32> {
    (value != UNSPECIFIED_INT).then_some(value)
}

fn non_negative_or_unspecified(node: &SchemaNode) -> i32 {
    node.non_negative_value().unwrap_or(UNSPECIFIED_INT)
}

fn referenced_parameter(node: &SchemaNode) -> Option<ParameterName> {
    node.parameter_ref_keyword()
        .and_then(ParameterName::from_keyword)
}

/// Option identified by a keyword of `T`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordOption<T: SchemaEnum> {
    /// Selected value
    pub value: T,
    /// Keyword of the `constrained` attribute, if any
    pub constrained: Option<&'static str>,
}

impl<T: SchemaEnum> KeywordOption<T> {
    fn from_node(node: &SchemaNode) -> Option<Self> {
        let value = node.keyword().and_then(T::from_keyword)?;
        Some(Self {
            value,
            constrained: None,
        })
    }

    fn apply_constraint(&mut self, node: &SchemaNode) {
        self.constrained = node
            .constrained
            .as_ref()
            .and_then(|c| CONSTRAINTS.iter().copied().find(|k| *k == c.local_name));
    }
}

const CONSTRAINTS: &[&str] = &["None", "PrintTicketSettings", "AdminSettings", "DeviceSettings"];

impl<T: SchemaEnum> NamedOption for KeywordOption<T> {
    fn option_name(&self) -> Option<&str> {
        Some(self.value.keyword())
    }
}

macro_rules! keyword_feature {
    ($(#[$meta:meta])* $handler:ident, $value:ty, $keyword:literal) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $handler;

        impl FeatureHandler for $handler {
            type Option = KeywordOption<$value>;
            type Properties = ();
            const KEYWORD: &'static str = $keyword;

            fn new_option(node: &SchemaNode) -> Option<Self::Option> {
                KeywordOption::from_node(node)
            }

            fn option_attribute(option: &mut Self::Option, node: &SchemaNode) {
                option.apply_constraint(node);
            }
        }
    };
}

keyword_feature!(
    /// `psk:JobDuplexAllDocumentsContiguously`
    DuplexHandler,
    Duplexing,
    "JobDuplexAllDocumentsContiguously"
);
keyword_feature!(
    /// `psk:JobCollateAllDocuments`
    CollateHandler,
    Collation,
    "JobCollateAllDocuments"
);
keyword_feature!(
    /// `psk:PageOrientation`
    OrientationHandler,
    PageOrientation,
    "PageOrientation"
);
keyword_feature!(
    /// `psk:JobStapleAllDocuments`
    StapleHandler,
    Stapling,
    "JobStapleAllDocuments"
);
keyword_feature!(
    /// `psk:PageMediaType`
    MediaTypeHandler,
    PageMediaType,
    "PageMediaType"
);
keyword_feature!(
    /// `psk:PresentationDirection`, nested in the N-up feature
    PresentationDirectionHandler,
    PagesPresentationDirection,
    "PresentationDirection"
);

/// Output color option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputColorOption {
    /// Color mode
    pub value: OutputColor,
    /// `psk:DeviceBitsPerPixel`, `UNSPECIFIED_INT` when absent
    pub device_bits_per_pixel: i32,
    /// `psk:DriverBitsPerPixel`, `UNSPECIFIED_INT` when absent
    pub driver_bits_per_pixel: i32,
}

impl NamedOption for OutputColorOption {
    fn option_name(&self) -> Option<&str> {
        Some(self.value.keyword())
    }
}

/// `psk:PageOutputColor`
#[derive(Debug)]
pub struct OutputColorHandler;

impl FeatureHandler for OutputColorHandler {
    type Option = OutputColorOption;
    type Properties = ();
    const KEYWORD: &'static str = "PageOutputColor";

    fn new_option(node: &SchemaNode) -> Option<Self::Option> {
        let value = node.keyword().and_then(OutputColor::from_keyword)?;
        Some(OutputColorOption {
            value,
            device_bits_per_pixel: UNSPECIFIED_INT,
            driver_bits_per_pixel: UNSPECIFIED_INT,
        })
    }

    fn option_property(option: &mut Self::Option, parent: Option<&str>, node: &SchemaNode) {
        match (parent, node.keyword()) {
            (None, Some("DeviceBitsPerPixel")) => {
                option.device_bits_per_pixel = non_negative_or_unspecified(node)
            }
            (None, Some("DriverBitsPerPixel")) => {
                option.driver_bits_per_pixel = non_negative_or_unspecified(node)
            }
            _ => {}
        }
    }
}

/// N-up option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NUpOption {
    /// Logical pages per physical sheet
    pub pages_per_sheet: i32,
}

impl NamedOption for NUpOption {
    fn option_name(&self) -> Option<&str> {
        None
    }
}

/// `psk:JobNUpAllDocumentsContiguously`
#[derive(Debug)]
pub struct NUpHandler;

impl FeatureHandler for NUpHandler {
    type Option = NUpOption;
    type Properties = ();
    const KEYWORD: &'static str = "JobNUpAllDocumentsContiguously";

    fn new_option(_node: &SchemaNode) -> Option<Self::Option> {
        Some(NUpOption {
            pages_per_sheet: UNSPECIFIED_INT,
        })
    }

    fn option_property(option: &mut Self::Option, parent: Option<&str>, node: &SchemaNode) {
        if parent.is_none() && node.keyword() == Some("PagesPerSheet") {
            option.pages_per_sheet = non_negative_or_unspecified(node);
        }
    }

    fn option_complete(option: &Self::Option) -> bool {
        option.pages_per_sheet > 0
    }

    fn build_sub_feature(keyword: &str) -> Option<FeatureFactory> {
        (keyword == PresentationDirectionHandler::KEYWORD)
            .then_some(build_boxed::<PresentationDirectionHandler> as FeatureFactory)
    }
}

impl Feature<NUpHandler> {
    /// Supported pages-per-sheet counts
    pub fn pages_per_sheet(&self) -> Vec<i32> {
        self.options().iter().map(|o| o.pages_per_sheet).collect()
    }

    /// The presentation direction sub-feature
    pub fn presentation_direction(&self) -> Option<&Feature<PresentationDirectionHandler>> {
        self.sub_feature_as()
    }
}

/// Media size option, fixed or custom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaSizeOption {
    /// Media name
    pub value: PageMediaSizeName,
    /// Fixed width in microns
    pub width: i32,
    /// Fixed height in microns
    pub height: i32,
    /// Parameter supplying a custom width
    pub width_parameter: Option<ParameterName>,
    /// Parameter supplying a custom height
    pub height_parameter: Option<ParameterName>,
}

impl MediaSizeOption {
    /// Whether this is the `CustomMediaSize` option
    pub fn is_custom(&self) -> bool {
        self.value == PageMediaSizeName::CustomMediaSize
    }

    /// Fixed width in device-independent pixels
    pub fn width_dip(&self) -> Option<f64> {
        specified(self.width).map(micron_to_dip)
    }

    /// Fixed height in device-independent pixels
    pub fn height_dip(&self) -> Option<f64> {
        specified(self.height).map(micron_to_dip)
    }
}

impl NamedOption for MediaSizeOption {
    fn option_name(&self) -> Option<&str> {
        Some(self.value.keyword())
    }
}

/// `psk:PageMediaSize`
#[derive(Debug)]
pub struct MediaSizeHandler;

impl FeatureHandler for MediaSizeHandler {
    type Option = MediaSizeOption;
    type Properties = ();
    const KEYWORD: &'static str = "PageMediaSize";

    fn new_option(node: &SchemaNode) -> Option<Self::Option> {
        let value = node.keyword().and_then(PageMediaSizeName::from_keyword)?;
        Some(MediaSizeOption {
            value,
            width: UNSPECIFIED_INT,
            height: UNSPECIFIED_INT,
            width_parameter: None,
            height_parameter: None,
        })
    }

    fn option_property(option: &mut Self::Option, parent: Option<&str>, node: &SchemaNode) {
        if parent.is_some() {
            return;
        }
        match node.keyword() {
            Some("MediaSizeWidth") => match referenced_parameter(node) {
                Some(param) => option.width_parameter = Some(param),
                None => option.width = non_negative_or_unspecified(node),
            },
            Some("MediaSizeHeight") => match referenced_parameter(node) {
                Some(param) => option.height_parameter = Some(param),
                None => option.height = non_negative_or_unspecified(node),
            },
            _ => {}
        }
    }

    fn option_complete(option: &Self::Option) -> bool {
        if option.is_custom() {
            option.width_parameter == Some(ParameterName::PageMediaSizeMediaSizeWidth)
                && option.height_parameter == Some(ParameterName::PageMediaSizeMediaSizeHeight)
        } else {
            option.width != UNSPECIFIED_INT && option.height != UNSPECIFIED_INT
        }
    }
}

impl Feature<MediaSizeHandler> {
    /// Whether the custom media size option is offered
    pub fn supports_custom_size(&self) -> bool {
        self.options().iter().any(MediaSizeOption::is_custom)
    }

    /// Fixed size option with the given name
    pub fn fixed_size(&self, name: PageMediaSizeName) -> Option<&MediaSizeOption> {
        self.options()
            .iter()
            .find(|o| o.value == name && !o.is_custom())
    }
}

/// Resolution option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionOption {
    /// Option keyword, usually device specific
    pub name: Option<String>,
    /// Horizontal resolution in dots per inch
    pub resolution_x: i32,
    /// Vertical resolution in dots per inch
    pub resolution_y: i32,
    /// Qualitative label
    pub qualitative: Option<PageQualitativeResolution>,
}

impl ResolutionOption {
    /// Both axes are known
    pub fn has_dimensions(&self) -> bool {
        self.resolution_x != UNSPECIFIED_INT && self.resolution_y != UNSPECIFIED_INT
    }
}

impl NamedOption for ResolutionOption {
    fn option_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// `psk:PageResolution`
#[derive(Debug)]
pub struct ResolutionHandler;

impl FeatureHandler for ResolutionHandler {
    type Option = ResolutionOption;
    type Properties = ();
    const KEYWORD: &'static str = "PageResolution";

    fn new_option(node: &SchemaNode) -> Option<Self::Option> {
        Some(ResolutionOption {
            name: node.name.as_ref().map(|n| n.local_name.clone()),
            resolution_x: UNSPECIFIED_INT,
            resolution_y: UNSPECIFIED_INT,
            qualitative: None,
        })
    }

    fn option_property(option: &mut Self::Option, parent: Option<&str>, node: &SchemaNode) {
        if parent.is_some() {
            return;
        }
        match node.keyword() {
            Some("ResolutionX") => option.resolution_x = non_negative_or_unspecified(node),
            Some("ResolutionY") => option.resolution_y = non_negative_or_unspecified(node),
            Some("QualitativeResolution") => {
                option.qualitative = node
                    .value_keyword()
                    .and_then(PageQualitativeResolution::from_keyword)
            }
            _ => {}
        }
    }

    fn option_complete(option: &Self::Option) -> bool {
        option.has_dimensions() || option.qualitative.is_some()
    }
}

/// Scaling option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalingOption {
    /// Scaling mode
    pub value: PageScaling,
    /// Parameter behind `psk:ScaleWidth`
    pub scale_width_parameter: Option<ParameterName>,
    /// Parameter behind `psk:ScaleHeight`
    pub scale_height_parameter: Option<ParameterName>,
    /// Parameter behind `psk:Scale`
    pub scale_parameter: Option<ParameterName>,
}

impl NamedOption for ScalingOption {
    fn option_name(&self) -> Option<&str> {
        Some(self.value.keyword())
    }
}

/// `psk:PageScaling`
#[derive(Debug)]
pub struct ScalingHandler;

impl FeatureHandler for ScalingHandler {
    type Option = ScalingOption;
    type Properties = ();
    const KEYWORD: &'static str = "PageScaling";

    fn new_option(node: &SchemaNode) -> Option<Self::Option> {
        let value = node.keyword().and_then(PageScaling::from_keyword)?;
        Some(ScalingOption {
            value,
            scale_width_parameter: None,
            scale_height_parameter: None,
            scale_parameter: None,
        })
    }

    fn option_property(option: &mut Self::Option, parent: Option<&str>, node: &SchemaNode) {
        if parent.is_some() {
            return;
        }
        let param = referenced_parameter(node);
        match node.keyword() {
            Some("ScaleWidth") => option.scale_width_parameter = param,
            Some("ScaleHeight") => option.scale_height_parameter = param,
            Some("Scale") => option.scale_parameter = param,
            // offsets are carried by the document but not modelled
            _ => {}
        }
    }

    fn option_complete(option: &Self::Option) -> bool {
        match option.value {
            PageScaling::NoScaling => true,
            PageScaling::Custom => {
                option.scale_width_parameter == Some(ParameterName::PageScalingScaleWidth)
                    && option.scale_height_parameter == Some(ParameterName::PageScalingScaleHeight)
            }
            PageScaling::CustomSquare => {
                option.scale_parameter == Some(ParameterName::PageScalingScale)
            }
        }
    }
}

/// Printable area inside the media, in microns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageableArea {
    /// Left edge
    pub origin_width: i32,
    /// Top edge
    pub origin_height: i32,
    /// Width
    pub extent_width: i32,
    /// Height
    pub extent_height: i32,
}

impl Default for ImageableArea {
    fn default() -> Self {
        Self {
            origin_width: UNSPECIFIED_INT,
            origin_height: UNSPECIFIED_INT,
            extent_width: UNSPECIFIED_INT,
            extent_height: UNSPECIFIED_INT,
        }
    }
}

impl ImageableArea {
    /// All four values are known
    pub fn is_complete(&self) -> bool {
        [
            self.origin_width,
            self.origin_height,
            self.extent_width,
            self.extent_height,
        ]
        .iter()
        .all(|v| *v != UNSPECIFIED_INT)
    }

    /// `(x, y, width, height)` in device-independent pixels
    pub fn to_dip(&self) -> Option<(f64, f64, f64, f64)> {
        self.is_complete().then(|| {
            (
                micron_to_dip(self.origin_width),
                micron_to_dip(self.origin_height),
                micron_to_dip(self.extent_width),
                micron_to_dip(self.extent_height),
            )
        })
    }
}

/// Feature-level properties of the imageable size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageableSize {
    /// Imageable width in microns
    pub width: i32,
    /// Imageable height in microns
    pub height: i32,
    /// Printable area, when the document describes one
    pub area: Option<ImageableArea>,
}

impl Default for ImageableSize {
    fn default() -> Self {
        Self {
            width: UNSPECIFIED_INT,
            height: UNSPECIFIED_INT,
            area: None,
        }
    }
}

/// `psk:PageImageableSize`
#[derive(Debug)]
pub struct ImageableSizeHandler;

impl FeatureHandler for ImageableSizeHandler {
    type Option = NoOption;
    type Properties = ImageableSize;
    const KEYWORD: &'static str = "PageImageableSize";

    fn new_option(_node: &SchemaNode) -> Option<Self::Option> {
        None
    }

    fn feature_property(properties: &mut Self::Properties, parent: Option<&str>, node: &SchemaNode) {
        let Some(keyword) = node.keyword() else {
            return;
        };
        trace!(?parent, keyword, "imageable size property");
        match (parent, keyword) {
            (None, "ImageableSizeWidth") => properties.width = non_negative_or_unspecified(node),
            (None, "ImageableSizeHeight") => properties.height = non_negative_or_unspecified(node),
            (None, "ImageableArea") => properties.area = Some(ImageableArea::default()),
            (Some("ImageableArea"), _) => {
                let area = properties.area.get_or_insert_with(ImageableArea::default);
                let value = non_negative_or_unspecified(node);
                match keyword {
                    "OriginWidth" => area.origin_width = value,
                    "OriginHeight" => area.origin_height = value,
                    "ExtentWidth" => area.extent_width = value,
                    "ExtentHeight" => area.extent_height = value,
                    _ => {}
                }
            }
            _ => {}
        }
    }

    fn is_valid(feature: &Feature<Self>) -> bool {
        let size = feature.properties();
        size.width != UNSPECIFIED_INT
            && size.height != UNSPECIFIED_INT
            && size.area.map_or(true, |a| a.is_complete())
    }
}

impl Feature<ImageableSizeHandler> {
    /// `(width, height)` in device-independent pixels
    pub fn size_dip(&self) -> Option<(f64, f64)> {
        let size = self.properties();
        Some((
            micron_to_dip(specified(size.width)?),
            micron_to_dip(specified(size.height)?),
        ))
    }
}
