//! Typed wrappers over [`FeatureSetting`]
//!
//! Convenience setters that switch a feature to a different property subset
//! validate every argument first, then clear the feature, then write.

use std::fmt;
use std::marker::PhantomData;

use super::property_map::PropertyKey;
use super::setting::FeatureSetting;
use crate::error::{Error, Result};
use crate::schema::enums::{
    PageMediaSizeName, PageQualitativeResolution, PageScaling, PagesPresentationDirection,
};
use crate::schema::{SchemaEnum, UNSPECIFIED_INT};
use crate::units::micron_to_dip;

fn specified(value: i32) -> Option<i32> {
    (value != UNSPECIFIED_INT).then_some(value)
}

/// Setting whose only property is the selected keyword option
#[derive(Clone)]
pub struct EnumSetting<T: SchemaEnum> {
    setting: FeatureSetting,
    _marker: PhantomData<T>,
}

impl<T: SchemaEnum> fmt::Debug for EnumSetting<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumSetting")
            .field("feature", &self.setting.feature())
            .field("value", &self.value())
            .finish()
    }
}

impl<T: SchemaEnum> EnumSetting<T> {
    pub(crate) fn new(setting: FeatureSetting) -> Self {
        Self {
            setting,
            _marker: PhantomData,
        }
    }

    /// Selected option, `None` when absent or not a standard keyword
    pub fn value(&self) -> Option<T> {
        T::from_code(self.code())
    }

    /// Raw code of the selected option, `0` when absent or unknown
    pub fn code(&self) -> i32 {
        self.setting.get(PropertyKey::Value)
    }

    /// Select an option
    pub fn set_value(&self, value: T) -> Result<()> {
        self.set_code(value.code())
    }

    /// Select an option by raw code
    pub fn set_code(&self, code: i32) -> Result<()> {
        self.setting.set(PropertyKey::Value, code)
    }

    /// Remove the feature from the ticket
    pub fn clear(&self) {
        self.setting.clear()
    }

    /// Untyped view
    pub fn setting(&self) -> &FeatureSetting {
        &self.setting
    }
}

/// N-up setting with its presentation direction sub-feature
#[derive(Debug, Clone)]
pub struct NUpSetting {
    setting: FeatureSetting,
    direction: EnumSetting<PagesPresentationDirection>,
}

impl NUpSetting {
    pub(crate) fn new(
        setting: FeatureSetting,
        direction: EnumSetting<PagesPresentationDirection>,
    ) -> Self {
        Self { setting, direction }
    }

    /// Logical pages per sheet
    pub fn pages_per_sheet(&self) -> i32 {
        self.setting.get(PropertyKey::PagesPerSheet)
    }

    /// Set the logical pages per sheet
    pub fn set_pages_per_sheet(&self, pages: i32) -> Result<()> {
        self.setting.set(PropertyKey::PagesPerSheet, pages)
    }

    /// Placement order of the logical pages
    pub fn presentation_direction(&self) -> &EnumSetting<PagesPresentationDirection> {
        &self.direction
    }

    /// Remove the feature, sub-feature included
    pub fn clear(&self) {
        self.setting.clear()
    }

    /// Untyped view
    pub fn setting(&self) -> &FeatureSetting {
        &self.setting
    }
}

/// Media size setting
///
/// Width and height read the fixed `ScoredProperty` value first and fall
/// back to the custom-size parameters only when the option is
/// `CustomMediaSize`. All sizes are in microns.
#[derive(Debug, Clone)]
pub struct MediaSizeSetting {
    setting: FeatureSetting,
}

impl MediaSizeSetting {
    pub(crate) fn new(setting: FeatureSetting) -> Self {
        Self { setting }
    }

    /// Selected media size
    pub fn value(&self) -> Option<PageMediaSizeName> {
        PageMediaSizeName::from_code(self.setting.get(PropertyKey::Value))
    }

    fn dimension(&self, fixed: PropertyKey, custom: PropertyKey) -> i32 {
        let value = self.setting.get(fixed);
        if value != UNSPECIFIED_INT {
            return value;
        }
        if self.value() == Some(PageMediaSizeName::CustomMediaSize) {
            return self.setting.get(custom);
        }
        UNSPECIFIED_INT
    }

    /// Media width in microns
    pub fn width(&self) -> i32 {
        self.dimension(PropertyKey::MediaSizeWidth, PropertyKey::CustomMediaSizeWidth)
    }

    /// Media height in microns
    pub fn height(&self) -> i32 {
        self.dimension(PropertyKey::MediaSizeHeight, PropertyKey::CustomMediaSizeHeight)
    }

    /// Media width in DIPs
    pub fn width_dip(&self) -> Option<f64> {
        specified(self.width()).map(micron_to_dip)
    }

    /// Media height in DIPs
    pub fn height_dip(&self) -> Option<f64> {
        specified(self.height()).map(micron_to_dip)
    }

    fn reject_custom(name: PageMediaSizeName) -> Result<()> {
        if name == PageMediaSizeName::CustomMediaSize {
            return Err(Error::InvalidArgument(
                "custom media sizes are set with set_custom".to_string(),
            ));
        }
        Ok(())
    }

    /// Select a standard size without dimensions
    pub fn set_fixed(&self, name: PageMediaSizeName) -> Result<()> {
        Self::reject_custom(name)?;
        self.setting.validate(PropertyKey::Value, name.code())?;
        self.setting.clear();
        self.setting.set(PropertyKey::Value, name.code())
    }

    /// Select a standard size and record its dimensions
    pub fn set_fixed_with_size(&self, name: PageMediaSizeName, width: i32, height: i32) -> Result<()> {
        Self::reject_custom(name)?;
        self.setting.validate(PropertyKey::Value, name.code())?;
        self.setting.validate(PropertyKey::MediaSizeWidth, width)?;
        self.setting.validate(PropertyKey::MediaSizeHeight, height)?;
        self.setting.clear();
        self.setting.set(PropertyKey::Value, name.code())?;
        self.setting.set(PropertyKey::MediaSizeWidth, width)?;
        self.setting.set(PropertyKey::MediaSizeHeight, height)
    }

    /// Select a custom size given through the media size parameters
    pub fn set_custom(&self, width: i32, height: i32) -> Result<()> {
        self.setting.validate(PropertyKey::CustomMediaSizeWidth, width)?;
        self.setting.validate(PropertyKey::CustomMediaSizeHeight, height)?;
        self.setting.clear();
        self.setting
            .set(PropertyKey::Value, PageMediaSizeName::CustomMediaSize.code())?;
        self.setting.set(PropertyKey::CustomMediaSizeWidth, width)?;
        self.setting.set(PropertyKey::CustomMediaSizeHeight, height)
    }

    /// Remove the feature and its parameters
    pub fn clear(&self) {
        self.setting.clear()
    }

    /// Untyped view
    pub fn setting(&self) -> &FeatureSetting {
        &self.setting
    }
}

/// Page resolution setting, in dots per inch
#[derive(Debug, Clone)]
pub struct ResolutionSetting {
    setting: FeatureSetting,
}

impl ResolutionSetting {
    pub(crate) fn new(setting: FeatureSetting) -> Self {
        Self { setting }
    }

    /// Horizontal resolution
    pub fn x(&self) -> i32 {
        self.setting.get(PropertyKey::ResolutionX)
    }

    /// Vertical resolution
    pub fn y(&self) -> i32 {
        self.setting.get(PropertyKey::ResolutionY)
    }

    /// Qualitative resolution label
    pub fn qualitative(&self) -> Option<PageQualitativeResolution> {
        PageQualitativeResolution::from_code(self.setting.get(PropertyKey::QualitativeResolution))
    }

    /// Replace the feature with an option of the given resolution
    pub fn set_resolution(&self, x: i32, y: i32) -> Result<()> {
        self.setting.validate(PropertyKey::ResolutionX, x)?;
        self.setting.validate(PropertyKey::ResolutionY, y)?;
        self.setting.clear();
        self.setting.set(PropertyKey::ResolutionX, x)?;
        self.setting.set(PropertyKey::ResolutionY, y)
    }

    /// Set the qualitative label of the selected option
    pub fn set_qualitative(&self, value: PageQualitativeResolution) -> Result<()> {
        self.setting
            .set(PropertyKey::QualitativeResolution, value.code())
    }

    /// Remove the feature
    pub fn clear(&self) {
        self.setting.clear()
    }

    /// Untyped view
    pub fn setting(&self) -> &FeatureSetting {
        &self.setting
    }
}

/// Page scaling setting, in percent
#[derive(Debug, Clone)]
pub struct ScalingSetting {
    setting: FeatureSetting,
}

impl ScalingSetting {
    pub(crate) fn new(setting: FeatureSetting) -> Self {
        Self { setting }
    }

    /// Scaling mode
    pub fn value(&self) -> Option<PageScaling> {
        PageScaling::from_code(self.setting.get(PropertyKey::Value))
    }

    /// Horizontal scale of a custom scaling
    pub fn scale_width(&self) -> i32 {
        self.setting.get(PropertyKey::ScaleWidth)
    }

    /// Vertical scale of a custom scaling
    pub fn scale_height(&self) -> i32 {
        self.setting.get(PropertyKey::ScaleHeight)
    }

    /// Scale of a square scaling
    pub fn scale(&self) -> i32 {
        self.setting.get(PropertyKey::Scale)
    }

    /// Turn scaling off
    pub fn set_none(&self) -> Result<()> {
        self.setting.clear();
        self.setting
            .set(PropertyKey::Value, PageScaling::NoScaling.code())
    }

    /// Scale each axis independently
    pub fn set_custom(&self, width: i32, height: i32) -> Result<()> {
        self.setting.validate(PropertyKey::ScaleWidth, width)?;
        self.setting.validate(PropertyKey::ScaleHeight, height)?;
        self.setting.clear();
        self.setting.set(PropertyKey::Value, PageScaling::Custom.code())?;
        self.setting.set(PropertyKey::ScaleWidth, width)?;
        self.setting.set(PropertyKey::ScaleHeight, height)
    }

    /// Scale both axes by the same percentage
    pub fn set_custom_square(&self, scale: i32) -> Result<()> {
        self.setting.validate(PropertyKey::Scale, scale)?;
        self.setting.clear();
        self.setting
            .set(PropertyKey::Value, PageScaling::CustomSquare.code())?;
        self.setting.set(PropertyKey::Scale, scale)
    }

    /// Remove the feature and its parameters
    pub fn clear(&self) {
        self.setting.clear()
    }

    /// Untyped view
    pub fn setting(&self) -> &FeatureSetting {
        &self.setting
    }
}
