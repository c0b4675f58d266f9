//! In-process reference provider
//!
//! Serves a fixed capabilities document and a pair of default DEVMODEs.
//! Merging overlays the delta's root settings onto the base ticket, drops
//! settings outside the requested scope and then repairs the result against
//! the capabilities. DEVMODE conversion maps the common public fields.

use tracing::{debug, info};

use super::{
    restrict_to_scope, BaseDevModeType, ConflictStatus, PrintTicketProvider, PrintTicketScope,
};
use crate::capabilities::{CapabilityFeature, CapabilityName, ParameterName, PrintCapabilities};
use crate::devmode::{
    consts, micron_to_tenth_mm, paper_by_code, paper_by_media, tenth_mm_to_micron, DevMode,
    DevModeFields,
};
use crate::documents::{Document, Node};
use crate::editor::remove_all_schema_elements_with_name_attr;
use crate::error::{Error, ProviderError, Result};
use crate::limits::Limits;
use crate::schema::enums::{
    Collation, Duplexing, OutputColor, PageMediaType, PageOrientation, PageQualitativeResolution,
    PageScaling,
};
use crate::schema::{attrs, elements, SchemaEnum, UNSPECIFIED_INT};
use crate::ticket::setting::{is_feature_of, read_parameter_init, write_parameter_init};
use crate::ticket::{EnumSetting, PrintTicket, TicketFeature};
use crate::{PSF_NAMESPACE, PSK_NAMESPACE};

fn failure(operation: &'static str) -> impl Fn(Error) -> ProviderError {
    move |e| ProviderError::new(operation, e.to_string())
}

/// Provider backed by an in-memory capabilities document
#[derive(Debug, Clone)]
pub struct InProcessProvider {
    device_name: String,
    capabilities: Vec<u8>,
    user_default: DevMode,
    printer_default: DevMode,
    limits: Limits,
}

impl InProcessProvider {
    /// Provider for `device_name` serving `capabilities`
    ///
    /// The capabilities document is parsed once to reject bad input early.
    pub fn new(device_name: &str, capabilities: Vec<u8>) -> Result<Self> {
        Self::with_limits(device_name, capabilities, Limits::default())
    }

    /// Provider applying `limits` to every document it reads
    pub fn with_limits(device_name: &str, capabilities: Vec<u8>, limits: Limits) -> Result<Self> {
        PrintCapabilities::parse_with_limits(&capabilities, &limits)?;
        Ok(Self {
            device_name: device_name.to_string(),
            capabilities,
            user_default: DevMode::new(device_name),
            printer_default: DevMode::new(device_name),
            limits,
        })
    }

    /// Replace the user default DEVMODE
    pub fn set_user_default(&mut self, devmode: DevMode) {
        self.user_default = devmode;
    }

    /// Replace the printer default DEVMODE
    pub fn set_printer_default(&mut self, devmode: DevMode) {
        self.printer_default = devmode;
    }

    /// Device served by this provider
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    fn parsed_capabilities(&self) -> Result<PrintCapabilities> {
        PrintCapabilities::parse_with_limits(&self.capabilities, &self.limits)
    }

    fn parse_ticket(&self, xml: &[u8]) -> Result<PrintTicket> {
        PrintTicket::parse_with_limits(xml, &self.limits)
    }

    fn merge(
        &self,
        base: &[u8],
        delta: Option<&[u8]>,
        scope: PrintTicketScope,
    ) -> Result<(Vec<u8>, ConflictStatus)> {
        let ticket = self.parse_ticket(base)?;
        if let Some(delta) = delta {
            let delta = self.parse_ticket(delta)?;
            let replaced = overlay(&mut ticket.document_mut(), &delta.document());
            debug!(replaced, "delta overlaid");
        }
        restrict_to_scope(&mut ticket.document_mut(), scope);

        let capabilities = self.parsed_capabilities()?;
        let status = if validate_against(&ticket, &capabilities)? {
            ConflictStatus::ConflictResolved
        } else {
            ConflictStatus::NoConflict
        };
        Ok((ticket.to_bytes()?, status))
    }

    fn to_ticket(&self, devmode: &[u8], scope: PrintTicketScope) -> Result<Vec<u8>> {
        let devmode = DevMode::decode(devmode)?;
        let ticket = PrintTicket::new();
        apply_devmode(&ticket, &devmode)?;
        restrict_to_scope(&mut ticket.document_mut(), scope);
        ticket.to_bytes()
    }

    fn to_devmode(
        &self,
        ticket: &[u8],
        base: BaseDevModeType,
        scope: PrintTicketScope,
    ) -> Result<Vec<u8>> {
        let ticket = self.parse_ticket(ticket)?;
        restrict_to_scope(&mut ticket.document_mut(), scope);
        let mut devmode = match base {
            BaseDevModeType::UserDefault => self.user_default.clone(),
            BaseDevModeType::PrinterDefault => self.printer_default.clone(),
        };
        apply_ticket(&mut devmode, &ticket);
        Ok(devmode.encode()?.to_vec())
    }
}

impl PrintTicketProvider for InProcessProvider {
    fn get_capabilities(
        &mut self,
        base_ticket: Option<&[u8]>,
    ) -> std::result::Result<Vec<u8>, ProviderError> {
        if let Some(base) = base_ticket {
            self.parse_ticket(base).map_err(failure("get_capabilities"))?;
        }
        Ok(self.capabilities.clone())
    }

    fn merge_and_validate(
        &mut self,
        base_ticket: &[u8],
        delta_ticket: Option<&[u8]>,
        scope: PrintTicketScope,
    ) -> std::result::Result<(Vec<u8>, ConflictStatus), ProviderError> {
        self.merge(base_ticket, delta_ticket, scope)
            .map_err(failure("merge_and_validate"))
    }

    fn devmode_to_ticket(
        &mut self,
        devmode: &[u8],
        scope: PrintTicketScope,
    ) -> std::result::Result<Vec<u8>, ProviderError> {
        self.to_ticket(devmode, scope)
            .map_err(failure("devmode_to_ticket"))
    }

    fn ticket_to_devmode(
        &mut self,
        ticket: &[u8],
        base: BaseDevModeType,
        scope: PrintTicketScope,
    ) -> std::result::Result<Vec<u8>, ProviderError> {
        self.to_devmode(ticket, base, scope)
            .map_err(failure("ticket_to_devmode"))
    }

    fn release(&mut self) {
        debug!(device = %self.device_name, "in-process provider released");
    }
}

/// Replace base root settings with the delta's settings of the same kind
/// and name, returning how many were copied
fn overlay(base: &mut Document, delta: &Document) -> usize {
    let base_scope = base.root_scope();
    let delta_scope = delta.root_scope();
    let mut copied = 0;

    for child in delta.root.elements() {
        if child.namespace() != Some(PSF_NAMESPACE) {
            continue;
        }
        let Some(name) = child
            .get_attribute(attrs::NAME)
            .and_then(|v| child.scope(&delta_scope).resolve_value(v))
        else {
            continue;
        };
        remove_all_schema_elements_with_name_attr(
            &mut base.root,
            &base_scope,
            child.local_name(),
            Some(&name),
        );
        // a feature replaces its aliases too
        if child.is(PSF_NAMESPACE, elements::FEATURE) {
            let feature = name.local_in(PSK_NAMESPACE).and_then(TicketFeature::from_keyword);
            if let Some(feature) = feature {
                let def = feature.def();
                base.root.children.retain(|node| match node {
                    Node::Element(e) => !is_feature_of(e, &base_scope, def),
                    _ => true,
                });
            }
        }

        // keep the delta's prefixes meaningful under the base root
        let mut moved = child.clone();
        for (prefix, uri) in delta_scope.iter() {
            let bound = base_scope.get_namespace(prefix) == Some(uri.as_str());
            if !bound && !moved.namespaces.has_prefix(prefix) {
                moved.namespaces.add_prefix(prefix.clone(), uri.clone());
            }
        }
        if let Some(default) = delta_scope.get_default_namespace() {
            if base_scope.get_default_namespace() != Some(default)
                && moved.namespaces.get_default_namespace().is_none()
            {
                moved.namespaces.set_default_namespace(default);
            }
        }
        base.root.append_child(moved);
        copied += 1;
    }
    copied
}

/// Select the first supported option when the ticket's option is not offered
fn repair_option<T: SchemaEnum>(
    setting: &EnumSetting<T>,
    feature: Option<&dyn CapabilityFeature>,
) -> Result<bool> {
    let Some(feature) = feature else {
        return Ok(false);
    };
    let Some(selected) = setting.setting().option_keyword() else {
        return Ok(false);
    };
    let supported = feature.option_names();
    if supported.iter().any(|name| *name == selected) {
        return Ok(false);
    }
    let Some(replacement) = supported.iter().find_map(|name| T::from_keyword(name)) else {
        return Ok(false);
    };
    info!(
        feature = feature.keyword(),
        %selected,
        replacement = replacement.keyword(),
        "unsupported option replaced"
    );
    setting.set_value(replacement)?;
    Ok(true)
}

fn repair_media_size(ticket: &PrintTicket, capabilities: &PrintCapabilities) -> Result<bool> {
    let Some(feature) = capabilities.media_size() else {
        return Ok(false);
    };
    let media = ticket.media_size();
    let Some(selected) = media.setting().option_keyword() else {
        return Ok(false);
    };
    if feature.option_names().iter().any(|name| *name == selected) {
        return Ok(false);
    }
    let Some(replacement) = feature.options().iter().find(|o| !o.is_custom()) else {
        return Ok(false);
    };
    info!(
        %selected,
        replacement = replacement.value.keyword(),
        "unsupported media size replaced"
    );
    media.set_fixed_with_size(replacement.value, replacement.width, replacement.height)?;
    Ok(true)
}

fn repair_nup(ticket: &PrintTicket, capabilities: &PrintCapabilities) -> Result<bool> {
    let Some(feature) = capabilities.nup() else {
        return Ok(false);
    };
    let nup = ticket.nup();
    let pages = nup.pages_per_sheet();
    let offered = feature.pages_per_sheet();
    if pages == UNSPECIFIED_INT || offered.contains(&pages) {
        return Ok(false);
    }
    let Some(first) = offered.first().copied() else {
        return Ok(false);
    };
    info!(pages, replacement = first, "unsupported pages per sheet replaced");
    nup.set_pages_per_sheet(first)?;
    Ok(true)
}

/// Clamp every parameter initializer into the range its definition allows
fn clamp_parameters(ticket: &PrintTicket, capabilities: &PrintCapabilities) -> Result<bool> {
    let mut changed = false;
    let mut document = ticket.document_mut();
    for parameter in ParameterName::ALL {
        let (Some(value), Some(def)) = (
            read_parameter_init(&document.root, parameter),
            capabilities.parameter(parameter),
        ) else {
            continue;
        };
        let clamped = def.clamp(value);
        if clamped != value && clamped > 0 {
            info!(%parameter, value, clamped, "parameter clamped");
            write_parameter_init(&mut document.root, parameter, clamped)?;
            changed = true;
        }
    }
    Ok(changed)
}

/// Make the ticket consistent with the capabilities, returning whether
/// anything changed
fn validate_against(ticket: &PrintTicket, capabilities: &PrintCapabilities) -> Result<bool> {
    let results = [
        repair_option(&ticket.duplex(), capabilities.get(CapabilityName::JobDuplex))?,
        repair_option(&ticket.collate(), capabilities.get(CapabilityName::JobCollate))?,
        repair_option(
            &ticket.orientation(),
            capabilities.get(CapabilityName::PageOrientation),
        )?,
        repair_option(
            &ticket.output_color(),
            capabilities.get(CapabilityName::PageOutputColor),
        )?,
        repair_option(&ticket.staple(), capabilities.get(CapabilityName::JobStaple))?,
        repair_option(
            &ticket.media_type(),
            capabilities.get(CapabilityName::PageMediaType),
        )?,
        repair_media_size(ticket, capabilities)?,
        repair_nup(ticket, capabilities)?,
        clamp_parameters(ticket, capabilities)?,
    ];
    Ok(results.iter().any(|changed| *changed))
}

fn qualitative_from_devmode(quality: i16) -> Option<PageQualitativeResolution> {
    match quality {
        consts::RES_DRAFT | consts::RES_LOW => Some(PageQualitativeResolution::Draft),
        consts::RES_MEDIUM => Some(PageQualitativeResolution::Normal),
        consts::RES_HIGH => Some(PageQualitativeResolution::High),
        _ => None,
    }
}

fn qualitative_to_devmode(quality: PageQualitativeResolution) -> Option<i16> {
    match quality {
        PageQualitativeResolution::Draft => Some(consts::RES_DRAFT),
        PageQualitativeResolution::Normal => Some(consts::RES_MEDIUM),
        PageQualitativeResolution::High => Some(consts::RES_HIGH),
        _ => None,
    }
}

fn saturate(value: i32) -> i16 {
    value.clamp(0, i32::from(i16::MAX)) as i16
}

/// Write the initialized DEVMODE fields into the ticket
fn apply_devmode(ticket: &PrintTicket, dm: &DevMode) -> Result<()> {
    if dm.has(DevModeFields::ORIENTATION) {
        let orientation = match dm.orientation {
            consts::ORIENT_PORTRAIT => Some(PageOrientation::Portrait),
            consts::ORIENT_LANDSCAPE => Some(PageOrientation::Landscape),
            _ => None,
        };
        if let Some(orientation) = orientation {
            ticket.orientation().set_value(orientation)?;
        }
    }

    let paper = if dm.has(DevModeFields::PAPER_SIZE) {
        paper_by_code(dm.paper_size)
    } else {
        None
    };
    if let Some(paper) = paper {
        ticket
            .media_size()
            .set_fixed_with_size(paper.media, paper.width, paper.height)?;
    } else if dm.has(DevModeFields::PAPER_WIDTH | DevModeFields::PAPER_LENGTH)
        && dm.paper_width > 0
        && dm.paper_length > 0
    {
        ticket.media_size().set_custom(
            tenth_mm_to_micron(dm.paper_width),
            tenth_mm_to_micron(dm.paper_length),
        )?;
    }

    if dm.has(DevModeFields::SCALE) && dm.scale > 0 {
        if dm.scale == 100 {
            ticket.scaling().set_none()?;
        } else {
            ticket.scaling().set_custom_square(i32::from(dm.scale))?;
        }
    }

    if dm.has(DevModeFields::COPIES) && dm.copies > 0 {
        ticket.copies().set_value(i32::from(dm.copies))?;
    }

    if dm.has(DevModeFields::PRINT_QUALITY) {
        if dm.print_quality > 0 {
            let y = if dm.has(DevModeFields::Y_RESOLUTION) && dm.y_resolution > 0 {
                dm.y_resolution
            } else {
                dm.print_quality
            };
            ticket
                .resolution()
                .set_resolution(i32::from(dm.print_quality), i32::from(y))?;
        } else if let Some(quality) = qualitative_from_devmode(dm.print_quality) {
            ticket.resolution().set_qualitative(quality)?;
        }
    }

    if dm.has(DevModeFields::COLOR) {
        let color = match dm.color {
            consts::COLOR_COLOR => Some(OutputColor::Color),
            consts::COLOR_MONOCHROME => Some(OutputColor::Monochrome),
            _ => None,
        };
        if let Some(color) = color {
            ticket.output_color().set_value(color)?;
        }
    }

    if dm.has(DevModeFields::DUPLEX) {
        let duplex = match dm.duplex {
            consts::DUPLEX_SIMPLEX => Some(Duplexing::OneSided),
            consts::DUPLEX_VERTICAL => Some(Duplexing::TwoSidedLongEdge),
            consts::DUPLEX_HORIZONTAL => Some(Duplexing::TwoSidedShortEdge),
            _ => None,
        };
        if let Some(duplex) = duplex {
            ticket.duplex().set_value(duplex)?;
        }
    }

    if dm.has(DevModeFields::COLLATE) {
        let collate = match dm.collate {
            consts::COLLATE_TRUE => Collation::Collated,
            _ => Collation::Uncollated,
        };
        ticket.collate().set_value(collate)?;
    }

    if dm.has(DevModeFields::MEDIA_TYPE) {
        let media_type = match dm.media_type {
            consts::MEDIA_STANDARD => Some(PageMediaType::Plain),
            consts::MEDIA_TRANSPARENCY => Some(PageMediaType::Transparency),
            consts::MEDIA_GLOSSY => Some(PageMediaType::PhotographicGlossy),
            _ => None,
        };
        if let Some(media_type) = media_type {
            ticket.media_type().set_value(media_type)?;
        }
    }

    Ok(())
}

/// Overwrite the DEVMODE fields the ticket specifies
fn apply_ticket(dm: &mut DevMode, ticket: &PrintTicket) {
    if let Some(orientation) = ticket.orientation().value() {
        dm.orientation = match orientation {
            PageOrientation::Portrait | PageOrientation::ReversePortrait => consts::ORIENT_PORTRAIT,
            PageOrientation::Landscape | PageOrientation::ReverseLandscape => {
                consts::ORIENT_LANDSCAPE
            }
        };
        dm.fields |= DevModeFields::ORIENTATION;
    }

    let media = ticket.media_size();
    if let Some(name) = media.value() {
        if let Some(paper) = paper_by_media(name) {
            dm.paper_size = paper.code;
            dm.fields |= DevModeFields::PAPER_SIZE;
            dm.fields
                .remove(DevModeFields::PAPER_LENGTH | DevModeFields::PAPER_WIDTH);
        } else if media.width() != UNSPECIFIED_INT && media.height() != UNSPECIFIED_INT {
            dm.paper_size = consts::PAPER_USER;
            dm.paper_width = micron_to_tenth_mm(media.width());
            dm.paper_length = micron_to_tenth_mm(media.height());
            dm.fields |=
                DevModeFields::PAPER_SIZE | DevModeFields::PAPER_LENGTH | DevModeFields::PAPER_WIDTH;
        }
    }

    let scaling = ticket.scaling();
    let scale = match scaling.value() {
        Some(PageScaling::NoScaling) => 100,
        Some(PageScaling::CustomSquare) => scaling.scale(),
        Some(PageScaling::Custom) => scaling.scale_width(),
        None => UNSPECIFIED_INT,
    };
    if scale > 0 {
        dm.scale = saturate(scale);
        dm.fields |= DevModeFields::SCALE;
    }

    let copies = ticket.copies().value();
    if copies > 0 {
        dm.copies = saturate(copies);
        dm.fields |= DevModeFields::COPIES;
    }

    let resolution = ticket.resolution();
    if resolution.x() > 0 {
        dm.print_quality = saturate(resolution.x());
        dm.fields |= DevModeFields::PRINT_QUALITY;
        if resolution.y() > 0 {
            dm.y_resolution = saturate(resolution.y());
            dm.fields |= DevModeFields::Y_RESOLUTION;
        }
    } else if let Some(quality) = resolution.qualitative().and_then(qualitative_to_devmode) {
        dm.print_quality = quality;
        dm.fields |= DevModeFields::PRINT_QUALITY;
    }

    if let Some(color) = ticket.output_color().value() {
        dm.color = match color {
            OutputColor::Color => consts::COLOR_COLOR,
            OutputColor::Grayscale | OutputColor::Monochrome => consts::COLOR_MONOCHROME,
        };
        dm.fields |= DevModeFields::COLOR;
    }

    if let Some(duplex) = ticket.duplex().value() {
        dm.duplex = match duplex {
            Duplexing::OneSided => consts::DUPLEX_SIMPLEX,
            Duplexing::TwoSidedLongEdge => consts::DUPLEX_VERTICAL,
            Duplexing::TwoSidedShortEdge => consts::DUPLEX_HORIZONTAL,
        };
        dm.fields |= DevModeFields::DUPLEX;
    }

    if let Some(collate) = ticket.collate().value() {
        dm.collate = match collate {
            Collation::Collated => consts::COLLATE_TRUE,
            Collation::Uncollated => consts::COLLATE_FALSE,
        };
        dm.fields |= DevModeFields::COLLATE;
    }

    let media_type = ticket.media_type().value().and_then(|t| match t {
        PageMediaType::Plain => Some(consts::MEDIA_STANDARD),
        PageMediaType::Transparency => Some(consts::MEDIA_TRANSPARENCY),
        PageMediaType::PhotographicGlossy => Some(consts::MEDIA_GLOSSY),
        _ => None,
    });
    if let Some(media_type) = media_type {
        dm.media_type = media_type;
        dm.fields |= DevModeFields::MEDIA_TYPE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::enums::PageMediaSizeName;

    const CAPS: &str = r#"<psf:PrintCapabilities version="1"
        xmlns:psf="http://schemas.microsoft.com/windows/2003/08/printing/printschemaframework"
        xmlns:psk="http://schemas.microsoft.com/windows/2003/08/printing/printschemakeywords"
        xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
        xmlns:xsd="http://www.w3.org/2001/XMLSchema">
      <psf:Feature name="psk:JobDuplexAllDocumentsContiguously">
        <psf:Option name="psk:OneSided"/>
        <psf:Option name="psk:TwoSidedLongEdge"/>
      </psf:Feature>
      <psf:ParameterDef name="psk:JobCopiesAllDocuments">
        <psf:Property name="psf:DataType"><psf:Value xsi:type="xsd:QName">xsd:integer</psf:Value></psf:Property>
        <psf:Property name="psf:DefaultValue"><psf:Value xsi:type="xsd:integer">1</psf:Value></psf:Property>
        <psf:Property name="psf:MinValue"><psf:Value xsi:type="xsd:integer">1</psf:Value></psf:Property>
        <psf:Property name="psf:MaxValue"><psf:Value xsi:type="xsd:integer">99</psf:Value></psf:Property>
      </psf:ParameterDef>
    </psf:PrintCapabilities>"#;

    fn provider() -> InProcessProvider {
        InProcessProvider::new("Test Printer", CAPS.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn test_unsupported_option_is_replaced() {
        let base = PrintTicket::new();
        base.duplex().set_value(Duplexing::TwoSidedShortEdge).unwrap();
        base.copies().set_value(500).unwrap();

        let (merged, status) = provider()
            .merge(&base.to_bytes().unwrap(), None, PrintTicketScope::Job)
            .unwrap();
        assert_eq!(status, ConflictStatus::ConflictResolved);
        let merged = PrintTicket::parse(&merged).unwrap();
        assert_eq!(merged.duplex().value(), Some(Duplexing::OneSided));
        assert_eq!(merged.copies().value(), 99);
    }

    #[test]
    fn test_valid_ticket_has_no_conflict() {
        let base = PrintTicket::new();
        base.duplex().set_value(Duplexing::TwoSidedLongEdge).unwrap();
        base.orientation().set_value(PageOrientation::Portrait).unwrap();
        let (_, status) = provider()
            .merge(&base.to_bytes().unwrap(), None, PrintTicketScope::Job)
            .unwrap();
        assert_eq!(status, ConflictStatus::NoConflict);
    }

    #[test]
    fn test_overlay_replaces_by_name() {
        let base = PrintTicket::new();
        base.duplex().set_value(Duplexing::OneSided).unwrap();
        base.orientation().set_value(PageOrientation::Portrait).unwrap();

        let delta = r#"<p:PrintTicket version="1"
            xmlns:p="http://schemas.microsoft.com/windows/2003/08/printing/printschemaframework"
            xmlns:k="http://schemas.microsoft.com/windows/2003/08/printing/printschemakeywords">
            <p:Feature name="k:JobDuplexAllDocumentsContiguously">
              <p:Option name="k:TwoSidedLongEdge"/>
            </p:Feature>
        </p:PrintTicket>"#;
        let delta = PrintTicket::parse(delta.as_bytes()).unwrap();
        let copied = overlay(&mut base.document_mut(), &delta.document());
        assert_eq!(copied, 1);

        let merged = base.clone_ticket().unwrap();
        assert_eq!(merged.duplex().value(), Some(Duplexing::TwoSidedLongEdge));
        assert_eq!(merged.orientation().value(), Some(PageOrientation::Portrait));
        assert_eq!(merged.feature_keywords().len(), 2);
    }

    #[test]
    fn test_overlay_replaces_feature_aliases() {
        let base = PrintTicket::new();
        base.duplex().set_value(Duplexing::OneSided).unwrap();

        let delta = r#"<psf:PrintTicket version="1"
            xmlns:psf="http://schemas.microsoft.com/windows/2003/08/printing/printschemaframework"
            xmlns:psk="http://schemas.microsoft.com/windows/2003/08/printing/printschemakeywords">
            <psf:Feature name="psk:JobDuplex">
              <psf:Option name="psk:TwoSidedShortEdge"/>
            </psf:Feature>
        </psf:PrintTicket>"#;
        let delta = PrintTicket::parse(delta.as_bytes()).unwrap();
        assert_eq!(overlay(&mut base.document_mut(), &delta.document()), 1);

        let merged = base.clone_ticket().unwrap();
        assert_eq!(merged.feature_keywords(), vec!["JobDuplex".to_string()]);
        assert_eq!(merged.duplex().value(), Some(Duplexing::TwoSidedShortEdge));
    }

    #[test]
    fn test_devmode_ticket_mapping() {
        let mut dm = DevMode::new("Test Printer");
        dm.fields = DevModeFields::ORIENTATION
            | DevModeFields::PAPER_SIZE
            | DevModeFields::COPIES
            | DevModeFields::DUPLEX
            | DevModeFields::COLLATE
            | DevModeFields::PRINT_QUALITY
            | DevModeFields::Y_RESOLUTION;
        dm.orientation = consts::ORIENT_LANDSCAPE;
        dm.paper_size = 9;
        dm.copies = 2;
        dm.duplex = consts::DUPLEX_HORIZONTAL;
        dm.collate = consts::COLLATE_TRUE;
        dm.print_quality = 600;
        dm.y_resolution = 1200;

        let mut provider = provider();
        let ticket = provider
            .devmode_to_ticket(&dm.encode().unwrap(), PrintTicketScope::Job)
            .unwrap();
        let parsed = PrintTicket::parse(&ticket).unwrap();
        assert_eq!(parsed.orientation().value(), Some(PageOrientation::Landscape));
        assert_eq!(parsed.media_size().value(), Some(PageMediaSizeName::IsoA4));
        assert_eq!(parsed.media_size().width(), 210_000);
        assert_eq!(parsed.copies().value(), 2);
        assert_eq!(parsed.duplex().value(), Some(Duplexing::TwoSidedShortEdge));
        assert_eq!(parsed.resolution().y(), 1200);

        let back = provider
            .ticket_to_devmode(&ticket, BaseDevModeType::UserDefault, PrintTicketScope::Job)
            .unwrap();
        let back = DevMode::decode(&back).unwrap();
        assert_eq!(back.fields, dm.fields);
        assert_eq!(back.orientation, dm.orientation);
        assert_eq!(back.paper_size, 9);
        assert_eq!(back.copies, 2);
        assert_eq!(back.duplex, dm.duplex);
        assert_eq!(back.collate, dm.collate);
        assert_eq!(back.print_quality, 600);
        assert_eq!(back.y_resolution, 1200);
    }

    #[test]
    fn test_page_scope_drops_job_settings() {
        let mut dm = DevMode::new("Test Printer");
        dm.fields = DevModeFields::ORIENTATION | DevModeFields::COPIES | DevModeFields::DUPLEX;
        dm.orientation = consts::ORIENT_PORTRAIT;
        dm.copies = 4;
        dm.duplex = consts::DUPLEX_SIMPLEX;

        let ticket = provider()
            .devmode_to_ticket(&dm.encode().unwrap(), PrintTicketScope::Page)
            .unwrap();
        let parsed = PrintTicket::parse(&ticket).unwrap();
        assert_eq!(parsed.orientation().value(), Some(PageOrientation::Portrait));
        assert_eq!(parsed.copies().value(), UNSPECIFIED_INT);
        assert_eq!(parsed.duplex().value(), None);
    }

    #[test]
    fn test_custom_paper_size() {
        let mut dm = DevMode::new("Test Printer");
        dm.fields = DevModeFields::PAPER_WIDTH | DevModeFields::PAPER_LENGTH;
        dm.paper_width = 1000;
        dm.paper_length = 1500;
        let ticket = provider()
            .to_ticket(&dm.encode().unwrap(), PrintTicketScope::Job)
            .unwrap();
        let parsed = PrintTicket::parse(&ticket).unwrap();
        assert_eq!(
            parsed.media_size().value(),
            Some(PageMediaSizeName::CustomMediaSize)
        );
        assert_eq!(parsed.media_size().width(), 100_000);
        assert_eq!(parsed.media_size().height(), 150_000);

        let mut back = DevMode::new("Test Printer");
        apply_ticket(&mut back, &parsed);
        assert_eq!(back.paper_size, consts::PAPER_USER);
        assert_eq!(back.paper_width, 1000);
        assert_eq!(back.paper_length, 1500);
    }

    #[test]
    fn test_bad_input_is_a_provider_error() {
        let mut provider = provider();
        let err = provider.devmode_to_ticket(&[0; 8], PrintTicketScope::Job).unwrap_err();
        assert_eq!(err.operation, "devmode_to_ticket");
        let err = provider.get_capabilities(Some(b"<nope/>")).unwrap_err();
        assert_eq!(err.operation, "get_capabilities");
        assert!(provider.get_capabilities(None).is_ok());
    }
}
