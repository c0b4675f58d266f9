//! PrintTicket object model
//!
//! A [`PrintTicket`] owns its mutable document. Settings are lightweight
//! views created on first access and cached per feature, so asking twice
//! for the same feature hands out views of the same identity. Every view
//! re-locates its element on access; views stay valid across edits made
//! through other views.
//!
//! # Example
//!
//! ```
//! use printschema::schema::enums::Duplexing;
//! use printschema::ticket::PrintTicket;
//!
//! let ticket = PrintTicket::new();
//! ticket.duplex().set_value(Duplexing::TwoSidedLongEdge).unwrap();
//! ticket.copies().set_value(3).unwrap();
//!
//! let saved = ticket.to_bytes().unwrap();
//! let reparsed = PrintTicket::parse(&saved).unwrap();
//! assert_eq!(reparsed.duplex().value(), Some(Duplexing::TwoSidedLongEdge));
//! assert_eq!(reparsed.copies().value(), 3);
//! ```

pub mod property_map;
pub mod setting;
pub mod settings;

pub use property_map::{FeatureDef, PropertyKey, PropertyMapEntry, TicketFeature, ValueKind};
pub use setting::{FeatureSetting, JobCopiesSetting, SharedDocument};
pub use settings::{EnumSetting, MediaSizeSetting, NUpSetting, ResolutionSetting, ScalingSetting};

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::debug;

use crate::documents::{Document, Element};
use crate::editor::{check_and_add_missing_std_namespaces, check_is_well_formed_print_ticket};
use crate::error::Result;
use crate::limits::Limits;
use crate::namespaces::{NamespaceContext, QName};
use crate::schema::enums::{
    Collation, Duplexing, OutputColor, PageMediaType, PageOrientation, Stapling,
};
use crate::schema::{attrs, elements, SchemaEnum, SCHEMA_VERSION};
use crate::{PSF_NAMESPACE, PSK_NAMESPACE, XSD_NAMESPACE, XSI_NAMESPACE};

/// Editable PrintTicket
pub struct PrintTicket {
    document: SharedDocument,
    settings: RefCell<IndexMap<TicketFeature, FeatureSetting>>,
    limits: Limits,
}

impl fmt::Debug for PrintTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrintTicket")
            .field("root", &self.document.borrow().root.qualified_name())
            .field("cached_settings", &self.settings.borrow().len())
            .finish()
    }
}

impl Default for PrintTicket {
    fn default() -> Self {
        Self::new()
    }
}

impl PrintTicket {
    /// Empty ticket declaring the framework and standard namespaces
    pub fn new() -> Self {
        let mut root = Element::new(
            Some("psf"),
            QName::namespaced(PSF_NAMESPACE, elements::PRINT_TICKET),
        );
        let mut namespaces = NamespaceContext::new();
        namespaces.add_prefix("psf", PSF_NAMESPACE);
        namespaces.add_prefix("psk", PSK_NAMESPACE);
        namespaces.add_prefix("xsi", XSI_NAMESPACE);
        namespaces.add_prefix("xsd", XSD_NAMESPACE);
        root.namespaces = namespaces;
        root.set_attribute(attrs::VERSION, SCHEMA_VERSION.to_string());
        Self::with_document(Document::new(root), Limits::default())
    }

    /// Parse a ticket with default limits
    pub fn parse(xml: &[u8]) -> Result<Self> {
        Self::parse_with_limits(xml, &Limits::default())
    }

    /// Parse a ticket
    ///
    /// The document is checked for a well-formed ticket root, then the
    /// keyword, xsi and xsd namespaces are declared at the root if missing.
    pub fn parse_with_limits(xml: &[u8], limits: &Limits) -> Result<Self> {
        let document = Document::parse_with_limits(xml, limits)?;
        Self::from_document(document, limits)
    }

    /// Take ownership of a parsed document
    pub fn from_document(mut document: Document, limits: &Limits) -> Result<Self> {
        check_is_well_formed_print_ticket(&document)?;
        let added = check_and_add_missing_std_namespaces(&mut document, limits)?;
        if !added.is_empty() {
            debug!(?added, "ticket namespaces completed");
        }
        Ok(Self::with_document(document, limits.clone()))
    }

    fn with_document(document: Document, limits: Limits) -> Self {
        Self {
            document: Rc::new(RefCell::new(document)),
            settings: RefCell::new(IndexMap::new()),
            limits,
        }
    }

    /// Limits the ticket was parsed with
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Borrow the underlying document
    pub fn document(&self) -> Ref<'_, Document> {
        self.document.borrow()
    }

    pub(crate) fn document_mut(&self) -> RefMut<'_, Document> {
        self.document.borrow_mut()
    }

    /// Serialize the ticket
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.document.borrow().to_bytes()
    }

    /// Serialize the ticket to a string
    pub fn to_xml_string(&self) -> Result<String> {
        self.document.borrow().to_xml_string()
    }

    /// Independent copy made by serializing and re-parsing
    pub fn clone_ticket(&self) -> Result<Self> {
        Self::parse_with_limits(&self.to_bytes()?, &self.limits)
    }

    /// Keywords of the root features present in the ticket
    pub fn feature_keywords(&self) -> Vec<String> {
        let document = self.document.borrow();
        let scope = document.root_scope();
        document
            .root
            .elements()
            .filter(|e| e.is(PSF_NAMESPACE, elements::FEATURE))
            .filter_map(|e| {
                let name = e.get_attribute(attrs::NAME)?;
                let qname = e.scope(&scope).resolve_value(name)?;
                qname.local_in(PSK_NAMESPACE).map(str::to_string)
            })
            .collect()
    }

    /// View of a feature, created on first access
    pub fn setting(&self, feature: TicketFeature) -> FeatureSetting {
        self.settings
            .borrow_mut()
            .entry(feature)
            .or_insert_with(|| FeatureSetting::new(self.document.clone(), feature.def()))
            .clone()
    }

    fn enum_setting<T: SchemaEnum>(&self, feature: TicketFeature) -> EnumSetting<T> {
        EnumSetting::new(self.setting(feature))
    }

    /// Duplex setting
    pub fn duplex(&self) -> EnumSetting<Duplexing> {
        self.enum_setting(TicketFeature::JobDuplex)
    }

    /// Collation setting
    pub fn collate(&self) -> EnumSetting<Collation> {
        self.enum_setting(TicketFeature::JobCollate)
    }

    /// Orientation setting
    pub fn orientation(&self) -> EnumSetting<PageOrientation> {
        self.enum_setting(TicketFeature::PageOrientation)
    }

    /// Output color setting
    pub fn output_color(&self) -> EnumSetting<OutputColor> {
        self.enum_setting(TicketFeature::PageOutputColor)
    }

    /// Stapling setting
    pub fn staple(&self) -> EnumSetting<Stapling> {
        self.enum_setting(TicketFeature::JobStaple)
    }

    /// Media type setting
    pub fn media_type(&self) -> EnumSetting<PageMediaType> {
        self.enum_setting(TicketFeature::PageMediaType)
    }

    /// N-up setting
    pub fn nup(&self) -> NUpSetting {
        NUpSetting::new(
            self.setting(TicketFeature::JobNUp),
            self.enum_setting(TicketFeature::NUpPresentationDirection),
        )
    }

    /// Media size setting
    pub fn media_size(&self) -> MediaSizeSetting {
        MediaSizeSetting::new(self.setting(TicketFeature::PageMediaSize))
    }

    /// Resolution setting
    pub fn resolution(&self) -> ResolutionSetting {
        ResolutionSetting::new(self.setting(TicketFeature::PageResolution))
    }

    /// Scaling setting
    pub fn scaling(&self) -> ScalingSetting {
        ScalingSetting::new(self.setting(TicketFeature::PageScaling))
    }

    /// Job copy count
    pub fn copies(&self) -> JobCopiesSetting {
        JobCopiesSetting::new(self.document.clone())
    }
}
