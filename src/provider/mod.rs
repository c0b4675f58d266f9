//! Print provider boundary
//!
//! [`PrintTicketProvider`] is the seam between the facade and whatever
//! actually talks to a print driver. [`PrintTicketConverter`] orchestrates a
//! provider with lifecycle and thread checks, and [`InProcessProvider`] is a
//! complete provider that works from a capabilities document and default
//! DEVMODEs without any driver.

pub mod converter;
pub mod reference;

pub use converter::{PrintTicketConverter, MAX_SUPPORTED_VERSION};
pub use reference::InProcessProvider;

use std::fmt;

use tracing::debug;

use crate::documents::{Document, Element, Node};
use crate::error::{Error, ProviderError, Result};
use crate::schema::{attrs, elements};
use crate::{PSF_NAMESPACE, PSK_NAMESPACE};

/// Keyword tier a ticket operation covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrintTicketScope {
    /// `Page*` settings only
    Page,
    /// `Page*` and `Document*` settings
    Document,
    /// Every setting
    #[default]
    Job,
}

impl TryFrom<i32> for PrintTicketScope {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(PrintTicketScope::Page),
            1 => Ok(PrintTicketScope::Document),
            2 => Ok(PrintTicketScope::Job),
            other => Err(Error::out_of_range(
                "scope",
                format!("scope must be 0 (page), 1 (document) or 2 (job), got {}", other),
            )),
        }
    }
}

impl fmt::Display for PrintTicketScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrintTicketScope::Page => f.write_str("page"),
            PrintTicketScope::Document => f.write_str("document"),
            PrintTicketScope::Job => f.write_str("job"),
        }
    }
}

impl PrintTicketScope {
    /// Whether a root keyword belongs to this scope
    ///
    /// `Job*` keywords need job scope, `Document*` keywords document or job
    /// scope; everything else is always included.
    pub fn includes(self, keyword: &str) -> bool {
        if keyword.starts_with("Job") {
            self == PrintTicketScope::Job
        } else if keyword.starts_with("Document") {
            self != PrintTicketScope::Page
        } else {
            true
        }
    }
}

/// Which default DEVMODE a ticket is applied on top of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseDevModeType {
    /// The user's default settings
    UserDefault,
    /// The printer's default settings
    PrinterDefault,
}

/// Outcome of a merge-and-validate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictStatus {
    /// The merged ticket was valid as is
    NoConflict,
    /// Settings were changed to make the ticket valid
    ConflictResolved,
}

/// Provider of ticket services for one device
///
/// Implementations report failures as [`ProviderError`]; the facade passes
/// them through unchanged.
pub trait PrintTicketProvider {
    /// Capabilities document, optionally relative to a base ticket
    fn get_capabilities(
        &mut self,
        base_ticket: Option<&[u8]>,
    ) -> std::result::Result<Vec<u8>, ProviderError>;

    /// Overlay `delta` on `base` and make the result valid for the device
    fn merge_and_validate(
        &mut self,
        base_ticket: &[u8],
        delta_ticket: Option<&[u8]>,
        scope: PrintTicketScope,
    ) -> std::result::Result<(Vec<u8>, ConflictStatus), ProviderError>;

    /// Ticket equivalent to a DEVMODE buffer
    fn devmode_to_ticket(
        &mut self,
        devmode: &[u8],
        scope: PrintTicketScope,
    ) -> std::result::Result<Vec<u8>, ProviderError>;

    /// DEVMODE buffer equivalent to a ticket
    fn ticket_to_devmode(
        &mut self,
        ticket: &[u8],
        base: BaseDevModeType,
        scope: PrintTicketScope,
    ) -> std::result::Result<Vec<u8>, ProviderError>;

    /// Release the device binding; called once by the facade
    fn release(&mut self) {}
}

/// Keyword the root child's `name` resolves to
fn root_keyword(document: &Document, child: &Element) -> Option<String> {
    let name = child.get_attribute(attrs::NAME)?;
    child
        .scope(&document.root_scope())
        .resolve_value(name)
        .and_then(|q| q.local_in(PSK_NAMESPACE).map(str::to_string))
}

/// Remove root settings outside `scope`, returning the number removed
pub(crate) fn restrict_to_scope(document: &mut Document, scope: PrintTicketScope) -> usize {
    let keep: Vec<bool> = document
        .root
        .children
        .iter()
        .map(|child| match child {
            Node::Element(e) if e.namespace() == Some(PSF_NAMESPACE) => {
                match e.local_name() {
                    elements::FEATURE | elements::PARAMETER_INIT | elements::PROPERTY => {
                        root_keyword(document, e).map_or(true, |k| scope.includes(&k))
                    }
                    _ => true,
                }
            }
            _ => true,
        })
        .collect();

    let mut flags = keep.iter();
    document
        .root
        .children
        .retain(|_| flags.next().copied().unwrap_or(true));
    let removed = keep.iter().filter(|k| !**k).count();
    if removed > 0 {
        debug!(%scope, removed, "dropped settings outside scope");
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_from_raw() {
        assert_eq!(PrintTicketScope::try_from(0).unwrap(), PrintTicketScope::Page);
        assert_eq!(PrintTicketScope::try_from(2).unwrap(), PrintTicketScope::Job);
        assert!(matches!(
            PrintTicketScope::try_from(3),
            Err(Error::ArgumentOutOfRange { .. })
        ));
        assert!(PrintTicketScope::try_from(-1).is_err());
    }

    #[test]
    fn test_scope_includes() {
        use PrintTicketScope::*;
        assert!(Job.includes("JobCopiesAllDocuments"));
        assert!(!Document.includes("JobCopiesAllDocuments"));
        assert!(Document.includes("DocumentCollate"));
        assert!(!Page.includes("DocumentCollate"));
        assert!(Page.includes("PageMediaSize"));
        assert!(Page.includes("VendorSetting"));
    }

    #[test]
    fn test_restrict_to_scope() {
        let xml = r#"<psf:PrintTicket version="1"
            xmlns:psf="http://schemas.microsoft.com/windows/2003/08/printing/printschemaframework"
            xmlns:psk="http://schemas.microsoft.com/windows/2003/08/printing/printschemakeywords">
            <psf:Feature name="psk:JobDuplexAllDocumentsContiguously"/>
            <psf:Feature name="psk:PageOrientation"/>
            <psf:ParameterInit name="psk:JobCopiesAllDocuments"/>
        </psf:PrintTicket>"#;
        let mut doc = Document::from_string(xml).unwrap();
        assert_eq!(restrict_to_scope(&mut doc, PrintTicketScope::Job), 0);
        assert_eq!(restrict_to_scope(&mut doc, PrintTicketScope::Page), 2);
        assert_eq!(doc.root.elements().count(), 1);
    }
}
