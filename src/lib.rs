//! # printschema
//!
//! Print Schema capabilities and print tickets for Rust.
//!
//! ## Features
//!
//! - Typed binding of PrintCapabilities documents
//! - Editable PrintTicket documents with typed setting views
//! - Namespace repair for tickets that omit the standard prefixes
//! - DEVMODE binary codec
//! - Provider facade with an in-process reference provider
//! - Protection against oversized or deeply nested XML
//!
//! ## Example
//!
//! ```rust
//! use printschema::PrintTicket;
//! use printschema::schema::enums::Duplexing;
//!
//! let ticket = PrintTicket::new();
//! ticket.duplex().set_value(Duplexing::TwoSidedLongEdge)?;
//! ticket.copies().set_value(2)?;
//!
//! let xml = ticket.to_xml_string()?;
//! let reparsed = PrintTicket::parse(xml.as_bytes())?;
//! assert_eq!(reparsed.copies().value(), 2);
//! # Ok::<(), printschema::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;

// XML utilities
pub mod namespaces;
pub mod names;
pub mod locations;

// Resource loading
pub mod loaders;
pub mod documents;

// Print Schema
pub mod schema;
pub mod units;
pub mod capabilities;
pub mod editor;
pub mod ticket;

// Binary settings and provider boundary
pub mod devmode;
pub mod provider;

// Re-exports for convenience
pub use capabilities::PrintCapabilities;
pub use devmode::DevMode;
pub use error::{Error, Result};
pub use limits::Limits;
pub use provider::{InProcessProvider, PrintTicketConverter};
pub use ticket::PrintTicket;

/// Version of the printschema library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Print Schema framework namespace
pub const PSF_NAMESPACE: &str =
    "http://schemas.microsoft.com/windows/2003/08/printing/printschemaframework";

/// Print Schema keywords namespace
pub const PSK_NAMESPACE: &str =
    "http://schemas.microsoft.com/windows/2003/08/printing/printschemakeywords";

/// XML Schema instance namespace
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// XML Schema namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";
