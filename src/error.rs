//! Error types for printschema
//!
//! This module defines the error taxonomy shared by the capability binder,
//! the ticket editor and the provider facade. Per-value content errors have
//! no variant: value decoders return `Option` and leave the field
//! at its unspecified sentinel instead of failing.

use std::fmt;
use thiserror::Error;

use crate::devmode::DevModeError;

/// Result type alias using printschema Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for printschema operations
#[derive(Error, Debug)]
pub enum Error {
    /// The underlying XML is not well formed
    #[error("malformed XML: {0}")]
    MalformedXml(String),

    /// Well-formed XML that violates Print Schema structure
    #[error("malformed print schema document: {0}")]
    Format(#[from] FormatError),

    /// A value passed to a setter or constructor is outside its domain
    #[error("argument '{parameter}' out of range: {message}")]
    ArgumentOutOfRange {
        /// Name of the offending argument
        parameter: String,
        /// Human readable description of the accepted domain
        message: String,
    },

    /// A required argument is missing or empty
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No free prefix could be generated for a namespace declaration
    #[error("namespace injection failed: {0}")]
    NamespaceInjection(String),

    /// The object has released its provider binding
    #[error("{0} has been released")]
    Disposed(&'static str),

    /// A thread-affine object was used from a thread other than its owner
    #[error("the calling thread cannot access this object because a different thread owns it")]
    InvalidThreadAccess,

    /// Opaque failure reported by the print provider
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// DEVMODE buffer could not be decoded
    #[error("DEVMODE error: {0}")]
    DevMode(#[from] DevModeError),

    /// Namespace error
    #[error("namespace error: {0}")]
    Namespace(String),

    /// Name error (invalid XML name)
    #[error("name error: {0}")]
    Name(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// Resource loading error
    #[error("resource error: {0}")]
    Resource(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for an [`Error::ArgumentOutOfRange`]
    pub fn out_of_range(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ArgumentOutOfRange {
            parameter: parameter.into(),
            message: message.into(),
        }
    }
}

/// Print Schema structural error with context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError {
    /// Error message
    pub message: String,
    /// Qualified element name implicated by the error
    pub element: Option<String>,
    /// Attribute name implicated by the error
    pub attribute: Option<String>,
}

impl FormatError {
    /// Create a new format error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            element: None,
            attribute: None,
        }
    }

    /// Set the element the error refers to
    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    /// Set the attribute the error refers to
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref element) = self.element {
            write!(f, " (element: {})", element)?;
        }

        if let Some(ref attribute) = self.attribute {
            write!(f, " (attribute: {})", attribute)?;
        }

        Ok(())
    }
}

impl std::error::Error for FormatError {}

/// Failure reported by a print provider implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("provider failed during {operation}: {message}")]
pub struct ProviderError {
    /// Provider operation that failed
    pub operation: &'static str,
    /// Provider supplied description
    pub message: String,
}

impl ProviderError {
    /// Create a new provider error
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}
