//! Resource location resolution
//!
//! Capabilities and tickets are read either from the file system or from
//! bytes already held in memory (for instance a provider response).

use std::path::PathBuf;

/// Resource location - a file path or an in-memory buffer
#[derive(Debug, Clone)]
pub enum Location {
    /// File system path
    Path(PathBuf),
    /// In-memory document bytes, with a label used in diagnostics
    Memory {
        /// Label naming the buffer in error messages
        label: String,
        /// Document bytes
        bytes: Vec<u8>,
    },
}

impl Location {
    /// Create a location for a file path
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Location::Path(path.into())
    }

    /// Create a location for an in-memory buffer
    pub fn memory(label: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Location::Memory {
            label: label.into(),
            bytes: bytes.into(),
        }
    }

    /// Get the location as a display string
    pub fn as_str(&self) -> String {
        match self {
            Location::Path(p) => p.to_string_lossy().to_string(),
            Location::Memory { label, .. } => format!("<memory:{}>", label),
        }
    }

    /// Check if this is a local file
    pub fn is_file(&self) -> bool {
        matches!(self, Location::Path(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_from_path() {
        let loc = Location::path("/tmp/ticket.xml");
        assert!(loc.is_file());
        assert_eq!(loc.as_str(), "/tmp/ticket.xml");
    }

    #[test]
    fn test_location_memory_label() {
        let loc = Location::memory("provider", b"<a/>".to_vec());
        assert!(!loc.is_file());
        assert_eq!(loc.as_str(), "<memory:provider>");
    }
}
