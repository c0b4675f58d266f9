//! Resource loading utilities
//!
//! This module loads capabilities and ticket documents from a [`Location`]
//! while enforcing the configured size limit.

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::locations::Location;
use std::fs;
use tracing::debug;

/// Resource loader for capabilities and tickets
#[derive(Debug, Default)]
pub struct Loader {
    /// Resource limits
    limits: Limits,
}

impl Loader {
    /// Create a new loader with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Limits applied by this loader
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Load a resource as bytes
    pub fn load_bytes(&self, location: &Location) -> Result<Vec<u8>> {
        let content = match location {
            Location::Path(path) => fs::read(path).map_err(|e| {
                Error::Resource(format!("Failed to read file '{}': {}", path.display(), e))
            })?,
            Location::Memory { bytes, .. } => bytes.clone(),
        };

        self.limits.check_xml_size(content.len())?;
        debug!(location = %location.as_str(), size = content.len(), "loaded resource");

        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "<root>test</root>").unwrap();

        let location = Location::path(file.path());
        let content = Loader::new().load_bytes(&location).unwrap();

        assert!(String::from_utf8(content).unwrap().contains("<root>test</root>"));
    }

    #[test]
    fn test_load_from_memory() {
        let location = Location::memory("inline", b"<root/>".to_vec());
        let content = Loader::new().load_bytes(&location).unwrap();

        assert_eq!(content, b"<root/>");
    }

    #[test]
    fn test_missing_file() {
        let location = Location::path("/definitely/not/here.xml");
        let result = Loader::new().load_bytes(&location);

        assert!(matches!(result, Err(Error::Resource(_))));
    }

    #[test]
    fn test_size_limit() {
        let mut file = NamedTempFile::new().unwrap();
        let large_content = "x".repeat(2 * 1024 * 1024); // 2 MB
        write!(file, "{}", large_content).unwrap();

        let location = Location::path(file.path());
        let loader = Loader::new().with_limits(Limits::strict());
        let result = loader.load_bytes(&location);

        // Strict limits (1 MB max) should reject a 2 MB file
        assert!(matches!(result, Err(Error::LimitExceeded(_))));
    }
}
