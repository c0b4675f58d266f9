//! XML name validation and utilities
//!
//! Print Schema keywords and generated namespace prefixes must be NCNames;
//! `name` attribute values are QNames.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static NCNAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{2FF}\u{370}-\u{37D}][A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{2FF}\u{370}-\u{37D}\-\.0-9\u{B7}]*$")
        .unwrap()
});

/// Check if a string is a valid NCName (non-colonized name)
pub fn is_valid_ncname(name: &str) -> bool {
    NCNAME.is_match(name)
}

/// Check if a string is a valid QName (qualified name)
pub fn is_valid_qname(name: &str) -> bool {
    match name.split_once(':') {
        Some((prefix, local)) => is_valid_ncname(prefix) && is_valid_ncname(local),
        None => is_valid_ncname(name),
    }
}

/// Validate an NCName and return an error if invalid
pub fn validate_ncname(name: &str) -> Result<()> {
    if is_valid_ncname(name) {
        Ok(())
    } else {
        Err(Error::Name(format!("Invalid NCName: '{}'", name)))
    }
}

/// Validate a QName and return an error if invalid
pub fn validate_qname(name: &str) -> Result<()> {
    if is_valid_qname(name) {
        Ok(())
    } else {
        Err(Error::Name(format!("Invalid QName: '{}'", name)))
    }
}

/// Split a QName into prefix and local name
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    if let Some((prefix, local)) = qname.split_once(':') {
        (Some(prefix), local)
    } else {
        (None, qname)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_ncname() {
        assert!(is_valid_ncname("JobDuplexAllDocumentsContiguously"));
        assert!(is_valid_ncname("xsi0000"));
        assert!(is_valid_ncname("_private"));

        assert!(!is_valid_ncname(""));
        assert!(!is_valid_ncname("0000xsi"));
        assert!(!is_valid_ncname("psk:Portrait"));
    }

    #[test]
    fn test_is_valid_qname() {
        assert!(is_valid_qname("psk:Portrait"));
        assert!(is_valid_qname("Portrait"));

        assert!(!is_valid_qname(""));
        assert!(!is_valid_qname(":Portrait"));
        assert!(!is_valid_qname("psk:"));
    }

    #[test]
    fn test_split_qname() {
        assert_eq!(split_qname("Portrait"), (None, "Portrait"));
        assert_eq!(split_qname("psk:Portrait"), (Some("psk"), "Portrait"));
    }

    #[test]
    fn test_validate() {
        assert!(validate_ncname("psk").is_ok());
        assert!(validate_qname("1:a").is_err());
    }
}
