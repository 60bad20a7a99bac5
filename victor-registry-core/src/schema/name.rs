//! Package name format
//!
//! Manifest names use underscores (`example_security`) while directories
//! may use hyphens (`example-security`); both spell the same identity.

use thiserror::Error;

use super::RESERVED_NAMES;

/// A way in which a package name is malformed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("Package name must be lowercase")]
    NotLowercase,

    #[error("Package name must start with a letter")]
    NotStartingWithLetter,

    #[error("Package name must contain only letters, numbers, underscores, or hyphens")]
    InvalidCharacters,

    #[error("Package name '{name}' conflicts with reserved name '{reserved}'")]
    Reserved { name: String, reserved: String },
}

/// Canonical identity of a package name: hyphens become underscores
pub fn normalize_name(name: &str) -> String {
    name.replace('-', "_")
}

/// Every format problem with `name`; empty when the name is acceptable
pub fn check_package_name(name: &str) -> Vec<NameError> {
    let mut errors = Vec::new();

    if name.to_lowercase() != name {
        errors.push(NameError::NotLowercase);
    }

    if !name.chars().next().is_some_and(char::is_alphabetic) {
        errors.push(NameError::NotStartingWithLetter);
    }

    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    {
        errors.push(NameError::InvalidCharacters);
    }

    let normalized = normalize_name(name);
    if RESERVED_NAMES.contains(&normalized.as_str()) {
        errors.push(NameError::Reserved {
            name: name.to_string(),
            reserved: normalized,
        });
    }

    errors
}
