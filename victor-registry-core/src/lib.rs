//! Victor registry library exports
//!
//! Integrity checks for the vertical registry: the central `index.json`
//! and the package directories it points at.

pub mod catalog;
pub mod config;
pub mod consistency;
pub mod error;
pub mod loader;
pub mod report;
pub mod schema;
pub mod sync;
pub mod validator;
pub mod violation;

pub use config::RegistryConfig;
pub use error::{RegistryError, Result};
pub use report::{ReportKind, ValidationReport};
pub use violation::{Scope, Violation};
