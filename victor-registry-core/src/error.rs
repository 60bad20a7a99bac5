use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a run.
///
/// Everything a rule can detect is a [`crate::Violation`] instead; only the
/// conditions that make further checking impossible end up here.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("index.json not found at {0}")]
    IndexNotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    IndexUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    InvalidIndexJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} must contain a JSON object at the top level")]
    IndexNotAnObject(PathBuf),

    #[error("{path} does not match the index schema (run validate-index first): {source}")]
    IndexSchema {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Package directory not found: {0}")]
    PackageDirNotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to write {path}: {source}")]
    IndexWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
