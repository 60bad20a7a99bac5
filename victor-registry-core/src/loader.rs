//! Document loading
//!
//! Reads the index and package documents from disk into in-memory maps.
//! A missing index is fatal; a missing or malformed package document is
//! recorded as a [`LoadedDocument`] state so that the rules that do not
//! depend on it still run.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::config::RegistryConfig;
use crate::consistency::PackageIdentity;
use crate::error::{RegistryError, Result};
use crate::schema::fields::string_field;
use crate::schema::RequiredFile;

/// Outcome of reading one package document
#[derive(Debug, Clone, PartialEq)]
pub enum LoadedDocument<T> {
    /// File does not exist
    Missing,
    /// File exists but could not be read (permissions, encoding)
    Unreadable(String),
    /// File was read but is not valid syntax
    Malformed(String),
    Parsed(T),
}

impl<T> LoadedDocument<T> {
    pub fn parsed(&self) -> Option<&T> {
        match self {
            LoadedDocument::Parsed(doc) => Some(doc),
            _ => None,
        }
    }

    pub fn exists(&self) -> bool {
        !matches!(self, LoadedDocument::Missing)
    }
}

/// The three documents of a package directory
#[derive(Debug, Clone)]
pub struct PackageContent {
    /// Directory path as given
    pub dir: PathBuf,
    /// Directory name, used as the package identity on disk
    pub name: String,
    /// `victor-vertical.toml`, converted to a JSON map
    pub manifest: LoadedDocument<Map<String, Value>>,
    /// `metadata.json`
    pub metadata: LoadedDocument<Value>,
    /// `README.md`
    pub readme: LoadedDocument<String>,
}

impl PackageContent {
    /// Load a package directory, failing if it is not a directory
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Err(RegistryError::PackageDirNotFound(dir.to_path_buf()));
        }
        if !dir.is_dir() {
            return Err(RegistryError::NotADirectory(dir.to_path_buf()));
        }
        Ok(Self::read(dir))
    }

    /// Load whatever is present in `dir`
    pub fn read(dir: &Path) -> Self {
        debug!("Loading package directory: {}", dir.display());
        Self {
            dir: dir.to_path_buf(),
            name: directory_name(dir),
            manifest: load_manifest(&dir.join(RequiredFile::Manifest.file_name())),
            metadata: load_metadata(&dir.join(RequiredFile::Metadata.file_name())),
            readme: load_readme(&dir.join(RequiredFile::Readme.file_name())),
        }
    }

    /// `[vertical].name` of the manifest, when it is a string
    pub fn manifest_name(&self) -> Option<&str> {
        self.manifest
            .parsed()
            .and_then(|doc| doc.get("vertical"))
            .and_then(Value::as_object)
            .and_then(|vertical| string_field(vertical, "name"))
    }

    /// `name` of the metadata, when it is a string
    pub fn metadata_name(&self) -> Option<&str> {
        self.metadata
            .parsed()
            .and_then(Value::as_object)
            .and_then(|doc| string_field(doc, "name"))
    }

    /// Names to cross-check, once both manifest and metadata parsed
    pub fn identity(&self) -> Option<PackageIdentity<'_>> {
        if self.manifest.parsed().is_none() || self.metadata.parsed().is_none() {
            return None;
        }
        Some(PackageIdentity {
            directory: &self.name,
            manifest_name: self.manifest_name(),
            metadata_name: self.metadata_name(),
        })
    }
}

/// The index document plus every package directory it references
#[derive(Debug, Clone)]
pub struct IndexContent {
    pub config: RegistryConfig,
    pub path: PathBuf,
    pub document: Map<String, Value>,
    /// Loaded package directories, keyed by position in `verticals`
    pub packages: HashMap<usize, PackageContent>,
}

impl IndexContent {
    /// Load the index at the configured root
    pub fn load(config: &RegistryConfig) -> Result<Self> {
        let path = config.index_path();
        let document = load_index(&path)?;
        Ok(Self::from_document(config.clone(), path, document))
    }

    /// Build from an already-parsed index, loading referenced packages
    pub fn from_document(
        config: RegistryConfig,
        path: PathBuf,
        document: Map<String, Value>,
    ) -> Self {
        let mut packages = HashMap::new();

        if let Some(Value::Array(verticals)) = document.get("verticals") {
            for (position, entry) in verticals.iter().enumerate() {
                let Some(relative) = entry
                    .as_object()
                    .and_then(|e| string_field(e, "registry_entry"))
                else {
                    continue;
                };
                let dir = config.resolve(relative);
                if dir.is_dir() {
                    packages.insert(position, PackageContent::read(&dir));
                } else {
                    trace!("registry_entry {} is not a directory", dir.display());
                }
            }
        }

        Self {
            config,
            path,
            document,
            packages,
        }
    }

    /// `verticals`, when it is a list
    pub fn verticals(&self) -> Option<&Vec<Value>> {
        self.document.get("verticals").and_then(Value::as_array)
    }
}

/// Read and parse the index; every failure here aborts the run
pub fn load_index(path: &Path) -> Result<Map<String, Value>> {
    let content = std::fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => RegistryError::IndexNotFound(path.to_path_buf()),
        _ => RegistryError::IndexUnreadable {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let value: Value =
        serde_json::from_str(&content).map_err(|source| RegistryError::InvalidIndexJson {
            path: path.to_path_buf(),
            source,
        })?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(RegistryError::IndexNotAnObject(path.to_path_buf())),
    }
}

fn read_text<T>(path: &Path) -> std::result::Result<String, LoadedDocument<T>> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => LoadedDocument::Missing,
        _ => LoadedDocument::Unreadable(e.to_string()),
    })
}

fn load_manifest(path: &Path) -> LoadedDocument<Map<String, Value>> {
    let content = match read_text(path) {
        Ok(content) => content,
        Err(state) => return state,
    };

    let table: toml::Table = match toml::from_str(&content) {
        Ok(table) => table,
        Err(e) => {
            let location = e
                .span()
                .map(|span| format!(" (line {})", line_of(&content, span.start)))
                .unwrap_or_default();
            return LoadedDocument::Malformed(format!("{}{location}", e.message()));
        }
    };

    match serde_json::to_value(table) {
        Ok(Value::Object(map)) => LoadedDocument::Parsed(map),
        Ok(_) => LoadedDocument::Malformed("manifest is not a table".to_string()),
        Err(e) => LoadedDocument::Malformed(e.to_string()),
    }
}

fn load_metadata(path: &Path) -> LoadedDocument<Value> {
    match read_text(path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(value) => LoadedDocument::Parsed(value),
            Err(e) => LoadedDocument::Malformed(e.to_string()),
        },
        Err(state) => state,
    }
}

fn load_readme(path: &Path) -> LoadedDocument<String> {
    match read_text(path) {
        Ok(content) => LoadedDocument::Parsed(content),
        Err(state) => state,
    }
}

fn line_of(content: &str, offset: usize) -> usize {
    let end = offset.min(content.len());
    content.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

fn directory_name(dir: &Path) -> String {
    dir.canonicalize()
        .ok()
        .as_deref()
        .and_then(Path::file_name)
        .or_else(|| dir.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
