//! Index sync from a package catalog
//!
//! Merges published package records into `index.json`: existing verticals
//! get their version bumped, unknown ones are appended with registry
//! defaults, and the statistics block is refreshed. The document is edited
//! in place, so keys keep their order and anything sync does not know about
//! is written back untouched.

use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::catalog::CatalogPackage;
use crate::config::{RegistryConfig, PACKAGES_DIR};
use crate::error::{RegistryError, Result};
use crate::loader::load_index;
use crate::schema::Version;

/// Category given to verticals first seen through the catalog
pub const DEFAULT_CATEGORY: &str = "unknown";

/// Victor constraint given to verticals first seen through the catalog
pub const DEFAULT_REQUIRES_VICTOR: &str = ">=0.5.0";

/// The parts of `index.json` sync reads or writes. Deserialized only to
/// type-check the document before it is edited.
#[allow(dead_code)]
#[derive(Debug, Deserialize)]
struct IndexShape {
    verticals: Vec<EntryShape>,
    statistics: Map<String, Value>,
}

#[allow(dead_code)]
#[derive(Debug, Deserialize)]
struct EntryShape {
    name: String,
    version: String,
}

/// Entry for a package the index has never seen
pub fn catalog_entry(package: &CatalogPackage, now: &str) -> Map<String, Value> {
    let name = package.vertical_name();
    let mut entry = Map::new();
    entry.insert("name".into(), json!(name));
    entry.insert("version".into(), json!(package.version));
    entry.insert("description".into(), json!(package.summary));
    entry.insert("author".into(), json!(package.author));
    entry.insert("license".into(), json!(package.license));
    entry.insert("homepage".into(), json!(package.home_page));
    entry.insert("repository".into(), json!(package.project_url));
    entry.insert("python_package".into(), json!(package.name));
    entry.insert("category".into(), json!(DEFAULT_CATEGORY));
    entry.insert("tags".into(), json!([]));
    entry.insert("requires_victor".into(), json!(DEFAULT_REQUIRES_VICTOR));
    let registry_entry = format!("{PACKAGES_DIR}/{name}");
    entry.insert("registry_entry".into(), json!(registry_entry));
    entry.insert("download_count".into(), json!(0));
    entry.insert("star_count".into(), json!(0));
    entry.insert("last_updated".into(), json!(now));
    entry.insert("verified".into(), json!(false));
    entry.insert("featured".into(), json!(false));
    entry
}

/// Direction of a version change, by PEP 440 precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionChange {
    Upgrade,
    Downgrade,
    /// Same precedence, different spelling (`1.0` vs `1.0.0`)
    Respelled,
    /// At least one side is not a valid version
    Unordered,
}

impl VersionChange {
    fn between(from: &str, to: &str) -> Self {
        match (from.parse::<Version>(), to.parse::<Version>()) {
            (Ok(from), Ok(to)) => match to.cmp(&from) {
                Ordering::Greater => VersionChange::Upgrade,
                Ordering::Less => VersionChange::Downgrade,
                Ordering::Equal => VersionChange::Respelled,
            },
            _ => VersionChange::Unordered,
        }
    }
}

/// What sync did to one vertical
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    Updated {
        name: String,
        from: String,
        to: String,
        change: VersionChange,
    },
    Added {
        name: String,
        version: String,
    },
}

/// Result of a sync run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    pub index_path: PathBuf,
    pub actions: Vec<SyncAction>,
    pub total_verticals: usize,
    /// Whether `index.json` was rewritten
    pub written: bool,
}

/// Applies catalog records to the index under a registry root
pub struct IndexSync {
    config: RegistryConfig,
    dry_run: bool,
}

impl IndexSync {
    pub fn new(config: RegistryConfig, dry_run: bool) -> Self {
        Self { config, dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Merge `packages` into the index and write it back
    ///
    /// A missing index is fatal even when there is nothing to merge. With no
    /// packages the document is not type-checked and the file is left as it
    /// was; in dry-run mode nothing is written either.
    pub fn run(&self, packages: &[CatalogPackage]) -> Result<SyncSummary> {
        let index_path = self.config.index_path();
        let mut document = load_index(&index_path)?;

        if packages.is_empty() {
            info!("No catalog packages to sync");
            return Ok(SyncSummary {
                total_verticals: vertical_count(&document),
                index_path,
                actions: Vec::new(),
                written: false,
            });
        }

        check_shape(&index_path, &document)?;

        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let actions = apply(&mut document, packages, &now);

        let written = if self.dry_run {
            info!("Dry run: {} not written", index_path.display());
            false
        } else {
            write_index(&index_path, &document)?;
            info!("Updated {}", index_path.display());
            true
        };

        Ok(SyncSummary {
            total_verticals: vertical_count(&document),
            index_path,
            actions,
            written,
        })
    }
}

/// Merge catalog records into an index document, stamping changes with `now`
///
/// Expects `verticals` to be a list and `statistics` an object; a document
/// without them is left unchanged.
pub fn apply(
    document: &mut Map<String, Value>,
    packages: &[CatalogPackage],
    now: &str,
) -> Vec<SyncAction> {
    let Some(Value::Array(verticals)) = document.get_mut("verticals") else {
        return Vec::new();
    };

    let mut actions = Vec::new();
    for package in packages {
        let name = package.vertical_name();
        debug!("Checking {}", package.name);

        let existing = verticals
            .iter_mut()
            .filter_map(Value::as_object_mut)
            .find(|entry| entry.get("name").and_then(Value::as_str) == Some(name));

        let Some(entry) = existing else {
            info!("New package: {}", package.name);
            actions.push(SyncAction::Added {
                name: name.to_string(),
                version: package.version.clone(),
            });
            verticals.push(Value::Object(catalog_entry(package, now)));
            continue;
        };

        let current = entry
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if current == package.version {
            debug!("{} is up to date", package.name);
            continue;
        }

        let change = VersionChange::between(&current, &package.version);
        if change == VersionChange::Downgrade {
            warn!(
                "Catalog version of {} is older: {} -> {}",
                package.name, current, package.version
            );
        } else {
            info!(
                "Updating {} from {} to {}",
                package.name, current, package.version
            );
        }

        // Existing keys keep their position on insert
        entry.insert("version".into(), json!(package.version));
        entry.insert("last_updated".into(), json!(now));
        actions.push(SyncAction::Updated {
            name: name.to_string(),
            from: current,
            to: package.version.clone(),
            change,
        });
    }

    let total = verticals.len();
    if let Some(Value::Object(statistics)) = document.get_mut("statistics") {
        statistics.insert("last_sync".into(), json!(now));
        statistics.insert("total_verticals".into(), json!(total));
    }

    actions
}

fn vertical_count(document: &Map<String, Value>) -> usize {
    document
        .get("verticals")
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

fn check_shape(path: &Path, document: &Map<String, Value>) -> Result<()> {
    serde_json::from_value::<IndexShape>(Value::Object(document.clone()))
        .map(|_| ())
        .map_err(|source| RegistryError::IndexSchema {
            path: path.to_path_buf(),
            source,
        })
}

fn write_index(path: &Path, document: &Map<String, Value>) -> Result<()> {
    let mut content = serde_json::to_string_pretty(document)?;
    content.push('\n');
    std::fs::write(path, content).map_err(|source| RegistryError::IndexWrite {
        path: path.to_path_buf(),
        source,
    })
}
