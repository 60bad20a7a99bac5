//! Remote package catalog
//!
//! Sync consults a catalog for published `victor-*` packages. The catalog
//! is best-effort: [`fetch_or_empty`] turns any failure into "no remote
//! data" so a network outage never blocks a sync run.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub mod pypi;

pub use pypi::PypiCatalog;

/// Prefix shared by every published vertical package
pub const PACKAGE_PREFIX: &str = "victor-";

/// One published package as reported by a catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPackage {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub license: String,
    pub home_page: Option<String>,
    pub project_url: Option<String>,
    pub requires_python: Option<String>,
}

impl CatalogPackage {
    /// Vertical name this package registers under (`victor-search` -> `search`)
    pub fn vertical_name(&self) -> &str {
        self.name.strip_prefix(PACKAGE_PREFIX).unwrap_or(&self.name)
    }
}

/// A source of published package records
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch every candidate package
    async fn fetch_packages(&self) -> Result<Vec<CatalogPackage>>;

    /// Catalog name for log messages
    fn name(&self) -> &str;
}

/// Catalog with nothing in it
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyCatalog;

#[async_trait]
impl CatalogSource for EmptyCatalog {
    async fn fetch_packages(&self) -> Result<Vec<CatalogPackage>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &str {
        "empty"
    }
}

/// Fetch from `catalog`, logging and swallowing any failure
pub async fn fetch_or_empty(catalog: &dyn CatalogSource) -> Vec<CatalogPackage> {
    match catalog.fetch_packages().await {
        Ok(packages) => {
            info!(
                "Fetched {} package(s) from catalog '{}'",
                packages.len(),
                catalog.name()
            );
            packages
        }
        Err(e) => {
            warn!("Failed to query catalog '{}': {:#}", catalog.name(), e);
            Vec::new()
        }
    }
}
