//! PyPI-backed catalog
//!
//! Lists projects from the simple index (PEP 691 JSON form), keeps the
//! `victor-*` ones and reads each project's JSON metadata.

use anyhow::Result;
use async_trait::async_trait;
#[cfg(feature = "pypi")]
use anyhow::Context;
#[cfg(any(feature = "pypi", test))]
use serde::Deserialize;

use super::{CatalogPackage, CatalogSource};
#[cfg(feature = "pypi")]
use super::PACKAGE_PREFIX;

pub const DEFAULT_PYPI_URL: &str = "https://pypi.org";

#[cfg(feature = "pypi")]
const SIMPLE_JSON_ACCEPT: &str = "application/vnd.pypi.simple.v1+json";

#[cfg(any(feature = "pypi", test))]
#[derive(Debug, Deserialize)]
struct SimpleIndex {
    projects: Vec<SimpleProject>,
}

#[cfg(any(feature = "pypi", test))]
#[derive(Debug, Deserialize)]
struct SimpleProject {
    name: String,
}

#[cfg(any(feature = "pypi", test))]
#[derive(Debug, Deserialize)]
struct ProjectDocument {
    info: ProjectInfo,
}

/// `info` block of `/pypi/<name>/json`; PyPI sends `null` for unset fields
#[cfg(any(feature = "pypi", test))]
#[derive(Debug, Deserialize)]
struct ProjectInfo {
    name: String,
    version: String,
    summary: Option<String>,
    author: Option<String>,
    license: Option<String>,
    home_page: Option<String>,
    project_url: Option<String>,
    requires_python: Option<String>,
}

#[cfg(any(feature = "pypi", test))]
impl From<ProjectInfo> for CatalogPackage {
    fn from(info: ProjectInfo) -> Self {
        Self {
            name: info.name,
            version: info.version,
            summary: info.summary.unwrap_or_default(),
            author: info.author.unwrap_or_default(),
            license: info.license.unwrap_or_default(),
            home_page: info.home_page.filter(|s| !s.is_empty()),
            project_url: info.project_url.filter(|s| !s.is_empty()),
            requires_python: info.requires_python.filter(|s| !s.is_empty()),
        }
    }
}

/// Names from a simple-index listing that look like vertical packages
#[cfg(any(feature = "pypi", test))]
fn candidate_names(index: SimpleIndex, prefix: &str) -> Vec<String> {
    index
        .projects
        .into_iter()
        .map(|p| p.name)
        .filter(|name| name.starts_with(prefix) && name.len() > prefix.len())
        .collect()
}

/// Catalog reading from a PyPI-compatible server
#[derive(Debug, Clone)]
pub struct PypiCatalog {
    base_url: String,
}

impl PypiCatalog {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[cfg(feature = "pypi")]
    fn client() -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(concat!("victor-registry/", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")
    }

    #[cfg(feature = "pypi")]
    async fn fetch_json<T: serde::de::DeserializeOwned>(
        client: &reqwest::Client,
        url: &str,
        accept: &str,
    ) -> Result<T> {
        let response = client
            .get(url)
            .header(reqwest::header::ACCEPT, accept)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {url}"))?;

        if !response.status().is_success() {
            anyhow::bail!("HTTP {} from {}", response.status(), url);
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse response from {url}"))
    }
}

impl Default for PypiCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_PYPI_URL)
    }
}

#[async_trait]
impl CatalogSource for PypiCatalog {
    #[cfg(feature = "pypi")]
    async fn fetch_packages(&self) -> Result<Vec<CatalogPackage>> {
        let client = Self::client()?;

        let listing_url = format!("{}/simple/", self.base_url);
        let index: SimpleIndex =
            Self::fetch_json(&client, &listing_url, SIMPLE_JSON_ACCEPT).await?;
        let names = candidate_names(index, PACKAGE_PREFIX);
        tracing::debug!("{} candidate package(s) on {}", names.len(), self.base_url);

        let mut packages = Vec::with_capacity(names.len());
        for name in names {
            let url = format!("{}/pypi/{}/json", self.base_url, name);
            match Self::fetch_json::<ProjectDocument>(&client, &url, "application/json").await {
                Ok(document) => packages.push(document.info.into()),
                Err(e) => {
                    // One broken project does not spoil the listing
                    tracing::warn!("Skipping {}: {:#}", name, e);
                }
            }
        }

        Ok(packages)
    }

    /// Stub for when the pypi feature is disabled
    #[cfg(not(feature = "pypi"))]
    async fn fetch_packages(&self) -> Result<Vec<CatalogPackage>> {
        anyhow::bail!("PyPI feature is not enabled. Rebuild with --features pypi")
    }

    fn name(&self) -> &str {
        &self.base_url
    }
}
