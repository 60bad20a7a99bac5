//! Registry root configuration and path resolution.
//!
//! All file lookups go through an explicit [`RegistryConfig`] so that the
//! validator never depends on the process working directory directly.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::schema::INDEX_FILE;

/// Environment variable that pins the registry root
pub const ROOT_ENV_VAR: &str = "VICTOR_REGISTRY_ROOT";

/// Directory (relative to the root) that holds package directories
pub const PACKAGES_DIR: &str = "packages";

/// Location of a registry checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    root: PathBuf,
}

impl RegistryConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Discover the registry root for the current process
    ///
    /// Resolution order:
    /// 1. CLI override (if provided)
    /// 2. `VICTOR_REGISTRY_ROOT`
    /// 3. Nearest ancestor of the working directory containing `index.json`
    /// 4. The working directory itself
    pub fn discover(cli_override: Option<PathBuf>) -> Result<Self> {
        let cwd = std::env::current_dir().context("Could not determine current directory")?;
        let env_root = std::env::var_os(ROOT_ENV_VAR).map(PathBuf::from);
        Ok(Self::discover_from(cli_override, env_root, &cwd))
    }

    /// Resolution logic behind [`RegistryConfig::discover`], without touching
    /// process state
    pub fn discover_from(
        cli_override: Option<PathBuf>,
        env_root: Option<PathBuf>,
        start: &Path,
    ) -> Self {
        if let Some(root) = cli_override {
            debug!("Using --root override: {}", root.display());
            return Self::new(absolutize(root, start));
        }

        if let Some(root) = env_root.filter(|p| !p.as_os_str().is_empty()) {
            debug!("Using {} override: {}", ROOT_ENV_VAR, root.display());
            return Self::new(absolutize(root, start));
        }

        for dir in start.ancestors() {
            trace!("Looking for {} in {}", INDEX_FILE, dir.display());
            if dir.join(INDEX_FILE).is_file() {
                debug!("Found registry root at {}", dir.display());
                return Self::new(dir);
            }
        }

        debug!(
            "No {} found above {}, using it as the root",
            INDEX_FILE,
            start.display()
        );
        Self::new(start)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the central index document
    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    /// Resolve a `registry_entry` value against the root
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }
}

fn absolutize(path: PathBuf, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
