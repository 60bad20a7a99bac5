//! Registry validator
//!
//! Applies every rule for a document kind and collects all violations.
//! Rules never abort the run; only an unreadable index or a package path
//! that is not a directory stops validation, before any rule executes.

use std::path::Path;
use tracing::{debug, info};

pub mod index_rules;
pub mod package_rules;


use crate::config::RegistryConfig;
use crate::error::Result;
use crate::loader::{IndexContent, PackageContent};
use crate::report::{ReportKind, ValidationReport};
use crate::violation::Violation;
use index_rules::*;
use package_rules::*;

/// A check over the whole index
pub trait IndexRule: Send + Sync {
    /// Check the index for violations
    fn check(&self, index: &IndexContent) -> Vec<Violation>;

    /// Rule identifier
    fn rule_id(&self) -> &'static str;

    /// Rule description
    fn description(&self) -> &'static str;
}

/// A check over one package directory
pub trait PackageRule: Send + Sync {
    /// Check the package for violations
    fn check(&self, package: &PackageContent) -> Vec<Violation>;

    /// Rule identifier
    fn rule_id(&self) -> &'static str;

    /// Rule description
    fn description(&self) -> &'static str;
}

/// Index validator with the registry rules, in evaluation order
pub struct IndexValidator {
    rules: Vec<Box<dyn IndexRule>>,
}

impl IndexValidator {
    pub fn new() -> Self {
        let rules: Vec<Box<dyn IndexRule>> = vec![
            Box::new(IndexStructureRule),
            Box::new(VerticalEntryRule),
            Box::new(RegisteredPackageIdentityRule),
            Box::new(StatisticsRule),
            Box::new(DuplicateNameRule),
        ];

        Self { rules }
    }

    /// Run every rule against a loaded index
    pub fn validate(&self, index: &IndexContent) -> ValidationReport {
        debug!("Validating index: {:?}", index.path);

        let mut violations = Vec::new();
        for rule in &self.rules {
            debug!("Checking {}: {}", rule.rule_id(), rule.description());
            violations.extend(rule.check(index));
        }

        let vertical_count = index.verticals().map(Vec::len).unwrap_or(0);
        info!(
            "Index validation finished: {} vertical(s), {} violation(s)",
            vertical_count,
            violations.len()
        );

        ValidationReport::new(
            ReportKind::Index {
                path: index.path.clone(),
                vertical_count,
            },
            violations,
        )
    }

    /// Identifiers and descriptions of the registered rules
    pub fn rules(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.rules.iter().map(|r| (r.rule_id(), r.description()))
    }
}

impl Default for IndexValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Package validator with the registry rules, in evaluation order
pub struct PackageValidator {
    rules: Vec<Box<dyn PackageRule>>,
}

impl PackageValidator {
    pub fn new() -> Self {
        let rules: Vec<Box<dyn PackageRule>> = vec![
            Box::new(ManifestRule),
            Box::new(MetadataRule),
            Box::new(ReadmeRule),
            Box::new(PackageIdentityRule),
        ];

        Self { rules }
    }

    /// Run every rule against a loaded package directory
    pub fn validate(&self, package: &PackageContent) -> ValidationReport {
        debug!("Validating package: {:?}", package.dir);

        let mut violations = Vec::new();
        for rule in &self.rules {
            debug!("Checking {}: {}", rule.rule_id(), rule.description());
            violations.extend(rule.check(package));
        }

        info!(
            "Package validation finished for {}: {} violation(s)",
            package.name,
            violations.len()
        );

        ValidationReport::new(
            ReportKind::Package {
                name: package.name.clone(),
            },
            violations,
        )
    }

    /// Identifiers and descriptions of the registered rules
    pub fn rules(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.rules.iter().map(|r| (r.rule_id(), r.description()))
    }
}

impl Default for PackageValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and validate the index under `config`
pub fn validate_index(config: &RegistryConfig) -> Result<ValidationReport> {
    let index = IndexContent::load(config)?;
    Ok(IndexValidator::new().validate(&index))
}

/// Load and validate one package directory
pub fn validate_package(dir: &Path) -> Result<ValidationReport> {
    let package = PackageContent::from_dir(dir)?;
    Ok(PackageValidator::new().validate(&package))
}
