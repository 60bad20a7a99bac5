//! Validation rules for a package directory

use serde_json::{Map, Value};

use super::PackageRule;
use crate::consistency::{check_identity, IDENTITY_RULE};
use crate::loader::{LoadedDocument, PackageContent};
use crate::schema::fields::{
    missing_fields, mistyped_fields, string_field, MAINTAINER_FIELDS, MANIFEST_CLASS_FIELDS,
    MANIFEST_FIELDS, METADATA_FIELDS,
};
use crate::schema::{
    check_package_name, parse_requires_victor, PackageStatus, RequiredFile, Version,
    README_MIN_CHARS, README_SECTIONS,
};
use crate::violation::{Scope, Violation};

/// Violations for a document that could not be parsed, or `None` if it was
fn unparsed<T>(
    document: &LoadedDocument<T>,
    file: RequiredFile,
    syntax: &str,
    package: &PackageContent,
    rule_id: &'static str,
) -> Option<Violation> {
    let message = match document {
        LoadedDocument::Parsed(_) => return None,
        LoadedDocument::Missing => format!("Missing {file}"),
        LoadedDocument::Unreadable(e) => format!("Unable to read {file}: {e}"),
        LoadedDocument::Malformed(e) => format!("Invalid {syntax}: {e}"),
    };
    Some(Violation::package(&package.name, rule_id, message))
}

/// Rule: victor-vertical.toml declares a complete, well-formed `[vertical]`
pub struct ManifestRule;

impl ManifestRule {
    fn check_vertical(
        &self,
        package: &PackageContent,
        vertical: &Map<String, Value>,
    ) -> Vec<Violation> {
        let report = |message: String| Violation::package(&package.name, self.rule_id(), message);
        let mut violations = Vec::new();

        for field in missing_fields(vertical, MANIFEST_FIELDS) {
            violations.push(report(format!("Missing required field: {}", field.key)));
        }

        for field in mistyped_fields(vertical, MANIFEST_FIELDS) {
            violations.push(report(format!(
                "Field '{}' must be {}",
                field.key,
                field.kind.describe()
            )));
        }

        if let Some(name) = string_field(vertical, "name") {
            violations.extend(
                check_package_name(name)
                    .into_iter()
                    .map(|e| report(e.to_string())),
            );
        }

        if let Some(version) = string_field(vertical, "version") {
            if let Err(e) = version.parse::<Version>() {
                violations.push(report(e.to_string()));
            }
        }

        if let Some(requires) = string_field(vertical, "requires_victor") {
            if let Err(e) = parse_requires_victor(requires) {
                violations.push(report(format!("Invalid requires_victor: {e}")));
            }
        }

        match vertical.get("class") {
            None => violations.push(report("Missing [vertical.class] section".to_string())),
            Some(Value::Object(class)) => {
                for field in missing_fields(class, MANIFEST_CLASS_FIELDS) {
                    violations.push(report(format!(
                        "Missing [vertical.class] field: {}",
                        field.key
                    )));
                }
            }
            Some(_) => violations.push(report("[vertical.class] must be a table".to_string())),
        }

        violations
    }
}

impl PackageRule for ManifestRule {
    fn rule_id(&self) -> &'static str {
        "manifest"
    }

    fn description(&self) -> &'static str {
        "victor-vertical.toml must define [vertical] and [vertical.class] with valid values"
    }

    fn check(&self, package: &PackageContent) -> Vec<Violation> {
        if let Some(violation) = unparsed(
            &package.manifest,
            RequiredFile::Manifest,
            "TOML",
            package,
            self.rule_id(),
        ) {
            return vec![violation];
        }
        let Some(doc) = package.manifest.parsed() else {
            return Vec::new();
        };

        match doc.get("vertical") {
            Some(Value::Object(vertical)) => self.check_vertical(package, vertical),
            Some(_) => vec![Violation::package(
                &package.name,
                self.rule_id(),
                "[vertical] must be a table",
            )],
            None => vec![Violation::package(
                &package.name,
                self.rule_id(),
                "Missing [vertical] section",
            )],
        }
    }
}

/// Rule: metadata.json names the package, a known status and a maintainer
pub struct MetadataRule;

impl PackageRule for MetadataRule {
    fn rule_id(&self) -> &'static str {
        "metadata"
    }

    fn description(&self) -> &'static str {
        "metadata.json must have name, a valid status and a maintainer with a name"
    }

    fn check(&self, package: &PackageContent) -> Vec<Violation> {
        if let Some(violation) = unparsed(
            &package.metadata,
            RequiredFile::Metadata,
            "JSON",
            package,
            self.rule_id(),
        ) {
            return vec![violation];
        }

        let report = |message: String| Violation::package(&package.name, self.rule_id(), message);

        let Some(doc) = package.metadata.parsed().and_then(Value::as_object) else {
            return vec![report(format!(
                "{} must contain a JSON object",
                RequiredFile::Metadata
            ))];
        };

        let mut violations = Vec::new();

        for field in missing_fields(doc, METADATA_FIELDS) {
            violations.push(report(format!("Missing required field: {}", field.key)));
        }

        if let Some(status) = doc.get("status") {
            if status.as_str().and_then(PackageStatus::parse).is_none() {
                let shown = match status {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                violations.push(report(format!(
                    "Invalid status: {shown} (must be one of {})",
                    PackageStatus::allowed_list()
                )));
            }
        }

        for field in mistyped_fields(doc, METADATA_FIELDS) {
            violations.push(report(format!(
                "Field '{}' must be {}",
                field.key,
                field.kind.describe()
            )));
        }

        if let Some(Value::Object(maintainer)) = doc.get("maintainer") {
            for field in missing_fields(maintainer, MAINTAINER_FIELDS) {
                violations.push(report(format!("Missing maintainer.{}", field.key)));
            }
        }

        violations
    }
}

/// Rule: README.md has the required sections and is long enough
pub struct ReadmeRule;

impl PackageRule for ReadmeRule {
    fn rule_id(&self) -> &'static str {
        "readme"
    }

    fn description(&self) -> &'static str {
        "README.md must contain Installation, Usage and License sections and 200+ characters"
    }

    fn check(&self, package: &PackageContent) -> Vec<Violation> {
        if let Some(violation) = unparsed(
            &package.readme,
            RequiredFile::Readme,
            "text",
            package,
            self.rule_id(),
        ) {
            return vec![violation];
        }
        let Some(content) = package.readme.parsed() else {
            return Vec::new();
        };

        let mut violations = Vec::new();

        for section in README_SECTIONS {
            if !content.contains(section) {
                violations.push(Violation::package(
                    &package.name,
                    self.rule_id(),
                    format!("Missing section: {section}"),
                ));
            }
        }

        let length = content.chars().count();
        if length < README_MIN_CHARS {
            violations.push(Violation::package(
                &package.name,
                self.rule_id(),
                format!(
                    "{} is too short \
                     (should be at least {README_MIN_CHARS} characters, found {length})",
                    RequiredFile::Readme
                ),
            ));
        }

        violations
    }
}

/// Rule: manifest, metadata and directory agree on the package name
pub struct PackageIdentityRule;

impl PackageRule for PackageIdentityRule {
    fn rule_id(&self) -> &'static str {
        IDENTITY_RULE
    }

    fn description(&self) -> &'static str {
        "Manifest name, metadata name and directory name must match (- and _ are equivalent)"
    }

    fn check(&self, package: &PackageContent) -> Vec<Violation> {
        // Depends on both documents; their own rules report why one is unusable.
        let Some(identity) = package.identity() else {
            return Vec::new();
        };
        check_identity(&identity, &Scope::Package(package.name.clone()))
    }
}
