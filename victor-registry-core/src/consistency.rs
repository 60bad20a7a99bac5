//! Cross-document consistency checks
//!
//! Counts and names that several documents state independently must agree.
//! Each check is independent of the others and returns every disagreement
//! it finds.

use serde_json::Value;
use std::collections::HashSet;

use crate::schema::{normalize_name, RequiredFile};
use crate::violation::{Scope, Violation};

pub const STATISTICS_RULE: &str = "statistics";
pub const DUPLICATE_RULE: &str = "duplicate-name";
pub const IDENTITY_RULE: &str = "package-identity";

/// The three names one package goes by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageIdentity<'a> {
    pub directory: &'a str,
    pub manifest_name: Option<&'a str>,
    pub metadata_name: Option<&'a str>,
}

/// `statistics.total_verticals` against the real number of entries
///
/// An absent counter is not checked here; a present one must be an integer
/// equal to `actual`.
pub fn check_statistics(declared: Option<&Value>, actual: usize) -> Vec<Violation> {
    let Some(declared) = declared else {
        return Vec::new();
    };

    if declared.as_u64() == Some(actual as u64) {
        return Vec::new();
    }

    vec![Violation::index(
        STATISTICS_RULE,
        format!(
            "statistics.total_verticals ({declared}) does not match actual count ({actual})"
        ),
    )]
}

/// Every repeat of an already-seen name, in order of appearance
pub fn check_duplicates<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<Violation> {
    let mut seen = HashSet::new();
    let mut violations = Vec::new();

    for name in names {
        if !seen.insert(name) {
            violations.push(Violation::index(
                DUPLICATE_RULE,
                format!("Duplicate package name: {name}"),
            ));
        }
    }

    violations
}

/// Manifest name against metadata name, then manifest name against the
/// directory name, comparing normalized forms
///
/// Without a manifest name the metadata name is compared against the
/// directory instead. Other pairs with an absent name are skipped; the
/// missing field is reported by the schema rules.
pub fn check_identity(identity: &PackageIdentity<'_>, scope: &Scope) -> Vec<Violation> {
    let mut violations = Vec::new();
    let manifest_file = RequiredFile::Manifest.file_name();

    let Some(manifest_name) = identity.manifest_name else {
        violations.extend(check_metadata_directory(identity, scope));
        return violations;
    };
    let manifest_normalized = normalize_name(manifest_name);

    if let Some(metadata_name) = identity.metadata_name {
        let metadata_normalized = normalize_name(metadata_name);
        if manifest_normalized != metadata_normalized {
            violations.push(Violation::new(
                scope.clone(),
                IDENTITY_RULE,
                format!(
                    "Name mismatch: {manifest_file} has '{manifest_name}', \
                     {} has '{metadata_name}' \
                     (normalized: {manifest_normalized} vs {metadata_normalized})",
                    RequiredFile::Metadata.file_name(),
                ),
            ));
        }
    }

    let directory_normalized = normalize_name(identity.directory);
    if manifest_normalized != directory_normalized {
        violations.push(Violation::new(
            scope.clone(),
            IDENTITY_RULE,
            format!(
                "Name mismatch: directory is '{}', {manifest_file} has '{manifest_name}' \
                 (normalized: {manifest_normalized} vs {directory_normalized})",
                identity.directory,
            ),
        ));
    }

    violations
}

fn check_metadata_directory(identity: &PackageIdentity<'_>, scope: &Scope) -> Option<Violation> {
    let metadata_name = identity.metadata_name?;
    let metadata_normalized = normalize_name(metadata_name);
    let directory_normalized = normalize_name(identity.directory);
    if metadata_normalized == directory_normalized {
        return None;
    }

    Some(Violation::new(
        scope.clone(),
        IDENTITY_RULE,
        format!(
            "Name mismatch: directory is '{}', {} has '{metadata_name}' \
             (normalized: {metadata_normalized} vs {directory_normalized})",
            identity.directory,
            RequiredFile::Metadata.file_name(),
        ),
    ))
}

#[cfg(test)]
mod consistency_tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn package_scope() -> Scope {
        Scope::Package("example-security".to_string())
    }

    #[test]
    fn test_statistics_match() {
        assert!(check_statistics(Some(&json!(2)), 2).is_empty());
        assert!(check_statistics(None, 5).is_empty());
    }

    #[test]
    fn test_statistics_drift_cites_both_counts() {
        let violations = check_statistics(Some(&json!(3)), 2);
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].message,
            "statistics.total_verticals (3) does not match actual count (2)"
        );
    }

    #[test]
    fn test_statistics_non_integer_counter() {
        let violations = check_statistics(Some(&json!("2")), 2);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("(\"2\")"));
    }

    #[test]
    fn test_duplicates_report_every_repeat() {
        let violations = check_duplicates(["search", "rag", "search", "search"]);
        let messages: Vec<&str> = violations.iter().map(|v| v.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Duplicate package name: search",
                "Duplicate package name: search"
            ]
        );
    }

    #[test]
    fn test_hyphen_underscore_equivalence() {
        let identity = PackageIdentity {
            directory: "example-security",
            manifest_name: Some("example_security"),
            metadata_name: Some("example_security"),
        };
        assert!(check_identity(&identity, &package_scope()).is_empty());
    }

    #[test]
    fn test_metadata_mismatch_reported_once() {
        let identity = PackageIdentity {
            directory: "example-security",
            manifest_name: Some("example_security"),
            metadata_name: Some("example_other"),
        };
        let violations = check_identity(&identity, &package_scope());
        assert_eq!(violations.len(), 1);
        assert!(violations[0].message.contains("example_security"));
        assert!(violations[0].message.contains("example_other"));
        assert_eq!(violations[0].rule_id, IDENTITY_RULE);
    }

    #[test]
    fn test_directory_mismatch_shows_normalized_forms() {
        let identity = PackageIdentity {
            directory: "example-search",
            manifest_name: Some("example-security"),
            metadata_name: Some("example_security"),
        };
        let violations = check_identity(&identity, &package_scope());
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].message,
            "Name mismatch: directory is 'example-search', victor-vertical.toml has \
             'example-security' (normalized: example_security vs example_search)"
        );
    }

    #[test]
    fn test_metadata_checked_against_directory_without_manifest_name() {
        let identity = PackageIdentity {
            directory: "example-security",
            manifest_name: None,
            metadata_name: Some("something_else"),
        };
        let violations = check_identity(&identity, &package_scope());
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].message,
            "Name mismatch: directory is 'example-security', metadata.json has \
             'something_else' (normalized: something_else vs example_security)"
        );
    }

    #[test]
    fn test_absent_names_are_skipped() {
        let identity = PackageIdentity {
            directory: "example-security",
            manifest_name: None,
            metadata_name: None,
        };
        assert!(check_identity(&identity, &package_scope()).is_empty());

        let identity = PackageIdentity {
            metadata_name: Some("example_security"),
            ..identity
        };
        assert!(check_identity(&identity, &package_scope()).is_empty());
    }
}
