//! End-to-end package directory validation

mod common;

use anyhow::Result;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;
use victor_registry_core::validator::{validate_package, PackageValidator};
use victor_registry_core::RegistryError;

#[test]
fn test_valid_package_passes() -> Result<()> {
    common::init_test_logging();
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path().join("example-security");
    common::create_package(&dir, "example_security")?;

    let report = validate_package(&dir)?;
    assert!(report.passed(), "unexpected violations: {:?}", report.violations);
    assert_eq!(
        report.render_text(),
        "VALIDATION PASSED: Package example-security is valid\n"
    );
    Ok(())
}

#[test]
fn test_every_document_problem_reported() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path().join("example-security");
    common::create_package(&dir, "example_security")?;

    let manifest = common::manifest("example_security")
        .replace("license = \"Apache-2.0\"\n", "")
        .replace("0.2.1", "2024.1.0.post1.dev3");
    fs::write(dir.join("victor-vertical.toml"), manifest)?;
    fs::write(
        dir.join("metadata.json"),
        serde_json::json!({
            "name": "example_security",
            "status": "archived",
            "maintainer": {"email": "x@example.org"}
        })
        .to_string(),
    )?;
    fs::write(dir.join("README.md"), "# Example\n\n## Installation\n\n## Usage\n")?;

    let report = validate_package(&dir)?;
    let lines: Vec<String> = report.violations.iter().map(|v| v.to_string()).collect();
    assert_eq!(
        lines,
        vec![
            "Missing required field: license".to_string(),
            "Invalid status: archived (must be one of ['active', 'deprecated', 'unmaintained'])"
                .to_string(),
            "Missing maintainer.name".to_string(),
            "Missing section: ## License".to_string(),
            "README.md is too short (should be at least 200 characters, found 37)".to_string(),
        ]
    );
    Ok(())
}

#[test]
fn test_hyphenated_directory_matches_underscored_name() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path().join("data-analysis");
    common::create_package(&dir, "data_analysis")?;
    assert!(validate_package(&dir)?.passed());
    Ok(())
}

#[test]
fn test_empty_directory_reports_each_missing_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path().join("example-security");
    fs::create_dir(&dir)?;

    let report = PackageValidator::new().validate(
        &victor_registry_core::loader::PackageContent::from_dir(&dir)?,
    );
    let lines: Vec<String> = report.violations.iter().map(|v| v.to_string()).collect();
    assert_eq!(
        lines,
        vec![
            "Missing victor-vertical.toml".to_string(),
            "Missing metadata.json".to_string(),
            "Missing README.md".to_string(),
        ]
    );
    Ok(())
}

#[test]
fn test_not_a_directory_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("example-security");
    fs::write(&file, "not a directory").unwrap();

    let err = validate_package(&file).unwrap_err();
    assert!(matches!(err, RegistryError::NotADirectory(_)));

    let err = validate_package(&temp_dir.path().join("missing")).unwrap_err();
    assert!(matches!(err, RegistryError::PackageDirNotFound(_)));
    assert!(err.to_string().starts_with("Package directory not found: "));
}
