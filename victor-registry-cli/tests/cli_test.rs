//! Integration tests for the victor-registry binary
//!
//! Each test builds a registry in a temporary directory and runs the real
//! binary against it, checking exit codes and what lands on stdout/stderr.

use anyhow::Result;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const README: &str = "# Search\n\n\
Semantic search tools for Victor agents, with indexing and ranking.\n\n\
## Installation\n\n    pip install victor-search\n\n\
## Usage\n\nEnable the search vertical in your configuration and restart.\n\n\
## License\n\nApache-2.0\n";

fn victor_registry() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_victor-registry"));
    command.env_remove("VICTOR_REGISTRY_ROOT").env_remove("RUST_LOG");
    command
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn create_package(dir: &Path, name: &str) -> Result<()> {
    fs::create_dir_all(dir)?;
    fs::write(
        dir.join("victor-vertical.toml"),
        format!(
            r#"[vertical]
name = "{name}"
version = "0.1.0"
description = "Search vertical"
authors = ["Registry Team"]
license = "Apache-2.0"
requires_victor = ">=0.5.0"

[vertical.class]
module = "{name}.vertical"
class_name = "SearchVertical"
"#
        ),
    )?;
    fs::write(
        dir.join("metadata.json"),
        serde_json::json!({
            "name": name,
            "status": "active",
            "maintainer": {"name": "Registry Team"}
        })
        .to_string(),
    )?;
    fs::write(dir.join("README.md"), README)?;
    Ok(())
}

fn create_registry(root: &Path, total_verticals: usize) -> Result<()> {
    create_package(&root.join("packages/search"), "search")?;
    let index = serde_json::json!({
        "version": "1.0",
        "last_updated": "2025-01-09T00:00:00Z",
        "verticals": [{
            "name": "search",
            "version": "0.1.0",
            "description": "Search vertical",
            "author": "Registry Team",
            "license": "Apache-2.0",
            "requires_victor": ">=0.5.0",
            "registry_entry": "packages/search"
        }],
        "statistics": {"total_verticals": total_verticals}
    });
    fs::write(root.join("index.json"), serde_json::to_string_pretty(&index)?)?;
    Ok(())
}

#[test]
fn test_validate_index_passes() -> Result<()> {
    let temp_dir = TempDir::new()?;
    create_registry(temp_dir.path(), 1)?;

    let output = victor_registry()
        .arg("validate-index")
        .current_dir(temp_dir.path())
        .output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "VALIDATION PASSED: 1 vertical(s) validated successfully\n"
    );
    Ok(())
}

#[test]
fn test_validate_index_finds_root_from_subdirectory() -> Result<()> {
    let temp_dir = TempDir::new()?;
    create_registry(temp_dir.path(), 1)?;

    let output = victor_registry()
        .arg("validate-index")
        .current_dir(temp_dir.path().join("packages/search"))
        .output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    Ok(())
}

#[test]
fn test_validate_index_reports_statistics_drift() -> Result<()> {
    let temp_dir = TempDir::new()?;
    create_registry(temp_dir.path(), 3)?;

    let output = victor_registry()
        .args(["validate-index", "--root"])
        .arg(temp_dir.path())
        .output()?;

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(
        stdout(&output),
        "VALIDATION FAILED: 1 error(s) found\n  \
         - statistics.total_verticals (3) does not match actual count (1)\n"
    );
    Ok(())
}

#[test]
fn test_validate_index_json_output() -> Result<()> {
    let temp_dir = TempDir::new()?;
    create_registry(temp_dir.path(), 3)?;

    let output = victor_registry()
        .args(["validate-index", "--json"])
        .env("VICTOR_REGISTRY_ROOT", temp_dir.path())
        .output()?;

    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["passed"], false);
    assert_eq!(report["error_count"], 1);
    assert_eq!(report["violations"][0]["rule_id"], "statistics");
    Ok(())
}

#[test]
fn test_validate_index_missing_index() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let output = victor_registry()
        .args(["validate-index", "--root"])
        .arg(temp_dir.path())
        .output()?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("ERROR: index.json not found at"));
    assert!(stdout(&output).is_empty());
    Ok(())
}

#[test]
fn test_validate_package() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path().join("search");
    create_package(&dir, "search")?;

    let output = victor_registry().arg("validate-package").arg(&dir).output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "VALIDATION PASSED: Package search is valid\n");

    fs::write(dir.join("README.md"), "## Installation\n## Usage\n")?;
    let output = victor_registry().arg("validate-package").arg(&dir).output()?;
    assert_eq!(output.status.code(), Some(1));
    let text = stdout(&output);
    assert!(text.starts_with("VALIDATION FAILED: 2 error(s) found\n"));
    assert!(text.contains("  - Missing section: ## License\n"));
    Ok(())
}

#[test]
fn test_validate_package_distinct_fatal_messages() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let file = temp_dir.path().join("file.txt");
    fs::write(&file, "x")?;

    let output = victor_registry().arg("validate-package").arg(&file).output()?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Not a directory"));

    let output = victor_registry()
        .arg("validate-package")
        .arg(temp_dir.path().join("absent"))
        .output()?;
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Package directory not found"));
    Ok(())
}

#[test]
fn test_sync_with_unreachable_catalog_is_a_no_op() -> Result<()> {
    let temp_dir = TempDir::new()?;
    create_registry(temp_dir.path(), 1)?;
    let before = fs::read_to_string(temp_dir.path().join("index.json"))?;

    let output = victor_registry()
        .args(["sync", "--pypi-url", "http://127.0.0.1:9", "--root"])
        .arg(temp_dir.path())
        .output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("No victor-* packages found"));
    assert!(stderr(&output).contains("Failed to query catalog"));
    assert_eq!(fs::read_to_string(temp_dir.path().join("index.json"))?, before);
    Ok(())
}

#[test]
fn test_sync_missing_index_is_fatal() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let output = victor_registry()
        .args(["sync", "--dry-run", "--pypi-url", "http://127.0.0.1:9", "--root"])
        .arg(temp_dir.path())
        .output()?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("index.json not found"));
    Ok(())
}

#[test]
fn test_rules_listing() -> Result<()> {
    let output = victor_registry().arg("rules").output()?;
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("duplicate-name"));
    assert!(text.contains("package-identity"));
    Ok(())
}
