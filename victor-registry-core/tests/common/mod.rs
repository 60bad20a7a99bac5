//! Registry fixtures shared by the integration tests

#![allow(dead_code)]

use anyhow::Result;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

pub const README: &str = "# Example vertical

Adds domain tools and prompts to Victor.

## Installation

    pip install victor-example

## Usage

Enable the vertical in your Victor configuration and restart the agent.

## License

Apache-2.0
";

pub fn manifest(name: &str) -> String {
    format!(
        r#"[vertical]
name = "{name}"
version = "0.2.1"
description = "Example vertical"
authors = ["Registry Team <registry@example.org>"]
license = "Apache-2.0"
requires_victor = ">=0.5.0,<1.0"

[vertical.class]
module = "{name}.vertical"
class_name = "ExampleVertical"
"#
    )
}

pub fn metadata(name: &str) -> Value {
    json!({
        "name": name,
        "status": "active",
        "maintainer": {"name": "Registry Team"}
    })
}

/// Write a complete, valid package directory
pub fn create_package(dir: &Path, name: &str) -> Result<()> {
    fs::create_dir_all(dir)?;
    fs::write(dir.join("victor-vertical.toml"), manifest(name))?;
    fs::write(
        dir.join("metadata.json"),
        serde_json::to_string_pretty(&metadata(name))?,
    )?;
    fs::write(dir.join("README.md"), README)?;
    Ok(())
}

pub fn vertical_entry(name: &str) -> Value {
    json!({
        "name": name,
        "version": "0.2.1",
        "description": "Example vertical",
        "author": "Registry Team",
        "license": "Apache-2.0",
        "requires_victor": ">=0.5.0",
        "registry_entry": format!("packages/{name}"),
        "tags": ["example"],
        "download_count": 0,
        "verified": false,
        "featured": false
    })
}

/// Write `index.json` plus a valid package for each name
pub fn create_registry(root: &Path, names: &[&str]) -> Result<PathBuf> {
    for name in names {
        create_package(&root.join("packages").join(name), name)?;
    }
    let verticals: Vec<Value> = names.iter().map(|name| vertical_entry(name)).collect();
    write_index(
        root,
        &json!({
            "version": "1.0",
            "last_updated": "2025-01-09T00:00:00Z",
            "verticals": verticals,
            "statistics": {"total_verticals": names.len(), "total_downloads": 0}
        }),
    )
}

pub fn write_index(root: &Path, index: &Value) -> Result<PathBuf> {
    let path = root.join("index.json");
    fs::write(&path, serde_json::to_string_pretty(index)?)?;
    Ok(path)
}

pub fn read_index(root: &Path) -> Result<Value> {
    Ok(serde_json::from_str(&fs::read_to_string(
        root.join("index.json"),
    )?)?)
}
