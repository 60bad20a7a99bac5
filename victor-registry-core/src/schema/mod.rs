//! Schema rules for registry documents
//!
//! Pure, stateless definitions: field tables for each document kind, the
//! package-name grammar, version and version-constraint parsing, and the
//! named constants every rule shares.

pub mod fields;
pub mod name;
pub mod requirement;
pub mod version;

pub use fields::{FieldKind, FieldRule, Presence};
pub use name::{check_package_name, normalize_name, NameError};
pub use requirement::{parse_requires_victor, Requirement, RequirementError};
pub use version::{Version, VersionError};

use std::fmt;

/// File name of the central index at the registry root
pub const INDEX_FILE: &str = "index.json";

/// Names a package may not take once hyphens are normalized to underscores
pub const RESERVED_NAMES: &[&str] = &[
    "victor",
    "core",
    "tools",
    "providers",
    "config",
    "ui",
    "tests",
    "framework",
    "agent",
    "workflows",
];

/// Distribution name `requires_victor` constraints apply to
pub const REQUIRES_PACKAGE: &str = "victor-ai";

/// Section markers every README must contain
pub const README_SECTIONS: &[&str] = &["## Installation", "## Usage", "## License"];

/// Minimum README length, in characters
pub const README_MIN_CHARS: usize = 200;

/// Documents every package directory must ship
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredFile {
    Manifest,
    Metadata,
    Readme,
}

impl RequiredFile {
    pub const ALL: [RequiredFile; 3] = [
        RequiredFile::Manifest,
        RequiredFile::Metadata,
        RequiredFile::Readme,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            RequiredFile::Manifest => "victor-vertical.toml",
            RequiredFile::Metadata => "metadata.json",
            RequiredFile::Readme => "README.md",
        }
    }
}

impl fmt::Display for RequiredFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Lifecycle status declared in `metadata.json`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageStatus {
    Active,
    Deprecated,
    Unmaintained,
}

impl PackageStatus {
    pub const ALL: [PackageStatus; 3] = [
        PackageStatus::Active,
        PackageStatus::Deprecated,
        PackageStatus::Unmaintained,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PackageStatus::Active => "active",
            PackageStatus::Deprecated => "deprecated",
            PackageStatus::Unmaintained => "unmaintained",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }

    /// `['active', 'deprecated', 'unmaintained']`, for messages
    pub fn allowed_list() -> String {
        let quoted: Vec<String> = Self::ALL
            .iter()
            .map(|s| format!("'{}'", s.as_str()))
            .collect();
        format!("[{}]", quoted.join(", "))
    }
}
