//! Violation records produced by validation rules

use serde::Serialize;
use std::fmt;

/// Entity a violation is about
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum Scope {
    /// The index document as a whole
    Index,
    /// One vertical entry of the index, by name (`unknown` when unnamed)
    Vertical(String),
    /// A package directory, by directory name
    Package(String),
}

/// One failed check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub scope: Scope,
    /// Identifier of the rule that reported this
    pub rule_id: &'static str,
    /// Human-readable description
    pub message: String,
}

impl Violation {
    pub fn new(scope: Scope, rule_id: &'static str, message: impl Into<String>) -> Self {
        Self {
            scope,
            rule_id,
            message: message.into(),
        }
    }

    pub fn index(rule_id: &'static str, message: impl Into<String>) -> Self {
        Self {
            scope: Scope::Index,
            rule_id,
            message: message.into(),
        }
    }

    pub fn vertical(
        name: impl Into<String>,
        rule_id: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            scope: Scope::Vertical(name.into()),
            rule_id,
            message: message.into(),
        }
    }

    pub fn package(
        name: impl Into<String>,
        rule_id: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            scope: Scope::Package(name.into()),
            rule_id,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    // Package reports concern a single directory, so the scope is implied there.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Scope::Vertical(name) => write!(f, "{name}: {}", self.message),
            Scope::Index | Scope::Package(_) => f.write_str(&self.message),
        }
    }
}
