//! Dependency specifiers for `requires_victor`
//!
//! Manifests usually write only the constraint (`>=0.5.0`); the distribution
//! name is prepended before parsing so that `victor-ai>=0.5.0,<1.0` and
//! `>=0.5.0,<1.0` are checked the same way.

use once_cell::sync::Lazy;
use regex::Regex;
use std::str::FromStr;
use thiserror::Error;

use super::version::Version;
use super::REQUIRES_PACKAGE;

static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)").expect("name pattern is valid")
});

static IDENTIFIER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?$")
        .expect("identifier pattern is valid")
});

static CLAUSE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(~=|===|==|!=|<=|>=|<|>)\s*(\S+)$").expect("clause pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequirementError {
    #[error("expected a distribution name in '{0}'")]
    MissingName(String),

    #[error("unclosed extras in '{0}'")]
    UnclosedExtras(String),

    #[error("invalid extra name '{0}'")]
    InvalidExtra(String),

    #[error("empty URL after '@' in '{0}'")]
    EmptyUrl(String),

    #[error("unbalanced parentheses in '{0}'")]
    UnbalancedParens(String),

    #[error("invalid version clause '{0}'")]
    InvalidClause(String),

    #[error("invalid version '{version}' in clause '{clause}'")]
    InvalidVersion { clause: String, version: String },

    #[error("'~=' needs at least two release segments in '{0}'")]
    CompatibleTooShort(String),

    #[error("local versions are only allowed with '==' or '!=' in '{0}'")]
    LocalNotAllowed(String),

    #[error("empty environment marker in '{0}'")]
    EmptyMarker(String),
}

/// Comparison operator of one specifier clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Compatible,
    Equal,
    NotEqual,
    LessEqual,
    GreaterEqual,
    Less,
    Greater,
    ArbitraryEqual,
}

impl Operator {
    fn parse(op: &str) -> Option<Self> {
        Some(match op {
            "~=" => Operator::Compatible,
            "==" => Operator::Equal,
            "!=" => Operator::NotEqual,
            "<=" => Operator::LessEqual,
            ">=" => Operator::GreaterEqual,
            "<" => Operator::Less,
            ">" => Operator::Greater,
            "===" => Operator::ArbitraryEqual,
            _ => return None,
        })
    }
}

/// One `op version` clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specifier {
    pub operator: Operator,
    pub version: String,
}

/// A parsed dependency specifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    pub extras: Vec<String>,
    pub specifiers: Vec<Specifier>,
    pub url: Option<String>,
    /// Environment marker text, kept verbatim
    pub marker: Option<String>,
}

/// Parse a `requires_victor` value, prefixing the distribution name when
/// the value is only a constraint
pub fn parse_requires_victor(value: &str) -> Result<Requirement, RequirementError> {
    if value.starts_with(REQUIRES_PACKAGE) {
        value.parse()
    } else {
        format!("{REQUIRES_PACKAGE}{value}").parse()
    }
}

impl FromStr for Requirement {
    type Err = RequirementError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let (head, marker) = match input.split_once(';') {
            Some((head, marker)) => {
                let marker = marker.trim();
                if marker.is_empty() {
                    return Err(RequirementError::EmptyMarker(input.to_string()));
                }
                (head, Some(marker.to_string()))
            }
            None => (input, None),
        };

        let name_match = NAME_PATTERN
            .captures(head)
            .and_then(|caps| caps.get(1))
            .ok_or_else(|| RequirementError::MissingName(input.to_string()))?;
        let name = name_match.as_str().to_string();
        let mut rest = head[name_match.end()..].trim();

        let mut extras = Vec::new();
        if let Some(after_bracket) = rest.strip_prefix('[') {
            let (inside, after) = after_bracket
                .split_once(']')
                .ok_or_else(|| RequirementError::UnclosedExtras(input.to_string()))?;
            for extra in inside.split(',').map(str::trim).filter(|e| !e.is_empty()) {
                if !IDENTIFIER_PATTERN.is_match(extra) {
                    return Err(RequirementError::InvalidExtra(extra.to_string()));
                }
                extras.push(extra.to_string());
            }
            rest = after.trim();
        }

        if let Some(url) = rest.strip_prefix('@') {
            let url = url.trim();
            if url.is_empty() || url.contains(char::is_whitespace) {
                return Err(RequirementError::EmptyUrl(input.to_string()));
            }
            return Ok(Self {
                name,
                extras,
                specifiers: Vec::new(),
                url: Some(url.to_string()),
                marker,
            });
        }

        let spec = match rest.strip_prefix('(') {
            Some(inner) => inner
                .strip_suffix(')')
                .ok_or_else(|| RequirementError::UnbalancedParens(input.to_string()))?,
            None if rest.ends_with(')') => {
                return Err(RequirementError::UnbalancedParens(input.to_string()))
            }
            None => rest,
        };

        let specifiers = if spec.trim().is_empty() {
            Vec::new()
        } else {
            spec.split(',')
                .map(|clause| parse_clause(clause.trim()))
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(Self {
            name,
            extras,
            specifiers,
            url: None,
            marker,
        })
    }
}

fn parse_clause(clause: &str) -> Result<Specifier, RequirementError> {
    let caps = CLAUSE_PATTERN
        .captures(clause)
        .ok_or_else(|| RequirementError::InvalidClause(clause.to_string()))?;
    let operator = Operator::parse(&caps[1])
        .ok_or_else(|| RequirementError::InvalidClause(clause.to_string()))?;
    let version = caps[2].to_string();

    let invalid_version = || RequirementError::InvalidVersion {
        clause: clause.to_string(),
        version: version.clone(),
    };

    match operator {
        Operator::ArbitraryEqual => {}
        Operator::Equal | Operator::NotEqual => match version.strip_suffix(".*") {
            Some(prefix) => {
                let parsed: Version = prefix.parse().map_err(|_| invalid_version())?;
                if parsed.has_local() {
                    return Err(RequirementError::LocalNotAllowed(clause.to_string()));
                }
            }
            None => {
                version.parse::<Version>().map_err(|_| invalid_version())?;
            }
        },
        _ => {
            let parsed: Version = version.parse().map_err(|_| invalid_version())?;
            if parsed.has_local() {
                return Err(RequirementError::LocalNotAllowed(clause.to_string()));
            }
            if operator == Operator::Compatible && parsed.release().len() < 2 {
                return Err(RequirementError::CompatibleTooShort(clause.to_string()));
            }
        }
    }

    Ok(Specifier { operator, version })
}
