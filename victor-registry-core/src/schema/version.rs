//! Package version strings
//!
//! Versions follow the Python packaging scheme: an optional epoch, a dotted
//! release, and optional pre-release, post-release, development and local
//! segments (`1!2.0.0rc1.post2.dev3+ubuntu.1`). Spelling variants such as
//! `1.0-alpha.1` and `v1.0` are accepted and normalized.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::cmp::Ordering;
use std::str::FromStr;
use thiserror::Error;

static VERSION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)
        ^\s*
        v?
        (?:(?P<epoch>[0-9]+)!)?
        (?P<release>[0-9]+(?:\.[0-9]+)*)
        (?P<pre>
            [-_.]?
            (?P<pre_l>alpha|a|beta|b|preview|pre|c|rc)
            [-_.]?
            (?P<pre_n>[0-9]+)?
        )?
        (?P<post>
            (?:-(?P<post_n1>[0-9]+))
            |
            (?:
                [-_.]?
                (?P<post_l>post|rev|r)
                [-_.]?
                (?P<post_n2>[0-9]+)?
            )
        )?
        (?P<dev>
            [-_.]?
            dev
            [-_.]?
            (?P<dev_n>[0-9]+)?
        )?
        (?:\+(?P<local>[a-z0-9]+(?:[-_.][a-z0-9]+)*))?
        \s*$",
    )
    .expect("version pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid version: '{0}'")]
pub struct VersionError(pub String);

/// Pre-release phase, in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PreRelease {
    Alpha,
    Beta,
    ReleaseCandidate,
}

/// Local version label segment; text sorts before numbers
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum LocalSegment {
    Text(String),
    Number(u64),
}

/// A parsed package version
#[derive(Debug, Clone)]
pub struct Version {
    epoch: u64,
    release: Vec<u64>,
    pre: Option<(PreRelease, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Option<Vec<LocalSegment>>,
}

// Sort keys. Variant order is precedence order.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum PreKey {
    DevOnly,
    Pre(PreRelease, u64),
    Final,
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum DevKey {
    Dev(u64),
    None,
}

impl Version {
    pub fn release(&self) -> &[u64] {
        &self.release
    }

    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    pub fn has_local(&self) -> bool {
        self.local.is_some()
    }

    fn sort_key(&self) -> (u64, &[u64], PreKey, Option<u64>, DevKey, Option<&[LocalSegment]>) {
        let trimmed = match self.release.iter().rposition(|&n| n != 0) {
            Some(last) => &self.release[..=last],
            None => &[][..],
        };

        let pre = match (self.pre, self.post, self.dev) {
            (None, None, Some(_)) => PreKey::DevOnly,
            (None, _, _) => PreKey::Final,
            (Some((phase, n)), _, _) => PreKey::Pre(phase, n),
        };

        let dev = match self.dev {
            Some(n) => DevKey::Dev(n),
            None => DevKey::None,
        };

        (
            self.epoch,
            trimmed,
            pre,
            self.post,
            dev,
            self.local.as_deref(),
        )
    }
}

fn number(caps: &Captures<'_>, group: &str, input: &str) -> Result<Option<u64>, VersionError> {
    caps.name(group)
        .map(|m| m.as_str().parse::<u64>())
        .transpose()
        .map_err(|_| VersionError(input.to_string()))
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let caps = VERSION_PATTERN
            .captures(input)
            .ok_or_else(|| VersionError(input.to_string()))?;

        let epoch = number(&caps, "epoch", input)?.unwrap_or(0);

        let release = caps["release"]
            .split('.')
            .map(|part| part.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| VersionError(input.to_string()))?;

        let pre = match caps.name("pre_l") {
            Some(label) => {
                let phase = match label.as_str().to_ascii_lowercase().as_str() {
                    "a" | "alpha" => PreRelease::Alpha,
                    "b" | "beta" => PreRelease::Beta,
                    _ => PreRelease::ReleaseCandidate,
                };
                Some((phase, number(&caps, "pre_n", input)?.unwrap_or(0)))
            }
            None => None,
        };

        let post = if caps.name("post").is_some() {
            Some(
                number(&caps, "post_n1", input)?
                    .or(number(&caps, "post_n2", input)?)
                    .unwrap_or(0),
            )
        } else {
            None
        };

        let dev = if caps.name("dev").is_some() {
            Some(number(&caps, "dev_n", input)?.unwrap_or(0))
        } else {
            None
        };

        let local = caps.name("local").map(|label| {
            label
                .as_str()
                .split(['-', '_', '.'])
                .map(|seg| match seg.parse::<u64>() {
                    Ok(n) => LocalSegment::Number(n),
                    Err(_) => LocalSegment::Text(seg.to_ascii_lowercase()),
                })
                .collect()
        });

        Ok(Self {
            epoch,
            release,
            pre,
            post,
            dev,
            local,
        })
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}
