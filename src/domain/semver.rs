//! Semantic version value used for mods and releases
//!
//! Mod authors and the registry spell versions inconsistently (`1.2.3`,
//! `v1.2.3`, ` 1.2.3 `). `SemVer` normalises them to a single `v`-prefixed
//! form and compares them with semantic-version precedence.

use crate::error::SemVerError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// A validated semantic version, or the zero value meaning "no valid version"
#[derive(Debug, Clone, Default)]
pub struct SemVer(Option<semver::Version>);

impl SemVer {
    /// Parse a version string, accepting an optional leading `v`
    pub fn parse(raw: &str) -> Result<Self, SemVerError> {
        let trimmed = raw.trim();
        let body = trimmed.strip_prefix('v').unwrap_or(trimmed);
        semver::Version::parse(body)
            .map(|v| SemVer(Some(v)))
            .map_err(|_| SemVerError::new(raw))
    }

    /// The zero value
    pub fn zero() -> Self {
        SemVer(None)
    }

    /// Returns true unless this is the zero value
    pub fn is_valid(&self) -> bool {
        self.0.is_some()
    }

    /// Returns true if the version carries a pre-release suffix
    pub fn is_prerelease(&self) -> bool {
        self.0.as_ref().is_some_and(|v| !v.pre.is_empty())
    }

    /// Access the underlying version
    pub fn as_version(&self) -> Option<&semver::Version> {
        self.0.as_ref()
    }

    /// Compare by semantic-version precedence; build metadata is ignored.
    /// The zero value sorts below every valid version.
    pub fn compare(&self, other: &SemVer) -> Ordering {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => a.cmp_precedence(b),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        }
    }

    /// Returns the greatest version; the first one wins on ties.
    /// Returns the zero value for an empty input.
    pub fn max_of<'a, I>(versions: I) -> SemVer
    where
        I: IntoIterator<Item = &'a SemVer>,
    {
        let mut best: Option<&SemVer> = None;
        for v in versions {
            match best {
                Some(b) if v.compare(b) != Ordering::Greater => {}
                _ => best = Some(v),
            }
        }
        best.cloned().unwrap_or_default()
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(v) => write!(f, "v{}", v),
            None => Ok(()),
        }
    }
}

impl PartialEq for SemVer {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for SemVer {}

impl PartialOrd for SemVer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SemVer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl std::str::FromStr for SemVer {
    type Err = SemVerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SemVer::parse(s)
    }
}

impl Serialize for SemVer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SemVer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.is_empty() {
            return Ok(SemVer::zero());
        }
        SemVer::parse(&raw).map_err(serde::de::Error::custom)
    }
}
