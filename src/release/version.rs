//! Semantic version wrapper with precedence ordering

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::release::error::ResolveError;

/// A parsed release version.
///
/// Ordering and equality follow semver precedence: build metadata is ignored,
/// and a version without a pre-release is greater than the same
/// major.minor.patch with one (`0.0.1-alpha1 < 0.0.1`).
#[derive(Debug, Clone)]
pub struct Version(semver::Version);

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self(semver::Version::new(major, minor, patch))
    }

    /// Parse a tag or client-supplied version string.
    ///
    /// Accepts an optional `v` prefix and pads partial versions with zeros,
    /// so `v1.2` parses as `1.2.0` and `v2-beta` as `2.0.0-beta`.
    pub fn parse(input: &str) -> Result<Self, ResolveError> {
        let trimmed = input.trim();
        let stripped = trimmed.strip_prefix('v').unwrap_or(trimmed);

        // Only the numeric core is padded; dots in pre-release or build stay put.
        let (core, suffix) = stripped
            .find(['-', '+'])
            .map_or((stripped, ""), |at| stripped.split_at(at));
        let normalized = match core.split('.').count() {
            1 => format!("{}.0.0{}", core, suffix),
            2 => format!("{}.0{}", core, suffix),
            _ => stripped.to_string(),
        };

        semver::Version::parse(&normalized)
            .map(Self)
            .map_err(|source| ResolveError::InvalidVersion {
                input: input.to_string(),
                source,
            })
    }

    pub fn is_prerelease(&self) -> bool {
        !self.0.pre.is_empty()
    }

    pub fn as_semver(&self) -> &semver::Version {
        &self.0
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let a = &self.0;
        let b = &other.0;
        a.major
            .cmp(&b.major)
            .then(a.minor.cmp(&b.minor))
            .then(a.patch.cmp(&b.patch))
            .then_with(|| a.pre.cmp(&b.pre))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl FromStr for Version {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
