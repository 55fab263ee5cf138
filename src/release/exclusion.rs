//! Denylist of quarantined release versions
//!
//! Source rules name versions a client can never be upgraded *from*; target
//! rules name versions that are never offered as an upgrade *to*. Both are
//! exact (owner, app, version) matches, not ranges.

use crate::config::{ExclusionEntry, ExclusionsConfig};
use crate::release::error::ResolveError;
use crate::release::version::Version;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionRule {
    pub owner: String,
    pub app: String,
    pub version: Version,
}

impl ExclusionRule {
    pub fn new(owner: impl Into<String>, app: impl Into<String>, version: Version) -> Self {
        Self {
            owner: owner.into(),
            app: app.into(),
            version,
        }
    }

    fn matches(&self, owner: &str, app: &str, version: &Version) -> bool {
        self.owner == owner && self.app == app && &self.version == version
    }
}

impl TryFrom<&ExclusionEntry> for ExclusionRule {
    type Error = ResolveError;

    fn try_from(entry: &ExclusionEntry) -> Result<Self, Self::Error> {
        Ok(Self::new(
            entry.owner.clone(),
            entry.app.clone(),
            Version::parse(&entry.version)?,
        ))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionRules {
    source: Vec<ExclusionRule>,
    target: Vec<ExclusionRule>,
}

impl ExclusionRules {
    pub fn new(source: Vec<ExclusionRule>, target: Vec<ExclusionRule>) -> Self {
        Self { source, target }
    }

    /// Build the rule sets from configuration, rejecting unparseable versions
    pub fn from_config(config: &ExclusionsConfig) -> Result<Self, ResolveError> {
        let source = config
            .source
            .iter()
            .map(ExclusionRule::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let target = config
            .target
            .iter()
            .map(ExclusionRule::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(source, target))
    }

    /// Whether `version` must never be upgraded from
    pub fn contains_source(&self, owner: &str, app: &str, version: &Version) -> bool {
        self.source.iter().any(|r| r.matches(owner, app, version))
    }

    /// Whether `version` must never be offered as an upgrade
    pub fn contains_target(&self, owner: &str, app: &str, version: &Version) -> bool {
        self.target.iter().any(|r| r.matches(owner, app, version))
    }
}
