//! Release resolution engine
//!
//! Groups the release source, checksum cache and exclusion rules that work
//! together to answer "what should this device install next".

use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::config::ResolverConfig;
use crate::release::catalogue::{CatalogueBuilder, CatalogueQuery};
use crate::release::checksum::{ChecksumCache, HttpChecksumFetcher};
use crate::release::error::ResolveError;
use crate::release::exclusion::ExclusionRules;
use crate::release::selector::next_release;
use crate::release::source::ReleaseSource;
use crate::release::sources::GitHubReleaseSource;
use crate::release::types::{Asset, Release, ReleaseSet};
use crate::release::version::Version;

/// Version assumed for clients that do not report one
pub const DEFAULT_CURRENT_VERSION: &str = "0.0.0";

/// Client application identifier in `owner:app:arch:version` form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSpec {
    pub owner: String,
    pub app: String,
    pub arch: String,
    pub version: String,
}

impl AppSpec {
    pub fn query(&self) -> CatalogueQuery {
        CatalogueQuery::new(&self.owner, &self.app, &self.arch)
    }
}

impl FromStr for AppSpec {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [owner, app, arch, version] if parts.iter().all(|p| !p.is_empty()) => Ok(Self {
                owner: owner.to_string(),
                app: app.to_string(),
                arch: arch.to_string(),
                version: version.to_string(),
            }),
            _ => Err(ResolveError::InvalidAppSpec(s.to_string())),
        }
    }
}

/// Outcome of an update check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum UpdateCheck {
    /// No newer installable version exists
    NoUpdate,
    /// A newer version exists but has no build for this device
    NoAssets { version: Version },
    /// Download target for the next version
    Available { version: Version, asset: Asset },
}

impl UpdateCheck {
    fn from_release(release: Option<&Release>) -> Self {
        match release {
            None => Self::NoUpdate,
            Some(release) => match release.first_asset() {
                Some(asset) => Self::Available {
                    version: release.version.clone(),
                    asset: asset.clone(),
                },
                None => Self::NoAssets {
                    version: release.version.clone(),
                },
            },
        }
    }
}

/// One resolver instance; its checksum cache is shared by every call
pub struct ReleaseResolver {
    source: Arc<dyn ReleaseSource>,
    checksums: ChecksumCache,
    exclusions: ExclusionRules,
    prerelease_markers: Vec<String>,
}

impl ReleaseResolver {
    pub fn new(
        source: Arc<dyn ReleaseSource>,
        checksums: ChecksumCache,
        exclusions: ExclusionRules,
        prerelease_markers: Vec<String>,
    ) -> Self {
        Self {
            source,
            checksums,
            exclusions,
            prerelease_markers,
        }
    }

    /// Create a resolver backed by GitHub and HTTP checksum documents
    pub fn from_config(config: &ResolverConfig) -> Result<Self, ResolveError> {
        let source = GitHubReleaseSource::from_config(&config.github, &config.http);
        let fetcher = HttpChecksumFetcher::from_config(&config.http)
            .with_limit(config.checksum.digest_length);

        Ok(Self::new(
            Arc::new(source),
            ChecksumCache::new(Arc::new(fetcher), &config.checksum),
            ExclusionRules::from_config(&config.exclusions)?,
            config.catalogue.prerelease_markers.clone(),
        ))
    }

    pub fn checksums(&self) -> &ChecksumCache {
        &self.checksums
    }

    pub fn exclusions(&self) -> &ExclusionRules {
        &self.exclusions
    }

    /// Build the sorted, filtered catalogue for `query`
    pub async fn build(&self, query: &CatalogueQuery) -> Result<ReleaseSet, ResolveError> {
        CatalogueBuilder::new(
            self.source.as_ref(),
            &self.checksums,
            &self.prerelease_markers,
        )
        .build(query)
        .await
    }

    /// Select the release to upgrade to from `current`
    pub fn next<'a>(&self, set: &'a ReleaseSet, current: Option<&Version>) -> Option<&'a Release> {
        next_release(set, current, &self.exclusions)
    }

    /// Run a full update check for a client reporting `current`
    ///
    /// An absent or blank `current` is treated as [`DEFAULT_CURRENT_VERSION`].
    /// The version is validated before the catalogue is fetched.
    pub async fn check(
        &self,
        query: &CatalogueQuery,
        current: Option<&str>,
    ) -> Result<UpdateCheck, ResolveError> {
        let current = match current.map(str::trim) {
            Some(v) if !v.is_empty() => Version::parse(v)?,
            _ => Version::parse(DEFAULT_CURRENT_VERSION)?,
        };

        let set = self.build(query).await?;
        let result = UpdateCheck::from_release(self.next(&set, Some(&current)));

        match &result {
            UpdateCheck::NoUpdate => info!(
                "No update for {}/{} from {}",
                query.owner, query.app, current
            ),
            UpdateCheck::NoAssets { version } => info!(
                "Release {} of {}/{} has no assets for arch {:?} hw {:?}",
                version, query.owner, query.app, query.arch, query.hardware
            ),
            UpdateCheck::Available { version, asset } => info!(
                "Update for {}/{} from {} to {}: {}",
                query.owner, query.app, current, version, asset.url
            ),
        }

        Ok(result)
    }
}
