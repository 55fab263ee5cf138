//! Release catalogue builder
//!
//! Pages through a [`ReleaseSource`], parses tags into versions, filters
//! assets by app name, architecture and hardware, attaches checksums, and
//! returns the releases sorted ascending by version.
//!
//! Only repository-level failures abort a build. An unparseable tag drops its
//! release; a filtered asset or failed checksum affects only that asset.

use std::fmt;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::release::checksum::ChecksumCache;
use crate::release::error::{ResolveError, SourceError};
use crate::release::source::{FIRST_PAGE, ReleaseSource, SourceAsset, SourceRelease};
use crate::release::types::{Asset, Release, ReleaseSet};
use crate::release::version::Version;

/// What to build a catalogue for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogueQuery {
    pub owner: String,
    pub app: String,
    pub arch: String,
    /// Hardware token; empty matches any hardware
    pub hardware: String,
    pub include_prerelease: bool,
}

impl CatalogueQuery {
    pub fn new(owner: impl Into<String>, app: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            app: app.into(),
            arch: arch.into(),
            hardware: String::new(),
            include_prerelease: false,
        }
    }

    pub fn with_hardware(mut self, hardware: impl Into<String>) -> Self {
        self.hardware = hardware.into();
        self
    }

    pub fn with_prerelease(mut self, include_prerelease: bool) -> Self {
        self.include_prerelease = include_prerelease;
        self
    }

    fn repo(&self) -> String {
        format!("{}/{}", self.owner, self.app)
    }
}

/// Why an asset was left out of a release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    ChecksumDocument,
    AppMismatch,
    ArchMismatch,
    HardwareMismatch,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::ChecksumDocument => "name is a checksum document",
            SkipReason::AppMismatch => "name does not match app",
            SkipReason::ArchMismatch => "name does not match arch",
            SkipReason::HardwareMismatch => "name does not match hardware",
        };
        f.write_str(reason)
    }
}

/// Asset name filter for one catalogue build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFilter {
    app: String,
    arch: String,
    hardware: String,
    checksum_suffix: String,
}

impl AssetFilter {
    /// Normalizes `arch` to lower case with `-` replaced by `_`, and
    /// `hardware` to lower case.
    pub fn new(app: &str, arch: &str, hardware: &str, checksum_suffix: &str) -> Self {
        Self {
            app: app.to_string(),
            arch: arch.to_lowercase().replace('-', "_"),
            hardware: hardware.to_lowercase(),
            checksum_suffix: checksum_suffix.to_string(),
        }
    }

    pub fn arch(&self) -> &str {
        &self.arch
    }

    pub fn hardware(&self) -> &str {
        &self.hardware
    }

    /// Checks rules in order; the checksum document rule always wins.
    pub fn check(&self, name: &str) -> Result<(), SkipReason> {
        if name.ends_with(&self.checksum_suffix) {
            return Err(SkipReason::ChecksumDocument);
        }
        if !name.starts_with(&self.app) {
            return Err(SkipReason::AppMismatch);
        }
        if !name.contains(&self.arch) {
            return Err(SkipReason::ArchMismatch);
        }
        if !self.hardware.is_empty() && !name.contains(&self.hardware) {
            return Err(SkipReason::HardwareMismatch);
        }
        Ok(())
    }
}

/// Builds release catalogues from a source, sharing one checksum cache
pub struct CatalogueBuilder<'a> {
    source: &'a dyn ReleaseSource,
    checksums: &'a ChecksumCache,
    prerelease_markers: &'a [String],
}

impl<'a> CatalogueBuilder<'a> {
    pub fn new(
        source: &'a dyn ReleaseSource,
        checksums: &'a ChecksumCache,
        prerelease_markers: &'a [String],
    ) -> Self {
        Self {
            source,
            checksums,
            prerelease_markers,
        }
    }

    /// Build the sorted catalogue for `query`
    ///
    /// # Errors
    /// * `ResolveError::AppNotFound` - the source reports no such repository on the first page
    /// * `ResolveError::SourceUnavailable` - any other failure fetching a page
    pub async fn build(&self, query: &CatalogueQuery) -> Result<ReleaseSet, ResolveError> {
        let filter = AssetFilter::new(
            &query.app,
            &query.arch,
            &query.hardware,
            self.checksums.suffix(),
        );
        let repo = query.repo();
        let mut releases = Vec::new();

        for page in FIRST_PAGE.. {
            let entries = match self
                .source
                .list_releases(&query.owner, &query.app, page)
                .await
            {
                Ok(entries) => entries,
                Err(SourceError::NotFound(_)) if page == FIRST_PAGE => {
                    return Err(ResolveError::AppNotFound {
                        owner: query.owner.clone(),
                        app: query.app.clone(),
                    });
                }
                Err(e) => {
                    warn!("Failed to list releases of {} (page {}): {}", repo, page, e);
                    return Err(ResolveError::SourceUnavailable(e));
                }
            };

            if entries.is_empty() {
                break;
            }

            for entry in entries {
                if let Some(release) = self.build_release(&repo, query, &filter, entry).await {
                    releases.push(release);
                }
            }
        }

        let set = ReleaseSet::new(&query.owner, &query.app, releases);
        info!(
            "Built catalogue for {} (arch {}): {} releases",
            repo,
            filter.arch(),
            set.len()
        );

        Ok(set)
    }

    async fn build_release(
        &self,
        repo: &str,
        query: &CatalogueQuery,
        filter: &AssetFilter,
        entry: SourceRelease,
    ) -> Option<Release> {
        debug!("Found release tag {} in {}", entry.tag_name, repo);

        let version = match Version::parse(&entry.tag_name) {
            Ok(version) => version,
            Err(e) => {
                warn!("Skipping release of {}: {}", repo, e);
                return None;
            }
        };

        if !query.include_prerelease && self.is_prerelease_tag(&entry.tag_name) {
            debug!(
                "Skipping release {} of {}: pre-releases not allowed",
                entry.tag_name, repo
            );
            return None;
        }

        let kept: Vec<SourceAsset> = entry
            .assets
            .into_iter()
            .filter(|asset| match filter.check(&asset.name) {
                Ok(()) => true,
                Err(reason) => {
                    debug!(
                        "Skipping asset {} of {} {}: {}",
                        asset.name, repo, entry.tag_name, reason
                    );
                    false
                }
            })
            .collect();

        // join_all keeps input order, so assets stay in source order
        let digests = join_all(
            kept.iter()
                .map(|asset| self.checksums.get_or_fetch(&asset.download_url)),
        )
        .await;

        let assets = kept
            .into_iter()
            .zip(digests)
            .map(|(asset, sha256)| Asset {
                name: asset.name,
                size: asset.size,
                sha256,
                url: asset.download_url,
            })
            .collect();

        Some(Release::new(version, assets))
    }

    fn is_prerelease_tag(&self, tag: &str) -> bool {
        self.prerelease_markers
            .iter()
            .any(|marker| tag.contains(marker.as_str()))
    }
}
