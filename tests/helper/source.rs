//! In-memory release source and checksum fetcher

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use release_resolver::config::ChecksumConfig;
use release_resolver::release::checksum::{ChecksumCache, ChecksumFetcher};
use release_resolver::release::error::{ChecksumError, SourceError};
use release_resolver::release::exclusion::ExclusionRules;
use release_resolver::release::resolver::ReleaseResolver;
use release_resolver::release::source::{FIRST_PAGE, ReleaseSource, SourceAsset, SourceRelease};

/// Release source serving fixed pages, then empty pages
pub struct StaticReleaseSource {
    owner: String,
    app: String,
    pages: Vec<Vec<SourceRelease>>,
    calls: AtomicUsize,
}

impl StaticReleaseSource {
    pub fn new(owner: &str, app: &str) -> Self {
        Self {
            owner: owner.to_string(),
            app: app.to_string(),
            pages: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_page(mut self, releases: Vec<SourceRelease>) -> Self {
        self.pages.push(releases);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReleaseSource for StaticReleaseSource {
    async fn list_releases(
        &self,
        owner: &str,
        app: &str,
        page: u32,
    ) -> Result<Vec<SourceRelease>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if owner != self.owner || app != self.app {
            return Err(SourceError::NotFound(format!("{}/{}", owner, app)));
        }

        Ok(self
            .pages
            .get((page - FIRST_PAGE) as usize)
            .cloned()
            .unwrap_or_default())
    }
}

/// Checksum fetcher answering from a map; unknown URLs fail with 404
#[derive(Default)]
pub struct StaticChecksumFetcher {
    documents: HashMap<String, Result<String, u16>>,
    calls: AtomicUsize,
}

impl StaticChecksumFetcher {
    pub fn with_document(mut self, url: &str, body: &str) -> Self {
        self.documents.insert(url.to_string(), Ok(body.to_string()));
        self
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.documents.insert(url.to_string(), Err(status));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChecksumFetcher for StaticChecksumFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ChecksumError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match self.documents.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(ChecksumError::Status(*status)),
            None => Err(ChecksumError::Status(404)),
        }
    }
}

/// A release entry whose assets download from `https://dl/<name>`
pub fn release(tag: &str, assets: &[&str]) -> SourceRelease {
    SourceRelease {
        tag_name: tag.to_string(),
        assets: assets
            .iter()
            .map(|name| SourceAsset {
                name: name.to_string(),
                size: 4096,
                download_url: asset_url(name),
            })
            .collect(),
    }
}

pub fn asset_url(name: &str) -> String {
    format!("https://dl/{}", name)
}

/// Create a resolver over the given source and fetcher
pub fn create_test_resolver(
    source: Arc<StaticReleaseSource>,
    fetcher: Arc<StaticChecksumFetcher>,
    exclusions: ExclusionRules,
) -> ReleaseResolver {
    ReleaseResolver::new(
        source,
        ChecksumCache::new(fetcher, &ChecksumConfig::default()),
        exclusions,
        vec!["-alpha".to_string()],
    )
}
