//! Memoized lookup of remote asset checksums
//!
//! A published asset's checksum document lives next to it, at the asset URL
//! plus a fixed suffix. Successful lookups are kept for the lifetime of the
//! cache; failures are never cached, so a failing document is retried on the
//! next lookup.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

#[cfg(test)]
use mockall::automock;
use tracing::{debug, warn};

use crate::config::{
    ChecksumConfig, DEFAULT_DIGEST_LENGTH, DEFAULT_USER_AGENT, FETCH_TIMEOUT_MS, HttpConfig,
};
use crate::release::error::ChecksumError;
use crate::release::sources::github::build_client;

/// Trait for fetching the body of a checksum document
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ChecksumFetcher: Send + Sync {
    /// Fetches the document at `url`, accepting only HTTP 200
    async fn fetch(&self, url: &str) -> Result<String, ChecksumError>;
}

/// Checksum fetcher over plain HTTP GET
///
/// Reads at most `limit` bytes of the body; the rest of the document is
/// never buffered.
pub struct HttpChecksumFetcher {
    client: reqwest::Client,
    limit: usize,
}

impl HttpChecksumFetcher {
    pub fn new() -> Self {
        Self {
            client: build_client(DEFAULT_USER_AGENT, Duration::from_millis(FETCH_TIMEOUT_MS)),
            limit: DEFAULT_DIGEST_LENGTH,
        }
    }

    pub fn from_config(http: &HttpConfig) -> Self {
        Self {
            client: build_client(&http.user_agent, Duration::from_millis(http.timeout_ms)),
            limit: DEFAULT_DIGEST_LENGTH,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

impl Default for HttpChecksumFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ChecksumFetcher for HttpChecksumFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ChecksumError> {
        let mut response = self.client.get(url).send().await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(ChecksumError::Status(status.as_u16()));
        }

        let mut body = Vec::with_capacity(self.limit);
        while body.len() < self.limit {
            match response.chunk().await? {
                Some(chunk) => body.extend_from_slice(&chunk),
                None => break,
            }
        }
        body.truncate(self.limit);

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// Checksum cache keyed by checksum document URL
pub struct ChecksumCache {
    fetcher: Arc<dyn ChecksumFetcher>,
    suffix: String,
    digest_length: usize,
    entries: Mutex<HashMap<String, String>>,
}

impl ChecksumCache {
    pub fn new(fetcher: Arc<dyn ChecksumFetcher>, config: &ChecksumConfig) -> Self {
        Self {
            fetcher,
            suffix: config.suffix.clone(),
            digest_length: config.digest_length,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Suffix identifying checksum documents among release assets
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Number of memoized digests
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the digest for `asset_url`, fetching it on first use
    ///
    /// Returns an empty string if the document cannot be fetched or is
    /// shorter than a digest.
    pub async fn get_or_fetch(&self, asset_url: &str) -> String {
        let url = format!("{}{}", asset_url, self.suffix);

        let cached = self.lock_entries().get(&url).cloned();
        if let Some(digest) = cached {
            return digest;
        }

        match self.fetch_digest(&url).await {
            Ok(digest) => {
                debug!("Fetched checksum {}", url);
                self.lock_entries().insert(url, digest.clone());
                digest
            }
            Err(e) => {
                warn!("Failed to fetch asset checksum {}: {}", url, e);
                String::new()
            }
        }
    }

    async fn fetch_digest(&self, url: &str) -> Result<String, ChecksumError> {
        let body = self.fetcher.fetch(url).await?;

        body.get(..self.digest_length)
            .map(str::to_string)
            .ok_or(ChecksumError::TooShort { len: body.len() })
    }

    // The map is never left half-written, so a poisoned lock is still usable.
    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
