//! GitHub Releases API release source

use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{
    DEFAULT_GITHUB_BASE_URL, DEFAULT_PER_PAGE, DEFAULT_USER_AGENT, FETCH_TIMEOUT_MS, GitHubConfig,
    HttpConfig,
};
use crate::release::error::SourceError;
use crate::release::source::{ReleaseSource, SourceAsset, SourceRelease};

/// Response item from GitHub Releases API
#[derive(Debug, Deserialize)]
struct GitHubRelease {
    tag_name: String,
    #[serde(default)]
    assets: Vec<GitHubAsset>,
}

#[derive(Debug, Deserialize)]
struct GitHubAsset {
    name: String,
    size: u64,
    browser_download_url: String,
}

impl From<GitHubRelease> for SourceRelease {
    fn from(release: GitHubRelease) -> Self {
        Self {
            tag_name: release.tag_name,
            assets: release
                .assets
                .into_iter()
                .map(|a| SourceAsset {
                    name: a.name,
                    size: a.size,
                    download_url: a.browser_download_url,
                })
                .collect(),
        }
    }
}

/// Release source backed by GitHub Releases API
pub struct GitHubReleaseSource {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    per_page: u32,
}

impl GitHubReleaseSource {
    /// Creates a new GitHubReleaseSource with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self::with_client(
            base_url,
            build_client(DEFAULT_USER_AGENT, Duration::from_millis(FETCH_TIMEOUT_MS)),
        )
    }

    pub fn from_config(github: &GitHubConfig, http: &HttpConfig) -> Self {
        let client = build_client(&http.user_agent, Duration::from_millis(http.timeout_ms));

        Self {
            token: github.token.clone(),
            per_page: github.per_page,
            ..Self::with_client(&github.base_url, client)
        }
    }

    fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            per_page: DEFAULT_PER_PAGE,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// `{base}/repos/{owner}/{app}/releases`, with owner and app encoded as
    /// single path segments
    fn releases_url(&self, owner: &str, app: &str, page: u32) -> Result<Url, SourceError> {
        let invalid = || SourceError::InvalidUrl(self.base_url.clone());

        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(["repos", owner, app, "releases"]);
        url.query_pairs_mut()
            .append_pair("per_page", &self.per_page.to_string())
            .append_pair("page", &page.to_string());

        Ok(url)
    }
}

impl Default for GitHubReleaseSource {
    fn default() -> Self {
        Self::new(DEFAULT_GITHUB_BASE_URL)
    }
}

pub(crate) fn build_client(user_agent: &str, timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .expect("Failed to create HTTP client")
}

#[async_trait::async_trait]
impl ReleaseSource for GitHubReleaseSource {
    async fn list_releases(
        &self,
        owner: &str,
        app: &str,
        page: u32,
    ) -> Result<Vec<SourceRelease>, SourceError> {
        let url = self.releases_url(owner, app, page)?;
        debug!("Fetching releases page {} of {}/{}", page, owner, app);

        let mut request = self
            .client
            .get(url.clone())
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(format!("{}/{}", owner, app)));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(SourceError::RateLimited {
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            warn!("GitHub API returned status {}: {}", status, url);
            return Err(SourceError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let releases: Vec<GitHubRelease> = response.json().await.map_err(|e| {
            warn!("Failed to parse GitHub releases response: {}", e);
            SourceError::InvalidResponse(e.to_string())
        })?;

        Ok(releases.into_iter().map(SourceRelease::from).collect())
    }
}
