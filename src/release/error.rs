use thiserror::Error;

/// Failure fetching one page from a release source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limited: retry after {retry_after_secs:?} seconds")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Repository not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

/// Failure fetching a checksum document
///
/// Never surfaced to callers of the resolver; the checksum cache logs it and
/// degrades the asset's digest to an empty string.
#[derive(Debug, Error)]
pub enum ChecksumError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected status: {0}")]
    Status(u16),

    #[error("Checksum document too short: {len} bytes")]
    TooShort { len: usize },
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("App not found: {owner}/{app}")]
    AppNotFound { owner: String, app: String },

    #[error("Invalid version {input:?}: {source}")]
    InvalidVersion {
        input: String,
        #[source]
        source: semver::Error,
    },

    #[error("Invalid app spec {0:?}: expected owner:app:arch:version")]
    InvalidAppSpec(String),

    #[error("Release source unavailable: {0}")]
    SourceUnavailable(#[from] SourceError),
}
