//! Release source trait for listing releases from a remote forge

#[cfg(test)]
use mockall::automock;

use crate::release::error::SourceError;

/// Page number of the first page of a listing
pub const FIRST_PAGE: u32 = 1;

/// A release entry as reported by the source, before any parsing or filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRelease {
    pub tag_name: String,
    pub assets: Vec<SourceAsset>,
}

/// An asset descriptor as reported by the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAsset {
    pub name: String,
    pub size: u64,
    pub download_url: String,
}

/// Trait for listing the releases of a repository, one page at a time
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Fetches one page of releases
    ///
    /// # Arguments
    /// * `owner` - Repository owner (e.g., "ashep")
    /// * `app` - Repository name (e.g., "cronus")
    /// * `page` - Page number, starting at [`FIRST_PAGE`]
    ///
    /// # Returns
    /// * `Ok(Vec<SourceRelease>)` - Entries of the page, empty past the last page
    /// * `Err(SourceError::NotFound)` - If the repository does not exist
    /// * `Err(SourceError)` - Any other transport or protocol failure
    async fn list_releases(
        &self,
        owner: &str,
        app: &str,
        page: u32,
    ) -> Result<Vec<SourceRelease>, SourceError>;
}
