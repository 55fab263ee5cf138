//! Catalogue types shared by the builder and the selector

use serde::Serialize;

use crate::release::version::Version;

/// One downloadable artifact of a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Asset {
    pub name: String,
    pub size: u64,
    /// Hex-encoded SHA-256, empty when the checksum document could not be fetched
    pub sha256: String,
    pub url: String,
}

/// A parsed release and the assets that survived filtering, in source order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Release {
    pub version: Version,
    pub assets: Vec<Asset>,
}

impl Release {
    pub fn new(version: Version, assets: Vec<Asset>) -> Self {
        Self { version, assets }
    }

    /// First asset, the download target for an update
    pub fn first_asset(&self) -> Option<&Asset> {
        self.assets.first()
    }
}

/// All releases of one repository, sorted ascending by version
///
/// Equal versions keep the order in which they were discovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseSet {
    owner: String,
    app: String,
    releases: Vec<Release>,
}

impl ReleaseSet {
    pub fn new(owner: impl Into<String>, app: impl Into<String>, mut releases: Vec<Release>) -> Self {
        // stable: duplicate versions stay in discovery order
        releases.sort_by(|a, b| a.version.cmp(&b.version));

        Self {
            owner: owner.into(),
            app: app.into(),
            releases,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    pub fn releases(&self) -> &[Release] {
        &self.releases
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Release> {
        self.releases.iter()
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}

impl<'a> IntoIterator for &'a ReleaseSet {
    type Item = &'a Release;
    type IntoIter = std::slice::Iter<'a, Release>;

    fn into_iter(self) -> Self::IntoIter {
        self.releases.iter()
    }
}
