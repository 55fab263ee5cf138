use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// =============================================================================
// Defaults
// =============================================================================

/// Default base URL for the GitHub API
pub const DEFAULT_GITHUB_BASE_URL: &str = "https://api.github.com";

/// GitHub's own default page size for release listings
pub const DEFAULT_PER_PAGE: u32 = 30;

/// Suffix appended to an asset URL to address its checksum document
pub const DEFAULT_CHECKSUM_SUFFIX: &str = ".sha256";

/// Length of a hex-encoded SHA-256 digest
pub const DEFAULT_DIGEST_LENGTH: usize = 64;

/// Timeout for outbound HTTP requests in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

pub const DEFAULT_USER_AGENT: &str = "release-resolver";

/// File name of the log file inside the data directory
pub const LOG_FILE_NAME: &str = "release-resolver.log";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Resolver configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ResolverConfig {
    pub github: GitHubConfig,
    pub checksum: ChecksumConfig,
    pub catalogue: CatalogueConfig,
    pub exclusions: ExclusionsConfig,
    pub http: HttpConfig,
}

impl ResolverConfig {
    /// Load configuration from a JSON file, filling missing fields with defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Release source configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct GitHubConfig {
    pub base_url: String,
    /// Personal access token, sent as a bearer token when set
    pub token: Option<String>,
    pub per_page: u32,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GITHUB_BASE_URL.to_string(),
            token: None,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Checksum document configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ChecksumConfig {
    pub suffix: String,
    pub digest_length: usize,
}

impl Default for ChecksumConfig {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_CHECKSUM_SUFFIX.to_string(),
            digest_length: DEFAULT_DIGEST_LENGTH,
        }
    }
}

/// Catalogue build configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogueConfig {
    /// Tag substrings marking a release as pre-release for channel filtering
    pub prerelease_markers: Vec<String>,
}

impl Default for CatalogueConfig {
    fn default() -> Self {
        Self {
            prerelease_markers: vec!["-alpha".to_string()],
        }
    }
}

/// One quarantined version
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ExclusionEntry {
    pub owner: String,
    pub app: String,
    pub version: String,
}

impl ExclusionEntry {
    pub fn new(owner: &str, app: &str, version: &str) -> Self {
        Self {
            owner: owner.to_string(),
            app: app.to_string(),
            version: version.to_string(),
        }
    }
}

/// Versions that must not be upgraded from (`source`) or to (`target`)
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExclusionsConfig {
    pub source: Vec<ExclusionEntry>,
    pub target: Vec<ExclusionEntry>,
}

impl Default for ExclusionsConfig {
    // Early cronus alphas shipped a broken updater.
    fn default() -> Self {
        let cronus = |versions: &[&str]| -> Vec<ExclusionEntry> {
            versions
                .iter()
                .map(|v| ExclusionEntry::new("ashep", "cronus", v))
                .collect()
        };

        Self {
            source: cronus(&[
                "0.0.1-alpha1",
                "0.0.1-alpha2",
                "0.0.1-alpha3",
                "0.0.1-alpha4",
                "0.0.1-alpha5",
            ]),
            target: cronus(&[
                "0.0.1-alpha2",
                "0.0.1-alpha3",
                "0.0.1-alpha4",
                "0.0.1-alpha5",
            ]),
        }
    }
}

/// Outbound HTTP configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpConfig {
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: FETCH_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Returns the path to the data directory for release-resolver.
/// Uses $XDG_DATA_HOME/release-resolver if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/release-resolver,
/// or ./release-resolver if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the default configuration file.
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join(LOG_FILE_NAME)
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("release-resolver")
}
