//! Configuration types for Folio components.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! environment variables and command-line flags applied by the CLI.
//!
//! ```toml
//! [source]
//! project_id = "kstudio-83ca5"
//! database_base_url = "https://kstudio-83ca5-default-rtdb.firebaseio.com"
//!
//! [proxy]
//! site_url = "https://studio.example.com"
//!
//! [http]
//! timeout_secs = 8
//! ```

use crate::error::AppError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Project id shipped in the config template; treated as "not configured".
pub const PLACEHOLDER_PROJECT_ID: &str = "YOUR_PROJECT_ID";

/// Document-store path holding the project tree.
pub const DEFAULT_DB_PATH: &str = "projects";

/// Same-origin path the edge proxy is mounted on.
pub const DEFAULT_PROXY_PATH: &str = "/api/projects";

/// Location of the bundled project list, relative to the site root or working directory.
pub const DEFAULT_STATIC_PATH: &str = "data/projects.json";

/// Identifies the remote document store and how to authenticate against it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub project_id: Option<String>,
    pub database_base_url: Option<String>,
    pub auth_token: Option<String>,
    pub default_path: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            database_base_url: None,
            auth_token: None,
            default_path: DEFAULT_DB_PATH.to_string(),
        }
    }
}

impl SourceConfig {
    /// The project id, unless it is missing, blank, or the template placeholder.
    pub fn effective_project_id(&self) -> Option<&str> {
        self.project_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty() && *id != PLACEHOLDER_PROJECT_ID)
    }

    /// Whether the document-store source may be attempted at all.
    ///
    /// # Examples
    ///
    /// ```
    /// use folio_core::config::{SourceConfig, PLACEHOLDER_PROJECT_ID};
    ///
    /// let config = SourceConfig {
    ///     project_id: Some(PLACEHOLDER_PROJECT_ID.to_string()),
    ///     ..SourceConfig::default()
    /// };
    /// assert!(!config.is_doc_store_configured());
    /// ```
    pub fn is_doc_store_configured(&self) -> bool {
        let has_base_url = self
            .database_base_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty());
        has_base_url || self.effective_project_id().is_some()
    }
}

/// HTTP client configuration for every source attempt.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Deadline for one source attempt, in seconds.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 8,
            user_agent: "Folio/0.1 (portfolio-data)".to_string(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Edge-proxy settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Public origin of the deployed site. Without it the proxy is never tried.
    pub site_url: Option<Url>,
    pub base_path: String,
    /// Explicit opt-out.
    pub skip: bool,
    /// Host suffixes of static hosting platforms that never mount the proxy.
    pub static_host_suffixes: Vec<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            site_url: None,
            base_path: DEFAULT_PROXY_PATH.to_string(),
            skip: false,
            static_host_suffixes: vec![
                "pages.dev".to_string(),
                "github.io".to_string(),
                "netlify.app".to_string(),
            ],
        }
    }
}

/// Where the bundled static document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaticLocation {
    Url(Url),
    Path(PathBuf),
}

impl StaticLocation {
    /// Treats `http(s)://` values as URLs and anything else as a filesystem path.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Url::parse(raw)
                .map(StaticLocation::Url)
                .map_err(|e| AppError::InvalidUrl(format!("{}: {}", raw, e)))
        } else {
            Ok(StaticLocation::Path(PathBuf::from(raw)))
        }
    }
}

impl std::fmt::Display for StaticLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StaticLocation::Url(url) => write!(f, "{}", url),
            StaticLocation::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Static-file settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StaticConfig {
    /// URL or path of the bundled document; derived from the site URL when unset.
    pub location: Option<String>,
}

impl StaticConfig {
    /// Resolves the effective location.
    ///
    /// Explicit values win. Otherwise the document is fetched relative to
    /// the site root (`<site_url>/data/projects.json`, keeping any path
    /// prefix), or read from `./data/projects.json`.
    pub fn resolve(&self, site_url: Option<&Url>) -> Result<StaticLocation, AppError> {
        if let Some(raw) = self.location.as_deref().filter(|l| !l.trim().is_empty()) {
            return StaticLocation::parse(raw);
        }
        match site_url {
            Some(site) => {
                let mut base = site.clone();
                if !base.path().ends_with('/') {
                    let dir = format!("{}/", base.path());
                    base.set_path(&dir);
                }
                base.join(DEFAULT_STATIC_PATH)
                    .map(StaticLocation::Url)
                    .map_err(|e| AppError::InvalidUrl(e.to_string()))
            }
            None => Ok(StaticLocation::Path(
                Path::new(".").join(DEFAULT_STATIC_PATH),
            )),
        }
    }
}

/// Complete configuration, as read from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    pub source: SourceConfig,
    pub http: HttpConfig,
    pub proxy: ProxyConfig,
    #[serde(rename = "static")]
    pub static_file: StaticConfig,
}

/// Default config file location: `<config_dir>/folio/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("folio").join("config.toml"))
}

/// Loads configuration from `path`, or from the default location.
///
/// A missing default file yields defaults; a missing explicit file is an error.
pub fn load_config(path: Option<&Path>) -> Result<FolioConfig, AppError> {
    let (path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => match default_config_path() {
            Some(p) => (p, false),
            None => return Ok(FolioConfig::default()),
        },
    };

    if !path.exists() {
        if explicit {
            return Err(AppError::ConfigError(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(FolioConfig::default());
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: FolioConfig = toml::from_str(&contents)
        .map_err(|e| AppError::ConfigError(format!("{}: {}", path.display(), e)))?;
    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(config)
}
