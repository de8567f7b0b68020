//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Course finder endpoints
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Storage backend selection
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if self.catalog.campuses.is_empty() {
            return Err(AppError::validation("No campuses defined"));
        }
        Url::parse(&self.catalog.course_base)
            .map_err(|e| AppError::validation(format!("catalog.course_base: {e}")))?;
        self.catalog.list_url()?;

        if self.storage.timeout_secs == 0 {
            return Err(AppError::validation("storage.timeout_secs must be > 0"));
        }
        if self.storage.backend == StorageBackend::Redis {
            if cfg!(not(feature = "redis")) {
                return Err(AppError::validation(
                    "storage.backend = \"redis\" requires the `redis` feature",
                ));
            }
            if self.storage.redis_url.trim().is_empty() {
                return Err(AppError::validation("storage.redis_url is empty"));
            }
        }
        Ok(())
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum concurrent detail page requests
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Cap on consecutive session recoveries against the list endpoint.
    /// Unset means the list endpoint is revisited for as long as it rejects us.
    #[serde(default)]
    pub max_session_retries: Option<u32>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
            max_session_retries: None,
        }
    }
}

/// Course finder endpoints and list query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL that detail paths from the course list are appended to
    #[serde(default = "defaults::course_base")]
    pub course_base: String,

    /// Path of the course list search, relative to `course_base`
    #[serde(default = "defaults::list_path")]
    pub list_path: String,

    /// Free-text search (empty selects every course)
    #[serde(default)]
    pub query_text: String,

    /// Requirement filter (empty disables it)
    #[serde(default)]
    pub requirements: String,

    /// Campuses included in the search
    #[serde(default = "defaults::campuses")]
    pub campuses: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            course_base: defaults::course_base(),
            list_path: defaults::list_path(),
            query_text: String::new(),
            requirements: String::new(),
            campuses: defaults::campuses(),
        }
    }
}

impl CatalogConfig {
    /// Full URL of the course list request.
    pub fn list_url(&self) -> Result<String> {
        let endpoint = format!("{}{}", self.course_base, self.list_path);
        let url = Url::parse_with_params(
            &endpoint,
            &[
                ("queryText", self.query_text.as_str()),
                ("requirements", self.requirements.as_str()),
                ("campusParam", self.campuses.join(",").as_str()),
            ],
        )?;
        Ok(url.to_string())
    }
}

/// Which storage backend receives crawled courses.
///
/// Defaults to Redis when built with the `redis` feature, local files otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local map, discarded on exit
    Memory,
    /// One JSON file per course under the storage directory
    Local,
    /// RediSearch index with code/name searchable
    Redis,
}

impl Default for StorageBackend {
    fn default() -> Self {
        if cfg!(feature = "redis") {
            StorageBackend::Redis
        } else {
            StorageBackend::Local
        }
    }
}

/// Storage backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Redis connection URL
    #[serde(default = "defaults::redis_url")]
    pub redis_url: String,

    /// Redis password, applied on top of `redis_url`
    #[serde(default)]
    pub password: Option<String>,

    /// Name of the search index
    #[serde(default = "defaults::index_name")]
    pub index_name: String,

    /// Key prefix of indexed course documents
    #[serde(default = "defaults::key_prefix")]
    pub key_prefix: String,

    /// Per-call timeout for storage requests in seconds
    #[serde(default = "defaults::storage_timeout")]
    pub timeout_secs: u64,

    /// Create the search index before crawling
    #[serde(default = "defaults::create_index")]
    pub create_index: bool,

    /// Write Redis records as index documents rather than plain strings
    #[serde(default = "defaults::indexed")]
    pub indexed: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            redis_url: defaults::redis_url(),
            password: None,
            index_name: defaults::index_name(),
            key_prefix: defaults::key_prefix(),
            timeout_secs: defaults::storage_timeout(),
            create_index: defaults::create_index(),
            indexed: defaults::indexed(),
        }
    }
}

mod defaults {
    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; course-crawler/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_concurrent() -> usize {
        50
    }

    // Catalog defaults
    pub fn course_base() -> String {
        "https://coursefinder.utoronto.ca/course-search/search/".into()
    }
    pub fn list_path() -> String {
        "courseSearch/course/search".into()
    }
    pub fn campuses() -> Vec<String> {
        vec![
            "St. George".into(),
            "Scarborough".into(),
            "Mississauga".into(),
        ]
    }

    // Storage defaults
    pub fn redis_url() -> String {
        "redis://127.0.0.1:6379".into()
    }
    pub fn index_name() -> String {
        "course".into()
    }
    pub fn key_prefix() -> String {
        "course:".into()
    }
    pub fn storage_timeout() -> u64 {
        5
    }
    pub fn create_index() -> bool {
        true
    }
    pub fn indexed() -> bool {
        true
    }
}
