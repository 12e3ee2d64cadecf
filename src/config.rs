//! Configuration file parser for ~/.config/category-tree/config.toml.
//!
//! The config file is optional. A missing file yields `Config::default()`.
//! Unknown keys are ignored by serde, though a warning is logged for each so
//! typos do not go unnoticed.
use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::catalog::{BuildOptions, SortDirection, SortField, DEFAULT_MAX_PATH_DEPTH};
use crate::source::SourceOptions;

/// Environment variable that overrides `api_token`.
pub const API_TOKEN_ENV: &str = "CATEGORY_TREE_API_TOKEN";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: &'static str, message: String },
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// The `Debug` impl masks `api_token`.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the storefront API, e.g. `https://api.shop.example/v1`.
    pub api_base_url: Option<String>,

    /// Path of the category listing below `api_base_url`.
    pub categories_path: String,

    /// Bearer token for the category endpoint. The env var takes precedence.
    pub api_token: Option<String>,

    pub request_timeout_secs: u64,

    /// Fail the build instead of warning when a parent title is ambiguous.
    pub strict_titles: bool,

    /// Upper bound on ancestor walks for breadcrumbs.
    pub max_path_depth: usize,

    /// Image CDN base for bare thumbnail public ids.
    pub image_cdn_base: Option<String>,

    /// Requested thumbnail edge in pixels.
    pub thumbnail_size: u32,

    /// One of `title`, `status`, `createdAt`.
    pub default_sort: String,

    /// `asc` or `desc`.
    pub default_direction: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: None,
            categories_path: "categories".to_string(),
            api_token: None,
            request_timeout_secs: 20,
            strict_titles: false,
            max_path_depth: DEFAULT_MAX_PATH_DEPTH,
            image_cdn_base: None,
            thumbnail_size: 48,
            default_sort: "title".to_string(),
            default_direction: "asc".to_string(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_base_url", &self.api_base_url)
            .field("categories_path", &self.categories_path)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("strict_titles", &self.strict_titles)
            .field("max_path_depth", &self.max_path_depth)
            .field("image_cdn_base", &self.image_cdn_base)
            .field("thumbnail_size", &self.thumbnail_size)
            .field("default_sort", &self.default_sort)
            .field("default_direction", &self.default_direction)
            .finish()
    }
}

const KNOWN_KEYS: &[&str] = &[
    "api_base_url",
    "categories_path",
    "api_token",
    "request_timeout_secs",
    "strict_titles",
    "max_path_depth",
    "image_cdn_base",
    "thumbnail_size",
    "default_sort",
    "default_direction",
];

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing or empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    /// - Unparseable sort/direction or zero depth → `Err(ConfigError::InvalidValue)`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Size check before reading
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        tracing::info!(
            path = %path.display(),
            api_base_url = ?config.api_base_url,
            strict_titles = config.strict_titles,
            "Loaded configuration"
        );
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.sort_field()?;
        self.sort_direction()?;
        if self.max_path_depth == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_path_depth",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn sort_field(&self) -> Result<SortField, ConfigError> {
        self.default_sort
            .parse()
            .map_err(|e: crate::catalog::compare::ParseSortError| ConfigError::InvalidValue {
                key: "default_sort",
                message: e.to_string(),
            })
    }

    pub fn sort_direction(&self) -> Result<SortDirection, ConfigError> {
        self.default_direction
            .parse()
            .map_err(|e: crate::catalog::compare::ParseSortError| ConfigError::InvalidValue {
                key: "default_direction",
                message: e.to_string(),
            })
    }

    /// Token from `CATEGORY_TREE_API_TOKEN`, falling back to the file.
    pub fn api_token(&self) -> Option<SecretString> {
        self.resolve_api_token(std::env::var(API_TOKEN_ENV).ok())
    }

    fn resolve_api_token(&self, env_value: Option<String>) -> Option<SecretString> {
        env_value
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.api_token.clone())
            .map(SecretString::from)
    }

    pub fn source_options(&self) -> SourceOptions {
        SourceOptions {
            timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
        }
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            strict_titles: self.strict_titles,
            max_depth: self.max_path_depth,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
