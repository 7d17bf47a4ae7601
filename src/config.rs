use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use crate::SearchFilter;
use crate::rank::DEFAULT_MODEL;

/// Default location of the config file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

const DEFAULT_CONFIG: &str = r#"youtube_api_key = ""
gemini_api_key = ""

# Optional settings (defaults shown)
# gemini_model = "gemini-2.5-flash"
# max_results = 20
# min_duration_minutes = 4
# max_duration_minutes = 20
# max_age_days = 14
# over_fetch_factor = 2
# relevance_language = "en"
# request_timeout_secs = 30
"#;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("created default config file at {}; fill in your API keys and run again", .0.display())]
    Created(PathBuf),

    #[error("missing required configuration keys: {}; update {}", .keys.join(", "), .path.display())]
    MissingKeys { path: PathBuf, keys: Vec<&'static str> },

    #[error("could not access config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub youtube_api_key: String,
    pub gemini_api_key: String,
    pub gemini_model: Option<String>,
    pub max_results: Option<u32>,
    pub min_duration_minutes: Option<u32>,
    pub max_duration_minutes: Option<u32>,
    pub max_age_days: Option<u32>,
    pub over_fetch_factor: Option<u32>,
    pub relevance_language: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    /// Load config from `path`.
    ///
    /// A missing file is created with empty API keys and reported as
    /// [`ConfigError::Created`]; a file with an empty key is reported as
    /// [`ConfigError::MissingKeys`]. Either way the caller must not proceed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            write_default(path)?;
            info!("Created default config at {}", path.display());
            return Err(ConfigError::Created(path.to_path_buf()));
        }

        debug!("Loading config from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let keys = config.missing_keys();
        if !keys.is_empty() {
            return Err(ConfigError::MissingKeys {
                path: path.to_path_buf(),
                keys,
            });
        }

        Ok(config)
    }

    /// Search parameters for `query`, falling back to built-in defaults
    pub fn search_filter(&self, query: &str) -> SearchFilter {
        let defaults = SearchFilter::new(query);
        SearchFilter {
            query: query.to_string(),
            max_results: self.max_results.unwrap_or(defaults.max_results),
            min_duration_secs: self
                .min_duration_minutes
                .map_or(defaults.min_duration_secs, |m| u64::from(m) * 60),
            max_duration_secs: self
                .max_duration_minutes
                .map_or(defaults.max_duration_secs, |m| u64::from(m) * 60),
            max_age_days: self.max_age_days.unwrap_or(defaults.max_age_days),
            over_fetch_factor: self.over_fetch_factor.unwrap_or(defaults.over_fetch_factor),
            relevance_language: self
                .relevance_language
                .clone()
                .unwrap_or(defaults.relevance_language),
        }
    }

    pub fn gemini_model(&self) -> &str {
        self.gemini_model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Names of required keys that are absent or blank
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let mut keys = Vec::new();
        if self.youtube_api_key.trim().is_empty() {
            keys.push("youtube_api_key");
        }
        if self.gemini_api_key.trim().is_empty() {
            keys.push("gemini_api_key");
        }
        keys
    }
}

fn write_default(path: &Path) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, DEFAULT_CONFIG).map_err(io_err)
}
