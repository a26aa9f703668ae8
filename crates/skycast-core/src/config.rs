use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Origin weather API settings
    pub origin: OriginConfig,

    /// Cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Search history settings
    #[serde(default)]
    pub history: HistoryConfig,

    /// City suggestion (autocomplete) settings
    #[serde(default)]
    pub suggest: SuggestConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OriginConfig {
    /// Base URL for the weatherstack-compatible API
    pub base_url: String,

    /// API access key (optional, can be set via WEATHERSTACK_API_KEY)
    pub access_key: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_origin_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_origin_timeout_secs() -> u64 {
    10
}

impl Default for OriginConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.weatherstack.com".to_string(),
            access_key: std::env::var("WEATHERSTACK_API_KEY").ok(),
            timeout_secs: default_origin_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Redis connection URL (optional, can be set via REDIS_URL).
    /// When unset, lookups use an in-process store instead.
    pub redis_url: Option<String>,

    /// Time-to-live for cached weather entries, in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: std::env::var("REDIS_URL").ok(),
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Path to the SQLite database holding per-user search history
    #[serde(default = "default_history_db_path")]
    pub db_path: String,
}

fn default_history_db_path() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("skycast")
        .join("history.db")
        .to_string_lossy()
        .into_owned()
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            db_path: default_history_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestConfig {
    /// Base URL for the GeoNames-compatible search API
    pub base_url: String,

    /// GeoNames account username
    pub username: String,

    /// Request timeout in seconds
    #[serde(default = "default_suggest_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_suggest_timeout_secs() -> u64 {
    5
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            base_url: "http://api.geonames.org".to_string(),
            username: "demo".to_string(),
            timeout_secs: default_suggest_timeout_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("skycast");

        Self {
            config_dir,
            origin: OriginConfig::default(),
            cache: CacheConfig::default(),
            history: HistoryConfig::default(),
            suggest: SuggestConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;

        let mut config: Config =
            toml::from_str(&contents).context("Failed to parse config file")?;

        config.apply_env_overrides();

        Ok(config)
    }

    /// Apply environment overrides for secrets
    ///
    /// Environment variables always win over persisted values so that
    /// deployments can rotate keys without editing the config file.
    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("WEATHERSTACK_API_KEY") {
            self.origin.access_key = Some(key);
        }
        if let Ok(url) = std::env::var("REDIS_URL") {
            self.cache.redis_url = Some(url);
        }
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        if !validation.warnings.is_empty() {
            for warning in &validation.warnings {
                tracing::warn!("Config warning: {}", warning);
            }
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        // Validate origin API URL
        self.validate_url(&self.origin.base_url, "origin.base_url", &mut result);

        if self.origin.timeout_secs == 0 {
            result.add_error("origin.timeout_secs", "Timeout must be greater than 0");
        } else if self.origin.timeout_secs > 60 {
            result.add_warning(
                "origin.timeout_secs",
                "Origin timeout is unusually long (>60s)",
            );
        }

        // Access key is only warned about: the origin rejects the request
        // with a readable message when the key is missing or wrong.
        if self
            .origin
            .access_key
            .as_deref()
            .map_or(true, |k| k.trim().is_empty())
        {
            result.add_warning(
                "origin.access_key",
                "WEATHERSTACK_API_KEY not set - weather lookups will be rejected by the origin",
            );
        }

        // Validate cache settings
        match &self.cache.redis_url {
            Some(redis_url) => match Url::parse(redis_url) {
                Ok(url) if url.scheme() == "redis" || url.scheme() == "rediss" => {}
                Ok(url) => {
                    result.add_error(
                        "cache.redis_url",
                        format!("URL must use redis or rediss scheme, got: {}", url.scheme()),
                    );
                }
                Err(e) => {
                    result.add_error("cache.redis_url", format!("Invalid URL: {}", e));
                }
            },
            None => {
                result.add_warning(
                    "cache.redis_url",
                    "REDIS_URL not set - using in-process cache",
                );
            }
        }

        if self.cache.ttl_secs == 0 {
            result.add_error("cache.ttl_secs", "TTL must be greater than 0");
        } else if self.cache.ttl_secs > 86_400 {
            result.add_warning(
                "cache.ttl_secs",
                "Cached weather older than a day will still be served",
            );
        }

        // Validate suggestion settings
        self.validate_url(&self.suggest.base_url, "suggest.base_url", &mut result);

        if self.suggest.timeout_secs == 0 {
            result.add_error("suggest.timeout_secs", "Timeout must be greater than 0");
        }

        if self.suggest.username.trim().is_empty() {
            result.add_warning(
                "suggest.username",
                "GeoNames username not set - city suggestions will be empty",
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                // Check scheme
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                // Check host
                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                // Validate port if explicitly specified
                if let Some(port) = url.port() {
                    if port == 0 {
                        result.add_error(field_name, "Port cannot be 0");
                    }
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        // Ensure config directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("skycast");

        Ok(config_dir.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_default_config() {
        let config = Config::default();
        let result = config.validate();
        // Default config should be valid (only warnings, no errors)
        assert!(
            result.is_valid(),
            "Default config should be valid: {:?}",
            result.errors
        );
    }

    #[test]
    fn test_invalid_origin_url() {
        let mut config = Config::default();
        config.origin.base_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "origin.base_url"));
    }

    #[test]
    fn test_invalid_origin_url_scheme() {
        let mut config = Config::default();
        config.origin.base_url = "ftp://weather.example.com".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result
            .errors
            .iter()
            .any(|e| e.message.contains("http or https")));
    }

    #[test]
    fn test_missing_access_key_is_warning() {
        let mut config = Config::default();
        config.origin.access_key = None;
        let result = config.validate();
        // Missing key degrades at the origin, it should not block startup
        assert!(result.is_valid());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.field == "origin.access_key"));
    }

    #[test]
    fn test_redis_url_must_use_redis_scheme() {
        let mut config = Config::default();
        config.cache.redis_url = Some("http://localhost:6379".to_string());
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "cache.redis_url"));
    }

    #[test]
    fn test_missing_redis_url_is_warning() {
        let mut config = Config::default();
        config.cache.redis_url = None;
        let result = config.validate();
        assert!(result.is_valid());
        assert!(result.warnings.iter().any(|w| w.field == "cache.redis_url"));
    }

    #[test]
    fn test_zero_ttl_is_error() {
        let mut config = Config::default();
        config.cache.ttl_secs = 0;
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "cache.ttl_secs"));
    }

    #[test]
    fn test_zero_origin_timeout_is_error() {
        let mut config = Config::default();
        config.origin.timeout_secs = 0;
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result
            .errors
            .iter()
            .any(|e| e.field == "origin.timeout_secs"));
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1"));
        assert!(summary.contains("field2"));
    }
}
