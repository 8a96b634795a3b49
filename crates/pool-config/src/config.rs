//! Configuration management for the userpool client.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Client configuration.
///
/// The pool and client identifiers select which provider backend/tenant
/// is targeted. They have no usable defaults: loading fails fast when
/// either is absent or blank, rather than producing a client that
/// silently talks to nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Identity provider base URL.
    pub provider_url: String,
    /// User pool identifier.
    pub pool_id: String,
    /// Client (application) identifier for the pool.
    pub client_id: String,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Config {
    /// Load configuration from the config file, apply environment
    /// overrides, and validate.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self {
                log_level: DEFAULT_LOG_LEVEL.to_string(),
                provider_url: String::new(),
                pool_id: String::new(),
                client_id: String::new(),
            }
        };

        config.load_from_env();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file without validation.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the config file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    /// Override configuration from environment variables.
    fn load_from_env(&mut self) {
        if let Ok(level) = std::env::var("USERPOOL_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Ok(url) = std::env::var("USERPOOL_PROVIDER_URL") {
            self.provider_url = url;
        }
        if let Ok(pool_id) = std::env::var("USERPOOL_POOL_ID") {
            self.pool_id = pool_id;
        }
        if let Ok(client_id) = std::env::var("USERPOOL_CLIENT_ID") {
            self.client_id = client_id;
        }
    }

    /// Fail fast on missing or malformed settings.
    pub fn validate(&self) -> CoreResult<()> {
        if self.pool_id.trim().is_empty() {
            return Err(CoreError::Config(
                "pool_id is not set (config file or USERPOOL_POOL_ID)".to_string(),
            ));
        }
        if self.client_id.trim().is_empty() {
            return Err(CoreError::Config(
                "client_id is not set (config file or USERPOOL_CLIENT_ID)".to_string(),
            ));
        }
        self.provider_url()?;
        Ok(())
    }

    /// Get the provider URL as a parsed URL.
    pub fn provider_url(&self) -> CoreResult<Url> {
        Url::parse(&self.provider_url).map_err(CoreError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn valid_config() -> Config {
        Config {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            provider_url: "https://auth.example.com".to_string(),
            pool_id: "pool-west-2_abc123".to_string(),
            client_id: "client-4f5g6h".to_string(),
        }
    }

    #[test]
    fn test_valid_config_passes_validation() {
        valid_config().validate().unwrap();
    }

    #[test]
    fn test_missing_pool_id_fails_fast() {
        let mut config = valid_config();
        config.pool_id = "  ".to_string();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn test_missing_client_id_fails_fast() {
        let mut config = valid_config();
        config.client_id = String::new();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_provider_url_fails_fast() {
        let mut config = valid_config();
        config.provider_url = "not a valid url".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        let mut config = valid_config();
        config.log_level = "debug".to_string();
        config.save(&paths).unwrap();

        let loaded = Config::load_from_file(&paths.config_file()).unwrap();
        assert_eq!(loaded.log_level, "debug");
        assert_eq!(loaded.pool_id, config.pool_id);
        assert_eq!(loaded.client_id, config.client_id);
    }

    #[test]
    fn test_load_missing_file_with_no_ids_is_an_error() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        // No config file and no env overrides set in this test process
        // for the required identifiers means load must not silently
        // produce a usable config.
        if std::env::var("USERPOOL_POOL_ID").is_err()
            && std::env::var("USERPOOL_CLIENT_ID").is_err()
        {
            assert!(Config::load(&paths).is_err());
        }
    }

    #[test]
    fn test_provider_url_parse() {
        let config = valid_config();
        let url = config.provider_url().unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.host_str().unwrap(), "auth.example.com");
    }
}
