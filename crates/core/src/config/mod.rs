//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PRECACHE_*)
//! 2. TOML config file (if PRECACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PRECACHE_*)
/// 2. TOML config file (if PRECACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Origin of the page the worker serves. Asset paths resolve against it,
    /// and responses from this origin are classified as basic.
    ///
    /// Set via PRECACHE_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Name of the current cache bucket. Bump the version suffix to make
    /// activation drop every older bucket.
    ///
    /// Set via PRECACHE_CACHE_NAME environment variable.
    #[serde(default = "default_cache_name")]
    pub cache_name: String,

    /// Asset paths seeded into the bucket on install.
    ///
    /// Set via PRECACHE_ASSETS environment variable (e.g. `["./","./app.js"]`).
    #[serde(default = "default_assets")]
    pub assets: Vec<String>,

    /// Asset path dropped from the list when seeding the full list fails.
    ///
    /// Set via PRECACHE_ROOT_PATH environment variable.
    #[serde(default = "default_root_path")]
    pub root_path: String,

    /// Path to SQLite cache database.
    ///
    /// Set via PRECACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via PRECACHE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via PRECACHE_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via PRECACHE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum number of redirects to follow.
    ///
    /// Set via PRECACHE_MAX_REDIRECTS environment variable.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Activate immediately after a successful install instead of waiting
    /// for an explicit activation.
    ///
    /// Set via PRECACHE_SKIP_WAITING environment variable.
    #[serde(default = "default_true")]
    pub skip_waiting: bool,

    /// Status of the placeholder served when offline with nothing cached.
    ///
    /// Set via PRECACHE_OFFLINE_STATUS environment variable.
    #[serde(default = "default_offline_status")]
    pub offline_status: u16,

    /// Body of the offline placeholder.
    ///
    /// Set via PRECACHE_OFFLINE_BODY environment variable.
    #[serde(default = "default_offline_body")]
    pub offline_body: String,
}

fn default_origin() -> String {
    "http://localhost:8080/".into()
}

fn default_cache_name() -> String {
    "precache-v1".into()
}

fn default_assets() -> Vec<String> {
    ["./", "./index.html", "./manifest.json", "./service-worker.js", "./icon-192.png", "./icon-512.png"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_root_path() -> String {
    "./".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./precache.sqlite")
}

fn default_user_agent() -> String {
    "precache/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_redirects() -> usize {
    5
}

fn default_true() -> bool {
    true
}

fn default_offline_status() -> u16 {
    503
}

fn default_offline_body() -> String {
    "Offline - page not cached".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            cache_name: default_cache_name(),
            assets: default_assets(),
            root_path: default_root_path(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            max_redirects: default_max_redirects(),
            skip_waiting: true,
            offline_status: default_offline_status(),
            offline_body: default_offline_body(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PRECACHE_`
    /// 2. TOML file from `PRECACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    /// The layered provider stack used by [`AppConfig::load`].
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PRECACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment.merge(
            Env::prefixed("PRECACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        )
    }

    /// Extract and validate a configuration from a provider stack.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.origin, "http://localhost:8080/");
        assert_eq!(config.cache_name, "precache-v1");
        assert_eq!(config.assets.len(), 6);
        assert_eq!(config.assets[0], "./");
        assert_eq!(config.root_path, "./");
        assert_eq!(config.db_path, PathBuf::from("./precache.sqlite"));
        assert_eq!(config.user_agent, "precache/0.1");
        assert_eq!(config.max_bytes, 5_242_880);
        assert_eq!(config.timeout_ms, 20_000);
        assert_eq!(config.max_redirects, 5);
        assert!(config.skip_waiting);
        assert_eq!(config.offline_status, 503);
        assert_eq!(config.offline_body, "Offline - page not cached");
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(20_000));
    }

    #[test]
    fn test_load_env_overrides() {
        Jail::expect_with(|jail| {
            jail.set_env("PRECACHE_CACHE_NAME", "precache-v2");
            jail.set_env("PRECACHE_SKIP_WAITING", "false");
            jail.set_env("PRECACHE_ASSETS", "[\"./\", \"./app.js\"]");

            let config = AppConfig::load().unwrap();
            assert_eq!(config.cache_name, "precache-v2");
            assert!(!config.skip_waiting);
            assert_eq!(config.assets, vec!["./", "./app.js"]);
            Ok(())
        });
    }

    #[test]
    fn test_load_toml_file_then_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "precache.toml",
                r#"
                origin = "https://app.example.com/"
                cache_name = "from-file"
                "#,
            )?;
            jail.set_env("PRECACHE_CONFIG_FILE", "precache.toml");
            jail.set_env("PRECACHE_CACHE_NAME", "from-env");

            let config = AppConfig::load().unwrap();
            assert_eq!(config.origin, "https://app.example.com/");
            assert_eq!(config.cache_name, "from-env");
            Ok(())
        });
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        Jail::expect_with(|jail| {
            jail.set_env("PRECACHE_OFFLINE_STATUS", "42");

            let result = AppConfig::load();
            assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "offline_status"));
            Ok(())
        });
    }
}
