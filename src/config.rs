use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub cache: CacheConfig,

    pub flight_api: FlightApiConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/flightstat.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 8000,
            cors_allowed_origins: vec![
                "http://localhost:8000".to_string(),
                "http://127.0.0.1:8000".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Runtime switch. When off every cache operation passes straight through.
    pub enabled: bool,

    /// "redis" or "memory"
    pub backend: String,

    pub redis_url: String,

    pub default_ttl_seconds: u64,

    /// Entry cap for the in-process backend
    pub max_capacity: u64,

    /// Namespace prepended to every record key (`{prefix}_{pk}`)
    pub key_prefix: String,

    /// Re-read a cached record from the database before returning it
    pub refresh_on_read: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            backend: "redis".to_string(),
            redis_url: "redis://127.0.0.1:6379/1".to_string(),
            default_ttl_seconds: 300,
            max_capacity: 10_000,
            key_prefix: "flight".to_string(),
            refresh_on_read: true,
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_seconds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// Call the external API inline in the request flow
    Immediate,
    /// Hand the call to a background task and wait a bounded time for it
    Deferred,
}

impl FetchMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::Deferred => "deferred",
        }
    }
}

impl std::str::FromStr for FetchMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "immediate" | "sync" => Ok(Self::Immediate),
            "deferred" | "async" => Ok(Self::Deferred),
            other => anyhow::bail!("Unknown fetch mode '{other}' (expected immediate or deferred)"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightApiConfig {
    /// Placeholders: {airline}, {flight_number}, {year}, {month}, {day}
    pub url_template: String,

    /// Per-request timeout in seconds (default: 10)
    pub request_timeout_seconds: u64,

    pub fetch_mode: FetchMode,

    /// How long a deferred fetch is awaited before giving up (default: 30)
    pub deferred_wait_seconds: u64,
}

impl Default for FlightApiConfig {
    fn default() -> Self {
        Self {
            url_template: "https://www.flightstats.com/v2/api-next/flight-tracker/{airline}/{flight_number}/{year}/{month}/{day}".to_string(),
            request_timeout_seconds: 10,
            fetch_mode: FetchMode::Immediate,
            deferred_wait_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        let mut config = None;
        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                config = Some(Self::load_from_path(path)?);
                break;
            }
        }

        let mut config = config.unwrap_or_else(|| {
            info!("No config file found, using defaults");
            Self::default()
        });
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Environment variables win over the file so containers can be configured
    /// without mounting a config.toml.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("FLIGHTSTAT_DATABASE_URL") {
            self.general.database_path = url;
        }

        if let Ok(enabled) = std::env::var("FLIGHTSTAT_CACHE_ENABLED") {
            self.cache.enabled = matches!(
                enabled.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }

        if let Ok(url) = std::env::var("FLIGHTSTAT_REDIS_URL") {
            self.cache.redis_url = url;
        }

        if let Ok(url) = std::env::var("FLIGHTSTAT_FLIGHT_API_URL") {
            self.flight_api.url_template = url;
        }

        if let Ok(mode) = std::env::var("FLIGHTSTAT_FETCH_MODE") {
            self.flight_api.fetch_mode = mode
                .parse()
                .context("Invalid FLIGHTSTAT_FETCH_MODE")?;
        }

        Ok(())
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("flightstat").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".flightstat").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache.enabled && self.cache.default_ttl_seconds == 0 {
            anyhow::bail!("Cache TTL must be > 0 when the cache is enabled");
        }

        if self.cache.key_prefix.is_empty() {
            anyhow::bail!("Cache key prefix cannot be empty");
        }

        if self.flight_api.request_timeout_seconds == 0 {
            anyhow::bail!("Flight API request timeout must be > 0");
        }

        if self.flight_api.fetch_mode == FetchMode::Deferred
            && self.flight_api.deferred_wait_seconds == 0
        {
            anyhow::bail!("Deferred fetch wait must be > 0 in deferred mode");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.cache.enabled);
        assert_eq!(config.cache.key_prefix, "flight");
        assert_eq!(config.cache.default_ttl_seconds, 300);
        assert_eq!(config.flight_api.request_timeout_seconds, 10);
        assert_eq!(config.flight_api.deferred_wait_seconds, 30);
        assert_eq!(config.flight_api.fetch_mode, FetchMode::Immediate);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[cache]"));
        assert!(toml_str.contains("[flight_api]"));
        assert!(toml_str.contains("fetch_mode = \"immediate\""));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [cache]
            enabled = true
            backend = "memory"
            default_ttl_seconds = 60

            [flight_api]
            fetch_mode = "deferred"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(config.cache.enabled);
        assert_eq!(config.cache.backend, "memory");
        assert_eq!(config.cache.ttl(), Duration::from_secs(60));
        assert_eq!(config.flight_api.fetch_mode, FetchMode::Deferred);

        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.cache.key_prefix, "flight");
    }

    #[test]
    fn test_validate_rejects_zero_ttl_when_enabled() {
        let mut config = Config::default();
        config.cache.enabled = true;
        config.cache.default_ttl_seconds = 0;
        assert!(config.validate().is_err());

        config.cache.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_deferred_wait() {
        let mut config = Config::default();
        config.flight_api.fetch_mode = FetchMode::Deferred;
        config.flight_api.deferred_wait_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fetch_mode_parse() {
        assert_eq!("deferred".parse::<FetchMode>().unwrap(), FetchMode::Deferred);
        assert_eq!("SYNC".parse::<FetchMode>().unwrap(), FetchMode::Immediate);
        assert!("later".parse::<FetchMode>().is_err());
    }
}
