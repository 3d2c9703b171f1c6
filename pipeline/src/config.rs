//! Configuration management for the wellness pipeline
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with WELLNESS_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::{Coordinates, MILLIS_PER_HOUR};

/// Main pipeline configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// External data sources
    pub sources: SourcesConfig,

    /// Local key-value cache
    pub cache: CacheConfig,

    /// Location used when no coordinates are available
    pub location: LocationConfig,

    /// How fields missing from the sources are filled in
    pub placeholders: PlaceholderPolicy,

    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourcesConfig {
    /// Air-quality API endpoint (hourly PM2.5/PM10/UV/pollen)
    pub air_quality_url: String,

    /// Weather API endpoint (hourly temperature/humidity)
    pub weather_url: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Directory holding one JSON file per cache key
    pub directory: String,

    /// Minutes a cached reading stays fresh
    pub freshness_minutes: i64,

    /// Hours a resolved device location is remembered
    pub location_freshness_hours: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LocationConfig {
    pub default_latitude: f64,
    pub default_longitude: f64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderPolicy {
    /// Bounded random values, matching the dashboard's demo data
    #[default]
    Randomized,
    /// Zero, the lowest value of each scale
    Neutral,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Filter used when RUST_LOG is not set
    pub filter: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let environment =
            std::env::var("WELLNESS_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = Self::builder(&environment)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (WELLNESS_ prefix)
            .add_source(
                Environment::with_prefix("WELLNESS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Configuration built from code defaults only
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::builder("development")?.build()?.try_deserialize()
    }

    fn builder(
        environment: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("environment", environment)?
            .set_default(
                "sources.air_quality_url",
                "https://air-quality-api.open-meteo.com/v1/air-quality",
            )?
            .set_default("sources.weather_url", "https://api.open-meteo.com/v1/forecast")?
            .set_default("sources.request_timeout_secs", 30)?
            .set_default("cache.directory", ".wellness-cache")?
            .set_default("cache.freshness_minutes", 180)?
            .set_default("cache.location_freshness_hours", 24)?
            // London
            .set_default("location.default_latitude", 51.5074)?
            .set_default("location.default_longitude", -0.1278)?
            .set_default("placeholders", "randomized")?
            .set_default("logging.filter", "wellness_pipeline=debug,reqwest=warn")?
            .set_default("logging.json", false)
    }
}

impl CacheConfig {
    pub fn freshness_window_ms(&self) -> i64 {
        self.freshness_minutes * 60 * 1000
    }

    pub fn location_window_ms(&self) -> i64 {
        self.location_freshness_hours * MILLIS_PER_HOUR
    }
}

impl LocationConfig {
    pub fn default_coordinates(&self) -> Coordinates {
        Coordinates::new(self.default_latitude, self.default_longitude)
    }
}
