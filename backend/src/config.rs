//! Configuration management for the ERP analytics server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with ERPA__ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::{CoercionPolicy, NormalizeOptions, QuantityUnit};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT authentication configuration
    pub jwt: JwtConfig,

    /// Where analytics read their raw records from
    pub data_source: DataSourceKind,

    /// Upstream ERP REST API, used when `data_source = "erp_api"`
    pub erp_api: ErpApiConfig,

    /// Record normalization settings
    pub analytics: AnalyticsConfig,

    /// Log output settings
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWT tokens
    pub secret: String,

    /// Access token expiration in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiration in seconds
    pub refresh_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DataSourceKind {
    Database,
    ErpApi,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ErpApiConfig {
    /// Base URL of the ERP REST API
    pub base_url: String,

    /// Bearer token sent to the ERP, if it needs one
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct AnalyticsConfig {
    /// zero_default or reject
    pub coercion_policy: CoercionPolicy,

    /// Unit of quantity columns that do not name one
    pub quantity_unit: QuantityUnit,
}

impl AnalyticsConfig {
    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            coercion: self.coercion_policy,
            default_unit: self.quantity_unit,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("ERPA_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("jwt.access_token_expiry", 3600)?
            .set_default("jwt.refresh_token_expiry", 604800)?
            .set_default("data_source", "database")?
            .set_default("erp_api.base_url", "http://localhost:8080/api")?
            .set_default("erp_api.timeout_secs", 30)?
            .set_default("analytics.coercion_policy", "zero_default")?
            .set_default("analytics.quantity_unit", "metric_ton")?
            .set_default("log.format", "pretty")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (ERPA__ prefix)
            .add_source(
                Environment::with_prefix("ERPA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Development configuration that needs no environment
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            environment: "test".to_string(),
            server: ServerConfig {
                port: 3000,
                host: "127.0.0.1".to_string(),
            },
            database: DatabaseConfig {
                url: "postgres://localhost/erp_analytics_test".to_string(),
                max_connections: 1,
                min_connections: 0,
            },
            jwt: JwtConfig {
                secret: "test-secret".to_string(),
                access_token_expiry: 3600,
                refresh_token_expiry: 604800,
            },
            data_source: DataSourceKind::Database,
            erp_api: ErpApiConfig {
                base_url: "http://localhost:8080/api".to_string(),
                api_key: None,
                timeout_secs: 5,
            },
            analytics: AnalyticsConfig {
                coercion_policy: CoercionPolicy::ZeroDefault,
                quantity_unit: QuantityUnit::MetricTon,
            },
            log: LogConfig {
                format: LogFormat::Pretty,
            },
        }
    }
}
