//! API server configuration.
//!
//! Configuration is loaded from environment variables (after an optional
//! `.env` file) with fallback to defaults. It is built once in `main` and
//! carried in [`AppState`](crate::AppState).

use jsonwebtoken::Algorithm;
use std::env;

/// Secret used when `SECRET_KEY` is unset. Startup logs a warning.
pub const DEV_SECRET_KEY: &str = "storefront-dev-secret-change-in-production";

/// API server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Reported by `GET /`
    pub app_name: String,

    /// SQLite database location (`sqlite://path` or `:memory:`)
    pub database_url: String,

    /// Connection pool size
    pub database_max_connections: u32,

    /// HTTP bind host
    pub http_host: String,

    /// HTTP bind port
    pub http_port: u16,

    /// HMAC secret for signing tokens
    pub secret_key: String,

    /// Token signing algorithm (HS256, HS384 or HS512)
    pub algorithm: Algorithm,

    /// Access token lifetime in minutes
    pub access_token_expire_minutes: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            app_name: "E-commerce API".to_string(),
            database_url: "sqlite://storefront.db".to_string(),
            database_max_connections: 5,
            http_host: "0.0.0.0".to_string(),
            http_port: 8000,
            secret_key: DEV_SECRET_KEY.to_string(),
            algorithm: Algorithm::HS256,
            access_token_expire_minutes: 30,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first if present.
    pub fn load() -> Result<Self, ConfigError> {
        // Missing .env is fine; real environment variables still apply
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();

        let config = AppConfig {
            app_name: lookup("APP_NAME").unwrap_or(defaults.app_name),

            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),

            database_max_connections: match lookup("DATABASE_MAX_CONNECTIONS") {
                Some(v) => parse_positive(&v, "DATABASE_MAX_CONNECTIONS")?,
                None => defaults.database_max_connections,
            },

            http_host: lookup("HTTP_HOST").unwrap_or(defaults.http_host),

            http_port: match lookup("HTTP_PORT") {
                Some(v) => v
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("HTTP_PORT".to_string()))?,
                None => defaults.http_port,
            },

            secret_key: match lookup("SECRET_KEY") {
                Some(v) if v.trim().is_empty() => {
                    return Err(ConfigError::InvalidValue("SECRET_KEY".to_string()))
                }
                Some(v) => v,
                None => defaults.secret_key,
            },

            algorithm: match lookup("ALGORITHM") {
                Some(v) => parse_algorithm(&v)?,
                None => defaults.algorithm,
            },

            access_token_expire_minutes: match lookup("ACCESS_TOKEN_EXPIRE_MINUTES") {
                Some(v) => parse_positive(&v, "ACCESS_TOKEN_EXPIRE_MINUTES")?,
                None => defaults.access_token_expire_minutes,
            },
        };

        Ok(config)
    }

    /// `host:port` to bind the listener to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    /// True when running with the built-in development secret.
    pub fn uses_dev_secret(&self) -> bool {
        self.secret_key == DEV_SECRET_KEY
    }

    /// Database URL cut short for log lines.
    pub fn database_url_for_log(&self) -> String {
        self.database_url.chars().take(30).collect()
    }
}

fn parse_positive<T>(value: &str, key: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match value.trim().parse::<T>() {
        Ok(n) if n > T::default() => Ok(n),
        _ => Err(ConfigError::InvalidValue(key.to_string())),
    }
}

fn parse_algorithm(value: &str) -> Result<Algorithm, ConfigError> {
    match value.trim() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        _ => Err(ConfigError::InvalidValue("ALGORITHM".to_string())),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
