//! Process configuration read from the environment (and `.env` via dotenvy).

use std::env;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::auth::jwt::DEFAULT_JWT_SECRET;
use crate::counter::RetryPolicy;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout: Duration,
    pub run_migrations: bool,
    pub registry_cache_ttl: Duration,
    pub commit_retry: RetryPolicy,
    pub cors_allowed_origins: Vec<String>,
    pub jwt_secret: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let db_max_connections = parse_or(&get, "DB_MAX_CONNECTIONS", 20)?;
        let db_min_connections = parse_or(&get, "DB_MIN_CONNECTIONS", 2)?;
        if db_min_connections > db_max_connections {
            return Err(ConfigError::Invalid {
                name: "DB_MIN_CONNECTIONS",
                value: db_min_connections.to_string(),
            });
        }

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            log::warn!("JWT_SECRET not set, using default secret (not suitable for production)");
            DEFAULT_JWT_SECRET.to_string()
        });

        Ok(Self {
            database_url,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&get, "PORT", 8080)?,
            db_max_connections,
            db_min_connections,
            db_acquire_timeout: Duration::from_secs(parse_or(&get, "DB_ACQUIRE_TIMEOUT_SECS", 30)?),
            run_migrations: parse_bool_or(&get, "RUN_MIGRATIONS", true)?,
            registry_cache_ttl: Duration::from_secs(parse_or(&get, "REGISTRY_CACHE_TTL_SECS", 600)?),
            commit_retry: RetryPolicy {
                max_retries: parse_or(&get, "COMMIT_MAX_RETRIES", 3)?,
                backoff: Duration::from_millis(parse_or(&get, "COMMIT_RETRY_BACKOFF_MS", 25)?),
            },
            cors_allowed_origins,
            jwt_secret,
        })
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn parse_or<T, G>(get: &G, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

fn parse_bool_or<G>(get: &G, name: &'static str, default: bool) -> Result<bool, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(value) => match value.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid { name, value }),
        },
        None => Ok(default),
    }
}
