//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `JWT_SECRET` - token signing secret (min 32 chars)
//! - `DATABASE_URL` - `PostgreSQL` connection string, only when `STORAGE_BACKEND=postgres`
//!
//! ## Optional
//! - `HOST` - bind address (default: 0.0.0.0)
//! - `PORT` - listen port (default: 8083)
//! - `STORAGE_BACKEND` - `memory` or `postgres` (default: memory)
//! - `DATABASE_MAX_CONNECTIONS` - pool size (default: 10)
//! - `JWT_TTL_HOURS` - token lifetime (default: 24)
//! - `CHECKOUT_DELAY_MS` - artificial checkout processing delay (default: 1500)
//! - `REQUIRE_CAPTCHA` - demand a solved captcha on login (default: false)
//! - `NATS_URL` - publish domain events to NATS when set

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

impl std::str::FromStr for StorageBackend {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            other => Err(format!("unknown storage backend '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: SecretString,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub storage: StorageBackend,
    /// Present iff `storage` is `Postgres`.
    pub database: Option<DatabaseConfig>,
    pub jwt_secret: SecretString,
    pub jwt_ttl_hours: i64,
    pub checkout_delay: Duration,
    pub require_captcha: bool,
    pub nats_url: Option<String>,
}

impl AppConfig {
    /// Load configuration from the process environment, reading `.env` first if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing, a value fails
    /// to parse, or the JWT secret is too short.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let or_default = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let host = parse_var("HOST", &or_default("HOST", "0.0.0.0"))?;
        let port = parse_var("PORT", &or_default("PORT", "8083"))?;
        let storage: StorageBackend = or_default("STORAGE_BACKEND", "memory")
            .parse()
            .map_err(|e| ConfigError::InvalidEnvVar("STORAGE_BACKEND".into(), e))?;
        let database = match storage {
            StorageBackend::Memory => None,
            StorageBackend::Postgres => Some(DatabaseConfig {
                url: get("DATABASE_URL")
                    .map(SecretString::from)
                    .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".into()))?,
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS", &or_default("DATABASE_MAX_CONNECTIONS", "10"))?,
            }),
        };
        let jwt_secret = get("JWT_SECRET")
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET".into()))?;
        validate_jwt_secret(&jwt_secret)?;
        let jwt_ttl_hours = parse_var("JWT_TTL_HOURS", &or_default("JWT_TTL_HOURS", "24"))?;
        let checkout_delay = Duration::from_millis(parse_var("CHECKOUT_DELAY_MS", &or_default("CHECKOUT_DELAY_MS", "1500"))?);
        let require_captcha = parse_var("REQUIRE_CAPTCHA", &or_default("REQUIRE_CAPTCHA", "false"))?;
        let nats_url = get("NATS_URL").filter(|u| !u.trim().is_empty());

        Ok(Self { host, port, storage, database, jwt_secret, jwt_ttl_hours, checkout_delay, require_captcha, nats_url })
    }

    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn validate_jwt_secret(secret: &SecretString) -> Result<(), ConfigError> {
    let len = secret.expose_secret().len();
    if len < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            "JWT_SECRET".to_string(),
            format!("must be at least {MIN_JWT_SECRET_LENGTH} characters (got {len})"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| vars.get(key).cloned()
    }
    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[("JWT_SECRET", SECRET)])).unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8083");
        assert_eq!(config.storage, StorageBackend::Memory);
        assert!(config.database.is_none());
        assert_eq!(config.checkout_delay, Duration::from_millis(1500));
        assert_eq!(config.jwt_ttl_hours, 24);
        assert!(!config.require_captcha);
        assert!(config.nats_url.is_none());
    }
    #[test]
    fn test_postgres_requires_database_url() {
        let err = AppConfig::from_lookup(lookup(&[("JWT_SECRET", SECRET), ("STORAGE_BACKEND", "postgres")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(k) if k == "DATABASE_URL"));
        let config = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", SECRET), ("STORAGE_BACKEND", "postgres"),
            ("DATABASE_URL", "postgres://localhost/tribal"), ("DATABASE_MAX_CONNECTIONS", "4"),
        ])).unwrap();
        assert_eq!(config.database.unwrap().max_connections, 4);
    }
    #[test]
    fn test_short_jwt_secret_rejected() {
        let err = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "short")])).unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(..)));
        assert!(matches!(AppConfig::from_lookup(lookup(&[])).unwrap_err(), ConfigError::MissingEnvVar(_)));
    }
    #[test]
    fn test_invalid_values() {
        let err = AppConfig::from_lookup(lookup(&[("JWT_SECRET", SECRET), ("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(k, _) if k == "PORT"));
        let err = AppConfig::from_lookup(lookup(&[("JWT_SECRET", SECRET), ("STORAGE_BACKEND", "redis")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(k, _) if k == "STORAGE_BACKEND"));
    }
    #[test]
    fn test_debug_redacts_secret() {
        let config = AppConfig::from_lookup(lookup(&[("JWT_SECRET", SECRET)])).unwrap();
        assert!(!format!("{config:?}").contains(SECRET));
    }
}
