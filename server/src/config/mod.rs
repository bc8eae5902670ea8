use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::str::FromStr;

use thiserror::Error;

use crate::models::GarageDefaults;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            "memory" | "in-memory" => Ok(StorageBackend::Memory),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub host: IpAddr,
    pub port: u16,
    pub garage: GarageDefaults,
    pub production: bool,
    pub cors_allowed_origins: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests need not touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage_backend = parse_or(&lookup, "STORAGE_BACKEND", StorageBackend::Postgres)?;
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let total_spaces: i32 =
            parse_or(&lookup, "GARAGE_TOTAL_SPACES", GarageDefaults::default().total_spaces)?;
        if total_spaces <= 0 {
            return Err(ConfigError::Invalid {
                key: "GARAGE_TOTAL_SPACES",
                value: total_spaces.to_string(),
            });
        }
        let hourly_rate_cents: i64 = parse_or(
            &lookup,
            "GARAGE_HOURLY_RATE_CENTS",
            GarageDefaults::default().hourly_rate_cents,
        )?;
        if hourly_rate_cents < 0 {
            return Err(ConfigError::Invalid {
                key: "GARAGE_HOURLY_RATE_CENTS",
                value: hourly_rate_cents.to_string(),
            });
        }

        Ok(Self {
            storage_backend,
            database_url,
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?,
            host: parse_or(&lookup, "HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?,
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            garage: GarageDefaults {
                total_spaces,
                hourly_rate_cents,
            },
            production: lookup("RUST_ENV")
                .map(|v| v.to_lowercase() == "production")
                .unwrap_or(false),
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS"),
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_with_database_url() {
        let config = config_from(&[("DATABASE_URL", "postgres://localhost/parking")]).unwrap();

        assert_eq!(config.storage_backend, StorageBackend::Postgres);
        assert_eq!(config.port, 5000);
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.garage, GarageDefaults::default());
        assert!(!config.production);
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:5000");
    }

    #[test]
    fn test_postgres_requires_database_url() {
        assert_eq!(config_from(&[]).unwrap_err(), ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn test_memory_backend_needs_no_database() {
        let config = config_from(&[
            ("STORAGE_BACKEND", "memory"),
            ("PORT", "8080"),
            ("GARAGE_TOTAL_SPACES", "25"),
            ("GARAGE_HOURLY_RATE_CENTS", "350"),
            ("RUST_ENV", "Production"),
        ])
        .unwrap();

        assert_eq!(config.storage_backend, StorageBackend::Memory);
        assert_eq!(config.port, 8080);
        assert_eq!(config.garage.total_spaces, 25);
        assert_eq!(config.garage.hourly_rate_cents, 350);
        assert!(config.production);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = config_from(&[("STORAGE_BACKEND", "memory"), ("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));

        let err = config_from(&[("STORAGE_BACKEND", "memory"), ("GARAGE_TOTAL_SPACES", "0")])
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "GARAGE_TOTAL_SPACES", .. }));

        let err = config_from(&[("STORAGE_BACKEND", "sqlite")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "STORAGE_BACKEND", .. }));
    }
}
