//! Process settings read from the environment.

use crate::error::ConfigError;
use std::net::SocketAddr;
use std::str::FromStr;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/studio";
pub const DEFAULT_SCHEMA: &str = "public";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub schema: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub max_body_bytes: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup. Unset keys take their defaults; set but unparsable
    /// values are a `ConfigError::Load`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let schema = text("DB_SCHEMA", DEFAULT_SCHEMA);
        if schema.trim().is_empty() {
            return Err(ConfigError::Load("DB_SCHEMA must not be empty".into()));
        }
        Ok(Settings {
            database_url: text("DATABASE_URL", DEFAULT_DATABASE_URL),
            schema,
            bind_addr: parsed(&lookup, "BIND_ADDR", DEFAULT_BIND_ADDR.parse().ok())?,
            max_connections: parsed(&lookup, "DB_MAX_CONNECTIONS", Some(DEFAULT_MAX_CONNECTIONS))?,
            max_body_bytes: parsed(&lookup, "MAX_BODY_BYTES", Some(DEFAULT_MAX_BODY_BYTES))?,
        })
    }
}

fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Option<T>,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Load(format!("{} has an invalid value: {}", key, raw))),
        None => default.ok_or_else(|| ConfigError::Load(format!("{} is required", key))),
    }
}
