//! Service settings from environment variables.

use crate::error::ConfigError;
use std::net::SocketAddr;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/person";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_SCHEMA: &str = "public";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Which [`crate::store::PersonStore`] the server wires in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl std::str::FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(StoreKind::Postgres),
            "memory" | "mem" => Ok(StoreKind::Memory),
            other => Err(format!("unknown store '{}' (expected postgres or memory)", other)),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub store: StoreKind,
    /// Schema holding the person table. Must be a plain PostgreSQL identifier.
    pub schema: String,
    pub max_connections: u32,
}

impl ServiceConfig {
    /// Read settings from the process environment.
    /// Env: `DATABASE_URL`, `PERSON_BIND_ADDR`, `PERSON_STORE`, `PERSON_SCHEMA`, `PERSON_DB_MAX_CONNECTIONS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same rules as [`ServiceConfig::from_env`], reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into());

        let bind_raw = get("PERSON_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into());
        let bind_addr = bind_raw.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            var: "PERSON_BIND_ADDR",
            reason: format!("'{}': {}", bind_raw, e),
        })?;

        let store = match get("PERSON_STORE") {
            Some(v) => v.parse::<StoreKind>().map_err(|reason| ConfigError::Invalid { var: "PERSON_STORE", reason })?,
            None => StoreKind::Postgres,
        };

        let schema = get("PERSON_SCHEMA").unwrap_or_else(|| DEFAULT_SCHEMA.into());
        if !is_plain_identifier(&schema) {
            return Err(ConfigError::Invalid {
                var: "PERSON_SCHEMA",
                reason: format!("'{}' is not a plain identifier", schema),
            });
        }

        let max_connections = match get("PERSON_DB_MAX_CONNECTIONS") {
            Some(v) => v
                .parse::<u32>()
                .ok()
                .filter(|n| (1..=100).contains(n))
                .ok_or_else(|| ConfigError::Invalid {
                    var: "PERSON_DB_MAX_CONNECTIONS",
                    reason: format!("'{}' must be an integer in 1..=100", v),
                })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(ServiceConfig {
            database_url,
            bind_addr,
            store,
            schema,
            max_connections,
        })
    }
}

/// Lowercase ASCII letters, digits and underscores, not starting with a digit.
fn is_plain_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    s.len() <= 63 && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
