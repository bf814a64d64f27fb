//! Server configuration from the environment.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use vinmap_core::defaults::{
    ADMIN_SESSION_TTL_SECS, ENV_ADMIN_PASSWORD_HASH, ENV_ADMIN_SESSION_TTL_SECS,
    ENV_DATABASE_MAX_CONNECTIONS, ENV_DATABASE_URL, ENV_STORAGE, SERVER_HOST, SERVER_PORT,
};
use vinmap_core::{Error, Result};
use vinmap_db::pool::DEFAULT_MAX_CONNECTIONS;
use vinmap_inference::{EnrichOptions, GatewayConfig};

/// Where wine records are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Memory,
    Postgres,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Memory => f.write_str("memory"),
            StorageKind::Postgres => f.write_str("postgres"),
        }
    }
}

impl FromStr for StorageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(StorageKind::Memory),
            "postgres" | "postgresql" | "pg" => Ok(StorageKind::Postgres),
            other => Err(Error::Config(format!("unknown storage backend: {}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub storage: StorageKind,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub admin_password_hash: Option<String>,
    pub admin_session_ttl: Duration,
    pub gateway: GatewayConfig,
    pub enrich: EnrichOptions,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: SERVER_HOST.to_string(),
            port: SERVER_PORT,
            storage: StorageKind::Memory,
            database_url: None,
            db_max_connections: DEFAULT_MAX_CONNECTIONS,
            admin_password_hash: None,
            admin_session_ttl: Duration::from_secs(ADMIN_SESSION_TTL_SECS),
            gateway: GatewayConfig::default(),
            enrich: EnrichOptions::default(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl ServerConfig {
    /// Read `HOST`, `PORT`, storage, admin and gateway settings.
    pub fn from_env() -> Result<Self> {
        let port = match non_empty_var("PORT") {
            Some(p) => p
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("invalid PORT: {}", p)))?,
            None => SERVER_PORT,
        };

        let database_url = non_empty_var(ENV_DATABASE_URL);
        let storage = match non_empty_var(ENV_STORAGE) {
            Some(s) => s.parse()?,
            None if database_url.is_some() => StorageKind::Postgres,
            None => StorageKind::Memory,
        };
        if storage == StorageKind::Postgres && database_url.is_none() {
            return Err(Error::Config(format!(
                "{}=postgres requires {}",
                ENV_STORAGE, ENV_DATABASE_URL
            )));
        }

        let db_max_connections = match non_empty_var(ENV_DATABASE_MAX_CONNECTIONS) {
            Some(v) => v.trim().parse().map_err(|_| {
                Error::Config(format!("invalid {}: {}", ENV_DATABASE_MAX_CONNECTIONS, v))
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let ttl_secs = match non_empty_var(ENV_ADMIN_SESSION_TTL_SECS) {
            Some(v) => v.trim().parse().map_err(|_| {
                Error::Config(format!("invalid {}: {}", ENV_ADMIN_SESSION_TTL_SECS, v))
            })?,
            None => ADMIN_SESSION_TTL_SECS,
        };

        Ok(Self {
            host: non_empty_var("HOST").unwrap_or_else(|| SERVER_HOST.to_string()),
            port,
            storage,
            database_url,
            db_max_connections,
            admin_password_hash: non_empty_var(ENV_ADMIN_PASSWORD_HASH),
            admin_session_ttl: Duration::from_secs(ttl_secs),
            gateway: GatewayConfig::from_env(),
            enrich: EnrichOptions::from_env()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_kind_parse() {
        assert_eq!("memory".parse::<StorageKind>().unwrap(), StorageKind::Memory);
        assert_eq!(" Postgres ".parse::<StorageKind>().unwrap(), StorageKind::Postgres);
        assert_eq!("pg".parse::<StorageKind>().unwrap(), StorageKind::Postgres);
        assert!(matches!(
            "sqlite".parse::<StorageKind>(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.storage, StorageKind::Memory);
        assert_eq!(config.admin_session_ttl, Duration::from_secs(1800));
        assert!(config.admin_password_hash.is_none());
        assert_eq!(config.db_max_connections, 5);
    }
}
