//! Configuration validation.
//!
//! Validates server config fields before any storage connection is opened.

use crate::domain::error::LedgerError;
use crate::ports::config_port::ConfigPort;
use std::net::SocketAddr;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:8000";
pub const DEFAULT_POOL_SIZE: i64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    Postgres,
}

pub fn validate_server_config(config: &dyn ConfigPort) -> Result<(), LedgerError> {
    let backend = storage_backend(config)?;
    pool_size(config, backend)?;
    listen_addr(config)?;
    Ok(())
}

pub fn storage_backend(config: &dyn ConfigPort) -> Result<Backend, LedgerError> {
    let value = config
        .get_string("database", "backend")
        .unwrap_or_else(|| "sqlite".to_string());
    match value.trim().to_lowercase().as_str() {
        "sqlite" => Ok(Backend::Sqlite),
        "postgres" | "postgresql" => Ok(Backend::Postgres),
        other => Err(LedgerError::ConfigInvalid {
            section: "database".to_string(),
            key: "backend".to_string(),
            reason: format!("unknown backend {other:?}, expected sqlite or postgres"),
        }),
    }
}

pub fn listen_addr(config: &dyn ConfigPort) -> Result<SocketAddr, LedgerError> {
    let value = config
        .get_string("web", "listen")
        .unwrap_or_else(|| DEFAULT_LISTEN.to_string());
    value.parse().map_err(|_| LedgerError::ConfigInvalid {
        section: "web".to_string(),
        key: "listen".to_string(),
        reason: format!("{value:?} is not a socket address"),
    })
}

/// `pool_size` from the backend's own section, defaulting to 4.
pub fn pool_size(config: &dyn ConfigPort, backend: Backend) -> Result<u32, LedgerError> {
    let section = match backend {
        Backend::Sqlite => "sqlite",
        Backend::Postgres => "postgres",
    };
    let value = config.get_int(section, "pool_size", DEFAULT_POOL_SIZE);
    u32::try_from(value)
        .ok()
        .filter(|size| *size >= 1)
        .ok_or_else(|| LedgerError::ConfigInvalid {
            section: section.to_string(),
            key: "pool_size".to_string(),
            reason: format!("{value} is not a valid pool size, expected at least 1"),
        })
}
