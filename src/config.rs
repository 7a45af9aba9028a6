//! Server configuration read from the environment.

use std::env;
use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Dataset JSON path; the bundled dataset is used when unset.
    pub data_path: Option<PathBuf>,
    /// Directory for file-backed favorites; in-memory when unset.
    pub favorites_dir: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid NFTBOARD_ADDR {raw:?}: {source}")]
    InvalidAddr {
        raw: String,
        #[source]
        source: AddrParseError,
    },
}

pub fn server_config_from_env() -> Result<ServerConfig, ConfigError> {
    let raw_addr = env::var("NFTBOARD_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    let bind_addr = raw_addr
        .trim()
        .parse()
        .map_err(|source| ConfigError::InvalidAddr {
            raw: raw_addr.clone(),
            source,
        })?;

    Ok(ServerConfig {
        bind_addr,
        data_path: non_empty_path("NFTBOARD_DATA"),
        favorites_dir: non_empty_path("NFTBOARD_FAVORITES_DIR"),
    })
}

fn non_empty_path(key: &str) -> Option<PathBuf> {
    env::var(key)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
        .map(PathBuf::from)
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
