//! Logging setup and server lifecycle events.

use std::env;
use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::parse_bool;

/// `NFTBOARD_LOG_LEVEL` is an `EnvFilter` directive; `NFTBOARD_LOG_JSON`
/// switches from human-readable lines to one JSON object per event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoggingInitError {
    #[error("logging already initialized: {0}")]
    AlreadyInitialized(#[from] tracing::subscriber::SetGlobalDefaultError),
}

pub fn logging_config_from_env() -> LoggingConfig {
    let defaults = LoggingConfig::default();
    LoggingConfig {
        level: env::var("NFTBOARD_LOG_LEVEL")
            .ok()
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .unwrap_or(defaults.level),
        json: env::var("NFTBOARD_LOG_JSON")
            .ok()
            .and_then(|raw| parse_bool(&raw))
            .unwrap_or(defaults.json),
    }
}

pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingInitError> {
    let env_filter =
        EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);

    if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

pub fn log_app_start(config: &LoggingConfig) {
    info!(
        component = "collections_server",
        event = "app.start",
        log_level = %config.level,
        log_json = config.json
    );
}

pub fn log_app_bind(bound_addr: SocketAddr) {
    info!(
        component = "collections_server",
        event = "app.bind",
        bind_addr = %bound_addr,
        route = "/api/collections/{period}"
    );
}

pub fn log_favorites_store_selected(store: &str, dir: Option<&Path>) {
    match dir {
        Some(dir) => info!(
            component = "collections_server",
            event = "favorites.store_selected",
            store,
            dir = %dir.display()
        ),
        None => info!(
            component = "collections_server",
            event = "favorites.store_selected",
            store
        ),
    }
}
