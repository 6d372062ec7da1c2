//! Process configuration from environment variables.
//!
//! | Variable         | Required | Default        |
//! |------------------|----------|----------------|
//! | `CHANNEL_SECRET` | yes      | -              |
//! | `BIND_ADDR`      | no       | `0.0.0.0:3000` |
//! | `ARCHIVE_DIR`    | no       | (no archive)   |
//! | `ROSTER_PATH`    | no       | (empty roster) |
//! | `SCHEDULE_PATH`  | no       | (empty schedule) |

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Default listen address when `BIND_ADDR` is unset.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Errors that make the configuration unusable.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `CHANNEL_SECRET` is unset or empty. Without it every delivery
    /// would be rejected, so refusing to start is kinder.
    #[error("CHANNEL_SECRET must be set and non-empty")]
    MissingSecret,

    /// `BIND_ADDR` is not a `host:port` socket address.
    #[error("BIND_ADDR is not a valid socket address: {0}")]
    InvalidBindAddr(String),
}

/// Everything the process reads from its environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared secret the platform signs deliveries with.
    pub channel_secret: Vec<u8>,

    /// Address the HTTP server listens on.
    pub bind_addr: SocketAddr,

    /// Where resolved requests are archived; `None` disables archiving.
    pub archive_dir: Option<PathBuf>,

    /// Roster seed file (JSON array of users).
    pub roster_path: Option<PathBuf>,

    /// Schedule seed file (JSON array of shifts).
    pub schedule_path: Option<PathBuf>,
}

impl Config {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let channel_secret = std::env::var("CHANNEL_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingSecret)?;

        let bind_raw =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .parse()
            .map_err(|_| ConfigError::InvalidBindAddr(bind_raw))?;

        Ok(Config {
            channel_secret: channel_secret.into_bytes(),
            bind_addr,
            archive_dir: std::env::var("ARCHIVE_DIR").ok().map(PathBuf::from),
            roster_path: std::env::var("ROSTER_PATH").ok().map(PathBuf::from),
            schedule_path: std::env::var("SCHEDULE_PATH").ok().map(PathBuf::from),
        })
    }
}
