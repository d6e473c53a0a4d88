//! Application configuration.
//!
//! Read once at start-up from `BIKESHARE_*` environment variables and passed
//! down explicitly; nothing reads the environment after that.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::feeds::FeedConfig;
use crate::render::{ArtifactConfig, DEFAULT_OUTPUT_DIR};
use crate::scheduler::{CAPTURE_REFRESH_INTERVAL, DEFAULT_REFRESH_INTERVAL};

pub const ENV_STATION_INFO_URL: &str = "BIKESHARE_STATION_INFO_URL";
pub const ENV_STATION_STATUS_URL: &str = "BIKESHARE_STATION_STATUS_URL";
pub const ENV_AVAILABILITY_FIELD: &str = "BIKESHARE_AVAILABILITY_FIELD";
pub const ENV_FEED_TIMEOUT_SECS: &str = "BIKESHARE_FEED_TIMEOUT_SECS";
pub const ENV_CAPTURE: &str = "BIKESHARE_CAPTURE";
pub const ENV_REFRESH_SECS: &str = "BIKESHARE_REFRESH_SECS";
pub const ENV_OUTPUT_DIR: &str = "BIKESHARE_OUTPUT_DIR";
pub const ENV_ARTIFACT_SIZE: &str = "BIKESHARE_ARTIFACT_SIZE";
pub const ENV_BIND_ADDR: &str = "BIKESHARE_BIND_ADDR";
pub const ENV_STATIC_DIR: &str = "BIKESHARE_STATIC_DIR";

/// Default listen address.
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8050";

/// Default location of the web assets.
const DEFAULT_STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value for {var}: {message}")]
pub struct ConfigError {
    pub var: &'static str,
    pub message: String,
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub feeds: FeedConfig,
    pub refresh_interval: Duration,
    /// Artifact settings; `None` unless capture is enabled.
    pub capture: Option<ArtifactConfig>,
    pub bind_addr: SocketAddr,
    pub static_dir: PathBuf,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value. Unset and blank variables take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let mut feeds = FeedConfig::new();
        if let Some(url) = get(ENV_STATION_INFO_URL) {
            feeds = feeds.with_station_information_url(url);
        }
        if let Some(url) = get(ENV_STATION_STATUS_URL) {
            feeds = feeds.with_station_status_url(url);
        }
        if let Some(field) = get(ENV_AVAILABILITY_FIELD) {
            feeds = feeds.with_availability_field(field.trim());
        }
        if let Some(secs) = get(ENV_FEED_TIMEOUT_SECS) {
            feeds = feeds.with_timeout(parse_positive(ENV_FEED_TIMEOUT_SECS, &secs)?);
        }

        let capture_enabled = match get(ENV_CAPTURE) {
            Some(v) => parse_bool(ENV_CAPTURE, &v)?,
            None => false,
        };

        let refresh_interval = match get(ENV_REFRESH_SECS) {
            Some(v) => Duration::from_secs(parse_positive(ENV_REFRESH_SECS, &v)?),
            None if capture_enabled => CAPTURE_REFRESH_INTERVAL,
            None => DEFAULT_REFRESH_INTERVAL,
        };

        let capture = if capture_enabled {
            let mut artifacts =
                ArtifactConfig::new(get(ENV_OUTPUT_DIR).unwrap_or_else(|| DEFAULT_OUTPUT_DIR.into()));
            if let Some(size) = get(ENV_ARTIFACT_SIZE) {
                let (width, height) = parse_size(ENV_ARTIFACT_SIZE, &size)?;
                artifacts = artifacts.with_size(width, height);
            }
            Some(artifacts)
        } else {
            None
        };

        let bind_addr = get(ENV_BIND_ADDR)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .trim()
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError {
                var: ENV_BIND_ADDR,
                message: e.to_string(),
            })?;

        let static_dir = get(ENV_STATIC_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR));

        Ok(Self {
            feeds,
            refresh_interval,
            capture,
            bind_addr,
            static_dir,
        })
    }
}

fn parse_positive(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError {
            var,
            message: format!("expected a positive integer, got '{value}'"),
        }),
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError {
            var,
            message: format!("expected a boolean, got '{value}'"),
        }),
    }
}

/// Parse `WIDTHxHEIGHT`, e.g. `1000x700`.
fn parse_size(var: &'static str, value: &str) -> Result<(u32, u32), ConfigError> {
    let invalid = || ConfigError {
        var,
        message: format!("expected WIDTHxHEIGHT, got '{value}'"),
    };

    let (w, h) = value.trim().split_once(['x', 'X']).ok_or_else(invalid)?;
    let width: u32 = w.trim().parse().map_err(|_| invalid())?;
    let height: u32 = h.trim().parse().map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }
    Ok((width, height))
}
