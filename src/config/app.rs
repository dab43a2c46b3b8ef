//! Application configuration loading from config.toml
//!
//! Every section is optional; a missing section or field takes its default, so an
//! empty file (or no file at all, see [`load_config_or_default`]) yields a working
//! configuration.

use crate::{
    config::rate_plans::RatePlanSeed,
    core::policy::CancellationPolicy,
    errors::{Error, Result},
};
use chrono::NaiveTime;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Reservation defaults
    pub reservations: ReservationConfig,
    /// Cancellation policy resolution
    pub cancellation: CancellationConfig,
    /// Rate plans to seed on startup
    pub rate_plans: Vec<RatePlanSeed>,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the API binds to, overridden by `BIND_ADDR`
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Reservation defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReservationConfig {
    /// Prefix of generated confirmation codes, e.g. `HD` in `HD-000042`
    pub confirmation_prefix: String,
    /// Time of day (UTC) a stay starts; cancellation windows count back from it
    pub check_in_time: NaiveTime,
    /// Currency used when a booking does not name one
    pub default_currency: String,
}

impl Default for ReservationConfig {
    fn default() -> Self {
        Self {
            confirmation_prefix: "HD".to_string(),
            check_in_time: NaiveTime::from_hms_opt(14, 0, 0).unwrap_or_default(),
            default_currency: "VND".to_string(),
        }
    }
}

/// What to do when a reservation's rate plan cannot be found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyFallback {
    /// Log a warning and apply `default_policy`
    #[default]
    UseDefault,
    /// Fail the operation with a not-found error
    Reject,
}

/// Cancellation policy resolution
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CancellationConfig {
    /// Behaviour for missing rate plans
    pub fallback: PolicyFallback,
    /// Terms applied under [`PolicyFallback::UseDefault`]
    pub default_policy: CancellationPolicy,
}

impl Default for CancellationConfig {
    fn default() -> Self {
        Self {
            fallback: PolicyFallback::default(),
            default_policy: CancellationPolicy::best_available_rate(),
        }
    }
}

impl AppConfig {
    /// Rejects configurations that would fail at request time.
    pub fn validate(&self) -> Result<()> {
        let prefix = &self.reservations.confirmation_prefix;
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::Config {
                message: format!("Confirmation prefix must be alphanumeric, got '{prefix}'"),
            });
        }
        self.cancellation
            .default_policy
            .validate()
            .map_err(|e| Error::Config {
                message: format!("Invalid default cancellation policy: {e}"),
            })?;
        for seed in &self.rate_plans {
            seed.validate().map_err(|e| Error::Config {
                message: format!("Invalid rate plan seed '{}': {e}", seed.policy.name),
            })?;
        }
        Ok(())
    }
}

/// Loads and validates configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A value fails validation
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    let config = parse_config(&contents)?;
    debug!(
        rate_plans = config.rate_plans.len(),
        fallback = ?config.cancellation.fallback,
        "Configuration loaded"
    );
    Ok(config)
}

/// Parses and validates configuration text.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;
    config.validate()?;
    Ok(config)
}

/// Loads `path` if it exists, otherwise falls back to defaults with a warning.
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    if path_ref.exists() {
        load_config(path_ref)
    } else {
        warn!(
            "Config file {} not found, using built-in defaults",
            path_ref.display()
        );
        Ok(AppConfig::default())
    }
}

/// Loads the configuration named by `HOTEL_DESK_CONFIG` (default `./config.toml`).
pub fn load_default_config() -> Result<AppConfig> {
    let path =
        std::env::var("HOTEL_DESK_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_config_or_default(path)
}
