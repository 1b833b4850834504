//! Runtime configuration read from the environment (and `.env` via dotenvy)

use serde::Serialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// ---------------------------------------------------------------------------
/// Defaults
/// ---------------------------------------------------------------------------

pub const DEFAULT_DB_PATH: &str = "coach10k.db";
pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 5;

const DB_PATH_VAR: &str = "COACH10K_DB_PATH";
const GEOCODING_URL_VAR: &str = "COACH10K_GEOCODING_URL";
const FORECAST_URL_VAR: &str = "COACH10K_FORECAST_URL";
const HTTP_TIMEOUT_VAR: &str = "COACH10K_HTTP_TIMEOUT_SECS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Invalid value for {name}: {value}")]
  InvalidValue { name: String, value: String },
}

impl Serialize for ConfigError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
  pub db_path: PathBuf,
  pub geocoding_url: String,
  pub forecast_url: String,
  pub http_timeout: Duration,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      db_path: PathBuf::from(DEFAULT_DB_PATH),
      geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
      forecast_url: DEFAULT_FORECAST_URL.to_string(),
      http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
    }
  }
}

impl AppConfig {
  /// Every variable is optional; unset or blank falls back to the default
  pub fn from_env() -> Result<Self, ConfigError> {
    let defaults = Self::default();

    let http_timeout = match non_empty_var(HTTP_TIMEOUT_VAR) {
      Some(raw) => {
        let secs: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
          name: HTTP_TIMEOUT_VAR.into(),
          value: raw.clone(),
        })?;
        Duration::from_secs(secs)
      }
      None => defaults.http_timeout,
    };

    Ok(Self {
      db_path: non_empty_var(DB_PATH_VAR)
        .map(PathBuf::from)
        .unwrap_or(defaults.db_path),
      geocoding_url: non_empty_var(GEOCODING_URL_VAR).unwrap_or(defaults.geocoding_url),
      forecast_url: non_empty_var(FORECAST_URL_VAR).unwrap_or(defaults.forecast_url),
      http_timeout,
    })
  }
}

fn non_empty_var(name: &str) -> Option<String> {
  env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
