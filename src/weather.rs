//! Open-Meteo weather forecasts for the runner's city
//!
//! Purely additive: forecasts are matched to sessions by date for display and
//! never feed back into the plan.

use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};
use url::Url;

use crate::config::AppConfig;
use crate::models::Plan;

/// Daily forecast labels keyed by date
pub type Forecast = BTreeMap<NaiveDate, String>;

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
  #[error("City '{0}' not found")]
  CityNotFound(String),

  #[error("HTTP request failed: {0}")]
  Request(String),

  #[error("API error: {0}")]
  Api(String),

  #[error("Unexpected response: {0}")]
  Parse(String),
}

impl From<reqwest::Error> for WeatherError {
  fn from(e: reqwest::Error) -> Self {
    if e.is_decode() {
      WeatherError::Parse(e.to_string())
    } else {
      WeatherError::Request(e.to_string())
    }
  }
}

impl Serialize for WeatherError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// API Responses
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
  pub latitude: f64,
  pub longitude: f64,
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
  #[serde(default)]
  results: Vec<Coordinates>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
  daily: DailyForecast,
}

#[derive(Debug, Deserialize)]
struct DailyForecast {
  time: Vec<NaiveDate>,
  weather_code: Vec<Option<i64>>,
}

/// WMO weather interpretation code -> short label
pub fn weather_label(code: i64) -> &'static str {
  match code {
    0 => "Clear sky",
    1 => "Mainly clear",
    2 => "Partly cloudy",
    3 => "Overcast",
    45 => "Fog",
    48 => "Depositing rime fog",
    51 => "Light drizzle",
    53 => "Moderate drizzle",
    55 => "Dense drizzle",
    61 => "Slight rain",
    63 => "Moderate rain",
    65 => "Heavy rain",
    80 => "Slight showers",
    81 => "Moderate showers",
    82 => "Violent showers",
    95 => "Thunderstorm",
    _ => "Rain / snow",
  }
}

/// ---------------------------------------------------------------------------
/// Client
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct WeatherClient {
  client: Client,
  geocoding_url: String,
  forecast_url: String,
}

impl WeatherClient {
  pub fn new(config: &AppConfig) -> Result<Self, WeatherError> {
    let client = Client::builder().timeout(config.http_timeout).build()?;
    Ok(Self {
      client,
      geocoding_url: config.geocoding_url.clone(),
      forecast_url: config.forecast_url.clone(),
    })
  }

  pub async fn coordinates(&self, city: &str) -> Result<Coordinates, WeatherError> {
    let city = city.trim();
    if city.is_empty() {
      return Err(WeatherError::CityNotFound(city.to_string()));
    }

    let mut url = parse_url(&self.geocoding_url)?;
    url
      .query_pairs_mut()
      .append_pair("name", city)
      .append_pair("count", "1")
      .append_pair("format", "json");

    let body: GeocodingResponse = self.get_json(url, "Geocoding").await?;
    body
      .results
      .into_iter()
      .next()
      .ok_or_else(|| WeatherError::CityNotFound(city.to_string()))
  }

  /// Daily forecast for the next days as published by Open-Meteo
  pub async fn forecast(&self, city: &str) -> Result<Forecast, WeatherError> {
    let coords = self.coordinates(city).await?;

    let mut url = parse_url(&self.forecast_url)?;
    url
      .query_pairs_mut()
      .append_pair("latitude", &format!("{:.4}", coords.latitude))
      .append_pair("longitude", &format!("{:.4}", coords.longitude))
      .append_pair("daily", "weather_code")
      .append_pair("timezone", "auto");

    let body: ForecastResponse = self.get_json(url, "Forecast").await?;
    let daily = body.daily;
    if daily.time.len() != daily.weather_code.len() {
      return Err(WeatherError::Parse(format!(
        "{} dates but {} weather codes",
        daily.time.len(),
        daily.weather_code.len()
      )));
    }

    let forecast: Forecast = daily
      .time
      .into_iter()
      .zip(daily.weather_code)
      .filter_map(|(date, code)| code.map(|c| (date, weather_label(c).to_string())))
      .collect();

    debug!("Forecast for {}: {} days", city, forecast.len());
    Ok(forecast)
  }

  async fn get_json<T: serde::de::DeserializeOwned>(
    &self,
    url: Url,
    what: &str,
  ) -> Result<T, WeatherError> {
    debug!("{} request: {}", what, url);
    let response = self.client.get(url).send().await?;

    if !response.status().is_success() {
      let status = response.status();
      let error_text = response.text().await.unwrap_or_default();
      warn!("{} API error {}", what, status);
      return Err(WeatherError::Api(format!(
        "{} API error {}: {}",
        what, status, error_text
      )));
    }

    Ok(response.json().await?)
  }
}

fn parse_url(raw: &str) -> Result<Url, WeatherError> {
  Url::parse(raw).map_err(|e| WeatherError::Request(format!("Invalid URL '{}': {}", raw, e)))
}

/// One display line per non-rest session that has a forecast for its date
pub fn annotate(plan: &Plan, forecast: &Forecast) -> Vec<String> {
  plan
    .sessions()
    .filter(|s| !s.is_rest())
    .filter_map(|s| {
      forecast.get(&s.date).map(|label| {
        format!(
          "{} {}: {} - {}",
          s.date.format("%a %d/%m"),
          s.session_type.label(),
          s.description,
          label
        )
      })
    })
    .collect()
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
