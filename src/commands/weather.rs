use crate::db::AppState;
use crate::storage;
use crate::weather::{self, Forecast, WeatherClient};

/// Forecast labels by date for a city
pub async fn get_forecast(state: &AppState, city: &str) -> Result<Forecast, String> {
  let client = WeatherClient::new(&state.config).map_err(|e| e.to_string())?;
  client.forecast(city).await.map_err(|e| e.to_string())
}

/// Forecast lines for the stored plan of a profile, using the profile's city
pub async fn plan_weather(state: &AppState, slug: &str) -> Result<Vec<String>, String> {
  let saved = storage::load_profile(&state.db, slug)
    .await
    .map_err(|e| e.to_string())?;

  let city = saved
    .profile
    .city
    .as_deref()
    .filter(|c| !c.trim().is_empty())
    .ok_or_else(|| format!("No city set for {}", slug))?;
  let plan = saved
    .plan
    .as_ref()
    .ok_or_else(|| format!("No plan stored for {}", slug))?;

  let forecast = get_forecast(state, city).await?;
  Ok(weather::annotate(plan, &forecast))
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
