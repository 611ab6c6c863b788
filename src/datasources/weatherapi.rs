use crate::config::WeatherConfig;
use crate::error::{CropWaterError, Result};
use crate::models::{DailyWeather, Location};
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

const API_BASE_URL: &str = "http://api.weatherapi.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const MIN_API_KEY_LEN: usize = 20;
/// Longest horizon the forecast endpoint serves on the free plan.
pub const MAX_FORECAST_DAYS: u32 = 7;

pub struct WeatherApiClient {
    client: reqwest::Client,
    api_key: String,
}

// WeatherAPI response structures. Numeric fields stay optional so a gap in
// the feed surfaces as a missing weather field rather than a parse error.
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    forecast: ForecastBlock,
}

#[derive(Debug, Deserialize)]
struct ForecastBlock {
    forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Deserialize)]
struct ForecastDay {
    date: NaiveDate,
    day: DayBlock,
}

#[derive(Debug, Deserialize)]
struct DayBlock {
    maxtemp_c: Option<f64>,
    mintemp_c: Option<f64>,
    avghumidity: Option<f64>,
    maxwind_kph: Option<f64>,
    totalprecip_mm: Option<f64>,
    #[serde(default)]
    uv: Option<f64>,
    #[serde(default)]
    condition: Option<Condition>,
}

#[derive(Debug, Deserialize)]
struct Condition {
    text: String,
}

impl WeatherApiClient {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        if config.api_key.trim().len() < MIN_API_KEY_LEN {
            return Err(CropWaterError::Config(
                "weather API key is missing or too short".into(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.trim().to_string(),
        })
    }

    /// Fetch up to [`MAX_FORECAST_DAYS`] of daily forecast for `location`.
    pub async fn fetch_forecast(&self, location: &Location, days: u32) -> Result<Vec<DailyWeather>> {
        let query = location.query().ok_or_else(|| {
            CropWaterError::InvalidInput("location needs an address or coordinates".into())
        })?;
        let days = days.clamp(1, MAX_FORECAST_DAYS).to_string();

        tracing::debug!("Requesting weather for: {}", query);

        let url = endpoint(
            "forecast.json",
            &[
                ("key", self.api_key.as_str()),
                ("q", query.as_str()),
                ("days", days.as_str()),
                ("aqi", "no"),
                ("alerts", "no"),
            ],
        )?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CropWaterError::DataSourceUnavailable(format!("WeatherAPI: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CropWaterError::DataSourceUnavailable(format!(
                "WeatherAPI returned {} for '{}': {}",
                status, query, body
            )));
        }

        let body: ForecastResponse = response.json().await.map_err(|e| {
            CropWaterError::DataSourceUnavailable(format!(
                "Failed to parse WeatherAPI response: {}",
                e
            ))
        })?;

        Ok(convert_response(body))
    }

    pub async fn test_connection(&self, location: &Location) -> Result<bool> {
        let query = location.query().unwrap_or_else(|| "auto:ip".to_string());
        let url = endpoint(
            "current.json",
            &[("key", self.api_key.as_str()), ("q", query.as_str())],
        )?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CropWaterError::DataSourceUnavailable(format!("WeatherAPI: {}", e)))?;

        Ok(response.status().is_success())
    }
}

fn endpoint(path: &str, params: &[(&str, &str)]) -> Result<reqwest::Url> {
    reqwest::Url::parse_with_params(&format!("{}/{}", API_BASE_URL, path), params)
        .map_err(|e| CropWaterError::InvalidInput(format!("bad WeatherAPI request: {}", e)))
}

fn convert_response(response: ForecastResponse) -> Vec<DailyWeather> {
    response
        .forecast
        .forecastday
        .into_iter()
        .map(convert_day)
        .collect()
}

/// Map one provider day onto the scheduler's units, bounding readings to
/// ranges the water balance was tuned for.
fn convert_day(day: ForecastDay) -> DailyWeather {
    let d = day.day;
    let mut weather = DailyWeather::new(day.date);

    weather.temp_max = d.maxtemp_c.map(|t| t.clamp(15.0, 50.0));
    weather.temp_min = d.mintemp_c.map(|t| t.clamp(10.0, 45.0));
    weather.humidity = d.avghumidity.map(|h| h.clamp(10.0, 100.0));
    weather.wind_speed = d.maxwind_kph.map(|kph| (kph / 3.6).max(0.0));
    weather.rainfall = d.totalprecip_mm.map(|mm| mm.max(0.0));
    // No radiation in the feed; estimate from the UV index
    weather.solar_radiation = Some((d.uv.unwrap_or(5.0) * 4.0).clamp(5.0, 35.0));
    weather.condition = d.condition.map(|c| c.text);

    weather
}
