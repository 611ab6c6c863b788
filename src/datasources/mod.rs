pub mod synthetic;
pub mod weatherapi;

pub use synthetic::{Region, SyntheticWeather};
pub use weatherapi::WeatherApiClient;

use crate::config::WeatherConfig;
use crate::error::Result;
use crate::models::{DailyWeather, Location};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Where a forecast came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastOrigin {
    WeatherApi,
    Synthetic,
}

impl ForecastOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastOrigin::WeatherApi => "WeatherAPI",
            ForecastOrigin::Synthetic => "Synthetic",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['_', ' '], "").as_str() {
            "weatherapi" => Some(ForecastOrigin::WeatherApi),
            "synthetic" => Some(ForecastOrigin::Synthetic),
            _ => None,
        }
    }
}

impl std::fmt::Display for ForecastOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub origin: ForecastOrigin,
    pub days: Vec<DailyWeather>,
}

/// A weather provider: the live feed or the deterministic fallback.
pub enum WeatherSource {
    Primary(WeatherApiClient),
    Fallback(SyntheticWeather),
}

impl WeatherSource {
    pub fn origin(&self) -> ForecastOrigin {
        match self {
            WeatherSource::Primary(_) => ForecastOrigin::WeatherApi,
            WeatherSource::Fallback(_) => ForecastOrigin::Synthetic,
        }
    }

    pub async fn fetch(
        &self,
        location: &Location,
        start: NaiveDate,
        days: u32,
    ) -> Result<Forecast> {
        let days = match self {
            WeatherSource::Primary(client) => client.fetch_forecast(location, days).await?,
            WeatherSource::Fallback(synthetic) => synthetic.generate(location, start, days),
        };
        Ok(Forecast {
            origin: self.origin(),
            days,
        })
    }
}

/// Tries the live feed first and falls back to synthetic data.
pub struct WeatherService {
    primary: Option<WeatherSource>,
    fallback: WeatherSource,
    forecast_days: u32,
}

impl WeatherService {
    pub fn new(config: &WeatherConfig) -> Self {
        let primary = if config.enabled {
            match WeatherApiClient::new(config) {
                Ok(client) => {
                    tracing::info!("WeatherAPI client configured for forecast data");
                    Some(WeatherSource::Primary(client))
                }
                Err(e) => {
                    tracing::warn!("WeatherAPI unavailable ({}), using synthetic forecasts", e);
                    None
                }
            }
        } else {
            tracing::info!("WeatherAPI disabled - forecasts will be synthetic");
            None
        };

        Self {
            primary,
            fallback: WeatherSource::Fallback(SyntheticWeather::new(config.fallback_seed)),
            forecast_days: config.forecast_days,
        }
    }

    /// Service that never touches the network.
    pub fn offline(config: &WeatherConfig) -> Self {
        Self {
            primary: None,
            fallback: WeatherSource::Fallback(SyntheticWeather::new(config.fallback_seed)),
            forecast_days: config.forecast_days,
        }
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    pub fn forecast_days(&self) -> u32 {
        self.forecast_days
    }

    pub async fn fetch_from(&self, location: &Location, start: NaiveDate) -> Result<Forecast> {
        if let Some(ref primary) = self.primary {
            match primary.fetch(location, start, self.forecast_days).await {
                Ok(forecast) if !forecast.days.is_empty() => return Ok(forecast),
                Ok(_) => tracing::warn!("WeatherAPI returned no forecast days, using fallback"),
                Err(e) => tracing::warn!("WeatherAPI error: {}, using fallback", e),
            }
        }

        self.fallback
            .fetch(location, start, self.forecast_days)
            .await
    }

    pub async fn test_connection(&self, location: &Location) -> bool {
        match self.primary {
            Some(WeatherSource::Primary(ref client)) => {
                client.test_connection(location).await.unwrap_or(false)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WeatherConfig {
        WeatherConfig {
            api_key: String::new(),
            forecast_days: 5,
            enabled: true,
            fallback_seed: 11,
        }
    }

    #[tokio::test]
    async fn missing_key_falls_back_to_synthetic() {
        let service = WeatherService::new(&config());
        assert!(!service.has_primary());

        let start = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
        let forecast = service
            .fetch_from(&Location::coordinates(27.1, 72.3), start)
            .await
            .unwrap();
        assert_eq!(forecast.origin, ForecastOrigin::Synthetic);
        assert_eq!(forecast.days.len(), 5);
        assert_eq!(forecast.days[0].date, start);
    }

    #[tokio::test]
    async fn offline_service_is_deterministic() {
        let service = WeatherService::offline(&config());
        let start = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
        let loc = Location::address("Phalodi");
        let a = service.fetch_from(&loc, start).await.unwrap();
        let b = service.fetch_from(&loc, start).await.unwrap();
        assert_eq!(a, b);
        assert!(!service.test_connection(&loc).await);
    }

    #[test]
    fn source_origin_tags() {
        let fallback = WeatherSource::Fallback(SyntheticWeather::default());
        assert_eq!(fallback.origin(), ForecastOrigin::Synthetic);
        assert_eq!(ForecastOrigin::WeatherApi.to_string(), "WeatherAPI");
        assert_eq!(
            ForecastOrigin::from_str("weather_api"),
            Some(ForecastOrigin::WeatherApi)
        );
        assert_eq!(ForecastOrigin::from_str("cache"), None);
    }
}
