use crate::error::{CropWaterError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One forecast day as delivered by a weather source.
///
/// Fields are optional because upstream providers omit values; the
/// scheduler requires all of them and rejects incomplete days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyWeather {
    pub date: NaiveDate,
    pub temp_max: Option<f64>,       // °C
    pub temp_min: Option<f64>,       // °C
    pub humidity: Option<f64>,       // %
    pub wind_speed: Option<f64>,     // m/s
    pub rainfall: Option<f64>,       // mm
    pub solar_radiation: Option<f64>, // MJ/m²/day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl DailyWeather {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            temp_max: None,
            temp_min: None,
            humidity: None,
            wind_speed: None,
            rainfall: None,
            solar_radiation: None,
            condition: None,
        }
    }

    /// Fully populated day, used by tests and the synthetic source.
    pub fn complete(
        date: NaiveDate,
        temp_max: f64,
        temp_min: f64,
        humidity: f64,
        wind_speed: f64,
        rainfall: f64,
        solar_radiation: f64,
    ) -> Self {
        Self {
            date,
            temp_max: Some(temp_max),
            temp_min: Some(temp_min),
            humidity: Some(humidity),
            wind_speed: Some(wind_speed),
            rainfall: Some(rainfall),
            solar_radiation: Some(solar_radiation),
            condition: None,
        }
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Extract a complete observation, failing on the first absent or
    /// non-finite field.
    pub fn observed(&self) -> Result<Observation> {
        let field = |value: Option<f64>, name: &'static str| {
            value
                .filter(|v| v.is_finite())
                .ok_or(CropWaterError::MissingWeatherField {
                    date: self.date,
                    field: name,
                })
        };

        Ok(Observation {
            date: self.date,
            temp_max: field(self.temp_max, "temp_max")?,
            temp_min: field(self.temp_min, "temp_min")?,
            humidity: field(self.humidity, "humidity")?,
            wind_speed: field(self.wind_speed, "wind_speed")?,
            rainfall: field(self.rainfall, "rainfall")?,
            solar_radiation: field(self.solar_radiation, "solar_radiation")?,
        })
    }
}

/// A field-complete day of weather.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub temp_max: f64,
    pub temp_min: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub rainfall: f64,
    pub solar_radiation: f64,
}

impl Observation {
    pub fn temp_mean(&self) -> f64 {
        (self.temp_max + self.temp_min) / 2.0
    }

    pub fn snapshot(&self) -> WeatherSnapshot {
        WeatherSnapshot {
            temp_max: self.temp_max,
            temp_min: self.temp_min,
            humidity: self.humidity,
            rainfall: self.rainfall,
            wind_speed: self.wind_speed,
            solar_radiation: self.solar_radiation,
        }
    }
}

/// Weather values copied into a schedule record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temp_max: f64,
    pub temp_min: f64,
    pub humidity: f64,
    pub rainfall: f64,
    pub wind_speed: f64,
    pub solar_radiation: f64,
}

/// Validate a forecast horizon and return its observations in order.
///
/// The sequence must be non-empty, strictly increasing by date and field
/// complete.
pub fn observe_sequence(days: &[DailyWeather]) -> Result<Vec<Observation>> {
    if days.is_empty() {
        return Err(CropWaterError::InvalidInput(
            "weather sequence is empty".into(),
        ));
    }

    for pair in days.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(CropWaterError::InvalidInput(format!(
                "weather dates must be strictly increasing ({} follows {})",
                pair[1].date, pair[0].date
            )));
        }
    }

    days.iter().map(DailyWeather::observed).collect()
}
