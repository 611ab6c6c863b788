use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CropWaterError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown soil type: {0}")]
    UnknownSoilType(String),

    #[error("Unknown crop: {0}")]
    UnknownCrop(String),

    #[error(
        "Invalid available water capacity for {soil} soil with {crop}: \
         field capacity {field_capacity}, wilting point {wilting_point}, \
         root depth {rooting_depth}m gives {awc}mm (must be > 0)"
    )]
    InvalidWaterCapacity {
        soil: String,
        crop: String,
        field_capacity: f64,
        wilting_point: f64,
        rooting_depth: f64,
        awc: f64,
    },

    #[error("Weather observation for {date} is missing {field}")]
    MissingWeatherField { date: NaiveDate, field: &'static str },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Data source unavailable: {0}")]
    DataSourceUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, CropWaterError>;
