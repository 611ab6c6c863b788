use crate::error::{CropWaterError, Result};
use serde::{Deserialize, Serialize};

const HECTARES_PER_ACRE: f64 = 0.404_686;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaUnit {
    #[default]
    Hectares,
    Acres,
}

impl AreaUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            AreaUnit::Hectares => "ha",
            AreaUnit::Acres => "ac",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "hectares" | "hectare" | "ha" => Some(AreaUnit::Hectares),
            "acres" | "acre" | "ac" => Some(AreaUnit::Acres),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FarmArea {
    pub value: f64,
    #[serde(default)]
    pub unit: AreaUnit,
}

impl FarmArea {
    pub fn hectares(value: f64) -> Self {
        Self {
            value,
            unit: AreaUnit::Hectares,
        }
    }

    pub fn acres(value: f64) -> Self {
        Self {
            value,
            unit: AreaUnit::Acres,
        }
    }

    pub fn in_hectares(&self) -> Result<f64> {
        if !self.value.is_finite() || self.value < 0.0 {
            return Err(CropWaterError::InvalidInput(format!(
                "farm area must be a non-negative number, got {}",
                self.value
            )));
        }
        Ok(match self.unit {
            AreaUnit::Hectares => self.value,
            AreaUnit::Acres => self.value * HECTARES_PER_ACRE,
        })
    }
}

impl std::fmt::Display for FarmArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.value, self.unit.as_str())
    }
}

/// How water is delivered. Carried through to records; it does not change
/// the water balance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IrrigationMethod {
    #[default]
    Drip,
    Sprinkler,
    Flood,
    Furrow,
}

impl IrrigationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            IrrigationMethod::Drip => "Drip",
            IrrigationMethod::Sprinkler => "Sprinkler",
            IrrigationMethod::Flood => "Flood",
            IrrigationMethod::Furrow => "Furrow",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "drip" | "micro" => Some(IrrigationMethod::Drip),
            "sprinkler" | "overhead" => Some(IrrigationMethod::Sprinkler),
            "flood" | "basin" => Some(IrrigationMethod::Flood),
            "furrow" => Some(IrrigationMethod::Furrow),
            _ => None,
        }
    }
}

impl std::fmt::Display for IrrigationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl Location {
    pub fn address(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            ..Default::default()
        }
    }

    pub fn coordinates(latitude: f64, longitude: f64) -> Self {
        Self {
            address: None,
            latitude: Some(latitude),
            longitude: Some(longitude),
        }
    }

    /// Parse user input: "GPS: 27.1, 72.3", "27.1,72.3" or a place name.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let coords = trimmed
            .strip_prefix("GPS:")
            .unwrap_or(trimmed)
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Vec<_>>();

        match coords.as_slice() {
            [Ok(lat), Ok(lon)] => Self::coordinates(*lat, *lon),
            _ => Self::address(trimmed),
        }
    }

    pub fn coords(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    /// Query string for forecast providers. Address wins over coordinates.
    pub fn query(&self) -> Option<String> {
        if let Some(address) = self.address.as_deref().filter(|a| !a.trim().is_empty()) {
            return Some(address.trim().to_string());
        }
        self.coords().map(|(lat, lon)| format!("{},{}", lat, lon))
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.query() {
            Some(q) => write!(f, "{}", q),
            None => write!(f, "unspecified"),
        }
    }
}

/// Everything needed to plan one farm over one forecast horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub farm_name: String,
    pub soil_type: String,
    pub crop: String,
    pub growth_stage: u8,
    pub area: FarmArea,
    #[serde(default)]
    pub irrigation_method: IrrigationMethod,
    #[serde(default)]
    pub location: Location,
}
