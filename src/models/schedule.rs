use super::farm::IrrigationMethod;
use super::weather::WeatherSnapshot;
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Advice tier for one day, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tier", rename_all = "snake_case")]
pub enum Recommendation {
    SufficientRainfall,
    IrrigationRequired { depletion_percent: f64 },
    PrepareSoon,
    Adequate,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::SufficientRainfall => "Sufficient Rainfall",
            Recommendation::IrrigationRequired { .. } => "Irrigation Required",
            Recommendation::PrepareSoon => "Prepare Soon",
            Recommendation::Adequate => "Adequate",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Recommendation::SufficientRainfall => "☔",
            Recommendation::IrrigationRequired { .. } => "!",
            Recommendation::PrepareSoon => "⚠",
            Recommendation::Adequate => "✓",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Recommendation::SufficientRainfall => {
                "No irrigation needed due to sufficient rainfall".to_string()
            }
            Recommendation::IrrigationRequired { depletion_percent } => {
                format!("IRRIGATION REQUIRED - {:.0}% soil depletion", depletion_percent)
            }
            Recommendation::PrepareSoon => {
                "Soil moisture decreasing - prepare for irrigation soon".to_string()
            }
            Recommendation::Adequate => "Soil moisture adequate - monitor daily".to_string(),
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Which decision strategy produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionMethod {
    Fao56Method,
    RuleBasedFallback,
    MlPrediction,
}

impl PredictionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionMethod::Fao56Method => "fao56_method",
            PredictionMethod::RuleBasedFallback => "rule_based_fallback",
            PredictionMethod::MlPrediction => "ml_prediction",
        }
    }
}

impl std::fmt::Display for PredictionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One simulated day. Built once by the water balance and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyScheduleRecord {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub weather: WeatherSnapshot,
    pub et0: f64,
    pub etc: f64,
    /// Depletion that drove the day's decision, before any irrigation.
    pub depletion_percent: f64,
    pub soil_moisture_mm: f64,
    pub soil_moisture_percent: f64,
    pub irrigation_needed: bool,
    pub irrigation_amount_mm: f64,
    pub irrigation_duration_hours: f64,
    pub total_water_liters: f64,
    pub best_irrigation_time: String,
    pub recommendation: Recommendation,
    pub confidence: f64,
    pub prediction_method: PredictionMethod,
    pub irrigation_method: IrrigationMethod,
}

/// Totals over a finished schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub horizon_days: usize,
    pub total_irrigation_days: usize,
    pub total_water_mm: f64,
    pub total_water_liters: f64,
    pub avg_daily_etc: f64,
}

impl ScheduleSummary {
    pub fn irrigation_frequency(&self) -> String {
        format!(
            "{} days out of {}",
            self.total_irrigation_days, self.horizon_days
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommendation_messages() {
        let rec = Recommendation::IrrigationRequired {
            depletion_percent: 71.6,
        };
        assert_eq!(rec.message(), "IRRIGATION REQUIRED - 72% soil depletion");
        assert_eq!(rec.as_str(), "Irrigation Required");
        assert!(Recommendation::SufficientRainfall
            .message()
            .contains("sufficient rainfall"));
    }

    #[test]
    fn recommendation_serializes_with_tier_tag() {
        let json = serde_json::to_value(Recommendation::PrepareSoon).unwrap();
        assert_eq!(json["tier"], "prepare_soon");

        let json = serde_json::to_value(Recommendation::IrrigationRequired {
            depletion_percent: 60.0,
        })
        .unwrap();
        assert_eq!(json["tier"], "irrigation_required");
        assert_eq!(json["depletion_percent"], 60.0);
    }

    #[test]
    fn frequency_text() {
        let summary = ScheduleSummary {
            horizon_days: 7,
            total_irrigation_days: 3,
            ..Default::default()
        };
        assert_eq!(summary.irrigation_frequency(), "3 days out of 7");
    }
}
