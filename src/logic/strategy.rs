use crate::models::{Observation, PredictionMethod};
use serde::{Deserialize, Serialize};

/// Management allowable depletion (%) that triggers irrigation.
pub const MAD_PERCENT: f64 = 50.0;
/// Irrigation refills the root zone to this fraction of AWC.
pub const REFILL_FRACTION: f64 = 0.8;
/// Confidence reported by the deterministic strategies.
const RULE_CONFIDENCE: f64 = 75.0;

/// State of the root zone on one day, after rain and ETc, before any
/// irrigation.
#[derive(Debug, Clone, Copy)]
pub struct DayState<'a> {
    pub weather: &'a Observation,
    pub awc_mm: f64,
    pub soil_moisture_mm: f64,
    pub depletion_percent: f64,
    pub growth_stage: u8,
    pub days_since_irrigation: u32,
}

impl DayState<'_> {
    pub fn soil_moisture_percent(&self) -> f64 {
        100.0 - self.depletion_percent
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub irrigate: bool,
    pub amount_mm: f64,
    pub confidence: f64,
}

impl Decision {
    fn skip(confidence: f64) -> Self {
        Self {
            irrigate: false,
            amount_mm: 0.0,
            confidence,
        }
    }
}

/// Decides whether and how much to irrigate on a given day.
///
/// The water balance owns the soil state; strategies only read it. A
/// trained model plugs in here as another implementation.
pub trait IrrigationStrategy: Send + Sync {
    fn method(&self) -> PredictionMethod;

    fn decide(&self, day: &DayState) -> Decision;
}

/// Irrigate once depletion passes the MAD, refilling to 80% of AWC.
pub struct Fao56Strategy;

impl IrrigationStrategy for Fao56Strategy {
    fn method(&self) -> PredictionMethod {
        PredictionMethod::Fao56Method
    }

    fn decide(&self, day: &DayState) -> Decision {
        if day.depletion_percent > MAD_PERCENT {
            Decision {
                irrigate: true,
                amount_mm: REFILL_FRACTION * day.awc_mm - day.soil_moisture_mm,
                confidence: RULE_CONFIDENCE,
            }
        } else {
            Decision::skip(RULE_CONFIDENCE)
        }
    }
}

/// Coarse moisture-percent rule used when no model is available.
///
/// Irrigates below 40% moisture with half a millimetre per point of
/// deficit against an 80% target.
pub struct RuleBasedStrategy;

impl IrrigationStrategy for RuleBasedStrategy {
    fn method(&self) -> PredictionMethod {
        PredictionMethod::RuleBasedFallback
    }

    fn decide(&self, day: &DayState) -> Decision {
        let moisture_percent = day.soil_moisture_percent();
        if moisture_percent < 40.0 {
            Decision {
                irrigate: true,
                amount_mm: (80.0 - moisture_percent) * 0.5,
                confidence: RULE_CONFIDENCE,
            }
        } else {
            Decision::skip(RULE_CONFIDENCE)
        }
    }
}

/// Configured choice of strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    Fao56,
    RuleBased,
}

impl StrategyKind {
    pub fn build(&self) -> Box<dyn IrrigationStrategy> {
        match self {
            StrategyKind::Fao56 => Box::new(Fao56Strategy),
            StrategyKind::RuleBased => Box::new(RuleBasedStrategy),
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fao56" | "fao-56" | "fao" => Some(StrategyKind::Fao56),
            "rule_based" | "rule-based" | "rules" => Some(StrategyKind::RuleBased),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn weather() -> Observation {
        Observation {
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            temp_max: 35.0,
            temp_min: 24.0,
            humidity: 40.0,
            wind_speed: 2.0,
            rainfall: 0.0,
            solar_radiation: 22.0,
        }
    }

    fn state(weather: &Observation, awc: f64, moisture: f64) -> DayState<'_> {
        DayState {
            weather,
            awc_mm: awc,
            soil_moisture_mm: moisture,
            depletion_percent: 100.0 - 100.0 * moisture / awc,
            growth_stage: 2,
            days_since_irrigation: 0,
        }
    }

    #[test]
    fn fao56_triggers_strictly_above_mad() {
        let w = weather();
        // Exactly 50% depletion does not trigger
        let at_mad = Fao56Strategy.decide(&state(&w, 100.0, 50.0));
        assert!(!at_mad.irrigate);
        assert_eq!(at_mad.amount_mm, 0.0);

        let past_mad = Fao56Strategy.decide(&state(&w, 100.0, 49.0));
        assert!(past_mad.irrigate);
        assert!((past_mad.amount_mm - 31.0).abs() < 1e-9);
    }

    #[test]
    fn rule_based_uses_moisture_percent() {
        let w = weather();
        let dry = RuleBasedStrategy.decide(&state(&w, 100.0, 30.0));
        assert!(dry.irrigate);
        assert!((dry.amount_mm - 25.0).abs() < 1e-9);
        assert_eq!(dry.confidence, 75.0);

        let ok = RuleBasedStrategy.decide(&state(&w, 100.0, 45.0));
        assert!(!ok.irrigate);
    }

    #[test]
    fn strategy_kind_builds_matching_method() {
        assert_eq!(
            StrategyKind::Fao56.build().method(),
            PredictionMethod::Fao56Method
        );
        assert_eq!(
            StrategyKind::RuleBased.build().method(),
            PredictionMethod::RuleBasedFallback
        );
        assert_eq!(StrategyKind::from_str("Rule-Based"), Some(StrategyKind::RuleBased));
        assert_eq!(StrategyKind::from_str("ml"), None);
    }
}
