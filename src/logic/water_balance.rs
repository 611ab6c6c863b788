//! Daily root-zone water balance.
//!
//! One run walks the forecast horizon once, carrying a single soil moisture
//! value (mm) from day to day:
//!
//! ```text
//! moisture += rain - ETc, clamp to [0, AWC]
//! depletion = 100 - 100 * moisture / AWC
//! strategy decides -> moisture += irrigation, clamp to [0, AWC]
//! emit record
//! ```
//!
//! All inputs are validated before the first day, so a run either returns
//! a record for every day or fails without output.

use super::crop_et::crop_et;
use super::et0::reference_et0_series;
use super::strategy::{DayState, Fao56Strategy, IrrigationStrategy};
use crate::error::{CropWaterError, Result};
use crate::models::{
    observe_sequence, CropProfile, DailyScheduleRecord, DailyWeather, IrrigationMethod,
    Observation, Recommendation, SoilProfile,
};
use chrono::Datelike;

/// Each run starts with the root zone half full.
pub const INITIAL_FRACTION: f64 = 0.5;
/// Assumed application rate (mm/hour).
pub const APPLICATION_RATE_MM_PER_HOUR: f64 = 10.0;
/// Litres per mm of irrigation per hectare of farm area.
pub const LITERS_PER_MM_HECTARE: f64 = 10.0;
/// Daily rainfall above which irrigation advice is suppressed (mm).
pub const SUFFICIENT_RAINFALL_MM: f64 = 10.0;
/// Depletion above which growers are told to get ready (%).
pub const PREPARE_DEPLETION_PERCENT: f64 = 20.0;
pub const BEST_IRRIGATION_TIME: &str = "06:00-08:00";

/// Available water capacity of the root zone (mm).
///
/// Fails with `InvalidWaterCapacity` unless field capacity exceeds the
/// wilting point and the root zone has positive depth. Each factor is
/// checked on its own so two bad factors cannot multiply into a positive
/// capacity.
pub fn available_water_capacity(soil: &SoilProfile, crop: &CropProfile) -> Result<f64> {
    let awc = soil.available_fraction() * crop.rooting_depth * 1000.0;

    // Negated comparisons also reject NaN
    if !(soil.field_capacity > soil.wilting_point) || !(crop.rooting_depth > 0.0) || !(awc > 0.0) {
        return Err(CropWaterError::InvalidWaterCapacity {
            soil: soil.name.clone(),
            crop: crop.name.clone(),
            field_capacity: soil.field_capacity,
            wilting_point: soil.wilting_point,
            rooting_depth: crop.rooting_depth,
            awc,
        });
    }

    Ok(awc)
}

/// Outcome of one simulated day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayOutcome {
    pub depletion_percent: f64,
    pub irrigation_needed: bool,
    pub irrigation_amount_mm: f64,
    pub soil_moisture_mm: f64,
    pub soil_moisture_percent: f64,
    pub confidence: f64,
}

/// Soil moisture state for a single run.
#[derive(Debug, Clone)]
pub struct WaterBalance {
    awc: f64,
    soil_moisture: f64,
    days_since_irrigation: u32,
}

impl WaterBalance {
    pub fn new(soil: &SoilProfile, crop: &CropProfile) -> Result<Self> {
        soil.validate()?;
        // Capacity first so a non-positive root depth is reported with the
        // soil/crop pair
        let awc = available_water_capacity(soil, crop)?;
        crop.validate()?;

        Ok(Self {
            awc,
            soil_moisture: awc * INITIAL_FRACTION,
            days_since_irrigation: 0,
        })
    }

    pub fn awc(&self) -> f64 {
        self.awc
    }

    pub fn soil_moisture(&self) -> f64 {
        self.soil_moisture
    }

    pub fn soil_moisture_percent(&self) -> f64 {
        self.soil_moisture / self.awc * 100.0
    }

    fn clamp(&mut self) {
        self.soil_moisture = self.soil_moisture.clamp(0.0, self.awc);
    }

    /// Advance one day.
    pub fn step(
        &mut self,
        weather: &Observation,
        etc: f64,
        growth_stage: u8,
        strategy: &dyn IrrigationStrategy,
    ) -> DayOutcome {
        self.soil_moisture += weather.rainfall;
        self.soil_moisture -= etc;
        self.clamp();

        let depletion_percent = 100.0 - self.soil_moisture_percent();

        let decision = strategy.decide(&DayState {
            weather,
            awc_mm: self.awc,
            soil_moisture_mm: self.soil_moisture,
            depletion_percent,
            growth_stage,
            days_since_irrigation: self.days_since_irrigation,
        });

        // Only water the root zone can hold is applied and reported
        let before_irrigation = self.soil_moisture;
        if decision.irrigate {
            self.soil_moisture += decision.amount_mm.max(0.0);
            self.days_since_irrigation = 0;
        } else {
            self.days_since_irrigation += 1;
        }
        self.clamp();
        let irrigation_amount_mm = self.soil_moisture - before_irrigation;

        DayOutcome {
            depletion_percent,
            irrigation_needed: decision.irrigate,
            irrigation_amount_mm,
            soil_moisture_mm: self.soil_moisture,
            soil_moisture_percent: self.soil_moisture_percent(),
            confidence: decision.confidence,
        }
    }
}

/// Pick the advice tier for a day. Earlier arms win.
pub fn recommend(rainfall: f64, irrigation_needed: bool, depletion_percent: f64) -> Recommendation {
    if rainfall > SUFFICIENT_RAINFALL_MM {
        Recommendation::SufficientRainfall
    } else if irrigation_needed {
        Recommendation::IrrigationRequired { depletion_percent }
    } else if depletion_percent > PREPARE_DEPLETION_PERCENT {
        Recommendation::PrepareSoon
    } else {
        Recommendation::Adequate
    }
}

pub struct ScheduleOptions<'a> {
    pub strategy: &'a dyn IrrigationStrategy,
    pub irrigation_method: IrrigationMethod,
}

impl Default for ScheduleOptions<'_> {
    fn default() -> Self {
        Self {
            strategy: &Fao56Strategy,
            irrigation_method: IrrigationMethod::default(),
        }
    }
}

/// Simulate the horizon with the FAO-56 strategy.
pub fn compute_schedule(
    soil: &SoilProfile,
    crop: &CropProfile,
    growth_stage: u8,
    weather: &[DailyWeather],
    farm_area_hectares: f64,
) -> Result<Vec<DailyScheduleRecord>> {
    compute_schedule_with(
        soil,
        crop,
        growth_stage,
        weather,
        farm_area_hectares,
        &ScheduleOptions::default(),
    )
}

pub fn compute_schedule_with(
    soil: &SoilProfile,
    crop: &CropProfile,
    growth_stage: u8,
    weather: &[DailyWeather],
    farm_area_hectares: f64,
    options: &ScheduleOptions,
) -> Result<Vec<DailyScheduleRecord>> {
    let mut balance = WaterBalance::new(soil, crop)?;
    let days = observe_sequence(weather)?;

    if !farm_area_hectares.is_finite() || farm_area_hectares < 0.0 {
        return Err(CropWaterError::InvalidInput(format!(
            "farm area must be a non-negative number of hectares, got {}",
            farm_area_hectares
        )));
    }

    let et0 = reference_et0_series(&days);
    let etc = crop_et(&et0, crop, growth_stage);

    let schedule = days
        .iter()
        .zip(et0.iter().zip(etc.iter()))
        .map(|(day, (&et0, &etc))| {
            let outcome = balance.step(day, etc, growth_stage, options.strategy);
            DailyScheduleRecord {
                date: day.date,
                weekday: day.date.weekday(),
                weather: day.snapshot(),
                et0,
                etc,
                depletion_percent: outcome.depletion_percent,
                soil_moisture_mm: outcome.soil_moisture_mm,
                soil_moisture_percent: outcome.soil_moisture_percent,
                irrigation_needed: outcome.irrigation_needed,
                irrigation_amount_mm: outcome.irrigation_amount_mm,
                irrigation_duration_hours: outcome.irrigation_amount_mm
                    / APPLICATION_RATE_MM_PER_HOUR,
                total_water_liters: outcome.irrigation_amount_mm
                    * farm_area_hectares
                    * LITERS_PER_MM_HECTARE,
                best_irrigation_time: BEST_IRRIGATION_TIME.to_string(),
                recommendation: recommend(
                    day.rainfall,
                    outcome.irrigation_needed,
                    outcome.depletion_percent,
                ),
                confidence: outcome.confidence,
                prediction_method: options.strategy.method(),
                irrigation_method: options.irrigation_method,
            }
        })
        .collect();

    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::strategy::{RuleBasedStrategy, MAD_PERCENT, REFILL_FRACTION};
    use crate::models::PredictionMethod;
    use crate::tables::ParameterTables;
    use approx::assert_relative_eq;
    use chrono::{Duration, NaiveDate};

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 6).unwrap()
    }

    fn hot_dry_week() -> Vec<DailyWeather> {
        (0..7)
            .map(|i| {
                DailyWeather::complete(
                    start() + Duration::days(i),
                    38.0,
                    22.0,
                    35.0,
                    3.0,
                    0.0,
                    25.0,
                )
            })
            .collect()
    }

    fn loam_rice() -> (SoilProfile, CropProfile) {
        let tables = ParameterTables::builtin();
        (
            tables.soil("Loam").unwrap().clone(),
            tables.crop("Rice").unwrap().clone(),
        )
    }

    fn observation(rainfall: f64) -> Observation {
        Observation {
            date: start(),
            temp_max: 30.0,
            temp_min: 20.0,
            humidity: 60.0,
            wind_speed: 2.0,
            rainfall,
            solar_radiation: 20.0,
        }
    }

    #[test]
    fn awc_for_loam_rice() {
        let (soil, crop) = loam_rice();
        assert_relative_eq!(
            available_water_capacity(&soil, &crop).unwrap(),
            65.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn reversed_soil_fractions_fail_with_context() {
        let soil = SoilProfile::new("Inverted", 0.10, 0.20);
        let (_, crop) = loam_rice();
        match available_water_capacity(&soil, &crop) {
            Err(CropWaterError::InvalidWaterCapacity {
                soil, crop, awc, ..
            }) => {
                assert_eq!(soil, "Inverted");
                assert_eq!(crop, "Rice");
                assert!(awc < 0.0);
            }
            other => panic!("expected InvalidWaterCapacity, got {:?}", other),
        }
    }

    #[test]
    fn equal_fractions_or_zero_depth_fail() {
        let (loam, rice) = loam_rice();
        let flat = SoilProfile::new("Flat", 0.2, 0.2);
        assert!(matches!(
            available_water_capacity(&flat, &rice),
            Err(CropWaterError::InvalidWaterCapacity { .. })
        ));

        let rootless = CropProfile::new("Rootless", [1.0; 4], 0.0);
        assert!(matches!(
            compute_schedule(&loam, &rootless, 2, &hot_dry_week(), 1.0),
            Err(CropWaterError::InvalidWaterCapacity { .. })
        ));
    }

    #[test]
    fn reversed_soil_with_negative_depth_is_rejected() {
        // Both factors negative would multiply to a positive capacity
        let soil = SoilProfile::new("Inverted", 0.10, 0.20);
        let crop = CropProfile::new("Upside", [0.5, 0.8, 1.0, 0.7], -0.5);

        match available_water_capacity(&soil, &crop) {
            Err(CropWaterError::InvalidWaterCapacity { soil, crop, .. }) => {
                assert_eq!(soil, "Inverted");
                assert_eq!(crop, "Upside");
            }
            other => panic!("expected InvalidWaterCapacity, got {:?}", other),
        }
        assert!(matches!(
            compute_schedule(&soil, &crop, 1, &hot_dry_week(), 1.0),
            Err(CropWaterError::InvalidWaterCapacity { .. })
        ));
    }

    #[test]
    fn negative_depth_alone_is_rejected() {
        let (loam, _) = loam_rice();
        let crop = CropProfile::new("Upside", [0.5, 0.8, 1.0, 0.7], -0.5);
        assert!(matches!(
            compute_schedule(&loam, &crop, 1, &hot_dry_week(), 1.0),
            Err(CropWaterError::InvalidWaterCapacity { .. })
        ));
    }

    #[test]
    fn irrigation_reports_only_water_the_soil_holds() {
        // AWC of 10 mm is smaller than anything the rule-based strategy asks for
        let soil = SoilProfile::new("Shallow", 0.15, 0.10);
        let crop = CropProfile::new("Seedling", [1.0; 4], 0.2);
        let options = ScheduleOptions {
            strategy: &RuleBasedStrategy,
            irrigation_method: IrrigationMethod::Drip,
        };
        let schedule =
            compute_schedule_with(&soil, &crop, 1, &hot_dry_week(), 2.0, &options).unwrap();

        // ETc exceeds the whole capacity every day, so each refill is 10 mm
        assert_eq!(schedule.len(), 7);
        for day in &schedule {
            assert!(day.etc > 10.0);
            assert!(day.irrigation_needed);
            assert_relative_eq!(day.soil_moisture_mm, 10.0, epsilon = 1e-9);
            assert_relative_eq!(day.irrigation_amount_mm, 10.0, epsilon = 1e-9);
            assert_relative_eq!(day.total_water_liters, 200.0, epsilon = 1e-9);
            assert_relative_eq!(day.irrigation_duration_hours, 1.0, epsilon = 1e-9);
        }

        let summary = crate::logic::summary::summarize(&schedule);
        assert_relative_eq!(summary.total_water_mm, 70.0, epsilon = 1e-9);
        assert_relative_eq!(summary.total_water_liters, 1400.0, epsilon = 1e-9);
    }

    #[test]
    fn starts_half_full() {
        let (soil, crop) = loam_rice();
        let balance = WaterBalance::new(&soil, &crop).unwrap();
        assert_relative_eq!(balance.soil_moisture(), 32.5, epsilon = 1e-9);
    }

    #[test]
    fn hot_dry_week_scenario() {
        let (soil, crop) = loam_rice();
        let schedule = compute_schedule(&soil, &crop, 2, &hot_dry_week(), 10.0).unwrap();
        assert_eq!(schedule.len(), 7);

        let first = &schedule[0];
        assert!(first.et0 > 11.0 && first.et0 <= 15.0);
        assert_relative_eq!(first.etc, first.et0 * 1.2, epsilon = 1e-12);
        assert!(first.depletion_percent > MAD_PERCENT);
        assert!(first.irrigation_needed);
        assert_relative_eq!(first.soil_moisture_mm, 52.0, epsilon = 1e-9);
        assert_relative_eq!(first.soil_moisture_percent, 80.0, epsilon = 1e-9);
        assert_relative_eq!(
            first.irrigation_duration_hours,
            first.irrigation_amount_mm / 10.0
        );
        assert_relative_eq!(
            first.total_water_liters,
            first.irrigation_amount_mm * 100.0,
            epsilon = 1e-9
        );
        assert!(matches!(
            first.recommendation,
            Recommendation::IrrigationRequired { .. }
        ));

        // Day two drains from 52mm but stays under the MAD
        let second = &schedule[1];
        assert!(!second.irrigation_needed);
        assert_eq!(second.irrigation_amount_mm, 0.0);
        assert_eq!(second.recommendation, Recommendation::PrepareSoon);

        let irrigation_days = schedule.iter().filter(|d| d.irrigation_needed).count();
        assert_eq!(irrigation_days, 4);
    }

    #[test]
    fn moisture_stays_within_capacity() {
        let (soil, crop) = loam_rice();
        let mut weather = hot_dry_week();
        weather[2].rainfall = Some(250.0);
        weather[4].rainfall = Some(12.0);
        let awc = available_water_capacity(&soil, &crop).unwrap();

        for stage in 0..6 {
            let schedule = compute_schedule(&soil, &crop, stage, &weather, 1.0).unwrap();
            for day in &schedule {
                assert!(day.soil_moisture_mm >= 0.0 && day.soil_moisture_mm <= awc);
                assert!((0.0..=100.0).contains(&day.soil_moisture_percent));
            }
        }
    }

    #[test]
    fn trigger_matches_depletion_threshold() {
        let (soil, crop) = loam_rice();
        let mut weather = hot_dry_week();
        weather[1].rainfall = Some(8.0);
        weather[3].temp_max = Some(20.0);
        weather[3].humidity = Some(90.0);
        let schedule = compute_schedule(&soil, &crop, 0, &weather, 1.0).unwrap();

        for day in &schedule {
            assert_eq!(day.irrigation_needed, day.depletion_percent > MAD_PERCENT);
            if day.irrigation_needed {
                assert_relative_eq!(
                    day.soil_moisture_mm,
                    REFILL_FRACTION * 65.0,
                    epsilon = 1e-9
                );
            } else {
                assert_eq!(day.irrigation_amount_mm, 0.0);
                assert_eq!(day.total_water_liters, 0.0);
            }
        }
    }

    #[test]
    fn heavy_rain_on_dry_soil_fills_to_capacity() {
        let (soil, crop) = loam_rice();
        let mut balance = WaterBalance::new(&soil, &crop).unwrap();
        balance.soil_moisture = 0.5;

        let outcome = balance.step(&observation(100.0), 4.0, 2, &Fao56Strategy);
        assert_eq!(outcome.soil_moisture_mm, balance.awc());
        assert_eq!(outcome.depletion_percent, 0.0);
        assert!(!outcome.irrigation_needed);
        assert_eq!(
            recommend(100.0, outcome.irrigation_needed, outcome.depletion_percent),
            Recommendation::SufficientRainfall
        );
    }

    #[test]
    fn etc_cannot_drive_moisture_negative() {
        let (soil, crop) = loam_rice();
        let mut balance = WaterBalance::new(&soil, &crop).unwrap();
        let outcome = balance.step(&observation(0.0), 500.0, 2, &RuleBasedStrategy);
        assert_eq!(outcome.depletion_percent, 100.0);
        assert!(outcome.irrigation_needed);
        // Rule-based: (80 - 0) * 0.5
        assert_relative_eq!(outcome.irrigation_amount_mm, 40.0);
        assert_relative_eq!(outcome.soil_moisture_mm, 40.0);
    }

    #[test]
    fn recommendation_priority() {
        // Rain beats everything, even a triggered irrigation
        assert_eq!(recommend(10.5, true, 80.0), Recommendation::SufficientRainfall);
        assert_eq!(
            recommend(10.0, true, 55.0),
            Recommendation::IrrigationRequired {
                depletion_percent: 55.0
            }
        );
        assert_eq!(recommend(0.0, false, 20.5), Recommendation::PrepareSoon);
        assert_eq!(recommend(0.0, false, 20.0), Recommendation::Adequate);
    }

    #[test]
    fn out_of_range_stage_matches_mid() {
        let (soil, crop) = loam_rice();
        let mid = compute_schedule(&soil, &crop, 2, &hot_dry_week(), 1.0).unwrap();
        let seven = compute_schedule(&soil, &crop, 7, &hot_dry_week(), 1.0).unwrap();
        assert_eq!(mid, seven);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let (soil, crop) = loam_rice();
        let weather = hot_dry_week();
        let a = compute_schedule(&soil, &crop, 1, &weather, 3.5).unwrap();
        let b = compute_schedule(&soil, &crop, 1, &weather, 3.5).unwrap();
        assert_eq!(a, b);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.soil_moisture_mm.to_bits(), y.soil_moisture_mm.to_bits());
            assert_eq!(x.etc.to_bits(), y.etc.to_bits());
        }
    }

    #[test]
    fn invalid_weather_aborts_before_output() {
        let (soil, crop) = loam_rice();
        let mut weather = hot_dry_week();
        weather[5].wind_speed = None;
        assert!(matches!(
            compute_schedule(&soil, &crop, 2, &weather, 1.0),
            Err(CropWaterError::MissingWeatherField { field: "wind_speed", .. })
        ));

        assert!(matches!(
            compute_schedule(&soil, &crop, 2, &[], 1.0),
            Err(CropWaterError::InvalidInput(_))
        ));
    }

    #[test]
    fn negative_area_is_rejected() {
        let (soil, crop) = loam_rice();
        assert!(matches!(
            compute_schedule(&soil, &crop, 2, &hot_dry_week(), -2.0),
            Err(CropWaterError::InvalidInput(_))
        ));
    }

    #[test]
    fn options_tag_records() {
        let (soil, crop) = loam_rice();
        let options = ScheduleOptions {
            strategy: &RuleBasedStrategy,
            irrigation_method: IrrigationMethod::Sprinkler,
        };
        let schedule =
            compute_schedule_with(&soil, &crop, 2, &hot_dry_week(), 1.0, &options).unwrap();
        for day in &schedule {
            assert_eq!(day.prediction_method, PredictionMethod::RuleBasedFallback);
            assert_eq!(day.irrigation_method, IrrigationMethod::Sprinkler);
            assert_eq!(day.best_irrigation_time, BEST_IRRIGATION_TIME);
        }
        assert_eq!(schedule[0].weekday, chrono::Weekday::Mon);
    }
}
