use crate::config::SimulationConfig;
use crate::datasources::{Forecast, ForecastOrigin, WeatherService};
use crate::db::Database;
use crate::error::Result;
use crate::logic::crop_et::{crop_et_by_name, CropFallback};
use crate::logic::et0::reference_et0_series;
use crate::logic::strategy::IrrigationStrategy;
use crate::logic::summary::summarize;
use crate::logic::water_balance::{available_water_capacity, compute_schedule_with, ScheduleOptions};
use crate::models::{observe_sequence, Location, ScheduleReport, ScheduleRequest};
use crate::tables::ParameterTables;
use chrono::{Local, NaiveDate, Utc};
use serde::Serialize;

/// Crop water demand for one forecast day, without a soil simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyDemand {
    pub date: NaiveDate,
    pub et0: f64,
    pub etc: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandEstimate {
    pub crop: String,
    pub growth_stage: u8,
    pub origin: ForecastOrigin,
    /// True when the crop was unknown and the flat multiplier was applied.
    pub flat_multiplier: bool,
    pub days: Vec<DailyDemand>,
}

/// Runs a schedule end to end: resolves names against the tables, fetches
/// the forecast, simulates, summarises, and stores the report when a
/// database is attached.
pub struct IrrigationPlanner {
    tables: ParameterTables,
    weather: WeatherService,
    strategy: Box<dyn IrrigationStrategy>,
    crop_fallback: CropFallback,
    store: Option<ReportStore>,
}

struct ReportStore {
    db: Database,
    default_retention_days: u32,
}

impl IrrigationPlanner {
    pub fn new(tables: ParameterTables, weather: WeatherService, simulation: SimulationConfig) -> Self {
        Self {
            tables,
            weather,
            strategy: simulation.strategy.build(),
            crop_fallback: simulation.crop_fallback,
            store: None,
        }
    }

    /// Persist every report to `db`. The retention stored in the database
    /// wins over `default_retention_days`.
    pub fn with_database(mut self, db: Database, default_retention_days: u32) -> Self {
        self.store = Some(ReportStore {
            db,
            default_retention_days,
        });
        self
    }

    pub async fn plan(&self, request: &ScheduleRequest) -> Result<ScheduleReport> {
        self.plan_from(request, Local::now().date_naive()).await
    }

    pub async fn plan_from(&self, request: &ScheduleRequest, start: NaiveDate) -> Result<ScheduleReport> {
        // Fail on bad names before spending a network call
        self.tables.soil(&request.soil_type)?;
        self.tables.crop(&request.crop)?;
        request.area.in_hectares()?;

        let forecast = self.weather.fetch_from(&request.location, start).await?;
        self.plan_with_forecast(request, forecast)
    }

    /// Simulate `request` over an already-fetched forecast.
    pub fn plan_with_forecast(
        &self,
        request: &ScheduleRequest,
        forecast: Forecast,
    ) -> Result<ScheduleReport> {
        let soil = self.tables.soil(&request.soil_type)?;
        let crop = self.tables.crop(&request.crop)?;
        let area_hectares = request.area.in_hectares()?;
        let awc_mm = available_water_capacity(soil, crop)?;

        let soil_threshold = self.tables.soil_threshold(&soil.name);
        let irrigation_trigger_mm = self.tables.irrigation_trigger(&soil.name);

        tracing::debug!(
            soil = %soil.name,
            crop = %crop.name,
            awc_mm,
            ?soil_threshold,
            ?irrigation_trigger_mm,
            origin = %forecast.origin,
            days = forecast.days.len(),
            "Running water balance"
        );

        let options = ScheduleOptions {
            strategy: self.strategy.as_ref(),
            irrigation_method: request.irrigation_method,
        };
        let schedule = compute_schedule_with(
            soil,
            crop,
            request.growth_stage,
            &forecast.days,
            area_hectares,
            &options,
        )?;
        let summary = summarize(&schedule);

        let report = ScheduleReport {
            id: ScheduleReport::new_id(),
            created_at: Utc::now(),
            request: request.clone(),
            origin: forecast.origin,
            area_hectares,
            awc_mm,
            soil_threshold,
            irrigation_trigger_mm,
            schedule,
            summary,
        };

        if let Some(ref store) = self.store {
            let retention = store.db.retention_days(store.default_retention_days)?;
            let expires_at = store.db.save_report(&report, retention)?;
            tracing::info!(id = %report.id, %expires_at, "Saved schedule report");
        }

        Ok(report)
    }

    /// ET0 and ETc over the forecast for `crop`. Honours the configured
    /// unknown-crop policy.
    pub async fn estimate_demand(
        &self,
        crop: &str,
        growth_stage: u8,
        location: &Location,
        start: NaiveDate,
    ) -> Result<DemandEstimate> {
        let flat_multiplier = self.tables.crop(crop).is_err();
        // Surfaces UnknownCrop before fetching under the strict policy
        crop_et_by_name(&self.tables, crop, &[], growth_stage, self.crop_fallback)?;

        let forecast = self.weather.fetch_from(location, start).await?;
        let observed = observe_sequence(&forecast.days)?;
        let et0 = reference_et0_series(&observed);
        let etc = crop_et_by_name(&self.tables, crop, &et0, growth_stage, self.crop_fallback)?;

        let days = observed
            .iter()
            .zip(et0.iter().zip(etc.iter()))
            .map(|(day, (&et0, &etc))| DailyDemand {
                date: day.date,
                et0,
                etc,
            })
            .collect();

        Ok(DemandEstimate {
            crop: crop.to_string(),
            growth_stage,
            origin: forecast.origin,
            flat_multiplier,
            days,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WeatherConfig;
    use crate::error::CropWaterError;
    use crate::logic::crop_et::FALLBACK_KC;
    use crate::logic::strategy::StrategyKind;
    use crate::logic::water_balance::compute_schedule;
    use crate::models::{DailyWeather, FarmArea, IrrigationMethod, PredictionMethod};
    use approx::assert_relative_eq;
    use chrono::Duration;

    fn offline_weather() -> WeatherService {
        WeatherService::offline(&WeatherConfig {
            forecast_days: 7,
            fallback_seed: 3,
            ..Default::default()
        })
    }

    fn planner(simulation: SimulationConfig) -> IrrigationPlanner {
        IrrigationPlanner::new(ParameterTables::builtin(), offline_weather(), simulation)
    }

    fn request(soil: &str, crop: &str) -> ScheduleRequest {
        ScheduleRequest {
            farm_name: "Test Farm".into(),
            soil_type: soil.into(),
            crop: crop.into(),
            growth_stage: 2,
            area: FarmArea::acres(5.0),
            irrigation_method: IrrigationMethod::Furrow,
            location: Location::coordinates(27.13, 72.36),
        }
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[tokio::test]
    async fn plans_over_synthetic_forecast() {
        let planner = planner(SimulationConfig::default());
        let report = planner
            .plan_from(&request("loam", "TOMATO"), start())
            .await
            .unwrap();

        assert_eq!(report.origin, ForecastOrigin::Synthetic);
        assert_eq!(report.schedule.len(), 7);
        assert_eq!(report.schedule[0].date, start());
        assert_eq!(report.summary, summarize(&report.schedule));
        assert_relative_eq!(report.area_hectares, 5.0 * 0.404686, epsilon = 1e-9);
        assert_eq!(report.soil_threshold, Some(0.5));
        assert_eq!(report.irrigation_trigger_mm, Some(20.0));
        assert!(report
            .schedule
            .iter()
            .all(|d| d.irrigation_method == IrrigationMethod::Furrow
                && d.prediction_method == PredictionMethod::Fao56Method));
    }

    #[test]
    fn forecast_plan_matches_core_simulation() {
        let planner = planner(SimulationConfig::default());
        let days: Vec<_> = (0..5)
            .map(|i| DailyWeather::complete(start() + Duration::days(i), 40.0, 26.0, 25.0, 3.0, 0.0, 26.0))
            .collect();
        let forecast = Forecast {
            origin: ForecastOrigin::WeatherApi,
            days: days.clone(),
        };

        let mut req = request("Clay", "Corn");
        req.area = FarmArea::hectares(2.0);
        let report = planner.plan_with_forecast(&req, forecast).unwrap();

        let tables = ParameterTables::builtin();
        let expected = compute_schedule(
            tables.soil("Clay").unwrap(),
            tables.crop("Corn").unwrap(),
            2,
            &days,
            2.0,
        )
        .unwrap();
        assert_eq!(report.schedule.len(), expected.len());
        for (a, b) in report.schedule.iter().zip(&expected) {
            assert_eq!(a.soil_moisture_mm, b.soil_moisture_mm);
            assert_eq!(a.irrigation_amount_mm, b.irrigation_amount_mm);
        }
    }

    #[tokio::test]
    async fn unknown_names_fail_before_fetch() {
        let planner = planner(SimulationConfig::default());
        assert!(matches!(
            planner.plan_from(&request("Peat", "Tomato"), start()).await,
            Err(CropWaterError::UnknownSoilType(_))
        ));
        assert!(matches!(
            planner.plan_from(&request("Loam", "Kale"), start()).await,
            Err(CropWaterError::UnknownCrop(_))
        ));
    }

    #[tokio::test]
    async fn flat_multiplier_does_not_rescue_full_plan() {
        let planner = planner(SimulationConfig {
            crop_fallback: CropFallback::FlatMultiplier,
            ..Default::default()
        });
        assert!(matches!(
            planner.plan_from(&request("Loam", "Kale"), start()).await,
            Err(CropWaterError::UnknownCrop(_))
        ));
    }

    #[tokio::test]
    async fn demand_estimate_uses_crop_policy() {
        let loc = Location::coordinates(13.3, 74.7);

        let strict = planner(SimulationConfig::default());
        assert!(matches!(
            strict.estimate_demand("Kale", 1, &loc, start()).await,
            Err(CropWaterError::UnknownCrop(_))
        ));

        let lenient = planner(SimulationConfig {
            crop_fallback: CropFallback::FlatMultiplier,
            ..Default::default()
        });
        let estimate = lenient.estimate_demand("Kale", 1, &loc, start()).await.unwrap();
        assert!(estimate.flat_multiplier);
        assert_eq!(estimate.days.len(), 7);
        for day in &estimate.days {
            assert_relative_eq!(day.etc, day.et0 * FALLBACK_KC, epsilon = 1e-12);
        }

        let known = lenient.estimate_demand("Rice", 1, &loc, start()).await.unwrap();
        assert!(!known.flat_multiplier);
    }

    #[tokio::test]
    async fn rule_based_strategy_is_applied() {
        let planner = planner(SimulationConfig {
            strategy: StrategyKind::RuleBased,
            ..Default::default()
        });
        let report = planner
            .plan_from(&request("Sandy", "Wheat"), start())
            .await
            .unwrap();
        assert!(report
            .schedule
            .iter()
            .all(|d| d.prediction_method == PredictionMethod::RuleBasedFallback));
    }

    #[tokio::test]
    async fn attached_database_stores_reports() {
        let db = Database::open_in_memory().unwrap();
        db.set_retention_days(5).unwrap();
        let planner = planner(SimulationConfig::default()).with_database(db.clone(), 30);

        let report = planner
            .plan_from(&request("Sandy Loam", "Cotton"), start())
            .await
            .unwrap();

        let listings = db.list_reports(10).unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].id, report.id);
        assert_eq!(
            listings[0].expires_at - listings[0].created_at,
            Duration::days(5)
        );
    }
}
