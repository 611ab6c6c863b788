pub mod crop_et;
pub mod et0;
pub mod planner;
pub mod strategy;
pub mod summary;
pub mod water_balance;

pub use crop_et::{crop_et, crop_et_by_name, CropFallback};
pub use et0::{reference_et0, reference_et0_series};
pub use planner::{DailyDemand, DemandEstimate, IrrigationPlanner};
pub use strategy::{Fao56Strategy, IrrigationStrategy, RuleBasedStrategy, StrategyKind};
pub use summary::summarize;
pub use water_balance::{
    available_water_capacity, compute_schedule, compute_schedule_with, ScheduleOptions,
    WaterBalance,
};
