use crate::models::{DailyScheduleRecord, ScheduleSummary};

/// Fold a finished schedule into totals. An empty schedule yields a zeroed
/// summary.
pub fn summarize(schedule: &[DailyScheduleRecord]) -> ScheduleSummary {
    if schedule.is_empty() {
        return ScheduleSummary::default();
    }

    let total_irrigation_days = schedule.iter().filter(|d| d.irrigation_needed).count();
    let total_water_mm = schedule.iter().map(|d| d.irrigation_amount_mm).sum();
    let total_water_liters = schedule.iter().map(|d| d.total_water_liters).sum();
    let avg_daily_etc =
        schedule.iter().map(|d| d.etc).sum::<f64>() / schedule.len() as f64;

    ScheduleSummary {
        horizon_days: schedule.len(),
        total_irrigation_days,
        total_water_mm,
        total_water_liters,
        avg_daily_etc,
    }
}
