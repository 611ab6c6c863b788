//! Plain-text rendering for the command line. Records keep full precision;
//! everything is rounded here.

use crate::logic::DemandEstimate;
use crate::models::{ReportListing, ScheduleReport, ScheduleSummary};
use crate::tables::ParameterTables;
use chrono::{DateTime, Utc};
use std::fmt::Write;

pub fn render_report(report: &ScheduleReport) -> String {
    let mut out = String::new();
    let req = &report.request;

    let _ = writeln!(out, "Irrigation schedule for {}", req.farm_name);
    let _ = writeln!(out, "  Report:    {}", report.id);
    let _ = writeln!(
        out,
        "  Crop:      {} (stage {}) on {} soil",
        req.crop, req.growth_stage, req.soil_type
    );
    let _ = writeln!(
        out,
        "  Area:      {} ({:.2} ha), {} irrigation",
        req.area, report.area_hectares, req.irrigation_method
    );
    let _ = writeln!(out, "  Location:  {}", req.location);
    let _ = writeln!(out, "  Forecast:  {}", report.origin);
    let _ = write!(out, "  AWC:       {:.1} mm", report.awc_mm);
    if let Some(threshold) = report.soil_threshold {
        let _ = write!(out, " (soil threshold {:.0}%", threshold * 100.0);
        match report.irrigation_trigger_mm {
            Some(trigger) => {
                let _ = write!(out, ", trigger {:.0} mm)", trigger);
            }
            None => out.push(')'),
        }
    }
    out.push_str("\n\n");

    let _ = writeln!(
        out,
        "{:<10} {:<3} {:>5} {:>5} {:>6} {:>6} {:>6} {:>7} {:>7} {:>6} {:>9}  {}",
        "Date", "Day", "Tmax", "Rain", "ET0", "ETc", "Depl%", "Moist%", "Irr mm", "Hours", "Liters", "Advice"
    );
    for day in &report.schedule {
        let _ = writeln!(
            out,
            "{:<10} {:<3} {:>5.1} {:>5.1} {:>6.2} {:>6.2} {:>6.1} {:>7.1} {:>7.1} {:>6.1} {:>9.0}  {} {}",
            day.date.format("%Y-%m-%d"),
            day.weekday,
            day.weather.temp_max,
            day.weather.rainfall,
            day.et0,
            day.etc,
            day.depletion_percent,
            day.soil_moisture_percent,
            day.irrigation_amount_mm,
            day.irrigation_duration_hours,
            day.total_water_liters,
            day.recommendation.symbol(),
            day.recommendation.message(),
        );
    }
    out.push('\n');

    out.push_str(&render_summary(&report.summary));
    if let Some(first) = report.first_irrigation() {
        let _ = writeln!(
            out,
            "  Next irrigation:   {} {} ({:.1} mm)",
            first.date, first.best_irrigation_time, first.irrigation_amount_mm
        );
    }
    out
}

pub fn render_summary(summary: &ScheduleSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Summary");
    let _ = writeln!(out, "  Irrigation days:   {}", summary.irrigation_frequency());
    let _ = writeln!(out, "  Total water:       {:.1} mm", summary.total_water_mm);
    let _ = writeln!(out, "  Total volume:      {:.0} L", summary.total_water_liters);
    let _ = writeln!(out, "  Average daily ETc: {:.2} mm", summary.avg_daily_etc);
    out
}

pub fn render_soils(tables: &ParameterTables) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:>5} {:>5} {:>6} {:>6} {:>10}  {:<10} {}",
        "Soil", "FC", "WP", "BD", "Poros", "Threshold", "Infiltr.", "Holding"
    );
    for soil in tables.soils() {
        let threshold = tables
            .soil_threshold(&soil.name)
            .map(|t| format!("{:.0}%", t * 100.0))
            .unwrap_or_else(|| "-".into());
        let _ = writeln!(
            out,
            "{:<12} {:>5.2} {:>5.2} {:>6.2} {:>6.2} {:>10}  {:<10} {}",
            soil.name,
            soil.field_capacity,
            soil.wilting_point,
            soil.bulk_density,
            soil.porosity,
            threshold,
            soil.infiltration_rate,
            soil.water_holding_capacity,
        );
    }
    out
}

pub fn render_crops(tables: &ParameterTables) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:>5} {:>5} {:>5} {:>5} {:>6} {:>5} {:>6}",
        "Crop", "Kc0", "Kc1", "Kc2", "Kc3", "Root m", "p", "Days"
    );
    for crop in tables.crops() {
        let _ = writeln!(
            out,
            "{:<12} {:>5.2} {:>5.2} {:>5.2} {:>5.2} {:>6.1} {:>5.2} {:>6}",
            crop.name,
            crop.kc_initial,
            crop.kc_development,
            crop.kc_mid,
            crop.kc_late,
            crop.rooting_depth,
            crop.critical_depletion,
            crop.season_length,
        );
    }
    out
}

/// Rows past their retention period are flagged; `purge` removes them.
pub fn render_history(listings: &[ReportListing], now: DateTime<Utc>) -> String {
    if listings.is_empty() {
        return "No saved reports.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<36}  {:<16}  {:<16}  {:<12} {:<10} {:<10} {}",
        "ID", "Created", "Expires", "Farm", "Crop", "Soil", "Irrigation"
    );
    for l in listings {
        let _ = write!(
            out,
            "{:<36}  {:<16}  {:<16}  {:<12} {:<10} {:<10} {}/{} days ({})",
            l.id,
            l.created_at.format("%Y-%m-%d %H:%M"),
            l.expires_at.format("%Y-%m-%d %H:%M"),
            l.farm_name,
            l.crop,
            l.soil_type,
            l.total_irrigation_days,
            l.horizon_days,
            l.origin,
        );
        if l.is_expired(now) {
            out.push_str("  [expired]");
        }
        out.push('\n');
    }
    out
}

pub fn render_demand(estimate: &DemandEstimate) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Water demand for {} (stage {}), {} forecast",
        estimate.crop, estimate.growth_stage, estimate.origin
    );
    if estimate.flat_multiplier {
        let _ = writeln!(out, "  Unknown crop: ETc uses a flat multiplier of ET0");
    }
    let _ = writeln!(out, "{:<10} {:>6} {:>6}", "Date", "ET0", "ETc");
    for day in &estimate.days {
        let _ = writeln!(out, "{:<10} {:>6.2} {:>6.2}", day.date, day.et0, day.etc);
    }
    out
}
