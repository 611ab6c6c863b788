use crate::datasources::ForecastOrigin;
use crate::db::Database;
use crate::error::{CropWaterError, Result};
use crate::models::{ReportListing, ScheduleReport, ScheduleSummary};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rusqlite::{params, Row};
use tracing::warn;

const RETENTION_KEY: &str = "retention_days";
pub const DEFAULT_RETENTION_DAYS: u32 = 30;

// Report Queries

impl Database {
    /// Store a report and return when it expires.
    pub fn save_report(&self, report: &ScheduleReport, retention_days: u32) -> Result<DateTime<Utc>> {
        let expires_at = report.created_at + Duration::days(i64::from(retention_days));
        let request_json = serde_json::to_string(&report.request)?;
        let schedule_json = serde_json::to_string(&report.schedule)?;
        let summary_json = serde_json::to_string(&report.summary)?;

        self.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO reports
                    (id, created_at, expires_at, farm_name, soil_type, crop, growth_stage,
                     location, origin, area_hectares, awc_mm, soil_threshold,
                     irrigation_trigger_mm, request_json, schedule_json, summary_json)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
                "#,
                params![
                    report.id,
                    format_timestamp(report.created_at),
                    format_timestamp(expires_at),
                    report.request.farm_name,
                    report.request.soil_type,
                    report.request.crop,
                    report.request.growth_stage,
                    report.request.location.to_string(),
                    report.origin.as_str(),
                    report.area_hectares,
                    report.awc_mm,
                    report.soil_threshold,
                    report.irrigation_trigger_mm,
                    request_json,
                    schedule_json,
                    summary_json,
                ],
            )?;
            Ok(())
        })?;

        Ok(expires_at)
    }

    /// Most recent reports first. Rows that cannot be read are logged and
    /// skipped.
    pub fn list_reports(&self, limit: usize) -> Result<Vec<ReportListing>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT id, created_at, expires_at, farm_name, soil_type, crop, origin, summary_json
                FROM reports
                ORDER BY created_at DESC
                LIMIT ?1
                "#,
            )?;
            let listings = stmt
                .query_map([limit as i64], row_to_listing)?
                .filter_map(|r| match r {
                    Ok(listing) => Some(listing),
                    Err(e) => {
                        warn!(error = %e, "Skipping unreadable report row");
                        None
                    }
                })
                .collect();
            Ok(listings)
        })
    }

    pub fn get_report(&self, id: &str) -> Result<ScheduleReport> {
        let raw = self.with_conn(|conn| {
            conn.query_row(
                r#"
                SELECT id, created_at, origin, area_hectares, awc_mm, soil_threshold,
                       irrigation_trigger_mm, request_json, schedule_json, summary_json
                FROM reports WHERE id = ?1
                "#,
                [id],
                row_to_raw_report,
            )
            .optional()
            .map_err(Into::into)
        })?;

        let raw = raw.ok_or_else(|| CropWaterError::NotFound(format!("report {}", id)))?;
        raw.into_report()
    }

    pub fn delete_report(&self, id: &str) -> Result<()> {
        let deleted = self.with_conn(|conn| {
            Ok(conn.execute("DELETE FROM reports WHERE id = ?1", [id])?)
        })?;
        if deleted == 0 {
            return Err(CropWaterError::NotFound(format!("report {}", id)));
        }
        Ok(())
    }

    /// Delete every report whose expiry is at or before `now`.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let purged = self.with_conn(|conn| {
            Ok(conn.execute(
                "DELETE FROM reports WHERE expires_at <= ?1",
                [format_timestamp(now)],
            )?)
        })?;
        if purged > 0 {
            tracing::info!(purged, "Purged expired reports");
        }
        Ok(purged)
    }
}

// Settings Queries

impl Database {
    /// Stored retention period, or `default` when none has been set.
    pub fn retention_days(&self, default: u32) -> Result<u32> {
        let stored: Option<String> = self.with_conn(|conn| {
            conn.query_row(
                "SELECT value FROM settings WHERE key = ?1",
                [RETENTION_KEY],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
        })?;

        Ok(match stored {
            Some(value) => value.parse().unwrap_or_else(|_| {
                warn!(value = %value, "Invalid retention_days in database, using default");
                default
            }),
            None => default,
        })
    }

    pub fn set_retention_days(&self, days: u32) -> Result<()> {
        if days == 0 {
            return Err(CropWaterError::InvalidInput(
                "retention must be at least one day".into(),
            ));
        }
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
                params![RETENTION_KEY, days.to_string()],
            )?;
            Ok(())
        })
    }
}

/// Columns of a stored report before the JSON payloads are decoded.
struct RawReport {
    id: String,
    created_at: String,
    origin: String,
    area_hectares: f64,
    awc_mm: f64,
    soil_threshold: Option<f64>,
    irrigation_trigger_mm: Option<f64>,
    request_json: String,
    schedule_json: String,
    summary_json: String,
}

impl RawReport {
    fn into_report(self) -> Result<ScheduleReport> {
        Ok(ScheduleReport {
            created_at: parse_timestamp(&self.created_at),
            origin: parse_origin(&self.origin),
            request: serde_json::from_str(&self.request_json)?,
            schedule: serde_json::from_str(&self.schedule_json)?,
            summary: serde_json::from_str(&self.summary_json)?,
            id: self.id,
            area_hectares: self.area_hectares,
            awc_mm: self.awc_mm,
            soil_threshold: self.soil_threshold,
            irrigation_trigger_mm: self.irrigation_trigger_mm,
        })
    }
}

fn row_to_raw_report(row: &Row) -> rusqlite::Result<RawReport> {
    Ok(RawReport {
        id: row.get("id")?,
        created_at: row.get("created_at")?,
        origin: row.get("origin")?,
        area_hectares: row.get("area_hectares")?,
        awc_mm: row.get("awc_mm")?,
        soil_threshold: row.get("soil_threshold")?,
        irrigation_trigger_mm: row.get("irrigation_trigger_mm")?,
        request_json: row.get("request_json")?,
        schedule_json: row.get("schedule_json")?,
        summary_json: row.get("summary_json")?,
    })
}

fn row_to_listing(row: &Row) -> rusqlite::Result<ReportListing> {
    let id: String = row.get("id")?;
    let created_at_str: String = row.get("created_at")?;
    let expires_at_str: String = row.get("expires_at")?;
    let origin_str: String = row.get("origin")?;
    let summary_json: String = row.get("summary_json")?;

    let summary: ScheduleSummary = serde_json::from_str(&summary_json).unwrap_or_else(|e| {
        warn!(report = %id, error = %e, "Unreadable summary in database");
        ScheduleSummary::default()
    });

    Ok(ReportListing {
        id,
        created_at: parse_timestamp(&created_at_str),
        expires_at: parse_timestamp(&expires_at_str),
        farm_name: row.get("farm_name")?,
        soil_type: row.get("soil_type")?,
        crop: row.get("crop")?,
        origin: parse_origin(&origin_str),
        total_irrigation_days: summary.total_irrigation_days,
        horizon_days: summary.horizon_days,
    })
}

/// Fixed-width UTC so stored timestamps compare correctly as text.
fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| {
            warn!(timestamp = %s, "Invalid timestamp in database, using now");
            Utc::now()
        })
}

fn parse_origin(s: &str) -> ForecastOrigin {
    ForecastOrigin::from_str(s).unwrap_or_else(|| {
        warn!(origin = %s, "Unknown forecast origin in database, defaulting to Synthetic");
        ForecastOrigin::Synthetic
    })
}

trait OptionalExt<T> {
    fn optional(self) -> rusqlite::Result<Option<T>>;
}

impl<T> OptionalExt<T> for rusqlite::Result<T> {
    fn optional(self) -> rusqlite::Result<Option<T>> {
        match self {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
