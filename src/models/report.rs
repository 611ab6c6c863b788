use super::farm::ScheduleRequest;
use super::schedule::{DailyScheduleRecord, ScheduleSummary};
use crate::datasources::ForecastOrigin;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A finished planning run: the request, the forecast source, and the
/// simulated horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleReport {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub request: ScheduleRequest,
    pub origin: ForecastOrigin,
    pub area_hectares: f64,
    pub awc_mm: f64,
    /// Depletion fraction listed for the soil class. Informational only.
    #[serde(default)]
    pub soil_threshold: Option<f64>,
    /// Depletion in mm listed for the soil class. Informational only.
    #[serde(default)]
    pub irrigation_trigger_mm: Option<f64>,
    pub schedule: Vec<DailyScheduleRecord>,
    pub summary: ScheduleSummary,
}

impl ScheduleReport {
    pub fn new_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    pub fn first_irrigation(&self) -> Option<&DailyScheduleRecord> {
        self.schedule.iter().find(|d| d.irrigation_needed)
    }
}

/// One row of the report history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportListing {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub farm_name: String,
    pub soil_type: String,
    pub crop: String,
    pub origin: ForecastOrigin,
    pub total_irrigation_days: usize,
    pub horizon_days: usize,
}

impl ReportListing {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn report_ids_are_unique_uuids() {
        let a = ScheduleReport::new_id();
        let b = ScheduleReport::new_id();
        assert_ne!(a, b);
        assert!(uuid::Uuid::parse_str(&a).is_ok());
    }

    #[test]
    fn listing_expiry_is_inclusive() {
        let now = Utc::now();
        let listing = ReportListing {
            id: ScheduleReport::new_id(),
            created_at: now - Duration::days(30),
            expires_at: now,
            farm_name: "North".into(),
            soil_type: "Loam".into(),
            crop: "Wheat".into(),
            origin: ForecastOrigin::Synthetic,
            total_irrigation_days: 2,
            horizon_days: 7,
        };
        assert!(listing.is_expired(now));
        assert!(!listing.is_expired(now - Duration::seconds(1)));
    }
}
