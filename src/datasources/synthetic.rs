//! Deterministic stand-in forecast used when the live feed is unavailable.
//!
//! Baselines follow the broad climate of the farm's region; day-to-day
//! variation comes from a seeded `ChaCha8Rng`, so the same seed, region and
//! start date always produce the same series.

use crate::models::{DailyWeather, Location};
use chrono::{Duration, NaiveDate};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Exp1, StandardNormal};

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    /// Karnataka coast
    Coastal,
    /// Rajasthan desert
    Arid,
    Default,
}

impl Region {
    pub fn classify(location: &Location) -> Self {
        match location.coords() {
            Some((lat, lon)) if (12.0..=15.0).contains(&lat) && (74.0..=76.0).contains(&lon) => {
                Region::Coastal
            }
            Some((lat, lon)) if (24.0..=30.0).contains(&lat) && (69.0..=78.0).contains(&lon) => {
                Region::Arid
            }
            _ => Region::Default,
        }
    }

    fn baseline(&self) -> Baseline {
        match self {
            Region::Coastal => Baseline {
                temp_max: 32.0,
                temp_min: 24.0,
                humidity: 75.0,
                rainfall: 3.0,
            },
            Region::Arid => Baseline {
                temp_max: 38.0,
                temp_min: 22.0,
                humidity: 35.0,
                rainfall: 0.5,
            },
            Region::Default => Baseline {
                temp_max: 35.0,
                temp_min: 25.0,
                humidity: 55.0,
                rainfall: 1.0,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Coastal => "Coastal",
            Region::Arid => "Arid",
            Region::Default => "Default",
        }
    }
}

struct Baseline {
    temp_max: f64,
    temp_min: f64,
    humidity: f64,
    rainfall: f64,
}

#[derive(Debug, Clone)]
pub struct SyntheticWeather {
    seed: u64,
}

impl SyntheticWeather {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn generate(&self, location: &Location, start: NaiveDate, days: u32) -> Vec<DailyWeather> {
        let region = Region::classify(location);
        let base = region.baseline();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        (0..days)
            .map(|i| {
                let temp_max = (base.temp_max + normal(&mut rng, 2.0)).max(20.0);
                let temp_min = (base.temp_min + normal(&mut rng, 2.0)).max(15.0);
                let humidity = (base.humidity + normal(&mut rng, 10.0)).clamp(20.0, 95.0);
                let wind_speed = (6.0 + normal(&mut rng, 2.0)).max(0.0);
                let extra_rain: f64 = Exp1.sample(&mut rng);
                let rainfall = base.rainfall + extra_rain;
                let solar_radiation = (22.0 + normal(&mut rng, 3.0)).max(10.0);

                DailyWeather::complete(
                    start + Duration::days(i64::from(i)),
                    temp_max,
                    temp_min,
                    humidity,
                    wind_speed,
                    rainfall,
                    solar_radiation,
                )
                .with_condition("Partly cloudy")
            })
            .collect()
    }
}

impl Default for SyntheticWeather {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

/// Zero-mean normal sample with the given spread.
fn normal(rng: &mut ChaCha8Rng, std_dev: f64) -> f64 {
    let z: f64 = StandardNormal.sample(rng);
    std_dev * z
}
