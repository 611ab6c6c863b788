//! Reference data for soils and crops.
//!
//! `ParameterTables` is built once at startup (built-in values plus any
//! configured additions) and handed to the planner by reference. Nothing
//! mutates it after construction.

use crate::error::{CropWaterError, Result};
use crate::models::{CropProfile, SoilProfile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct ParameterTables {
    soils: BTreeMap<String, SoilProfile>,
    crops: BTreeMap<String, CropProfile>,
    soil_thresholds: BTreeMap<String, f64>,
    irrigation_triggers: BTreeMap<String, f64>,
}

/// Extra table rows supplied through configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableOverrides {
    #[serde(default)]
    pub soils: Vec<SoilProfile>,
    #[serde(default)]
    pub crops: Vec<CropProfile>,
    /// Depletion fraction per soil class.
    #[serde(default)]
    pub soil_thresholds: BTreeMap<String, f64>,
    /// Depletion in mm per soil class.
    #[serde(default)]
    pub irrigation_triggers: BTreeMap<String, f64>,
}

impl TableOverrides {
    pub fn is_empty(&self) -> bool {
        self.soils.is_empty()
            && self.crops.is_empty()
            && self.soil_thresholds.is_empty()
            && self.irrigation_triggers.is_empty()
    }
}

fn key(name: &str) -> String {
    name.trim().to_lowercase()
}

impl ParameterTables {
    pub fn builtin() -> Self {
        let mut tables = Self::default();

        for soil in builtin_soils() {
            tables.insert_soil(soil);
        }
        for crop in builtin_crops() {
            tables.insert_crop(crop);
        }

        for (name, threshold) in [
            ("Sandy", 0.3),
            ("Sandy Loam", 0.4),
            ("Loam", 0.5),
            ("Clay", 0.6),
        ] {
            tables.soil_thresholds.insert(key(name), threshold);
        }
        for (name, trigger) in [
            ("Sandy", 30.0),
            ("Sandy Loam", 45.0),
            ("Loam", 20.0),
            ("Clay", 15.0),
        ] {
            tables.irrigation_triggers.insert(key(name), trigger);
        }

        tables
    }

    /// Built-in tables with configured rows merged over them. Rows are
    /// validated so a bad config fails at startup rather than mid-run.
    pub fn with_overrides(overrides: &TableOverrides) -> Result<Self> {
        let mut tables = Self::builtin();

        for soil in &overrides.soils {
            soil.validate()?;
            if soil.field_capacity <= soil.wilting_point {
                return Err(CropWaterError::InvalidInput(format!(
                    "{} soil has field capacity {} at or below wilting point {}",
                    soil.name, soil.field_capacity, soil.wilting_point
                )));
            }
            tables.insert_soil(soil.clone());
        }
        for crop in &overrides.crops {
            crop.validate()?;
            tables.insert_crop(crop.clone());
        }
        for (name, threshold) in &overrides.soil_thresholds {
            tables.soil_thresholds.insert(key(name), *threshold);
        }
        for (name, trigger) in &overrides.irrigation_triggers {
            tables.irrigation_triggers.insert(key(name), *trigger);
        }

        Ok(tables)
    }

    pub fn insert_soil(&mut self, soil: SoilProfile) {
        self.soils.insert(key(&soil.name), soil);
    }

    pub fn insert_crop(&mut self, crop: CropProfile) {
        self.crops.insert(key(&crop.name), crop);
    }

    pub fn soil(&self, name: &str) -> Result<&SoilProfile> {
        self.soils
            .get(&key(name))
            .ok_or_else(|| CropWaterError::UnknownSoilType(name.to_string()))
    }

    pub fn crop(&self, name: &str) -> Result<&CropProfile> {
        self.crops
            .get(&key(name))
            .ok_or_else(|| CropWaterError::UnknownCrop(name.to_string()))
    }

    /// Soil-specific depletion fraction. Informational; the irrigation
    /// trigger uses the uniform MAD.
    pub fn soil_threshold(&self, soil: &str) -> Option<f64> {
        self.soil_thresholds.get(&key(soil)).copied()
    }

    /// Soil-specific trigger depth in mm. Informational, like
    /// [`soil_threshold`](Self::soil_threshold).
    pub fn irrigation_trigger(&self, soil: &str) -> Option<f64> {
        self.irrigation_triggers.get(&key(soil)).copied()
    }

    pub fn soils(&self) -> impl Iterator<Item = &SoilProfile> {
        self.soils.values()
    }

    pub fn crops(&self) -> impl Iterator<Item = &CropProfile> {
        self.crops.values()
    }
}

fn builtin_soils() -> Vec<SoilProfile> {
    vec![
        SoilProfile::new("Sandy", 0.15, 0.05)
            .with_physical(1.6, 0.4)
            .with_descriptors(
                "High (25-250 mm/hr)",
                "Low",
                "Drains quickly, requires frequent irrigation",
            ),
        SoilProfile::new("Clay", 0.35, 0.18)
            .with_physical(1.3, 0.5)
            .with_descriptors(
                "Low (1-5 mm/hr)",
                "High",
                "Retains water well, less frequent irrigation needed",
            ),
        SoilProfile::new("Loam", 0.25, 0.12)
            .with_physical(1.4, 0.45)
            .with_descriptors(
                "Medium (5-25 mm/hr)",
                "Medium",
                "Balanced drainage and retention",
            ),
        SoilProfile::new("Sandy Loam", 0.28, 0.12)
            .with_physical(1.5, 0.43)
            .with_descriptors(
                "Medium-High (15-75 mm/hr)",
                "Medium-Low",
                "Moderate water retention",
            ),
    ]
}

fn builtin_crops() -> Vec<CropProfile> {
    vec![
        CropProfile::new("Tomato", [0.6, 0.8, 1.15, 0.8], 1.0)
            .with_season(0.5, 120)
            .with_stages(&[
                "Germination (0-15 days)",
                "Vegetative (16-45 days)",
                "Flowering (46-75 days)",
                "Fruiting (76-120 days)",
            ]),
        CropProfile::new("Wheat", [0.4, 0.7, 1.15, 0.4], 1.2)
            .with_season(0.6, 130)
            .with_stages(&[
                "Emergence (0-20 days)",
                "Tillering (21-60 days)",
                "Heading (61-100 days)",
                "Maturity (101-130 days)",
            ]),
        CropProfile::new("Rice", [1.15, 1.2, 1.20, 0.9], 0.5)
            .with_season(0.2, 120)
            .with_stages(&[
                "Nursery (0-30 days)",
                "Vegetative (31-65 days)",
                "Reproductive (66-95 days)",
                "Maturity (96-120 days)",
            ]),
        CropProfile::new("Corn", [0.3, 0.7, 1.20, 0.6], 1.0)
            .with_season(0.55, 125)
            .with_stages(&[
                "Emergence (0-25 days)",
                "Vegetative (26-60 days)",
                "Tasseling (61-90 days)",
                "Maturity (91-125 days)",
            ]),
        CropProfile::new("Coconut", [0.8, 0.9, 1.0, 1.0], 2.0)
            .with_season(0.4, 365)
            .with_stages(&[
                "Young Palm (0-5 years)",
                "Bearing Palm (6-15 years)",
                "Prime Bearing (16-50 years)",
                "Old Palm (50+ years)",
            ]),
        CropProfile::new("Arecanut", [0.7, 0.8, 0.95, 0.9], 1.5)
            .with_season(0.4, 365)
            .with_stages(&[
                "Young Palm (0-7 years)",
                "Bearing Palm (8-20 years)",
                "Prime Bearing (21-40 years)",
                "Old Palm (40+ years)",
            ]),
        CropProfile::new("Banana", [0.5, 0.75, 1.1, 0.9], 0.8)
            .with_season(0.35, 300)
            .with_stages(&[
                "Planting (0-60 days)",
                "Vegetative (61-150 days)",
                "Flowering (151-210 days)",
                "Fruiting (211-300 days)",
            ]),
        CropProfile::new("Sugarcane", [0.4, 0.8, 1.25, 0.75], 1.2)
            .with_season(0.65, 365)
            .with_stages(&[
                "Germination (0-45 days)",
                "Tillering (46-120 days)",
                "Grand Growth (121-270 days)",
                "Maturity (271-365 days)",
            ]),
        CropProfile::new("Cotton", [0.35, 0.7, 1.15, 0.5], 1.0)
            .with_season(0.65, 180)
            .with_stages(&[
                "Emergence (0-30 days)",
                "Squaring (31-65 days)",
                "Flowering (66-125 days)",
                "Boll Opening (126-180 days)",
            ]),
        CropProfile::new("Groundnut", [0.4, 0.7, 1.15, 0.6], 0.6)
            .with_season(0.5, 110)
            .with_stages(&[
                "Emergence (0-25 days)",
                "Vegetative (26-45 days)",
                "Flowering (46-75 days)",
                "Pod Development (76-110 days)",
            ]),
        CropProfile::new("Chili", [0.6, 0.8, 1.05, 0.8], 0.7)
            .with_season(0.45, 150)
            .with_stages(&[
                "Nursery (0-35 days)",
                "Vegetative (36-65 days)",
                "Flowering (66-95 days)",
                "Fruiting (96-150 days)",
            ]),
        CropProfile::new("Onion", [0.7, 0.85, 1.05, 0.75], 0.4)
            .with_season(0.3, 130)
            .with_stages(&[
                "Establishment (0-25 days)",
                "Vegetative (26-75 days)",
                "Bulb Development (76-110 days)",
                "Maturity (111-130 days)",
            ]),
        CropProfile::new("Turmeric", [0.5, 0.75, 1.0, 0.6], 0.5)
            .with_season(0.4, 270)
            .with_stages(&[
                "Sprouting (0-45 days)",
                "Vegetative (46-120 days)",
                "Rhizome Development (121-210 days)",
                "Maturity (211-270 days)",
            ]),
        CropProfile::new("Cardamom", [0.6, 0.75, 0.9, 0.85], 0.8)
            .with_season(0.3, 365)
            .with_stages(&[
                "Young Plant (0-3 years)",
                "Bearing Plant (4-10 years)",
                "Prime Bearing (11-20 years)",
                "Old Plant (20+ years)",
            ]),
        CropProfile::new("Coffee", [0.7, 0.8, 0.95, 0.9], 1.5)
            .with_season(0.4, 365)
            .with_stages(&[
                "Young Plant (0-3 years)",
                "Bearing Plant (4-15 years)",
                "Prime Bearing (16-30 years)",
                "Old Plant (30+ years)",
            ]),
        CropProfile::new("Mango", [0.6, 0.75, 0.9, 0.85], 2.5)
            .with_season(0.5, 365)
            .with_stages(&[
                "Young Tree (0-5 years)",
                "Bearing Tree (6-15 years)",
                "Prime Bearing (16-40 years)",
                "Old Tree (40+ years)",
            ]),
        CropProfile::new("Papaya", [0.6, 0.8, 1.0, 0.9], 1.0)
            .with_season(0.4, 365)
            .with_stages(&[
                "Seedling (0-60 days)",
                "Vegetative (61-180 days)",
                "Flowering (181-270 days)",
                "Fruiting (271-365 days)",
            ]),
        CropProfile::new("Jackfruit", [0.6, 0.75, 0.9, 0.85], 2.0)
            .with_season(0.5, 365)
            .with_stages(&[
                "Young Tree (0-7 years)",
                "Bearing Tree (8-20 years)",
                "Prime Bearing (21-50 years)",
                "Old Tree (50+ years)",
            ]),
        CropProfile::new("Drumstick", [0.5, 0.7, 0.85, 0.8], 1.5)
            .with_season(0.6, 365)
            .with_stages(&[
                "Seedling (0-90 days)",
                "Vegetative (91-180 days)",
                "Flowering (181-270 days)",
                "Pod Development (271-365 days)",
            ]),
        CropProfile::new("Ragi", [0.4, 0.7, 1.0, 0.5], 0.8)
            .with_season(0.6, 120)
            .with_stages(&[
                "Emergence (0-20 days)",
                "Tillering (21-45 days)",
                "Heading (46-75 days)",
                "Maturity (76-120 days)",
            ]),
        CropProfile::new("Jowar", [0.35, 0.7, 1.1, 0.55], 1.0)
            .with_season(0.6, 115)
            .with_stages(&[
                "Emergence (0-25 days)",
                "Vegetative (26-60 days)",
                "Heading (61-90 days)",
                "Maturity (91-115 days)",
            ]),
        CropProfile::new("Bajra", [0.35, 0.7, 1.05, 0.55], 1.2)
            .with_season(0.65, 100)
            .with_stages(&[
                "Emergence (0-20 days)",
                "Vegetative (26-50 days)",
                "Heading (51-75 days)",
                "Maturity (76-100 days)",
            ]),
    ]
}
