use crate::error::{CropWaterError, Result};
use serde::{Deserialize, Serialize};

/// Number of growth stages with their own crop coefficient.
pub const GROWTH_STAGE_COUNT: u8 = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropProfile {
    pub name: String,
    pub kc_initial: f64,
    pub kc_development: f64,
    pub kc_mid: f64,
    pub kc_late: f64,
    /// Effective root zone depth in metres.
    pub rooting_depth: f64,
    pub critical_depletion: f64,
    pub season_length: u32,
    #[serde(default)]
    pub growth_stages: Vec<String>,
}

impl CropProfile {
    pub fn new(name: impl Into<String>, kc: [f64; 4], rooting_depth: f64) -> Self {
        Self {
            name: name.into(),
            kc_initial: kc[0],
            kc_development: kc[1],
            kc_mid: kc[2],
            kc_late: kc[3],
            rooting_depth,
            critical_depletion: 0.5,
            season_length: 0,
            growth_stages: Vec::new(),
        }
    }

    pub fn with_season(mut self, critical_depletion: f64, season_length: u32) -> Self {
        self.critical_depletion = critical_depletion;
        self.season_length = season_length;
        self
    }

    pub fn with_stages(mut self, stages: &[&str]) -> Self {
        self.growth_stages = stages.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Crop coefficient for a growth stage ordinal.
    ///
    /// 0 initial, 1 development, 2 mid, 3 late. Any other ordinal uses the
    /// mid-season value.
    pub fn kc(&self, growth_stage: u8) -> f64 {
        match growth_stage {
            0 => self.kc_initial,
            1 => self.kc_development,
            2 => self.kc_mid,
            3 => self.kc_late,
            _ => self.kc_mid,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let coefficients = [
            ("kc_initial", self.kc_initial),
            ("kc_development", self.kc_development),
            ("kc_mid", self.kc_mid),
            ("kc_late", self.kc_late),
        ];
        for (label, value) in coefficients {
            if !value.is_finite() || value < 0.0 {
                return Err(CropWaterError::InvalidInput(format!(
                    "{} has {} = {}; crop coefficients must be non-negative",
                    self.name, label, value
                )));
            }
        }

        if !self.rooting_depth.is_finite() || self.rooting_depth <= 0.0 {
            return Err(CropWaterError::InvalidInput(format!(
                "{} has rooting depth {}; it must be a positive number of metres",
                self.name, self.rooting_depth
            )));
        }

        if !(0.0..=1.0).contains(&self.critical_depletion) {
            return Err(CropWaterError::InvalidInput(format!(
                "{} has critical depletion {} outside 0-1",
                self.name, self.critical_depletion
            )));
        }

        Ok(())
    }
}

impl std::fmt::Display for CropProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
