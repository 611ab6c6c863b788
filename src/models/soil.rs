use crate::error::{CropWaterError, Result};
use serde::{Deserialize, Serialize};

/// Hydraulic properties of a soil class.
///
/// `field_capacity` and `wilting_point` are volumetric water fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilProfile {
    pub name: String,
    pub field_capacity: f64,
    pub wilting_point: f64,
    #[serde(default)]
    pub bulk_density: f64,
    #[serde(default)]
    pub porosity: f64,
    #[serde(default)]
    pub infiltration_rate: String,
    #[serde(default)]
    pub water_holding_capacity: String,
    #[serde(default)]
    pub description: String,
}

impl SoilProfile {
    pub fn new(name: impl Into<String>, field_capacity: f64, wilting_point: f64) -> Self {
        Self {
            name: name.into(),
            field_capacity,
            wilting_point,
            bulk_density: 0.0,
            porosity: 0.0,
            infiltration_rate: String::new(),
            water_holding_capacity: String::new(),
            description: String::new(),
        }
    }

    pub fn with_physical(mut self, bulk_density: f64, porosity: f64) -> Self {
        self.bulk_density = bulk_density;
        self.porosity = porosity;
        self
    }

    pub fn with_descriptors(
        mut self,
        infiltration_rate: impl Into<String>,
        water_holding_capacity: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.infiltration_rate = infiltration_rate.into();
        self.water_holding_capacity = water_holding_capacity.into();
        self.description = description.into();
        self
    }

    /// Plant-available water per metre of root zone (m³/m³).
    pub fn available_fraction(&self) -> f64 {
        self.field_capacity - self.wilting_point
    }

    /// Range checks on the water fractions.
    ///
    /// Ordering of field capacity over wilting point is checked when the
    /// available water capacity is computed, so a reversed pair surfaces as
    /// `InvalidWaterCapacity` with the full soil/crop combination.
    pub fn validate(&self) -> Result<()> {
        for (label, value) in [
            ("field capacity", self.field_capacity),
            ("wilting point", self.wilting_point),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(CropWaterError::InvalidInput(format!(
                    "{} soil has {} {} outside 0-1",
                    self.name, label, value
                )));
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for SoilProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn available_fraction_is_difference() {
        let loam = SoilProfile::new("Loam", 0.25, 0.12);
        assert!((loam.available_fraction() - 0.13).abs() < 1e-12);
    }

    #[test]
    fn validate_accepts_reversed_pair() {
        // Reversal is reported by the AWC check, not here
        let odd = SoilProfile::new("Odd", 0.10, 0.20);
        assert!(odd.validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range() {
        let bad = SoilProfile::new("Bad", 1.4, 0.1);
        assert!(matches!(bad.validate(), Err(CropWaterError::InvalidInput(_))));

        let nan = SoilProfile::new("NaN", f64::NAN, 0.1);
        assert!(matches!(nan.validate(), Err(CropWaterError::InvalidInput(_))));
    }
}
