use crate::error::{CropWaterError, Result};
use crate::models::CropProfile;
use crate::tables::ParameterTables;
use serde::{Deserialize, Serialize};

/// Multiplier applied to ET0 when the crop is unknown and the caller
/// opted into a degraded schedule.
pub const FALLBACK_KC: f64 = 1.1;

/// What to do when a crop name is not in the tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropFallback {
    #[default]
    Strict,
    FlatMultiplier,
}

/// Scale ET0 by the crop coefficient for `growth_stage`.
pub fn crop_et(et0: &[f64], crop: &CropProfile, growth_stage: u8) -> Vec<f64> {
    let kc = crop.kc(growth_stage);
    et0.iter().map(|e| e * kc).collect()
}

/// Resolve `crop_name` and compute ETc for the horizon.
///
/// An unknown crop fails with `UnknownCrop` under [`CropFallback::Strict`]
/// and uses [`FALLBACK_KC`] under [`CropFallback::FlatMultiplier`].
pub fn crop_et_by_name(
    tables: &ParameterTables,
    crop_name: &str,
    et0: &[f64],
    growth_stage: u8,
    fallback: CropFallback,
) -> Result<Vec<f64>> {
    match tables.crop(crop_name) {
        Ok(crop) => Ok(crop_et(et0, crop, growth_stage)),
        Err(CropWaterError::UnknownCrop(_)) if fallback == CropFallback::FlatMultiplier => {
            Ok(et0.iter().map(|e| e * FALLBACK_KC).collect())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn scales_by_stage_coefficient() {
        let tables = ParameterTables::builtin();
        let tomato = tables.crop("Tomato").unwrap();

        let etc = crop_et(&[5.0, 10.0], tomato, 0);
        assert_relative_eq!(etc[0], 3.0);
        assert_relative_eq!(etc[1], 6.0);

        let etc = crop_et(&[5.0], tomato, 2);
        assert_relative_eq!(etc[0], 5.75);
    }

    #[test]
    fn out_of_range_stage_uses_mid() {
        let tables = ParameterTables::builtin();
        let wheat = tables.crop("Wheat").unwrap();
        assert_eq!(crop_et(&[4.0], wheat, 7), crop_et(&[4.0], wheat, 2));
    }

    #[test]
    fn preserves_length() {
        let tables = ParameterTables::builtin();
        let corn = tables.crop("Corn").unwrap();
        let et0 = vec![3.0; 9];
        assert_eq!(crop_et(&et0, corn, 1).len(), 9);
        assert!(crop_et(&[], corn, 1).is_empty());
    }

    #[test]
    fn unknown_crop_strict_fails() {
        let tables = ParameterTables::builtin();
        let result = crop_et_by_name(&tables, "Quinoa", &[5.0], 1, CropFallback::Strict);
        assert!(matches!(result, Err(CropWaterError::UnknownCrop(_))));
    }

    #[test]
    fn unknown_crop_flat_multiplier() {
        let tables = ParameterTables::builtin();
        let etc =
            crop_et_by_name(&tables, "Quinoa", &[5.0, 8.0], 1, CropFallback::FlatMultiplier)
                .unwrap();
        assert_relative_eq!(etc[0], 5.5);
        assert_relative_eq!(etc[1], 8.8);
    }

    #[test]
    fn known_crop_ignores_fallback_policy() {
        let tables = ParameterTables::builtin();
        let etc = crop_et_by_name(&tables, "rice", &[10.0], 3, CropFallback::FlatMultiplier)
            .unwrap();
        assert_relative_eq!(etc[0], 9.0);
    }
}
