use crate::models::Observation;

/// Lower bound for a plausible daily ET0 (mm/day)
pub const ET0_MIN: f64 = 2.0;
/// Upper bound for a plausible daily ET0 (mm/day)
pub const ET0_MAX: f64 = 15.0;

/// Psychrometric constant at sea level (kPa/°C)
const GAMMA: f64 = 0.665;

/// Saturation vapour pressure at `temp_c` (kPa)
pub fn saturation_vapor_pressure(temp_c: f64) -> f64 {
    0.6108 * (17.27 * temp_c / (temp_c + 237.3)).exp()
}

/// Reference evapotranspiration for one day (mm/day)
///
/// FAO-56 Penman-Monteith in its simplified sea-level form: fixed
/// psychrometric constant, no elevation or net longwave correction. The
/// result is clamped to [`ET0_MIN`, `ET0_MAX`]; anything outside that band
/// (including a NaN from degenerate inputs, which lands on the upper
/// bound) is treated as an artefact rather than an error.
pub fn reference_et0(day: &Observation) -> f64 {
    let temp_mean = day.temp_mean();
    let es = saturation_vapor_pressure(temp_mean);
    let ea = es * day.humidity / 100.0;
    let delta = 4098.0 * es / (temp_mean + 237.3).powi(2);

    let numerator = 0.408 * delta * day.solar_radiation
        + GAMMA * 900.0 / (temp_mean + 273.0) * day.wind_speed * (es - ea);
    let denominator = delta + GAMMA * (1.0 + 0.34 * day.wind_speed);

    bound(numerator / denominator)
}

fn bound(et0: f64) -> f64 {
    if et0.is_nan() {
        return ET0_MAX;
    }
    et0.clamp(ET0_MIN, ET0_MAX)
}

/// ET0 for each day of a horizon, in order.
pub fn reference_et0_series(days: &[Observation]) -> Vec<f64> {
    days.iter().map(reference_et0).collect()
}
