//! Closed-form solar-time corrections, usable without the ephemeris
//! engine: equation of time, standard-meridian offset and an
//! approximate solar longitude for degraded operation.
//!
//! Both corrections are additive over civil clock time; the corrected
//! result is the true solar time that decides the hour-pillar window.

use serde::{Deserialize, Serialize};

use crate::ephemeris::normalize_degrees;

const J2000: f64 = 2_451_545.0;
const DEG_TO_RAD: f64 = std::f64::consts::PI / 180.0;
/// One radian of hour angle in minutes of time (1440 / 2π).
const RADIANS_TO_MINUTES: f64 = 1440.0 / std::f64::consts::TAU;

/// Which branch produced a solar-time correction. `Exact` means the
/// ephemeris engine's apparent right ascension; `Approximate` means the
/// closed-form series below.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrectionSource {
    Exact,
    Approximate,
}

/// Mean solar longitude in degrees for a day count since J2000.
fn mean_longitude(days: f64) -> f64 {
    normalize_degrees(280.46646 + 0.985_647_36 * days)
}

/// Mean solar anomaly in degrees for a day count since J2000.
fn mean_anomaly(days: f64) -> f64 {
    normalize_degrees(357.52911 + 0.985_600_28 * days)
}

/// Equation of time in minutes, positive when the sundial runs ahead of
/// the clock. Fixed-coefficient trigonometric series over the mean
/// solar longitude and anomaly (Smart's expansion with the Spencer 1971
/// empirical constants); accurate to roughly ±0.5 minute, which keeps a
/// usable hour-pillar correction available when the engine is not.
pub fn eot_minutes(jd_ut: f64) -> f64 {
    // tan²(ε/2) for the fixed mean obliquity 23.4393°.
    const Y: f64 = 0.043_026_4;
    // Fixed orbital eccentricity.
    const E: f64 = 0.016_709;

    let days = jd_ut - J2000;
    let l = mean_longitude(days) * DEG_TO_RAD;
    let m = mean_anomaly(days) * DEG_TO_RAD;

    let eot_radians = Y * (2.0 * l).sin() - 2.0 * E * m.sin()
        + 4.0 * E * Y * m.sin() * (2.0 * l).cos()
        - Y * Y / 2.0 * (4.0 * l).sin()
        - 1.25 * E * E * (2.0 * m).sin();
    eot_radians * RADIANS_TO_MINUTES
}

/// Correction in minutes owed to the gap between the location's true
/// longitude and its timezone's standard meridian: four minutes of time
/// per degree. Positive east of the meridian.
pub fn longitude_offset_minutes(longitude: f64, tz_offset_minutes: i32) -> f64 {
    // The standard meridian sits at tz_offset / 60 * 15 degrees.
    4.0 * longitude - tz_offset_minutes as f64
}

/// True solar time in minutes from local civil midnight. `civil_minutes`
/// is clock time at the birth place; the equation-of-time value comes
/// from whichever correction branch is active.
pub fn true_solar_minutes(
    civil_minutes: f64,
    eot_minutes: f64,
    longitude: Option<f64>,
    tz_offset_minutes: i32,
) -> f64 {
    let meridian = match longitude {
        Some(lon) => longitude_offset_minutes(lon, tz_offset_minutes),
        // Without a birthplace longitude the clock meridian is assumed.
        None => 0.0,
    };
    civil_minutes + eot_minutes + meridian
}

/// Approximate apparent solar longitude in degrees: mean longitude plus
/// the equation of center with fixed coefficients. Good to a few
/// hundredths of a degree, i.e. under an hour of solar-term timing.
pub fn approximate_solar_longitude(jd_ut: f64) -> f64 {
    let days = jd_ut - J2000;
    let l = mean_longitude(days);
    let m = mean_anomaly(days) * DEG_TO_RAD;
    let center = 1.9148 * m.sin() + 0.0200 * (2.0 * m).sin() + 0.0003 * (3.0 * m).sin();
    normalize_degrees(l + center)
}
