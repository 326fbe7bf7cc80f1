//! Ephemeris adapter: apparent solar longitude, Julian-day conversion
//! and the equation of time on a ΔT-corrected dynamical time axis.
//!
//! The engine is an analytic solar theory (mean elements, equation of
//! center, nutation in longitude, annual aberration). It is initialized
//! at most once per process; concurrent first callers attach to the same
//! pending initialization instead of racing to construct duplicates.

use crate::CalcError;
use serde::{Deserialize, Serialize};
use std::sync::{Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// First supported Gregorian year (bounded by the ΔT model).
pub const MIN_YEAR: i32 = 1800;
/// Last supported Gregorian year.
pub const MAX_YEAR: i32 = 2199;

/// Julian day at 1800-01-01T00:00 UT.
const MIN_JD: f64 = 2_378_496.5;
/// Julian day at 2200-01-01T00:00 UT (exclusive upper bound).
const MAX_JD: f64 = 2_524_593.5;

const J2000: f64 = 2_451_545.0;
const DEG_TO_RAD: f64 = std::f64::consts::PI / 180.0;
const ARCSEC_TO_DEG: f64 = 1.0 / 3600.0;

/// Nutation-in-longitude series: sine coefficient in arcseconds and the
/// integer multiples of (Ω, L☉, L☾) forming the argument.
const NUTATION_TERMS: [(f64, i32, i32, i32); 4] = [
    (-17.20, 1, 0, 0),
    (-1.32, 0, 2, 0),
    (-0.23, 0, 0, 2),
    (0.21, 2, 0, 0),
];

/// Nutation-in-obliquity series, cosine coefficients over the same
/// arguments.
const OBLIQUITY_NUTATION_TERMS: [(f64, i32, i32, i32); 4] = [
    (9.20, 1, 0, 0),
    (0.57, 0, 2, 0),
    (0.10, 0, 0, 2),
    (-0.09, 2, 0, 0),
];

/// Geocentric solar position snapshot for one instant. Immutable once
/// computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolarPosition {
    /// Apparent ecliptic longitude in degrees, [0, 360).
    pub longitude: f64,
    /// Ecliptic latitude in degrees. The Sun never strays more than
    /// ~1.2 arcseconds from the ecliptic, so this is reported as zero.
    pub latitude: f64,
    /// Earth-Sun distance in astronomical units.
    pub distance: f64,
    /// Longitude rate in degrees per day.
    pub speed_longitude: Option<f64>,
}

/// Analytic solar ephemeris engine.
///
/// Construct one per process (see [`global`]) and pass it by reference
/// to every calculation. All methods are pure given the engine.
#[derive(Debug)]
pub struct Engine {
    nutation: &'static [(f64, i32, i32, i32)],
    obliquity_nutation: &'static [(f64, i32, i32, i32)],
}

impl Engine {
    /// Builds and self-checks the engine. Fails with `EngineUnavailable`
    /// if the coefficient tables are unusable.
    pub fn new() -> Result<Engine, CalcError> {
        let engine = Engine {
            nutation: &NUTATION_TERMS,
            obliquity_nutation: &OBLIQUITY_NUTATION_TERMS,
        };
        for &(coeff, ..) in engine.nutation.iter().chain(engine.obliquity_nutation) {
            if !coeff.is_finite() {
                return Err(CalcError::EngineUnavailable(
                    "nutation table contains non-finite coefficient".to_string(),
                ));
            }
        }
        // Anchor check at J2000.0: apparent solar longitude ~280.37°.
        let check = engine.apparent_longitude(J2000 + delta_t_seconds(J2000) / 86_400.0);
        if !(279.5..=281.5).contains(&check) {
            return Err(CalcError::EngineUnavailable(format!(
                "self-check failed: J2000 solar longitude {:.4}",
                check
            )));
        }
        debug!(longitude_j2000 = check, "solar engine initialized");
        Ok(engine)
    }

    /// Identifier recorded in result payloads.
    pub fn version(&self) -> &'static str {
        "analytic-sun/1"
    }

    /// Julian day (UT) for a calendar instant. `hour_ut` is a fractional
    /// hour in [0, 24).
    pub fn julian_day(&self, year: i32, month: u32, day: u32, hour_ut: f64) -> Result<f64, CalcError> {
        if chrono::NaiveDate::from_ymd_opt(year, month, day).is_none() {
            return Err(CalcError::InvalidInput(format!(
                "no such calendar date: {:04}-{:02}-{:02}",
                year, month, day
            )));
        }
        if !(0.0..24.0).contains(&hour_ut) {
            return Err(CalcError::InvalidInput(format!(
                "hour {} outside 0..24",
                hour_ut
            )));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(CalcError::OutOfRange(format!(
                "year {} outside supported span {}..={}",
                year, MIN_YEAR, MAX_YEAR
            )));
        }
        Ok(calendar_julian_day(year, month, day, hour_ut))
    }

    /// Apparent geocentric solar position at the given Julian day (UT).
    pub fn solar_longitude(&self, jd_ut: f64) -> Result<SolarPosition, CalcError> {
        self.check_range(jd_ut)?;
        let jde = jd_ut + delta_t_seconds(jd_ut) / 86_400.0;
        let longitude = self.apparent_longitude(jde);
        let distance = solar_distance(jde);
        // Central difference over one day for the longitude rate.
        let before = self.apparent_longitude(jde - 0.5);
        let after = self.apparent_longitude(jde + 0.5);
        let speed = wrap_degrees_signed(after - before);
        Ok(SolarPosition {
            longitude,
            latitude: 0.0,
            distance,
            speed_longitude: Some(speed),
        })
    }

    /// Equation of time in minutes (apparent minus mean solar time),
    /// from the apparent right ascension. Positive when the sundial is
    /// ahead of the clock.
    pub fn equation_of_time_minutes(&self, jd_ut: f64) -> Result<f64, CalcError> {
        self.check_range(jd_ut)?;
        let jde = jd_ut + delta_t_seconds(jd_ut) / 86_400.0;
        let t = julian_centuries(jde);
        let l0 = normalize_degrees(280.46646 + 36_000.76983 * t + 0.000_303_2 * t * t);
        let lambda = self.apparent_longitude(jde);
        let eps = self.true_obliquity(jde);
        let eps_rad = eps * DEG_TO_RAD;
        let lambda_rad = lambda * DEG_TO_RAD;
        let alpha = normalize_degrees(
            (lambda_rad.sin() * eps_rad.cos())
                .atan2(lambda_rad.cos())
                .to_degrees(),
        );
        let delta_psi = self.nutation_in_longitude(t);
        let e_deg = wrap_degrees_signed(l0 - 0.005_718_3 - alpha + delta_psi * eps_rad.cos());
        Ok(4.0 * e_deg)
    }

    fn check_range(&self, jd_ut: f64) -> Result<(), CalcError> {
        if !jd_ut.is_finite() {
            return Err(CalcError::InvalidInput(format!(
                "julian day {} is not finite",
                jd_ut
            )));
        }
        if !(MIN_JD..MAX_JD).contains(&jd_ut) {
            return Err(CalcError::OutOfRange(format!(
                "julian day {:.2} outside supported span {:.1}..{:.1}",
                jd_ut, MIN_JD, MAX_JD
            )));
        }
        Ok(())
    }

    /// Apparent solar longitude in degrees at a dynamical-time Julian
    /// day: geometric longitude + nutation + annual aberration.
    fn apparent_longitude(&self, jde: f64) -> f64 {
        let t = julian_centuries(jde);
        let l0 = 280.46646 + 36_000.76983 * t + 0.000_303_2 * t * t;
        let m = mean_anomaly(t);
        let c = equation_of_center(t, m);
        let true_longitude = l0 + c;
        let delta_psi = self.nutation_in_longitude(t);
        let aberration = -20.4898 * ARCSEC_TO_DEG / solar_distance(jde);
        normalize_degrees(true_longitude + delta_psi + aberration)
    }

    /// Nutation in longitude, in degrees.
    fn nutation_in_longitude(&self, t: f64) -> f64 {
        let (omega, l_sun, l_moon) = nutation_arguments(t);
        let arcsec: f64 = self
            .nutation
            .iter()
            .map(|&(coeff, k_om, k_ls, k_lm)| {
                let arg = (k_om as f64 * omega + k_ls as f64 * l_sun + k_lm as f64 * l_moon)
                    * DEG_TO_RAD;
                coeff * arg.sin()
            })
            .sum();
        arcsec * ARCSEC_TO_DEG
    }

    /// True obliquity of the ecliptic in degrees.
    fn true_obliquity(&self, jde: f64) -> f64 {
        let t = julian_centuries(jde);
        let eps0 = 23.0 + 26.0 / 60.0 + 21.448 / 3600.0
            - (46.8150 * t + 0.000_59 * t * t - 0.001_813 * t * t * t) * ARCSEC_TO_DEG;
        let (omega, l_sun, l_moon) = nutation_arguments(t);
        let delta_eps: f64 = self
            .obliquity_nutation
            .iter()
            .map(|&(coeff, k_om, k_ls, k_lm)| {
                let arg = (k_om as f64 * omega + k_ls as f64 * l_sun + k_lm as f64 * l_moon)
                    * DEG_TO_RAD;
                coeff * arg.cos()
            })
            .sum();
        eps0 + delta_eps * ARCSEC_TO_DEG
    }
}

/// Pure-calendar Julian day formula (Gregorian calendar), usable without
/// an engine. Integer part follows the ERFA convention.
pub fn calendar_julian_day(year: i32, month: u32, day: u32, hour_ut: f64) -> f64 {
    let month = month as i32;
    let day = day as i32;
    let my = (month - 14) / 12;
    let iypmy = year + my;
    let mjd = (1461 * (iypmy + 4800)) / 4 + (367 * (month - 2 - 12 * my)) / 12
        - (3 * ((iypmy + 4900) / 100)) / 4
        + day
        - 2_432_076;
    2_400_000.5 + mjd as f64 + hour_ut / 24.0
}

/// ΔT = TT − UT in seconds, Espenak–Meeus piecewise polynomials.
/// Adequate for solar-term timing across the supported span.
pub fn delta_t_seconds(jd_ut: f64) -> f64 {
    let y = 2000.0 + (jd_ut - 2_451_544.5) / 365.2425;
    if y < 1860.0 {
        let t = y - 1800.0;
        13.72 - 0.332447 * t + 0.0068612 * t * t + 0.0041116 * t.powi(3)
            - 0.00037436 * t.powi(4)
            + 0.0000121272 * t.powi(5)
            - 0.0000001699 * t.powi(6)
            + 0.000000000875 * t.powi(7)
    } else if y < 1900.0 {
        let t = y - 1860.0;
        7.62 + 0.5737 * t - 0.251754 * t * t + 0.01680668 * t.powi(3)
            - 0.0004473624 * t.powi(4)
            + t.powi(5) / 233_174.0
    } else if y < 1920.0 {
        let t = y - 1900.0;
        -2.79 + 1.494119 * t - 0.0598939 * t * t + 0.0061966 * t.powi(3) - 0.000197 * t.powi(4)
    } else if y < 1941.0 {
        let t = y - 1920.0;
        21.20 + 0.84493 * t - 0.076100 * t * t + 0.0020936 * t.powi(3)
    } else if y < 1961.0 {
        let t = y - 1950.0;
        29.07 + 0.407 * t - t * t / 233.0 + t.powi(3) / 2547.0
    } else if y < 1986.0 {
        let t = y - 1975.0;
        45.45 + 1.067 * t - t * t / 260.0 - t.powi(3) / 718.0
    } else if y < 2005.0 {
        let t = y - 2000.0;
        63.86 + 0.3345 * t - 0.060374 * t * t + 0.0017275 * t.powi(3)
            + 0.000651814 * t.powi(4)
            + 0.00002373599 * t.powi(5)
    } else if y < 2050.0 {
        let t = y - 2000.0;
        62.92 + 0.32217 * t + 0.005589 * t * t
    } else {
        let u = (y - 1820.0) / 100.0;
        -20.0 + 32.0 * u * u - 0.5628 * (2150.0 - y).max(0.0)
    }
}

fn julian_centuries(jde: f64) -> f64 {
    (jde - J2000) / 36_525.0
}

fn mean_anomaly(t: f64) -> f64 {
    357.52911 + 35_999.05029 * t - 0.000_153_7 * t * t
}

fn equation_of_center(t: f64, m_deg: f64) -> f64 {
    let m = m_deg * DEG_TO_RAD;
    (1.914602 - 0.004817 * t - 0.000014 * t * t) * m.sin()
        + (0.019993 - 0.000101 * t) * (2.0 * m).sin()
        + 0.000289 * (3.0 * m).sin()
}

fn solar_distance(jde: f64) -> f64 {
    let t = julian_centuries(jde);
    let m = mean_anomaly(t);
    let e = 0.016708634 - 0.000042037 * t - 0.0000001267 * t * t;
    let nu = (m + equation_of_center(t, m)) * DEG_TO_RAD;
    1.000001018 * (1.0 - e * e) / (1.0 + e * nu.cos())
}

/// Fundamental arguments of the nutation series, in degrees:
/// longitude of the ascending lunar node, mean solar longitude, mean
/// lunar longitude.
fn nutation_arguments(t: f64) -> (f64, f64, f64) {
    let omega = 125.04452 - 1934.136261 * t;
    let l_sun = 280.4665 + 36_000.7698 * t;
    let l_moon = 218.3165 + 481_267.8813 * t;
    (omega, l_sun, l_moon)
}

pub(crate) fn normalize_degrees(value: f64) -> f64 {
    value.rem_euclid(360.0)
}

/// Wraps an angle difference into [-180, 180).
pub(crate) fn wrap_degrees_signed(value: f64) -> f64 {
    (value + 180.0).rem_euclid(360.0) - 180.0
}

// ---------------------------
// ## Process-wide engine
// ---------------------------

#[derive(Debug)]
enum InitState {
    Idle,
    Pending,
    Ready(&'static Engine),
    Failed(CalcError),
}

#[derive(Debug, Copy, Clone)]
enum InitAction {
    Start,
    Wait,
}

static INIT_STATE: Mutex<InitState> = Mutex::new(InitState::Idle);
static INIT_CVAR: Condvar = Condvar::new();

/// Default bound on how long a caller waits for engine initialization.
pub const DEFAULT_INIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Process-lifetime engine, initialized at most once. Concurrent first
/// callers share a single in-flight initialization.
pub fn global() -> Result<&'static Engine, CalcError> {
    global_timeout(DEFAULT_INIT_TIMEOUT)
}

/// Like [`global`], waiting at most `timeout` for an in-flight
/// initialization. Expiry surfaces as `EngineUnavailable` without
/// cancelling the initialization; later callers can still observe it
/// completing.
pub fn global_timeout(timeout: Duration) -> Result<&'static Engine, CalcError> {
    let deadline = Instant::now() + timeout;
    let mut state = lock_state()?;
    loop {
        let action = match &*state {
            InitState::Ready(engine) => return Ok(*engine),
            InitState::Failed(err) => return Err(err.clone()),
            InitState::Idle => InitAction::Start,
            InitState::Pending => InitAction::Wait,
        };
        match action {
            InitAction::Start => {
                *state = InitState::Pending;
                drop(state);
                thread::spawn(|| {
                    let outcome = Engine::new();
                    let mut st = match INIT_STATE.lock() {
                        Ok(guard) => guard,
                        Err(poisoned) => poisoned.into_inner(),
                    };
                    *st = match outcome {
                        Ok(engine) => InitState::Ready(Box::leak(Box::new(engine))),
                        Err(err) => {
                            warn!(error = %err, "solar engine initialization failed");
                            InitState::Failed(err)
                        }
                    };
                    INIT_CVAR.notify_all();
                });
                state = lock_state()?;
            }
            InitAction::Wait => {
                let now = Instant::now();
                if now >= deadline {
                    return Err(CalcError::EngineUnavailable(
                        "engine initialization timed out".to_string(),
                    ));
                }
                let (guard, _) = INIT_CVAR
                    .wait_timeout(state, deadline - now)
                    .map_err(|_| poisoned_error())?;
                state = guard;
            }
        }
    }
}

fn lock_state() -> Result<std::sync::MutexGuard<'static, InitState>, CalcError> {
    INIT_STATE.lock().map_err(|_| poisoned_error())
}

fn poisoned_error() -> CalcError {
    CalcError::EngineUnavailable("engine initialization state poisoned".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn julian_day_at_j2000_noon() {
        let engine = Engine::new().unwrap();
        let jd = engine.julian_day(2000, 1, 1, 12.0).unwrap();
        assert_abs_diff_eq!(jd, 2_451_545.0, epsilon = 1e-9);
    }

    #[test]
    fn julian_day_for_sample_birth_date() {
        let engine = Engine::new().unwrap();
        let jd = engine.julian_day(1990, 5, 15, 0.0).unwrap();
        assert_abs_diff_eq!(jd, 2_448_026.5, epsilon = 1e-9);
    }

    #[test]
    fn julian_day_rejects_impossible_date() {
        let engine = Engine::new().unwrap();
        assert!(matches!(
            engine.julian_day(2001, 2, 29, 0.0),
            Err(CalcError::InvalidInput(_))
        ));
    }

    #[test]
    fn julian_day_rejects_unsupported_year() {
        let engine = Engine::new().unwrap();
        assert!(matches!(
            engine.julian_day(1600, 6, 1, 0.0),
            Err(CalcError::OutOfRange(_))
        ));
        assert!(matches!(
            engine.julian_day(2300, 6, 1, 0.0),
            Err(CalcError::OutOfRange(_))
        ));
    }

    #[test]
    fn solar_longitude_at_j2000() {
        let engine = Engine::new().unwrap();
        let pos = engine.solar_longitude(J2000).unwrap();
        // Published apparent longitude at J2000.0 is ~280.37°.
        assert_abs_diff_eq!(pos.longitude, 280.37, epsilon = 0.05);
        assert_abs_diff_eq!(pos.distance, 0.9833, epsilon = 0.001);
        let speed = pos.speed_longitude.unwrap();
        // Near perihelion the Sun moves slightly over 1°/day.
        assert!(speed > 0.95 && speed < 1.1, "speed {}", speed);
    }

    #[test]
    fn solar_longitude_near_solstices_and_equinoxes() {
        let engine = Engine::new().unwrap();
        // 2000-03-20 07:35 UT, March equinox.
        let jd = engine.julian_day(2000, 3, 20, 7.5).unwrap();
        let pos = engine.solar_longitude(jd).unwrap();
        let dist = wrap_degrees_signed(pos.longitude);
        assert!(dist.abs() < 0.1, "equinox longitude {}", pos.longitude);
        // 2000-06-21 01:48 UT, June solstice.
        let jd = engine.julian_day(2000, 6, 21, 1.8).unwrap();
        let pos = engine.solar_longitude(jd).unwrap();
        assert_abs_diff_eq!(pos.longitude, 90.0, epsilon = 0.1);
    }

    #[test]
    fn solar_longitude_rejects_out_of_range_day() {
        let engine = Engine::new().unwrap();
        assert!(matches!(
            engine.solar_longitude(2_000_000.0),
            Err(CalcError::OutOfRange(_))
        ));
    }

    #[test]
    fn equation_of_time_at_j2000() {
        let engine = Engine::new().unwrap();
        let eot = engine.equation_of_time_minutes(J2000).unwrap();
        // Published value for 2000 Jan 1.5 is about -3.2 minutes.
        assert_abs_diff_eq!(eot, -3.0, epsilon = 0.5);
    }

    #[test]
    fn equation_of_time_seasonal_extremes() {
        let engine = Engine::new().unwrap();
        // Early November maximum, around +16.4 minutes.
        let jd = engine.julian_day(2000, 11, 3, 12.0).unwrap();
        let eot = engine.equation_of_time_minutes(jd).unwrap();
        assert!(eot > 15.5 && eot < 17.5, "november eot {}", eot);
        // Mid-February minimum, around -14.2 minutes.
        let jd = engine.julian_day(2000, 2, 11, 12.0).unwrap();
        let eot = engine.equation_of_time_minutes(jd).unwrap();
        assert!(eot < -13.0 && eot > -15.5, "february eot {}", eot);
    }

    #[test]
    fn delta_t_matches_published_anchors() {
        // ~63.8 s at 2000, ~29 s mid-century.
        assert_abs_diff_eq!(delta_t_seconds(2_451_544.5), 63.86, epsilon = 0.5);
        assert_abs_diff_eq!(delta_t_seconds(2_433_282.5), 29.1, epsilon = 1.0);
    }

    #[test]
    fn global_engine_initializes_exactly_once_under_contention() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                thread::spawn(|| {
                    let engine = global().unwrap();
                    engine as *const Engine as usize
                })
            })
            .collect();
        let addresses: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(addresses.windows(2).all(|w| w[0] == w[1]));
    }
}
