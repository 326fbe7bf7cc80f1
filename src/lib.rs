//! Saju (four pillars) calculation core.
//!
//! Converts a birth date/time/location into sexagenary pillars, a day
//! master, ten-god relations, five-element scores and luck pillars. The
//! crate is the calculation layer only; callers persist or render the
//! resulting [`SajuResultPayload`] themselves.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod elements;
pub mod ephemeris;
pub mod lunar;
pub mod pillars;
pub mod report;
pub mod solar_time;
pub mod tables;

pub use elements::{FiveElementScoreboard, TenGodReading, SCORE_TABLE_VERSION};
pub use ephemeris::{Engine, SolarPosition};
pub use lunar::LunarDate;
pub use pillars::{FourPillars, LuckPillar, PillarComputation};
pub use report::{ResultMeta, SajuResultPayload};
pub use solar_time::CorrectionSource;
pub use tables::{
    EarthlyBranch, FiveElement, HeavenlyStem, Polarity, SexagenaryPair, SolarTerm, TenGod,
};

// ---------------------------
// ## Errors
// ---------------------------

/// Failure taxonomy of the calculation core.
///
/// `InvalidInput` and `OutOfRange` are deterministic for a given input;
/// retrying them without changing the input is pointless.
/// `EngineUnavailable` is transient and may be retried by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum CalcError {
    /// Malformed or missing required fields in the request.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Well-formed input outside the supported date span.
    #[error("out of supported range: {0}")]
    OutOfRange(String),
    /// The ephemeris engine failed to initialize or timed out.
    #[error("ephemeris engine unavailable: {0}")]
    EngineUnavailable(String),
    /// An internal invariant was violated. Indicates a defect, never an
    /// expected outcome.
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

// ---------------------------
// ## Birth input
// ---------------------------

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// How reliable the supplied birth time is.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeAccuracy {
    Exact,
    Approximate,
    Unknown,
}

/// A birth moment as entered by the user, in civil local time.
///
/// The date is mandatory. A missing (or `Unknown`-tagged) time degrades
/// the result to three pillars instead of failing the computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BirthInput {
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub time_accuracy: TimeAccuracy,
    pub gender: Gender,
    /// Geographic longitude in degrees, east positive.
    pub longitude: Option<f64>,
    /// Geographic latitude in degrees, north positive.
    pub latitude: Option<f64>,
    /// Offset of the civil clock from UTC, in minutes.
    pub tz_offset_minutes: i32,
}

impl BirthInput {
    /// Birth time usable for the hour pillar, or `None` when absent or
    /// tagged `Unknown`.
    pub fn effective_time(&self) -> Option<NaiveTime> {
        match self.time_accuracy {
            TimeAccuracy::Unknown => None,
            _ => self.time,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), CalcError> {
        if let Some(lat) = self.latitude {
            if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
                return Err(CalcError::InvalidInput(format!(
                    "latitude {} outside -90..=90",
                    lat
                )));
            }
        }
        if let Some(lon) = self.longitude {
            if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
                return Err(CalcError::InvalidInput(format!(
                    "longitude {} outside -180..=180",
                    lon
                )));
            }
        }
        if self.tz_offset_minutes.abs() > 18 * 60 {
            return Err(CalcError::InvalidInput(format!(
                "timezone offset {} minutes outside -1080..=1080",
                self.tz_offset_minutes
            )));
        }
        Ok(())
    }
}

// ---------------------------
// ## Entry points
// ---------------------------

/// Computes the full saju payload with an injected ephemeris engine.
///
/// The engine is constructed once at process startup (see
/// [`ephemeris::global`]) and passed by reference to every call. Engine
/// failures during the computation degrade to the closed-form solar
/// approximation instead of aborting; the chosen branch is recorded in
/// the payload metadata.
pub fn calculate(input: &BirthInput, engine: &Engine) -> Result<SajuResultPayload, CalcError> {
    let computation = pillars::compute_pillars(input, Some(engine))?;
    report::assemble(input, &computation)
}

/// Computes the payload without any ephemeris engine, forcing the
/// approximate correction branch. Pillar boundaries derive from the
/// closed-form solar longitude instead of the engine's apparent one.
pub fn calculate_offline(input: &BirthInput) -> Result<SajuResultPayload, CalcError> {
    let computation = pillars::compute_pillars(input, None)?;
    report::assemble(input, &computation)
}
