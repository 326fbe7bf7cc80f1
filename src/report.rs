//! Result assembly: pure structural mapping of a pillar computation
//! into the immutable payload handed to persistence or display. No
//! computation happens here beyond schema validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::elements::{
    self, FiveElementScoreboard, TenGodReading, BRANCH_WEIGHT, FULL_RAW_TOTAL, NORMALIZED_BASIS,
    SCORE_TABLE_VERSION, STEM_WEIGHT,
};
use crate::lunar::{self, LunarDate};
use crate::pillars::{FourPillars, LuckPillar, PillarComputation};
use crate::solar_time::CorrectionSource;
use crate::tables::{FiveElement, HeavenlyStem, Polarity, SolarTerm};
use crate::{BirthInput, CalcError};

/// Provenance metadata carried with every result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMeta {
    /// Identifier of the longitude source that produced the pillars.
    pub engine: String,
    pub correction: CorrectionSource,
    pub computed_at: DateTime<Utc>,
    pub julian_day: f64,
    /// Apparent solar longitude used for the term boundaries, degrees.
    pub solar_longitude: f64,
    /// Version of the five-element weighting table.
    pub score_table: String,
}

/// The externally visible calculation result. Created once per request
/// and never mutated afterwards; serializes to the JSON record the
/// storage collaborator persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SajuResultPayload {
    pub pillars: FourPillars,
    pub day_master: HeavenlyStem,
    pub day_master_element: FiveElement,
    pub day_master_polarity: Polarity,
    pub elements: FiveElementScoreboard,
    pub ten_gods: TenGodReading,
    pub luck_pillars: Vec<LuckPillar>,
    pub solar_term: SolarTerm,
    /// Advisory lunisolar cross-reference; absent outside the table
    /// span. Never feeds pillar derivation.
    pub lunar: Option<LunarDate>,
    pub meta: ResultMeta,
}

impl SajuResultPayload {
    /// Checks the payload against its fixed schema: sexagenary parity,
    /// scoreboard totals, longitude range and day-master consistency.
    pub fn validate(&self) -> Result<(), CalcError> {
        for pillar in self.pillars.present() {
            if pillar.stem.index() % 2 != pillar.branch.index() % 2 {
                return Err(CalcError::Internal(format!(
                    "sexagenary parity violated by {}",
                    pillar
                )));
            }
        }
        if self.day_master != self.pillars.day.stem {
            return Err(CalcError::Internal(
                "day master does not match day-pillar stem".to_string(),
            ));
        }
        let pillar_count = self.pillars.present().len() as f64;
        let expected =
            NORMALIZED_BASIS * (pillar_count * (STEM_WEIGHT + BRANCH_WEIGHT)) / FULL_RAW_TOTAL;
        if (self.elements.total() - expected).abs() > 1e-6 {
            return Err(CalcError::Internal(format!(
                "element scores total {} but {} pillars require {}",
                self.elements.total(),
                pillar_count,
                expected
            )));
        }
        if !(0.0..360.0).contains(&self.meta.solar_longitude) {
            return Err(CalcError::Internal(format!(
                "solar longitude {} outside [0, 360)",
                self.meta.solar_longitude
            )));
        }
        if !self.meta.julian_day.is_finite() {
            return Err(CalcError::Internal("julian day is not finite".to_string()));
        }
        Ok(())
    }
}

/// Packages a pillar computation into the payload. The lunar
/// cross-reference degrades to `None` outside its table span instead of
/// failing the assembly.
pub fn assemble(
    input: &BirthInput,
    computation: &PillarComputation,
) -> Result<SajuResultPayload, CalcError> {
    let scoreboard = elements::score_pillars(&computation.pillars);
    let ten_gods = elements::ten_gods(computation.day_master, &computation.pillars);
    let lunar = lunar::solar_to_lunar(input.date);
    if lunar.is_none() {
        debug!(date = %input.date, "no lunisolar cross-reference for date");
    }

    let payload = SajuResultPayload {
        pillars: computation.pillars,
        day_master: computation.day_master,
        day_master_element: computation.day_master.element(),
        day_master_polarity: computation.day_master.polarity(),
        elements: scoreboard,
        ten_gods,
        luck_pillars: computation.luck_pillars.clone(),
        solar_term: computation.solar_term,
        lunar,
        meta: ResultMeta {
            engine: computation.engine_id.to_string(),
            correction: computation.correction,
            computed_at: Utc::now(),
            julian_day: computation.julian_day,
            solar_longitude: computation.solar_longitude,
            score_table: SCORE_TABLE_VERSION.to_string(),
        },
    };
    payload.validate()?;
    Ok(payload)
}
