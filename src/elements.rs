//! Five-element scoring and ten-god readings over a set of pillars.
//!
//! The weighting convention is a fixed, versioned constant table: a
//! pillar's stem puts its full weight on one element, while the branch
//! splits its weight across the hidden stems. Accumulation is
//! commutative, so pillar order never changes a scoreboard.

use serde::{Deserialize, Serialize};

use crate::pillars::FourPillars;
use crate::tables::{FiveElement, HeavenlyStem, SexagenaryPair, TenGod};

/// Version tag of the weighting convention below. Bump when the weights
/// change so persisted scoreboards stay attributable.
pub const SCORE_TABLE_VERSION: &str = "w1";

/// Score contributed by each pillar stem.
pub const STEM_WEIGHT: f64 = 10.0;
/// Score distributed across each branch's hidden stems.
pub const BRANCH_WEIGHT: f64 = 10.0;
/// Raw total with all four pillars present.
pub const FULL_RAW_TOTAL: f64 = 4.0 * (STEM_WEIGHT + BRANCH_WEIGHT);
/// Normalized basis the full raw total maps onto.
pub const NORMALIZED_BASIS: f64 = 100.0;

/// Per-element weights, normalized to the 100-point basis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FiveElementScoreboard {
    pub wood: f64,
    pub fire: f64,
    pub earth: f64,
    pub metal: f64,
    pub water: f64,
}

impl FiveElementScoreboard {
    pub fn get(&self, element: FiveElement) -> f64 {
        match element {
            FiveElement::Wood => self.wood,
            FiveElement::Fire => self.fire,
            FiveElement::Earth => self.earth,
            FiveElement::Metal => self.metal,
            FiveElement::Water => self.water,
        }
    }

    fn add(&mut self, element: FiveElement, weight: f64) {
        match element {
            FiveElement::Wood => self.wood += weight,
            FiveElement::Fire => self.fire += weight,
            FiveElement::Earth => self.earth += weight,
            FiveElement::Metal => self.metal += weight,
            FiveElement::Water => self.water += weight,
        }
    }

    pub fn total(&self) -> f64 {
        self.wood + self.fire + self.earth + self.metal + self.water
    }

    /// The strongest element; ties resolve in cycle order.
    pub fn dominant(&self) -> FiveElement {
        let mut best = FiveElement::Wood;
        for element in FiveElement::all() {
            if self.get(element) > self.get(best) {
                best = element;
            }
        }
        best
    }
}

fn accumulate(board: &mut FiveElementScoreboard, pillar: SexagenaryPair) {
    board.add(pillar.stem.element(), STEM_WEIGHT);
    for &(hidden, weight) in pillar.branch.hidden_stems() {
        board.add(hidden.element(), weight);
    }
}

/// Tallies the scoreboard for the available pillars and normalizes onto
/// the 100-point basis. A missing hour pillar reduces the total
/// proportionally (to 75) rather than being guessed at.
pub fn score_pillars(pillars: &FourPillars) -> FiveElementScoreboard {
    let mut raw = FiveElementScoreboard::default();
    for pillar in pillars.present() {
        accumulate(&mut raw, pillar);
    }
    let scale = NORMALIZED_BASIS / FULL_RAW_TOTAL;
    FiveElementScoreboard {
        wood: raw.wood * scale,
        fire: raw.fire * scale,
        earth: raw.earth * scale,
        metal: raw.metal * scale,
        water: raw.water * scale,
    }
}

/// Ten-god relation of every non-day-master position to the day master.
/// Branch readings use the branch's principal hidden stem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TenGodReading {
    pub year_stem: TenGod,
    pub month_stem: TenGod,
    pub hour_stem: Option<TenGod>,
    pub year_branch: TenGod,
    pub month_branch: TenGod,
    pub day_branch: TenGod,
    pub hour_branch: Option<TenGod>,
}

pub fn ten_gods(day_master: HeavenlyStem, pillars: &FourPillars) -> TenGodReading {
    let stem = |p: SexagenaryPair| TenGod::relate(day_master, p.stem);
    let branch = |p: SexagenaryPair| TenGod::relate(day_master, p.branch.principal_stem());
    TenGodReading {
        year_stem: stem(pillars.year),
        month_stem: stem(pillars.month),
        hour_stem: pillars.hour.map(stem),
        year_branch: branch(pillars.year),
        month_branch: branch(pillars.month),
        day_branch: branch(pillars.day),
        hour_branch: pillars.hour.map(branch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    // 경오(庚午), 신사(辛巳), 경진(庚辰), 계미(癸未): the 1990-05-15
    // 14:30 Seoul chart.
    fn sample_pillars() -> FourPillars {
        FourPillars {
            year: SexagenaryPair::from_cycle_index(6),
            month: SexagenaryPair::from_cycle_index(17),
            day: SexagenaryPair::from_cycle_index(16),
            hour: Some(SexagenaryPair::from_cycle_index(19)),
        }
    }

    #[test]
    fn full_chart_sums_to_basis() {
        let board = score_pillars(&sample_pillars());
        assert_abs_diff_eq!(board.total(), NORMALIZED_BASIS, epsilon = 1e-9);
    }

    #[test]
    fn sample_chart_scores() {
        let board = score_pillars(&sample_pillars());
        assert_abs_diff_eq!(board.metal, 41.25, epsilon = 1e-9);
        assert_abs_diff_eq!(board.fire, 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(board.earth, 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(board.water, 13.75, epsilon = 1e-9);
        assert_abs_diff_eq!(board.wood, 5.0, epsilon = 1e-9);
        assert_eq!(board.dominant(), FiveElement::Metal);
    }

    #[test]
    fn missing_hour_reduces_total_proportionally() {
        let mut pillars = sample_pillars();
        pillars.hour = None;
        let board = score_pillars(&pillars);
        assert_abs_diff_eq!(board.total(), 75.0, epsilon = 1e-9);
        for element in FiveElement::all() {
            assert!(board.get(element) >= 0.0);
        }
    }

    #[test]
    fn accumulation_is_commutative() {
        let pillars = sample_pillars();
        let mut forward = FiveElementScoreboard::default();
        for pillar in pillars.present() {
            accumulate(&mut forward, pillar);
        }
        let mut reverse = FiveElementScoreboard::default();
        for pillar in pillars.present().into_iter().rev() {
            accumulate(&mut reverse, pillar);
        }
        for element in FiveElement::all() {
            assert_abs_diff_eq!(
                forward.get(element),
                reverse.get(element),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn ten_gods_for_sample_chart() {
        let pillars = sample_pillars();
        let day_master = pillars.day.stem;
        let reading = ten_gods(day_master, &pillars);
        assert_eq!(reading.year_stem, TenGod::BiGyeon);
        assert_eq!(reading.month_stem, TenGod::GeopJae);
        assert_eq!(reading.hour_stem, Some(TenGod::SangGwan));
        // 오(午) hides 정(丁), yin fire: 정관 to a 경(庚) day master.
        assert_eq!(reading.year_branch, TenGod::JeongGwan);
        // 진(辰) hides 무(戊), yang earth: 편인.
        assert_eq!(reading.day_branch, TenGod::PyeonIn);
    }

    #[test]
    fn hour_readings_absent_without_hour_pillar() {
        let mut pillars = sample_pillars();
        pillars.hour = None;
        let reading = ten_gods(pillars.day.stem, &pillars);
        assert_eq!(reading.hour_stem, None);
        assert_eq!(reading.hour_branch, None);
    }
}
