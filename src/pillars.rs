//! Pillar derivation: year and month pillars from solar-term
//! boundaries, the day pillar from the continuous 60-day cycle, the
//! hour pillar from true solar time, plus decade luck pillars.

use chrono::{Datelike, Duration, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ephemeris::{self, calendar_julian_day, wrap_degrees_signed, Engine};
use crate::solar_time::{self, CorrectionSource};
use crate::tables::{HeavenlyStem, Polarity, SexagenaryPair, SolarTerm};
use crate::{BirthInput, CalcError, Gender};

/// Sexagenary index of the day-cycle anchor: 1900-01-01 was a 갑술(甲戌)
/// day, giving `(JDN + 49) mod 60` for any Julian day number.
const DAY_CYCLE_OFFSET: i64 = 49;

/// Julian day number offset of the proleptic-Gregorian day count.
const JDN_FROM_CE: i64 = 1_721_425;

/// Decade pillars emitted for a luck-pillar sequence.
const LUCK_PILLAR_COUNT: i16 = 8;

/// The four pillars of a birth moment. The hour pillar is absent when
/// the birth time is unknown; it is never guessed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FourPillars {
    pub year: SexagenaryPair,
    pub month: SexagenaryPair,
    pub day: SexagenaryPair,
    pub hour: Option<SexagenaryPair>,
}

impl FourPillars {
    /// The pillars that are actually present, in year/month/day/hour
    /// order.
    pub fn present(&self) -> Vec<SexagenaryPair> {
        let mut pillars = vec![self.year, self.month, self.day];
        if let Some(hour) = self.hour {
            pillars.push(hour);
        }
        pillars
    }

    /// The day master: the day pillar's heavenly stem.
    pub fn day_master(&self) -> HeavenlyStem {
        self.day.stem
    }
}

/// One decade of the luck-pillar (대운) sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LuckPillar {
    pub pillar: SexagenaryPair,
    /// Age in years at which the decade begins.
    pub start_age: f64,
}

/// Everything the pillar stage produces, consumed by the assembler.
#[derive(Debug, Clone, PartialEq)]
pub struct PillarComputation {
    pub pillars: FourPillars,
    pub day_master: HeavenlyStem,
    pub solar_term: SolarTerm,
    pub luck_pillars: Vec<LuckPillar>,
    /// Julian day (UT) of the birth instant used for the solar lookup.
    pub julian_day: f64,
    /// Apparent solar longitude at that instant, degrees.
    pub solar_longitude: f64,
    pub correction: CorrectionSource,
    pub engine_id: &'static str,
}

enum LongitudeSource<'a> {
    Engine(&'a Engine),
    Analytic,
}

impl LongitudeSource<'_> {
    fn correction(&self) -> CorrectionSource {
        match self {
            LongitudeSource::Engine(_) => CorrectionSource::Exact,
            LongitudeSource::Analytic => CorrectionSource::Approximate,
        }
    }

    fn engine_id(&self) -> &'static str {
        match self {
            LongitudeSource::Engine(engine) => engine.version(),
            LongitudeSource::Analytic => "calendar-approx/1",
        }
    }

    fn eot_minutes(&self, jd: f64) -> Result<f64, CalcError> {
        match self {
            LongitudeSource::Engine(engine) => engine.equation_of_time_minutes(jd),
            LongitudeSource::Analytic => Ok(solar_time::eot_minutes(jd)),
        }
    }

    /// Longitude for boundary scans. Engine range misses degrade to the
    /// closed form so a scan bracketing the span edge still resolves.
    fn scan_longitude(&self, jd: f64) -> f64 {
        match self {
            LongitudeSource::Engine(engine) => match engine.solar_longitude(jd) {
                Ok(position) => position.longitude,
                Err(_) => solar_time::approximate_solar_longitude(jd),
            },
            LongitudeSource::Analytic => solar_time::approximate_solar_longitude(jd),
        }
    }
}

fn pair_from_indices(stem: u8, branch: u8) -> SexagenaryPair {
    SexagenaryPair::from_cycle_index(((stem as u16 * 36 + branch as u16 * 25) % 60) as u8)
}

/// Derives pillars, day master and luck pillars for a birth input.
///
/// With an engine the solar longitude and equation of time come from the
/// apparent solar position; without one (or when the engine reports
/// itself unavailable) the closed-form approximations take over and the
/// result is tagged `Approximate`.
pub fn compute_pillars(
    input: &BirthInput,
    engine: Option<&Engine>,
) -> Result<PillarComputation, CalcError> {
    input.validate()?;
    let civil_year = input.date.year();
    if !(ephemeris::MIN_YEAR..=ephemeris::MAX_YEAR).contains(&civil_year) {
        return Err(CalcError::OutOfRange(format!(
            "year {} outside supported span {}..={}",
            civil_year,
            ephemeris::MIN_YEAR,
            ephemeris::MAX_YEAR
        )));
    }

    let time = input.effective_time();
    // Noon keeps the date-only path in the middle of the civil day.
    let clock = time.unwrap_or_else(|| NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default());
    let utc = input.date.and_time(clock) - Duration::minutes(input.tz_offset_minutes as i64);
    let hour_ut =
        utc.hour() as f64 + utc.minute() as f64 / 60.0 + utc.second() as f64 / 3600.0;
    let julian_day = match engine {
        Some(engine) => match engine.julian_day(utc.year(), utc.month(), utc.day(), hour_ut) {
            Ok(jd) => jd,
            Err(CalcError::EngineUnavailable(reason)) => {
                warn!(%reason, "engine unavailable, using calendar julian day");
                calendar_julian_day(utc.year(), utc.month(), utc.day(), hour_ut)
            }
            Err(other) => return Err(other),
        },
        None => calendar_julian_day(utc.year(), utc.month(), utc.day(), hour_ut),
    };

    let (solar_longitude, source) = resolve_longitude(engine, julian_day)?;

    // Year pillar: the year turns at 입춘 (315°). Early-year dates
    // still short of it (longitude in the 동지..입춘 arc) belong to the
    // previous year.
    let before_ipchun = (240.0..315.0).contains(&solar_longitude);
    let pillar_year = if (1..=3).contains(&input.date.month()) && before_ipchun {
        civil_year - 1
    } else {
        civil_year
    };
    let year_pillar = SexagenaryPair::from_cycle_index((pillar_year - 4).rem_euclid(60) as u8);

    // Month pillar: 30° sectors from 315°, stems by the five-tigers rule.
    let month_ordinal = (((solar_longitude - 315.0).rem_euclid(360.0)) / 30.0).floor() as u8;
    let month_ordinal = month_ordinal.min(11);
    let month_branch = (month_ordinal + 2) % 12;
    let month_stem = ((year_pillar.stem.index() % 5) * 2 + 2 + month_ordinal) % 10;
    let month_pillar = pair_from_indices(month_stem, month_branch);

    // Day pillar: continuous 60-day count over the civil local date.
    let jdn = input.date.num_days_from_ce() as i64 + JDN_FROM_CE;
    let day_pillar = SexagenaryPair::from_cycle_index((jdn + DAY_CYCLE_OFFSET).rem_euclid(60) as u8);

    let hour_pillar = match time {
        None => None,
        Some(time) => {
            let civil_minutes = time.hour() as f64 * 60.0
                + time.minute() as f64
                + time.second() as f64 / 60.0;
            let eot = source.eot_minutes(julian_day)?;
            let true_solar = solar_time::true_solar_minutes(
                civil_minutes,
                eot,
                input.longitude,
                input.tz_offset_minutes,
            )
            .rem_euclid(1440.0);
            // 12 two-hour windows, 자(子) spanning 23:00-01:00.
            let hour_branch = (((true_solar + 60.0) / 120.0).floor() as i64).rem_euclid(12) as u8;
            let hour_stem = ((day_pillar.stem.index() % 5) * 2 + hour_branch) % 10;
            Some(pair_from_indices(hour_stem, hour_branch))
        }
    };

    let pillars = FourPillars {
        year: year_pillar,
        month: month_pillar,
        day: day_pillar,
        hour: hour_pillar,
    };

    let luck_pillars = luck_pillars(
        &source,
        input.gender,
        year_pillar.polarity(),
        month_pillar,
        month_ordinal,
        julian_day,
    );

    debug!(
        julian_day,
        solar_longitude,
        source = source.engine_id(),
        "pillars derived"
    );

    Ok(PillarComputation {
        day_master: pillars.day_master(),
        solar_term: SolarTerm::from_longitude(solar_longitude),
        pillars,
        luck_pillars,
        julian_day,
        solar_longitude,
        correction: source.correction(),
        engine_id: source.engine_id(),
    })
}

fn resolve_longitude<'a>(
    engine: Option<&'a Engine>,
    julian_day: f64,
) -> Result<(f64, LongitudeSource<'a>), CalcError> {
    match engine {
        Some(engine) => match engine.solar_longitude(julian_day) {
            Ok(position) => Ok((position.longitude, LongitudeSource::Engine(engine))),
            Err(CalcError::EngineUnavailable(reason)) => {
                warn!(%reason, "engine unavailable, using closed-form solar longitude");
                Ok((
                    solar_time::approximate_solar_longitude(julian_day),
                    LongitudeSource::Analytic,
                ))
            }
            Err(other) => Err(other),
        },
        None => Ok((
            solar_time::approximate_solar_longitude(julian_day),
            LongitudeSource::Analytic,
        )),
    }
}

/// Decade luck pillars: direction from year polarity and gender, start
/// age from the distance to the adjacent month-opening solar term at
/// three days per year.
fn luck_pillars(
    source: &LongitudeSource<'_>,
    gender: Gender,
    year_polarity: Polarity,
    month_pillar: SexagenaryPair,
    month_ordinal: u8,
    julian_day: f64,
) -> Vec<LuckPillar> {
    let forward = matches!(
        (year_polarity, gender),
        (Polarity::Yang, Gender::Male) | (Polarity::Yin, Gender::Female)
    );
    let month_start = 315.0 + 30.0 * month_ordinal as f64;
    let (target, lo, hi) = if forward {
        ((month_start + 30.0).rem_euclid(360.0), julian_day, julian_day + 45.0)
    } else {
        (month_start.rem_euclid(360.0), julian_day - 45.0, julian_day)
    };
    let crossing = term_crossing(source, target, lo, hi);
    let start_age = (crossing - julian_day).abs() / 3.0;

    let month_cycle = month_pillar.cycle_index() as i16;
    (1..=LUCK_PILLAR_COUNT)
        .map(|step| {
            let cycle = if forward {
                month_cycle + step
            } else {
                month_cycle - step
            }
            .rem_euclid(60) as u8;
            LuckPillar {
                pillar: SexagenaryPair::from_cycle_index(cycle),
                start_age: start_age + 10.0 * (step - 1) as f64,
            }
        })
        .collect()
}

/// Bisects for the instant the solar longitude reaches `target`,
/// assuming the crossing lies in `[lo, hi]` with the longitude behind
/// the target at `lo`.
fn term_crossing(source: &LongitudeSource<'_>, target: f64, mut lo: f64, mut hi: f64) -> f64 {
    for _ in 0..64 {
        if hi - lo < 1e-7 {
            break;
        }
        let mid = 0.5 * (lo + hi);
        if wrap_degrees_signed(source.scan_longitude(mid) - target) < 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::EarthlyBranch;
    use crate::TimeAccuracy;
    use chrono::NaiveDate;

    fn input(date: NaiveDate, time: Option<NaiveTime>) -> BirthInput {
        BirthInput {
            date,
            time,
            time_accuracy: TimeAccuracy::Exact,
            gender: Gender::Male,
            longitude: Some(126.978),
            latitude: Some(37.566),
            tz_offset_minutes: 9 * 60,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(h, m, 0)
    }

    #[test]
    fn seoul_scenario_full_chart() {
        let engine = Engine::new().unwrap();
        let birth = input(date(1990, 5, 15), time(14, 30));
        let result = compute_pillars(&birth, Some(&engine)).unwrap();

        // 경오(庚午) year, 신사(辛巳) month, 경진(庚辰) day, 계미(癸未) hour.
        assert_eq!(result.pillars.year.cycle_index(), 6);
        assert_eq!(result.pillars.month.cycle_index(), 17);
        assert_eq!(result.pillars.day.cycle_index(), 16);
        assert_eq!(result.pillars.hour.unwrap().cycle_index(), 19);

        assert_eq!(result.day_master, HeavenlyStem::Gyeong);
        assert_eq!(
            result.day_master.element(),
            crate::tables::FiveElement::Metal
        );
        assert_eq!(result.correction, CorrectionSource::Exact);
        assert_eq!(result.solar_term, SolarTerm::Ipha);
        assert!(
            result.solar_longitude > 53.0 && result.solar_longitude < 56.0,
            "solar longitude {}",
            result.solar_longitude
        );
    }

    #[test]
    fn parity_invariant_over_date_sweep() {
        let engine = Engine::new().unwrap();
        let mut day = date(1923, 3, 7);
        while day < date(2047, 1, 1) {
            let result = compute_pillars(&input(day, time(10, 45)), Some(&engine)).unwrap();
            for pillar in result.pillars.present() {
                assert_eq!(
                    pillar.stem.index() % 2,
                    pillar.branch.index() % 2,
                    "parity broken on {}",
                    day
                );
            }
            day = day + Duration::days(997);
        }
    }

    #[test]
    fn day_pillar_advances_once_per_day_and_wraps() {
        let engine = Engine::new().unwrap();
        let start = date(1999, 11, 20);
        let first = compute_pillars(&input(start, time(8, 0)), Some(&engine)).unwrap();
        let mut previous = first.pillars.day.cycle_index();
        for offset in 1..=60 {
            let day = start + Duration::days(offset);
            let result = compute_pillars(&input(day, time(8, 0)), Some(&engine)).unwrap();
            let index = result.pillars.day.cycle_index();
            assert_eq!(index, (previous + 1) % 60, "no single-step advance at {}", day);
            previous = index;
        }
        // 60 days later the cycle has come all the way around.
        assert_eq!(previous, first.pillars.day.cycle_index());
    }

    #[test]
    fn unknown_time_drops_hour_pillar_only() {
        let engine = Engine::new().unwrap();
        let birth = input(date(1990, 5, 15), None);
        let result = compute_pillars(&birth, Some(&engine)).unwrap();
        assert_eq!(result.pillars.hour, None);
        assert_eq!(result.pillars.day.cycle_index(), 16);
        assert_eq!(result.pillars.present().len(), 3);
    }

    #[test]
    fn year_turns_at_ipchun_not_january() {
        let engine = Engine::new().unwrap();
        // 2000-02-03 precedes 입춘 2000 (Feb 4): still the 기묘(己卯)
        // year of 1999.
        let before = compute_pillars(&input(date(2000, 2, 3), time(12, 0)), Some(&engine)).unwrap();
        assert_eq!(before.pillars.year.stem, HeavenlyStem::Gi);
        assert_eq!(before.pillars.year.branch, EarthlyBranch::Myo);
        // 2000-02-05 is past the crossing: 경진(庚辰).
        let after = compute_pillars(&input(date(2000, 2, 5), time(12, 0)), Some(&engine)).unwrap();
        assert_eq!(after.pillars.year.stem, HeavenlyStem::Gyeong);
        assert_eq!(after.pillars.year.branch, EarthlyBranch::Jin);
        // January 1st belongs to the old year outright.
        let january =
            compute_pillars(&input(date(2000, 1, 1), time(12, 0)), Some(&engine)).unwrap();
        assert_eq!(january.pillars.year, before.pillars.year);
    }

    #[test]
    fn late_night_zi_hour_keeps_civil_day() {
        let engine = Engine::new().unwrap();
        let mut birth = input(date(1990, 5, 15), time(23, 30));
        birth.longitude = None;
        birth.tz_offset_minutes = 0;
        let result = compute_pillars(&birth, Some(&engine)).unwrap();
        let hour = result.pillars.hour.unwrap();
        assert_eq!(hour.branch, EarthlyBranch::Ja);
        // 경(庚) day opens the 자(子) hour with 병(丙).
        assert_eq!(hour.stem, HeavenlyStem::Byeong);
        assert_eq!(result.pillars.day.cycle_index(), 16);
    }

    #[test]
    fn offline_matches_engine_away_from_boundaries() {
        let engine = Engine::new().unwrap();
        let birth = input(date(1990, 5, 15), time(14, 30));
        let exact = compute_pillars(&birth, Some(&engine)).unwrap();
        let approximate = compute_pillars(&birth, None).unwrap();
        assert_eq!(exact.pillars, approximate.pillars);
        assert_eq!(approximate.correction, CorrectionSource::Approximate);
        assert_eq!(approximate.engine_id, "calendar-approx/1");
    }

    #[test]
    fn luck_pillars_direction_by_gender() {
        let engine = Engine::new().unwrap();
        // 경오 year is yang: male runs forward, female backward.
        let male = compute_pillars(&input(date(1990, 5, 15), time(14, 30)), Some(&engine)).unwrap();
        let month_cycle = male.pillars.month.cycle_index();
        assert_eq!(male.luck_pillars.len(), 8);
        assert_eq!(
            male.luck_pillars[0].pillar.cycle_index(),
            (month_cycle + 1) % 60
        );
        // Next month term (망종, ~June 6) is about 22 days out: the
        // first decade opens around age 7.
        let start = male.luck_pillars[0].start_age;
        assert!(start > 6.0 && start < 8.5, "forward start age {}", start);
        assert_eq!(male.luck_pillars[3].start_age, start + 30.0);

        let mut female_input = input(date(1990, 5, 15), time(14, 30));
        female_input.gender = Gender::Female;
        let female = compute_pillars(&female_input, Some(&engine)).unwrap();
        assert_eq!(
            female.luck_pillars[0].pillar.cycle_index(),
            (month_cycle + 59) % 60
        );
        // 입하 (~May 6) lies about nine days back: a bit over age 3.
        let start = female.luck_pillars[0].start_age;
        assert!(start > 2.5 && start < 4.0, "backward start age {}", start);
    }

    #[test]
    fn out_of_range_year_is_rejected() {
        let engine = Engine::new().unwrap();
        let birth = input(date(2199, 12, 31), time(10, 0));
        // Inside the span: works.
        assert!(compute_pillars(&birth, Some(&engine)).is_ok());
        let mut early = input(date(1990, 5, 15), time(10, 0));
        early.date = date(1799, 12, 31);
        assert!(matches!(
            compute_pillars(&early, Some(&engine)),
            Err(CalcError::OutOfRange(_))
        ));
    }
}
