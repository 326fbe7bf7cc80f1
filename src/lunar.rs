//! Lunisolar calendar conversion, table-driven for 1900–2049.
//!
//! The lunar cross-reference is informational only: pillar derivation is
//! solar-term based and never reads these tables. Conversions therefore
//! return `None` on any unsupported or invalid input instead of raising.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// First day of the packed table: 1900-01-31 is lunar 1900-01-01.
const BASE_YEAR: i32 = 1900;

/// Per-year packed month layout, 1900..=2049. Bits 15..4 flag the twelve
/// regular months as long (30 days) or short (29); bits 3..0 hold the
/// leap-month number (0 = none); bit 16 marks a long leap month.
const YEAR_INFO: [u32; 150] = [
    0x04bd8, 0x04ae0, 0x0a570, 0x054d5, 0x0d260, 0x0d950, 0x16554, 0x056a0, 0x09ad0, 0x055d2,
    0x04ae0, 0x0a5b6, 0x0a4d0, 0x0d250, 0x1d255, 0x0b540, 0x0d6a0, 0x0ada2, 0x095b0, 0x14977,
    0x04970, 0x0a4b0, 0x0b4b5, 0x06a50, 0x06d40, 0x1ab54, 0x02b60, 0x09570, 0x052f2, 0x04970,
    0x06566, 0x0d4a0, 0x0ea50, 0x06e95, 0x05ad0, 0x02b60, 0x186e3, 0x092e0, 0x1c8d7, 0x0c950,
    0x0d4a0, 0x1d8a6, 0x0b550, 0x056a0, 0x1a5b4, 0x025d0, 0x092d0, 0x0d2b2, 0x0a950, 0x0b557,
    0x06ca0, 0x0b550, 0x15355, 0x04da0, 0x0a5b0, 0x14573, 0x052b0, 0x0a9a8, 0x0e950, 0x06aa0,
    0x0aea6, 0x0ab50, 0x04b60, 0x0aae4, 0x0a570, 0x05260, 0x0f263, 0x0d950, 0x05b57, 0x056a0,
    0x096d0, 0x04dd5, 0x04ad0, 0x0a4d0, 0x0d4d4, 0x0d250, 0x0d558, 0x0b540, 0x0b5a0, 0x195a6,
    0x095b0, 0x049b0, 0x0a974, 0x0a4b0, 0x0b27a, 0x06a50, 0x06d40, 0x0af46, 0x0ab60, 0x09570,
    0x04af5, 0x04970, 0x064b0, 0x074a3, 0x0ea50, 0x06b58, 0x055c0, 0x0ab60, 0x096d5, 0x092e0,
    0x0c960, 0x0d954, 0x0d4a0, 0x0da50, 0x07552, 0x056a0, 0x0abb7, 0x025d0, 0x092d0, 0x0cab5,
    0x0a950, 0x0b4a0, 0x0baa4, 0x0ad50, 0x055d9, 0x04ba0, 0x0a5b0, 0x15176, 0x052b0, 0x0a930,
    0x07954, 0x06aa0, 0x0ad50, 0x05b52, 0x04b60, 0x0a6e6, 0x0a4e0, 0x0d260, 0x0ea65, 0x0d530,
    0x05aa0, 0x076a3, 0x096d0, 0x04afb, 0x04ad0, 0x0a4d0, 0x1d0b6, 0x0d250, 0x0d520, 0x0dd45,
    0x0b5a0, 0x056d0, 0x055b2, 0x049b0, 0x0a577, 0x0a4b0, 0x0aa50, 0x1b255, 0x06d20, 0x0ada0,
];

/// A date on the traditional lunisolar calendar.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LunarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub is_leap_month: bool,
}

impl fmt::Display for LunarDate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let leap = if self.is_leap_month { "윤" } else { "" };
        write!(f, "{}년 {}{}월 {}일", self.year, leap, self.month, self.day)
    }
}

fn base_date() -> NaiveDate {
    // Always a valid constant date.
    NaiveDate::from_ymd_opt(BASE_YEAR, 1, 31).unwrap_or_default()
}

fn year_info(year: i32) -> Option<u32> {
    if (BASE_YEAR..BASE_YEAR + YEAR_INFO.len() as i32).contains(&year) {
        Some(YEAR_INFO[(year - BASE_YEAR) as usize])
    } else {
        None
    }
}

/// Number of the leap month of a lunar year, 0 when there is none.
fn leap_month(info: u32) -> u32 {
    info & 0xf
}

/// Length of a regular month (1..=12) in days.
fn month_days(info: u32, month: u32) -> u32 {
    if info & (0x10000 >> month) != 0 {
        30
    } else {
        29
    }
}

/// Length of the leap month in days, 0 when the year has none.
fn leap_days(info: u32) -> u32 {
    if leap_month(info) == 0 {
        0
    } else if info & 0x10000 != 0 {
        30
    } else {
        29
    }
}

/// Total days in a lunar year.
fn year_days(info: u32) -> u32 {
    (1..=12).map(|m| month_days(info, m)).sum::<u32>() + leap_days(info)
}

/// Converts a Gregorian date to its lunisolar equivalent. `None` outside
/// the 1900–2049 table span.
pub fn solar_to_lunar(date: NaiveDate) -> Option<LunarDate> {
    let mut offset = date.signed_duration_since(base_date()).num_days();
    if offset < 0 {
        debug!(%date, "date precedes lunisolar table span");
        return None;
    }

    let mut year = BASE_YEAR;
    let mut info = year_info(year)?;
    while offset >= year_days(info) as i64 {
        offset -= year_days(info) as i64;
        year += 1;
        info = year_info(year)?;
    }

    let leap = leap_month(info);
    let mut offset = offset as u32;
    for month in 1..=12 {
        let days = month_days(info, month);
        if offset < days {
            return Some(LunarDate {
                year,
                month,
                day: offset + 1,
                is_leap_month: false,
            });
        }
        offset -= days;
        if month == leap {
            let days = leap_days(info);
            if offset < days {
                return Some(LunarDate {
                    year,
                    month,
                    day: offset + 1,
                    is_leap_month: true,
                });
            }
            offset -= days;
        }
    }
    None
}

/// Convenience wrapper for `YYYY-MM-DD` strings; `None` when the string
/// does not parse as a date.
pub fn solar_to_lunar_str(date: &str) -> Option<LunarDate> {
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    solar_to_lunar(parsed)
}

/// Converts a lunisolar date back to the Gregorian calendar. `None` for
/// out-of-span years, a leap flag on a month that has no leap, or a day
/// beyond the month's length.
pub fn lunar_to_solar(year: i32, month: u32, day: u32, is_leap: bool) -> Option<NaiveDate> {
    let info = year_info(year)?;
    if !(1..=12).contains(&month) || day == 0 {
        return None;
    }
    if is_leap && leap_month(info) != month {
        return None;
    }
    let target_len = if is_leap {
        leap_days(info)
    } else {
        month_days(info, month)
    };
    if day > target_len {
        return None;
    }

    let mut offset: i64 = 0;
    for y in BASE_YEAR..year {
        offset += year_days(year_info(y)?) as i64;
    }
    let leap = leap_month(info);
    for m in 1..month {
        offset += month_days(info, m) as i64;
        if m == leap {
            offset += leap_days(info) as i64;
        }
    }
    if is_leap {
        offset += month_days(info, month) as i64;
    }
    offset += day as i64 - 1;
    base_date().checked_add_days(Days::new(offset as u64))
}
