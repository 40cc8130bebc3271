//! Calendar components embedded in letter numbers.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

const ROMAN_MONTHS: [&str; 12] = [
    "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII",
];

/// Julian day number of 1 Muharram 1 AH (civil epoch).
const ISLAMIC_EPOCH_JDN: i64 = 1_948_440;

/// Offset between chrono's day count (0001-01-01 = 1) and the Julian day number.
const CE_TO_JDN: i64 = 1_721_425;

/// Roman numeral for a 1-based month, `None` outside 1..=12.
pub fn roman_month(month: u32) -> Option<&'static str> {
    match month {
        1..=12 => Some(ROMAN_MONTHS[(month - 1) as usize]),
        _ => None,
    }
}

/// Hijri year for a Gregorian date using the tabular Islamic calendar.
///
/// The tabular calendar may disagree with the sighted calendar by a day
/// around 1 Muharram.
pub fn hijri_year(date: NaiveDate) -> i32 {
    let jdn = date.num_days_from_ce() as i64 + CE_TO_JDN;
    ((30 * (jdn - ISLAMIC_EPOCH_JDN) + 10_646).div_euclid(10_631)) as i32
}

/// Date-derived parts of a letter number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DateContext {
    #[schema(example = "XI")]
    pub roman_month: String,
    #[schema(example = 1446)]
    pub hijri_year: i32,
    #[schema(example = 2024)]
    pub gregorian_year: i32,
}

impl DateContext {
    pub fn from_date(date: NaiveDate) -> Self {
        // month() is always 1..=12
        let roman = ROMAN_MONTHS[date.month0() as usize];
        Self {
            roman_month: roman.to_string(),
            hijri_year: hijri_year(date),
            gregorian_year: date.year(),
        }
    }
}
