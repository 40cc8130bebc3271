use chrono::NaiveDate;

use super::calendar::DateContext;

/// Minimum width of the sequence field. Wider sequences are never truncated.
pub const SEQUENCE_WIDTH: usize = 3;

pub const DELIMITER: char = '/';

/// Build the printable letter number, e.g. `007/SKA/XI/1446/2024`.
pub fn format_letter_number(
    sequence: u64,
    type_code: &str,
    roman_month: &str,
    hijri_year: &str,
    gregorian_year: &str,
) -> String {
    format!(
        "{sequence:0width$}{d}{type_code}{d}{roman_month}{d}{hijri_year}{d}{gregorian_year}",
        width = SEQUENCE_WIDTH,
        d = DELIMITER,
    )
}

/// Format a sequence as of the given issue date.
pub fn format_for_date(sequence: u64, type_code: &str, on: NaiveDate) -> String {
    let ctx = DateContext::from_date(on);
    format_letter_number(
        sequence,
        type_code,
        &ctx.roman_month,
        &ctx.hijri_year.to_string(),
        &ctx.gregorian_year.to_string(),
    )
}
