//! Letter number formatting.
//!
//! A letter number is a pure projection of (sequence, document type code, issue date):
//! `{sequence:03}/{type}/{roman month}/{hijri year}/{gregorian year}`.

pub mod calendar;
pub mod formatter;

pub use calendar::{hijri_year, roman_month, DateContext};
pub use formatter::{format_for_date, format_letter_number, DELIMITER, SEQUENCE_WIDTH};
