//! Month name helpers for invoice and service period dates.

use chrono::Month;

/// Full English month name for a 1-based month number.
pub fn month_name(number: u32) -> Option<&'static str> {
    u8::try_from(number)
        .ok()
        .and_then(|n| Month::try_from(n).ok())
        .map(|m| m.name())
}

/// Full English month name for an abbreviation such as `JAN` or `sep`.
pub fn month_name_from_abbreviation(abbreviation: &str) -> Option<&'static str> {
    abbreviation.parse::<Month>().ok().map(|m| m.name())
}

/// Derive the invoice month from a `DD.MM.YYYY` or `DD/MM/YYYY` date.
///
/// Only the second segment is read; anything unparsable yields `None`.
pub fn month_of_invoice(date: &str) -> Option<String> {
    let month = date.split(['.', '/']).nth(1)?.trim().parse::<u32>().ok()?;
    month_name(month).map(str::to_string)
}
