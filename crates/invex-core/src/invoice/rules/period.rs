//! Service provision period detection, one page at a time.

use regex::Captures;
use tracing::trace;

use crate::models::invoice::UNKNOWN_PERIOD;

use super::dates::{month_name, month_name_from_abbreviation};
use super::patterns::{MONTH_ABBR_YEAR, MONTH_YEAR, PERIOD_LABEL};

/// Resolve the service period printed on a page, e.g. `"January 2024"`.
///
/// Tries a month abbreviation with year, then a labelled `MM/YYYY`, then any
/// bare `MM/YYYY`. Returns [`UNKNOWN_PERIOD`] when none is found.
pub fn resolve_service_period(page_text: &str) -> String {
    if let Some(caps) = MONTH_ABBR_YEAR.captures(page_text) {
        if let Some(month) = month_name_from_abbreviation(&caps[1]) {
            trace!(matched = &caps[0], "service period from month abbreviation");
            return format!("{} {}", month, &caps[2]);
        }
    }

    if let Some(period) = first_valid_month_year(PERIOD_LABEL.captures_iter(page_text)) {
        trace!(%period, "service period from label");
        return period;
    }

    if let Some(period) = first_valid_month_year(MONTH_YEAR.captures_iter(page_text)) {
        trace!(%period, "service period from bare month/year");
        return period;
    }

    UNKNOWN_PERIOD.to_string()
}

fn first_valid_month_year<'h>(mut matches: impl Iterator<Item = Captures<'h>>) -> Option<String> {
    matches.find_map(|caps| {
        let month = caps[1].parse::<u32>().ok()?;
        month_name(month).map(|name| format!("{} {}", name, &caps[2]))
    })
}
