//! Internal helpers for input normalization.

use chrono::NaiveDate;

/// Normalizes a date string to the stored `DD/MM/YYYY` display format.
///
/// `YYYY-MM-DD` (HTML date inputs) is converted; `DD/MM/YYYY` passes
/// through; anything else is returned as-is, since the field is
/// informational only.
pub(crate) fn normalize_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.format("%d/%m/%Y").to_string();
    }
    trimmed.to_string()
}
