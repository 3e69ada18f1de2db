//! Normalization from raw report rows to [`toppages_core::PageRecord`].

use toppages_core::PageRecord;

use crate::error::AnalyticsError;
use crate::types::ReportRow;

/// Removes one trailing `suffix` from `title`, if present.
#[must_use]
pub fn strip_title_suffix<'a>(title: &'a str, suffix: &str) -> &'a str {
    if suffix.is_empty() {
        return title;
    }
    title.strip_suffix(suffix).unwrap_or(title)
}

/// Maps one report row with dimensions `(title, path)` to a [`PageRecord`].
///
/// `index` is the row's position in the report and only feeds the error.
///
/// # Errors
///
/// Returns [`AnalyticsError::MalformedRow`] if the row does not carry exactly
/// two dimension values.
pub fn normalize_row(
    index: usize,
    row: ReportRow,
    title_suffix: &str,
) -> Result<PageRecord, AnalyticsError> {
    let found = row.dimensions.len();
    let Ok([title, url]) = <[String; 2]>::try_from(row.dimensions) else {
        return Err(AnalyticsError::MalformedRow { index, found });
    };

    Ok(PageRecord {
        title: strip_title_suffix(&title, title_suffix).to_string(),
        url,
    })
}

/// Normalizes every row, keeping report order.
///
/// # Errors
///
/// Fails on the first malformed row; see [`normalize_row`].
pub fn normalize_rows(
    rows: Vec<ReportRow>,
    title_suffix: &str,
) -> Result<Vec<PageRecord>, AnalyticsError> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| normalize_row(index, row, title_suffix))
        .collect()
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
