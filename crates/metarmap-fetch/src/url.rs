//! Request URL construction for the aviationweather.gov data API.

use metarmap_types::{ReportType, StationId};

/// Base URL for the aviationweather.gov data API.
pub const DEFAULT_BASE_URL: &str = "https://aviationweather.gov/api/data";

/// Builds the request URL for one chunk of stations.
///
/// URL format: `{base}/{report}?format=xml&hours={hours}&ids={id,id,...}`
///
/// # Example
///
/// ```
/// use metarmap_fetch::url::{DEFAULT_BASE_URL, report_url};
/// use metarmap_types::{ReportType, StationId};
///
/// let chunk = [
///     StationId::parse("KORD").unwrap(),
///     StationId::parse("KJFK").unwrap(),
/// ];
/// let url = report_url(DEFAULT_BASE_URL, ReportType::Metar, 2.5, &chunk);
/// assert_eq!(
///     url,
///     "https://aviationweather.gov/api/data/metar?format=xml&hours=2.5&ids=KORD,KJFK"
/// );
/// ```
#[must_use]
pub fn report_url(base: &str, report_type: ReportType, hours: f64, chunk: &[StationId]) -> String {
    let ids = chunk
        .iter()
        .map(StationId::as_str)
        .collect::<Vec<_>>()
        .join(",");
    format!(
        "{}/{}?format=xml&hours={}&ids={}",
        base.trim_end_matches('/'),
        report_type.path(),
        hours,
        ids
    )
}
