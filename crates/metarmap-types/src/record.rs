//! Parsed weather records and the merged fetch result.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{ReportType, StationId};

/// One parsed observation or forecast for a single station.
///
/// Only the station id and observation time are interpreted by the fetch
/// engine; everything else travels in `xml` as the record's original
/// element text, unmodified, for downstream consumers (category
/// classification, dashboards) to pick apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeatherRecord {
    /// The station this record describes.
    pub station: StationId,
    /// Issue/observation time, when the record carried a parseable one.
    pub observation_time: Option<DateTime<Utc>>,
    /// The record's full XML element text, passed through unmodified.
    pub xml: String,
}

/// The final output of a fetch: one record per distinct station.
///
/// Built by the merger from all chunks' records, keeping the most recent
/// record per station. Immutable once returned; iteration order is the
/// station id order, so results are deterministic regardless of chunk
/// completion order.
#[derive(Debug, Clone, Serialize)]
pub struct MergedResult {
    report_type: ReportType,
    records: BTreeMap<StationId, WeatherRecord>,
}

impl MergedResult {
    /// Creates an empty result for the given report kind.
    #[must_use]
    pub const fn empty(report_type: ReportType) -> Self {
        Self {
            report_type,
            records: BTreeMap::new(),
        }
    }

    /// Creates a result from already-deduplicated records.
    #[must_use]
    pub const fn new(report_type: ReportType, records: BTreeMap<StationId, WeatherRecord>) -> Self {
        Self {
            report_type,
            records,
        }
    }

    /// Returns the report kind these records were fetched as.
    #[must_use]
    pub const fn report_type(&self) -> ReportType {
        self.report_type
    }

    /// Returns the number of distinct stations with a record.
    #[must_use]
    pub fn num_results(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the fetch produced no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Looks up the record for a station, if any.
    #[must_use]
    pub fn get(&self, station: &StationId) -> Option<&WeatherRecord> {
        self.records.get(station)
    }

    /// Iterates over records in station id order.
    pub fn records(&self) -> impl Iterator<Item = &WeatherRecord> {
        self.records.values()
    }

    /// Iterates over the stations that have a record, in id order.
    pub fn stations(&self) -> impl Iterator<Item = &StationId> {
        self.records.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str) -> WeatherRecord {
        WeatherRecord {
            station: StationId::parse(code).unwrap(),
            observation_time: None,
            xml: format!("<METAR station_id=\"{code}\"/>"),
        }
    }

    #[test]
    fn test_empty_result() {
        let result = MergedResult::empty(ReportType::Metar);
        assert!(result.is_empty());
        assert_eq!(result.num_results(), 0);
        assert_eq!(result.report_type(), ReportType::Metar);
    }

    #[test]
    fn test_iteration_is_station_ordered() {
        let mut records = BTreeMap::new();
        for code in ["KSEA", "KORD", "KJFK"] {
            records.insert(StationId::parse(code).unwrap(), record(code));
        }
        let result = MergedResult::new(ReportType::Metar, records);

        let stations: Vec<&str> = result.stations().map(StationId::as_str).collect();
        assert_eq!(stations, ["KJFK", "KORD", "KSEA"]);
        assert_eq!(result.num_results(), 3);
    }

    #[test]
    fn test_get_by_station() {
        let mut records = BTreeMap::new();
        records.insert(StationId::parse("KORD").unwrap(), record("KORD"));
        let result = MergedResult::new(ReportType::Metar, records);

        let kord = StationId::parse("KORD").unwrap();
        assert!(result.get(&kord).is_some());
        assert!(result.get(&StationId::parse("KLAX").unwrap()).is_none());
    }
}
