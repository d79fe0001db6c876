//! Cross-chunk record merging with per-station deduplication.
//!
//! Each chunk's fragment is parsed independently; a fragment that fails to
//! parse is logged and skipped, never aborting the merge. Per station, the
//! record with the most recent resolvable observation time wins; records
//! without a usable timestamp are kept only when nothing else has been seen
//! for that station, in chunk-index order so results are deterministic.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::{debug, warn};

use metarmap_types::{MergedResult, ReportType, StationId, WeatherRecord};

use crate::extract::Fragment;

/// Merges all chunks' fragments into one deduplicated result.
///
/// Fragments must be passed in chunk-index order; the order only matters
/// for the untimestamped first-seen tie-break.
#[must_use]
pub fn merge(fragments: &[Fragment], report_type: ReportType) -> MergedResult {
    let mut retained: BTreeMap<StationId, WeatherRecord> = BTreeMap::new();

    for (chunk_index, fragment) in fragments.iter().enumerate() {
        if fragment.is_empty() {
            continue;
        }
        let document = fragment.to_document();
        match parse_records(&document, report_type) {
            Ok(records) => {
                debug!(
                    chunk = chunk_index,
                    records = records.len(),
                    "parsed chunk fragment"
                );
                for record in records {
                    retain(&mut retained, record);
                }
            }
            Err(e) => {
                warn!(chunk = chunk_index, error = %e, "skipping unparseable fragment");
            }
        }
    }

    MergedResult::new(report_type, retained)
}

/// Counts the parseable records in a single fragment (verbose diagnostics).
#[must_use]
pub fn record_count(fragment: &Fragment, report_type: ReportType) -> usize {
    if fragment.is_empty() {
        return 0;
    }
    parse_records(&fragment.to_document(), report_type)
        .map(|records| records.len())
        .unwrap_or(0)
}

/// Applies the deduplication rule for one incoming record.
fn retain(retained: &mut BTreeMap<StationId, WeatherRecord>, record: WeatherRecord) {
    match retained.get(&record.station) {
        None => {
            retained.insert(record.station.clone(), record);
        }
        Some(existing) => {
            // An untimestamped record never replaces anything; a timestamped
            // one replaces the retained record only if strictly newer (equal
            // timestamps keep the earlier chunk's record).
            if let Some(new_time) = record.observation_time
                && existing.observation_time.is_none_or(|old| old < new_time)
            {
                retained.insert(record.station.clone(), record);
            }
        }
    }
}

/// Parses every record element of the requested kind out of a document.
fn parse_records(document: &str, report_type: ReportType) -> quick_xml::Result<Vec<WeatherRecord>> {
    let element = report_type.element_name().as_bytes();
    let mut reader = Reader::from_str(document);
    let mut records = Vec::new();

    loop {
        let tag_start = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == element => {
                let station_attr = attr_value(&e, "station_id");
                let end = e.to_end().into_owned();
                let inner_span = reader.read_to_end(end.name())?;
                let inner = &document[inner_span.start as usize..inner_span.end as usize];
                let raw = document[tag_start..reader.buffer_position() as usize]
                    .trim()
                    .to_string();

                if let Some(record) = build_record(station_attr, inner, raw, report_type) {
                    records.push(record);
                }
            }
            Event::Empty(e) if e.local_name().as_ref() == element => {
                let station_attr = attr_value(&e, "station_id");
                let raw = document[tag_start..reader.buffer_position() as usize]
                    .trim()
                    .to_string();

                if let Some(record) = build_record(station_attr, "", raw, report_type) {
                    records.push(record);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(records)
}

/// Assembles a record, resolving the station id from the attribute or the
/// nested field. Records with no resolvable station are dropped.
fn build_record(
    station_attr: Option<String>,
    inner: &str,
    raw: String,
    report_type: ReportType,
) -> Option<WeatherRecord> {
    let station_text = station_attr.or_else(|| child_text(inner, "station_id"))?;
    let station = StationId::parse(&station_text).ok()?;
    let observation_time = resolve_time(inner, report_type);

    Some(WeatherRecord {
        station,
        observation_time,
        xml: raw,
    })
}

/// Resolves the record's time field.
///
/// METAR carries a single canonical `observation_time`; TAF prefers the
/// `issue_time` and falls back to `valid_time_from`.
fn resolve_time(inner: &str, report_type: ReportType) -> Option<DateTime<Utc>> {
    let fields: &[&str] = match report_type {
        ReportType::Metar => &["observation_time"],
        ReportType::Taf => &["issue_time", "valid_time_from"],
    };
    fields
        .iter()
        .find_map(|field| child_text(inner, field))
        .and_then(|text| parse_iso8601(&text))
}

/// Parses an ISO-8601 timestamp, accepting a trailing `Z` UTC designator.
fn parse_iso8601(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Returns the text of the first direct child element with the given name.
fn child_text(inner: &str, name: &str) -> Option<String> {
    let mut reader = Reader::from_str(inner);
    let mut depth = 0usize;
    loop {
        match reader.read_event().ok()? {
            Event::Start(e) => {
                if depth == 0 && e.local_name().as_ref() == name.as_bytes() {
                    let end = e.to_end().into_owned();
                    return reader
                        .read_text(end.name())
                        .ok()
                        .map(|text| text.trim().to_string());
                }
                depth += 1;
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Eof => return None,
            _ => {}
        }
    }
}

/// Extracts and unescapes one attribute value.
fn attr_value(e: &BytesStart<'_>, name: &str) -> Option<String> {
    e.try_get_attribute(name)
        .ok()
        .flatten()
        .and_then(|attr| attr.unescape_value().ok())
        .map(|value| value.into_owned())
}
