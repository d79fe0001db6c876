//! Station identifiers and normalized station sets.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder codes used by map layouts for "no data" and legend positions.
///
/// These are not real stations and must never reach the network.
const SENTINEL_CODES: [&str; 2] = ["NULL", "LGND"];

/// Error returned when parsing an invalid station identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid station id: {reason}")]
pub struct InvalidStationId {
    reason: &'static str,
}

/// A validated aviation station identifier (e.g. `KORD`, `EGLL`).
///
/// Station ids are stored in canonical form: trimmed, upper-cased ASCII
/// alphanumerics. The sentinel placeholder codes `NULL` and `LGND` are
/// rejected at construction, so any `StationId` value is a real station
/// by construction.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(String);

impl StationId {
    /// Parses a station id from raw input.
    ///
    /// Leading/trailing whitespace is stripped and the code is upper-cased.
    ///
    /// # Errors
    ///
    /// Returns an error for empty input, non-alphanumeric characters, or
    /// the sentinel placeholder codes.
    pub fn parse(raw: &str) -> Result<Self, InvalidStationId> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InvalidStationId {
                reason: "empty or whitespace-only",
            });
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(InvalidStationId {
                reason: "must be ASCII alphanumeric",
            });
        }

        let canonical = trimmed.to_ascii_uppercase();
        if SENTINEL_CODES.contains(&canonical.as_str()) {
            return Err(InvalidStationId {
                reason: "placeholder code, not a station",
            });
        }

        Ok(Self(canonical))
    }

    /// Returns the canonical station code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// A deduplicated set of station ids, preserving first-seen order.
///
/// Insertion order matters: chunk membership is derived by slicing this
/// set in order, so a given input always produces the same chunks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StationSet {
    stations: Vec<StationId>,
}

impl StationSet {
    /// Builds a station set from raw caller input.
    ///
    /// Entries that fail [`StationId::parse`] (blank, malformed, or
    /// sentinel placeholders) are dropped. Duplicates keep their first
    /// position.
    pub fn normalize<I, S>(raw_codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut stations = Vec::new();

        for raw in raw_codes {
            if let Ok(id) = StationId::parse(raw.as_ref())
                && seen.insert(id.clone())
            {
                stations.push(id);
            }
        }

        Self { stations }
    }

    /// Returns true if the set contains no stations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Returns the number of distinct stations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    /// Returns true if the set contains the given station.
    #[must_use]
    pub fn contains(&self, id: &StationId) -> bool {
        self.stations.contains(id)
    }

    /// Iterates over stations in first-seen order.
    pub fn iter(&self) -> std::slice::Iter<'_, StationId> {
        self.stations.iter()
    }

    /// Splits the set into ordered chunks of at most `max_per_chunk` ids.
    ///
    /// # Panics
    ///
    /// Panics if `max_per_chunk` is zero.
    pub fn chunks(&self, max_per_chunk: usize) -> std::slice::Chunks<'_, StationId> {
        self.stations.chunks(max_per_chunk)
    }
}

impl<'a> IntoIterator for &'a StationSet {
    type Item = &'a StationId;
    type IntoIter = std::slice::Iter<'a, StationId>;

    fn into_iter(self) -> Self::IntoIter {
        self.stations.iter()
    }
}
