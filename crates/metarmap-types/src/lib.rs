//! Core types for the metarmap aviation weather fetcher.
//!
//! This crate provides the fundamental data structures used throughout
//! metarmap:
//!
//! - [`StationId`] - A validated, canonical station identifier
//! - [`StationSet`] - A deduplicated, insertion-ordered set of stations
//! - [`ReportType`] - The two report kinds the fetcher handles (METAR/TAF)
//! - [`WeatherRecord`] - One parsed observation or forecast for a station
//! - [`MergedResult`] - The deduplicated output of a multi-chunk fetch
//! - [`FlightCategory`] - Category levels consumed by display collaborators

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/metarmap/metarmap/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod category;
mod error;
mod record;
mod report;
mod station;

pub use category::FlightCategory;
pub use error::{MetarMapError, Result};
pub use record::{MergedResult, WeatherRecord};
pub use report::{ReportType, ReportTypeParseError};
pub use station::{InvalidStationId, StationId, StationSet};
