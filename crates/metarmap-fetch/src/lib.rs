//! Resilient batched METAR/TAF fetching.
//!
//! This crate provides the fetch pipeline:
//!
//! - [`url::report_url`] - Constructs data API request URLs
//! - [`extract`](extract()) - Recovers the XML fragment from a noisy response body
//! - [`BatchFetcher`] - Per-chunk HTTP fetching with retry and backoff
//! - [`merge`] - Cross-chunk merging with per-station deduplication
//! - [`WeatherFetcher`] - The top-level fetch façade

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/metarmap/metarmap/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod extract;
mod fetcher;
mod merge;
mod transport;
pub mod url;

pub use client::{BatchFetcher, ChunkError, ChunkOutcome, ClientConfig};
pub use extract::{DecodeError, Fragment, extract};
pub use fetcher::WeatherFetcher;
pub use merge::{merge, record_count};
