//! Batched aviation weather fetching library.
//!
//! This is a facade crate that re-exports functionality from the metarmap
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use metarmap_lib::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = WeatherFetcher::new(ClientConfig::default())?;
//!     let result = fetcher
//!         .fetch(["KORD", "KJFK", "KLAX"], ReportType::Metar)
//!         .await?;
//!
//!     for record in result.records() {
//!         println!("{}: {:?}", record.station, record.observation_time);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/metarmap/metarmap/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use metarmap_types::*;

// Re-export the fetch engine
#[cfg(feature = "fetch")]
pub use metarmap_fetch::{
    BatchFetcher, ChunkError, ChunkOutcome, ClientConfig, DecodeError, Fragment, WeatherFetcher,
    extract, merge, record_count, url,
};

/// Prelude module for convenient imports.
///
/// ```
/// use metarmap_lib::prelude::*;
/// ```
pub mod prelude {
    pub use metarmap_types::{
        FlightCategory, MergedResult, MetarMapError, ReportType, Result, StationId, StationSet,
        WeatherRecord,
    };

    #[cfg(feature = "fetch")]
    pub use metarmap_fetch::{ChunkOutcome, ClientConfig, Fragment, WeatherFetcher};
}
