//! The top-level fetch façade.
//!
//! Normalizes caller input, plans chunks, drives the per-chunk fetcher
//! sequentially with an inter-batch pause, and hands the collected
//! fragments to the merger. Individual chunk failures degrade to missing
//! data; the only hard errors are construction-time ones.

use metarmap_types::{MergedResult, MetarMapError, ReportType, StationId, StationSet};
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::client::{BatchFetcher, ChunkOutcome, ClientConfig};
use crate::extract::Fragment;
use crate::merge::{merge, record_count};
use crate::url::report_url;

/// Fetches METAR/TAF reports for arbitrarily large station lists.
#[derive(Debug)]
pub struct WeatherFetcher {
    fetcher: BatchFetcher,
}

impl WeatherFetcher {
    /// Creates a fetcher with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is unusable (empty base
    /// URL, zero chunk size) or the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self, MetarMapError> {
        if config.base_url.trim().is_empty() {
            return Err(MetarMapError::InvalidConfig(
                "base URL must not be empty".to_string(),
            ));
        }
        if config.max_per_request == 0 {
            return Err(MetarMapError::InvalidConfig(
                "max_per_request must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            fetcher: BatchFetcher::new(config)?,
        })
    }

    /// Creates a fetcher with default configuration plus environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_env() -> Result<Self, MetarMapError> {
        Self::new(ClientConfig::from_env())
    }

    #[cfg(test)]
    pub(crate) fn with_transport(
        config: ClientConfig,
        transport: std::sync::Arc<dyn crate::transport::Transport>,
    ) -> Self {
        Self {
            fetcher: BatchFetcher::with_transport(config, transport),
        }
    }

    /// Returns the fetcher configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        self.fetcher.config()
    }

    /// Fetches reports of the given kind for the given station codes.
    ///
    /// Input is normalized first (trimmed, upper-cased, deduplicated,
    /// placeholders dropped); an input that normalizes to nothing returns
    /// an empty result without any network activity. Oversized station
    /// lists are split into ordered chunks fetched sequentially.
    ///
    /// # Errors
    ///
    /// Network and HTTP failures for individual chunks never surface
    /// here; they degrade to missing stations in the result.
    pub async fn fetch<I, S>(
        &self,
        raw_codes: I,
        report_type: ReportType,
    ) -> Result<MergedResult, MetarMapError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.fetch_with_deadline(raw_codes, report_type, None).await
    }

    /// Like [`fetch`](Self::fetch), aborting between chunks once the
    /// deadline passes.
    ///
    /// On expiry the chunks fetched so far are merged and returned, so a
    /// caller still gets partial data.
    ///
    /// # Errors
    ///
    /// See [`fetch`](Self::fetch).
    pub async fn fetch_with_deadline<I, S>(
        &self,
        raw_codes: I,
        report_type: ReportType,
        deadline: Option<Instant>,
    ) -> Result<MergedResult, MetarMapError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.fetch_with_options(raw_codes, report_type, None, deadline)
            .await
    }

    /// Like [`fetch`](Self::fetch), with per-call overrides.
    ///
    /// `hours` overrides the configured data window for this call only;
    /// `deadline` bounds the whole fetch as in
    /// [`fetch_with_deadline`](Self::fetch_with_deadline).
    ///
    /// # Errors
    ///
    /// See [`fetch`](Self::fetch).
    pub async fn fetch_with_options<I, S>(
        &self,
        raw_codes: I,
        report_type: ReportType,
        hours: Option<f64>,
        deadline: Option<Instant>,
    ) -> Result<MergedResult, MetarMapError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let config = self.config();
        let hours = hours.unwrap_or(config.hours);
        let stations = StationSet::normalize(raw_codes);

        if stations.is_empty() {
            warn!(report = %report_type, "no valid station codes after normalization");
            return Ok(MergedResult::empty(report_type));
        }

        let chunks: Vec<&[StationId]> = stations.chunks(config.max_per_request).collect();
        if config.debug_batch {
            info!(
                "Batching {} stations into {} batches of max {}",
                stations.len(),
                chunks.len(),
                config.max_per_request
            );
        } else if chunks.len() > 1 {
            info!(
                stations = stations.len(),
                batches = chunks.len(),
                report = %report_type,
                "fetching in chunks"
            );
        }

        let mut fragments: Vec<Fragment> = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.iter().enumerate() {
            if let Some(deadline) = deadline
                && Instant::now() >= deadline
            {
                warn!(
                    fetched = index,
                    remaining = chunks.len() - index,
                    "deadline reached, returning partial data"
                );
                break;
            }

            let url = report_url(&config.base_url, report_type, hours, chunk);
            debug!(batch = index, stations = chunk.len(), url, "fetching chunk");

            match self.fetcher.fetch_chunk(&url, deadline).await {
                ChunkOutcome::Fragment(fragment) => {
                    if config.debug_batch {
                        info!(
                            batch = index,
                            records = record_count(&fragment, report_type),
                            "chunk parsed"
                        );
                    }
                    fragments.push(fragment);
                }
                ChunkOutcome::Empty => {
                    debug!(batch = index, "chunk returned no content");
                }
                ChunkOutcome::Failed(error) => {
                    warn!(batch = index, error = %error, "chunk failed, continuing without it");
                }
            }

            // Be polite to the remote service between batches; retries of
            // one chunk have their own backoff.
            if index + 1 < chunks.len() {
                sleep(config.inter_batch_delay).await;
            }
        }

        let result = merge(&fragments, report_type);
        if config.debug_batch {
            info!(
                "Final result: {} unique stations after deduplication",
                result.num_results()
            );
        }
        Ok(result)
    }

    /// Probes the remote service with a single well-known station.
    ///
    /// Returns true if the service answered the probe at all (data or an
    /// explicit no-content), false otherwise.
    pub async fn check_connection(&self) -> bool {
        let Ok(probe) = StationId::parse("KORD") else {
            return false;
        };
        let url = report_url(
            &self.config().base_url,
            ReportType::Metar,
            1.0,
            std::slice::from_ref(&probe),
        );
        matches!(
            self.fetcher.fetch_chunk(&url, None).await,
            ChunkOutcome::Fragment(_) | ChunkOutcome::Empty
        )
    }
}
