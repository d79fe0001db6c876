//! Per-chunk HTTP fetching with retry and backoff.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use metarmap_types::MetarMapError;
use tokio::time::{Instant, sleep};
use tracing::{debug, warn};

use crate::extract::{DecodeError, Fragment, extract};
use crate::transport::{HttpTransport, Transport};
use crate::url::DEFAULT_BASE_URL;

/// HTTP statuses worth retrying: transient server trouble, rate limiting,
/// and the service's occasional spurious 400s on well-formed requests.
const RETRYABLE_STATUSES: [u16; 6] = [400, 429, 500, 502, 503, 504];

/// Configuration for the fetch engine.
///
/// An explicit value passed into constructors; no component reads ambient
/// process state after construction.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the remote data API.
    pub base_url: String,
    /// Maximum station ids per request, kept safely below the service's
    /// undocumented per-request cap.
    pub max_per_request: usize,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Total attempts per chunk (first try included).
    pub retries: u32,
    /// Base delay for exponential backoff between retries.
    pub base_delay: Duration,
    /// Ceiling for a single backoff delay.
    pub max_delay: Duration,
    /// Pause between successive chunk requests (not between retries).
    pub inter_batch_delay: Duration,
    /// Hours of data to request.
    pub hours: f64,
    /// User agent string.
    pub user_agent: String,
    /// Verbose batch diagnostics (per-chunk record counts).
    pub debug_batch: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_per_request: 380,
            timeout: Duration::from_secs(15),
            retries: 3,
            base_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(30),
            inter_batch_delay: Duration::from_millis(200),
            hours: 2.5,
            user_agent: format!("metarmap/{}", env!("CARGO_PKG_VERSION")),
            debug_batch: false,
        }
    }
}

impl ClientConfig {
    /// Builds a configuration from defaults plus `METARMAP_*` environment
    /// overrides.
    ///
    /// Recognized variables: `METARMAP_MAX_PER_REQUEST`,
    /// `METARMAP_TIMEOUT_SECS`, `METARMAP_RETRIES`,
    /// `METARMAP_RETRY_DELAY_SECS`, `METARMAP_INTER_BATCH_MS`,
    /// `METARMAP_HOURS`, and `METARMAP_DEBUG_BATCH` (`1`/`true`).
    /// Unparseable values fall back to the default.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(max) = env_parse::<usize>("METARMAP_MAX_PER_REQUEST") {
            config.max_per_request = max.max(1);
        }
        if let Some(secs) = env_parse::<u64>("METARMAP_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = env_parse::<u32>("METARMAP_RETRIES") {
            config.retries = retries.max(1);
        }
        if let Some(secs) = env_parse::<u64>("METARMAP_RETRY_DELAY_SECS") {
            config.base_delay = Duration::from_secs(secs);
        }
        if let Some(ms) = env_parse::<u64>("METARMAP_INTER_BATCH_MS") {
            config.inter_batch_delay = Duration::from_millis(ms);
        }
        if let Some(hours) = env_parse::<f64>("METARMAP_HOURS") {
            config.hours = hours;
        }
        if let Ok(value) = std::env::var("METARMAP_DEBUG_BATCH") {
            config.debug_batch = matches!(value.trim(), "1" | "true" | "TRUE");
        }
        config
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok()?.trim().parse().ok()
}

/// Why a chunk produced no data.
#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    /// Every retry of a retryable HTTP status failed.
    #[error("HTTP {last_status} persisted through {attempts} attempts")]
    RetriesExhausted {
        /// Status of the final attempt.
        last_status: u16,
        /// Number of attempts made.
        attempts: u32,
    },

    /// The service answered with a status that is not worth retrying.
    #[error("non-retryable HTTP status {status}")]
    NonRetryable {
        /// The offending status code.
        status: u16,
    },

    /// Network-level failure (timeout, connection refused, ...).
    #[error("network failure after {attempts} attempts: {message}")]
    Network {
        /// Number of attempts made.
        attempts: u32,
        /// Underlying error description.
        message: String,
    },

    /// The response body was not valid text.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The caller's deadline expired mid-retry.
    #[error("deadline expired while backing off")]
    DeadlineExceeded,
}

/// The outcome of fetching one chunk.
///
/// Failures are values, not exceptions: the orchestrator switches on the
/// outcome and degrades failed chunks to "no data" instead of aborting
/// the whole fetch.
#[derive(Debug)]
pub enum ChunkOutcome {
    /// The chunk produced a data fragment.
    Fragment(Fragment),
    /// The service reported no content for the chunk (HTTP 204).
    Empty,
    /// The chunk could not be fetched; carries the reason for logging.
    Failed(ChunkError),
}

/// Fetches single chunks with retry, backoff, and error classification.
pub struct BatchFetcher {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
}

impl BatchFetcher {
    /// Creates a fetcher backed by a pooled HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self, MetarMapError> {
        let transport = HttpTransport::new(config.timeout, &config.user_agent)
            .map_err(|e| MetarMapError::Client(e.to_string()))?;
        Ok(Self {
            transport: Arc::new(transport),
            config,
        })
    }

    /// Creates a fetcher over an arbitrary transport (tests).
    #[cfg(test)]
    pub(crate) fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self { transport, config }
    }

    /// Returns the fetcher configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetches one chunk URL, retrying transient failures.
    ///
    /// - 204 stops immediately and counts as empty, not an error.
    /// - Retryable statuses and transient network errors back off
    ///   exponentially (`base_delay * 2^attempt_index`, capped).
    /// - Anything else fails the chunk without retrying.
    ///
    /// If `deadline` is given and a backoff sleep would outlive it, the
    /// chunk gives up with [`ChunkError::DeadlineExceeded`].
    pub async fn fetch_chunk(&self, url: &str, deadline: Option<Instant>) -> ChunkOutcome {
        let mut attempt: u32 = 0;

        loop {
            let cause = match self.transport.get(url).await {
                Ok(response) => match response.status {
                    204 => {
                        debug!(url, "no content for chunk");
                        return ChunkOutcome::Empty;
                    }
                    status if (200..300).contains(&status) => {
                        return match extract(&response.body) {
                            Ok(fragment) => ChunkOutcome::Fragment(fragment),
                            Err(e) => ChunkOutcome::Failed(ChunkError::Decode(e)),
                        };
                    }
                    status if RETRYABLE_STATUSES.contains(&status) => RetryCause::Status(status),
                    status => {
                        return ChunkOutcome::Failed(ChunkError::NonRetryable { status });
                    }
                },
                Err(e) if e.retryable => RetryCause::Network(e.message),
                Err(e) => {
                    return ChunkOutcome::Failed(ChunkError::Network {
                        attempts: attempt + 1,
                        message: e.message,
                    });
                }
            };

            attempt += 1;
            if attempt >= self.config.retries {
                return ChunkOutcome::Failed(match cause {
                    RetryCause::Status(status) => ChunkError::RetriesExhausted {
                        last_status: status,
                        attempts: attempt,
                    },
                    RetryCause::Network(message) => ChunkError::Network {
                        attempts: attempt,
                        message,
                    },
                });
            }

            let delay = self.backoff_delay(attempt - 1);
            warn!(
                url,
                attempt,
                delay_ms = delay.as_millis() as u64,
                cause = %cause,
                "chunk attempt failed, backing off"
            );

            if let Some(deadline) = deadline
                && Instant::now() + delay >= deadline
            {
                return ChunkOutcome::Failed(ChunkError::DeadlineExceeded);
            }
            sleep(delay).await;
        }
    }

    /// Backoff delay for the given zero-based attempt index.
    fn backoff_delay(&self, attempt_index: u32) -> Duration {
        let factor = 1u32 << attempt_index.min(10);
        self.config
            .base_delay
            .saturating_mul(factor)
            .min(self.config.max_delay)
    }
}

impl fmt::Debug for BatchFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchFetcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// What triggered a retry, for logging and final classification.
enum RetryCause {
    Status(u16),
    Network(String),
}

impl fmt::Display for RetryCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(status) => write!(f, "HTTP {status}"),
            Self::Network(message) => f.write_str(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::testing::{Reply, ScriptedTransport};

    const OK_BODY: &str = "h0\nh1\nh2\nh3\nh4\nh5\nh6\nh7\n<data num_results=\"1\">\n<METAR station_id=\"KORD\"></METAR>\n</data>\nfooter";

    fn fetcher(transport: ScriptedTransport) -> (BatchFetcher, Arc<ScriptedTransport>) {
        let transport = Arc::new(transport);
        let fetcher = BatchFetcher::with_transport(ClientConfig::default(), transport.clone());
        (fetcher, transport)
    }

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.max_per_request, 380);
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.retries, 3);
        assert_eq!(config.base_delay, Duration::from_secs(5));
        assert_eq!(config.inter_batch_delay, Duration::from_millis(200));
        assert!(!config.debug_batch);
    }

    #[test]
    fn test_backoff_delay_doubles_and_caps() {
        let (fetcher, _) = fetcher(ScriptedTransport::default());
        assert_eq!(fetcher.backoff_delay(0), Duration::from_secs(5));
        assert_eq!(fetcher.backoff_delay(1), Duration::from_secs(10));
        assert_eq!(fetcher.backoff_delay(2), Duration::from_secs(20));
        // Capped at max_delay.
        assert_eq!(fetcher.backoff_delay(5), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_success_returns_fragment() {
        let (fetcher, transport) =
            fetcher(ScriptedTransport::sequence([Reply::StatusBody(
                200,
                OK_BODY.to_string(),
            )]));

        match fetcher.fetch_chunk("http://test/metar", None).await {
            ChunkOutcome::Fragment(fragment) => {
                assert!(fragment.lines()[0].contains("<data"));
            }
            other => panic!("expected fragment, got {other:?}"),
        }
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_204_is_empty_without_retries() {
        let (fetcher, transport) =
            fetcher(ScriptedTransport::sequence([Reply::Status(204, "")]));

        assert!(matches!(
            fetcher.fetch_chunk("http://test/metar", None).await,
            ChunkOutcome::Empty
        ));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_500_retries_with_exponential_backoff() {
        let (fetcher, transport) = fetcher(ScriptedTransport::always(Reply::Status(500, "")));

        let started = Instant::now();
        let outcome = fetcher.fetch_chunk("http://test/metar", None).await;

        match outcome {
            ChunkOutcome::Failed(ChunkError::RetriesExhausted {
                last_status,
                attempts,
            }) => {
                assert_eq!(last_status, 500);
                assert_eq!(attempts, 3);
            }
            other => panic!("expected retries exhausted, got {other:?}"),
        }
        assert_eq!(transport.request_count(), 3);
        // Two backoff sleeps: 5s * 2^0 + 5s * 2^1.
        assert_eq!(started.elapsed(), Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_error_retries_then_succeeds() {
        let (fetcher, transport) = fetcher(ScriptedTransport::sequence([
            Reply::NetworkError { retryable: true },
            Reply::StatusBody(200, OK_BODY.to_string()),
        ]));

        assert!(matches!(
            fetcher.fetch_chunk("http://test/metar", None).await,
            ChunkOutcome::Fragment(_)
        ));
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_status_fails_immediately() {
        let (fetcher, transport) =
            fetcher(ScriptedTransport::sequence([Reply::Status(404, "")]));

        assert!(matches!(
            fetcher.fetch_chunk("http://test/metar", None).await,
            ChunkOutcome::Failed(ChunkError::NonRetryable { status: 404 })
        ));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_non_retryable_network_error_fails_immediately() {
        let (fetcher, transport) = fetcher(ScriptedTransport::sequence([Reply::NetworkError {
            retryable: false,
        }]));

        assert!(matches!(
            fetcher.fetch_chunk("http://test/metar", None).await,
            ChunkOutcome::Failed(ChunkError::Network { attempts: 1, .. })
        ));
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_utf8_body_is_decode_failure() {
        let (fetcher, _) = fetcher(ScriptedTransport::sequence([Reply::StatusRaw(
            200,
            vec![0xff, 0xfe, 0x00],
        )]));

        assert!(matches!(
            fetcher.fetch_chunk("http://test/metar", None).await,
            ChunkOutcome::Failed(ChunkError::Decode(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_cuts_backoff_short() {
        let (fetcher, transport) = fetcher(ScriptedTransport::always(Reply::Status(503, "")));

        let deadline = Instant::now() + Duration::from_secs(1);
        let outcome = fetcher
            .fetch_chunk("http://test/metar", Some(deadline))
            .await;

        assert!(matches!(
            outcome,
            ChunkOutcome::Failed(ChunkError::DeadlineExceeded)
        ));
        assert_eq!(transport.request_count(), 1);
    }
}
