//! HTTP transport seam.
//!
//! The batch fetcher talks to the network through the [`Transport`] trait so
//! the retry and chunking logic can be exercised against scripted responses.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

/// A raw HTTP response: status code plus opaque body bytes.
#[derive(Debug, Clone)]
pub(crate) struct TransportResponse {
    pub(crate) status: u16,
    pub(crate) body: Bytes,
}

/// A network-level failure, classified for retry purposes.
#[derive(Debug, Clone)]
pub(crate) struct TransportError {
    pub(crate) message: String,
    pub(crate) retryable: bool,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        // Builder errors are configuration problems; everything transient
        // (timeouts, connection failures, mid-request errors) is retryable.
        let retryable =
            !error.is_builder() && (error.is_timeout() || error.is_connect() || error.is_request());
        Self {
            message: error.to_string(),
            retryable,
        }
    }
}

/// One HTTP GET, however it is carried out.
#[async_trait]
pub(crate) trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError>;
}

/// The production transport: a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub(crate) struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds a client with the given request timeout and user agent.
    pub(crate) fn new(timeout: Duration, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .user_agent(user_agent)
            .gzip(true)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted transport for exercising retry and chunking behavior.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// One scripted reply.
    #[derive(Debug, Clone)]
    pub(crate) enum Reply {
        Status(u16, &'static str),
        StatusBody(u16, String),
        StatusRaw(u16, Vec<u8>),
        NetworkError { retryable: bool },
    }

    /// A transport that serves scripted replies and records request URLs.
    ///
    /// Replies are consumed in order; once the script runs out, the
    /// fallback reply (if any) repeats forever.
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedTransport {
        replies: Mutex<VecDeque<Reply>>,
        fallback: Option<Reply>,
        requests: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        pub(crate) fn sequence(replies: impl IntoIterator<Item = Reply>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().collect()),
                fallback: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn always(reply: Reply) -> Self {
            Self {
                replies: Mutex::new(VecDeque::new()),
                fallback: Some(reply),
                requests: Mutex::new(Vec::new()),
            }
        }

        /// Returns the URLs requested so far, in order.
        pub(crate) fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }

        pub(crate) fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
            self.requests.lock().unwrap().push(url.to_string());

            let reply = self
                .replies
                .lock()
                .unwrap()
                .pop_front()
                .or_else(|| self.fallback.clone())
                .expect("scripted transport exhausted");

            match reply {
                Reply::Status(status, body) => Ok(TransportResponse {
                    status,
                    body: Bytes::from_static(body.as_bytes()),
                }),
                Reply::StatusBody(status, body) => Ok(TransportResponse {
                    status,
                    body: Bytes::from(body),
                }),
                Reply::StatusRaw(status, body) => Ok(TransportResponse {
                    status,
                    body: Bytes::from(body),
                }),
                Reply::NetworkError { retryable } => Err(TransportError {
                    message: "scripted network error".to_string(),
                    retryable,
                }),
            }
        }
    }
}
