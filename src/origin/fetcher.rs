//! Origin fetching with a hard deadline and cache-busting

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use reqwest::header::CACHE_CONTROL;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::MirrorError;

// == Fetch Outcome ==
/// Result of one origin attempt, before or after integrity verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Delivered { content: Bytes },
    TimedOut,
    UpstreamError(UpstreamFailure),
    /// Digest prefixes only; the offending content is already dropped.
    IntegrityMismatch { expected: String, got: String },
}

/// Why origin failed to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamFailure {
    Status(u16),
    Transport(String),
}

impl FetchOutcome {
    /// Converts to the delivered content or the classified failure.
    ///
    /// `timeout` is only used to describe a `TimedOut` outcome.
    pub fn into_result(self, timeout: Duration) -> Result<Bytes, MirrorError> {
        match self {
            FetchOutcome::Delivered { content } => Ok(content),
            FetchOutcome::TimedOut => Err(MirrorError::FetchTimeout(timeout.as_millis() as u64)),
            FetchOutcome::UpstreamError(UpstreamFailure::Status(status)) => {
                Err(MirrorError::UpstreamHttp(status))
            }
            FetchOutcome::UpstreamError(UpstreamFailure::Transport(reason)) => {
                Err(MirrorError::UpstreamTransport(reason))
            }
            FetchOutcome::IntegrityMismatch { expected, got } => {
                Err(MirrorError::IntegrityMismatch { expected, got })
            }
        }
    }
}

// == Origin Fetcher Trait ==
/// Single-attempt retrieval of a resource from upstream.
///
/// Implementations make each attempt observe the true origin state and must
/// give up (cancelling the in-flight request) once `timeout` elapses. No
/// retries happen at this layer.
#[async_trait]
pub trait OriginFetcher: Send + Sync {
    async fn fetch(&self, locator: &str, timeout: Duration) -> FetchOutcome;
}

// == Cache Busting ==
/// Appends a `cb` query parameter carrying `token` to `locator`.
pub fn cache_busted(locator: &str, token: &str) -> String {
    let separator = if locator.contains('?') { '&' } else { '?' };
    format!("{}{}cb={}", locator, separator, token)
}

// == HTTP Fetcher ==
/// reqwest-backed fetcher used in production.
pub struct HttpFetcher {
    client: Client,
    sequence: AtomicU64,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            sequence: AtomicU64::new(0),
        }
    }

    /// Current Unix milliseconds plus a per-process sequence number, so two
    /// attempts within the same millisecond still differ.
    fn next_token(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", Utc::now().timestamp_millis(), seq)
    }

    async fn fetch_once(&self, url: &str) -> FetchOutcome {
        let response = match self
            .client
            .get(url)
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Origin request failed");
                return FetchOutcome::UpstreamError(UpstreamFailure::Transport(e.to_string()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "Origin returned non-success status");
            return FetchOutcome::UpstreamError(UpstreamFailure::Status(status.as_u16()));
        }

        match response.bytes().await {
            Ok(content) => {
                debug!(size = content.len(), "Fetched script from origin");
                FetchOutcome::Delivered { content }
            }
            Err(e) => {
                warn!(error = %e, "Failed to read origin body");
                FetchOutcome::UpstreamError(UpstreamFailure::Transport(e.to_string()))
            }
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OriginFetcher for HttpFetcher {
    async fn fetch(&self, locator: &str, timeout: Duration) -> FetchOutcome {
        let url = cache_busted(locator, &self.next_token());
        debug!(url = %url, timeout_ms = timeout.as_millis() as u64, "Fetching from origin");

        // Dropping the request future on expiry aborts the connection and
        // discards any partially received body.
        match tokio::time::timeout(timeout, self.fetch_once(&url)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(url = %url, "Origin fetch timed out");
                FetchOutcome::TimedOut
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_busted_without_query() {
        assert_eq!(
            cache_busted("https://example.com/targets/deck.sh", "123-0"),
            "https://example.com/targets/deck.sh?cb=123-0"
        );
    }

    #[test]
    fn test_cache_busted_with_query() {
        assert_eq!(
            cache_busted("https://example.com/deck.sh?ref=main", "123-0"),
            "https://example.com/deck.sh?ref=main&cb=123-0"
        );
    }

    #[test]
    fn test_tokens_differ_between_calls() {
        let fetcher = HttpFetcher::new();
        let first = fetcher.next_token();
        let second = fetcher.next_token();
        assert_ne!(first, second);
    }

    #[test]
    fn test_into_result_classifies_failures() {
        let timeout = Duration::from_millis(250);

        assert_eq!(
            FetchOutcome::TimedOut.into_result(timeout),
            Err(MirrorError::FetchTimeout(250))
        );
        assert_eq!(
            FetchOutcome::UpstreamError(UpstreamFailure::Status(404)).into_result(timeout),
            Err(MirrorError::UpstreamHttp(404))
        );
        assert!(matches!(
            FetchOutcome::UpstreamError(UpstreamFailure::Transport("refused".into()))
                .into_result(timeout),
            Err(MirrorError::UpstreamTransport(_))
        ));
        assert_eq!(
            FetchOutcome::Delivered {
                content: Bytes::from_static(b"ok")
            }
            .into_result(timeout),
            Ok(Bytes::from_static(b"ok"))
        );
    }

    #[tokio::test]
    async fn test_unreachable_origin_is_upstream_error() {
        // Reserve a port, then release it so nothing is listening there.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = HttpFetcher::new();
        let outcome = fetcher
            .fetch(&format!("http://{}/deck.sh", addr), Duration::from_secs(5))
            .await;

        assert!(matches!(
            outcome,
            FetchOutcome::UpstreamError(UpstreamFailure::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_stalled_body_times_out() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Headers promise 100 bytes, only 7 arrive, then the socket idles.
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\npartial")
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let fetcher = HttpFetcher::new();
        let started = std::time::Instant::now();
        let outcome = fetcher
            .fetch(&format!("http://{}/deck.sh", addr), Duration::from_millis(300))
            .await;
        let elapsed = started.elapsed();

        assert_eq!(outcome, FetchOutcome::TimedOut);
        assert!(elapsed < Duration::from_secs(2), "took {:?}", elapsed);

        server.abort();
    }
}
