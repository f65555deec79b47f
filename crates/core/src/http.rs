//! Retrying HTTP transport for network backends.
//!
//! Every request goes through [`HttpClient::send`], which retries transient
//! failures (connection errors, timeouts, 5xx, 429) with exponential backoff
//! and gives up immediately on anything else. The caller's
//! [`CancellationToken`] is raced against both the in-flight request and the
//! backoff sleep; dropping the request future closes its connection.

use crate::config::RetryConfig;
use crate::error::{Error, Result};
use backoff::backoff::Backoff;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// HTTP client with retry and cancellation.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    retry: RetryConfig,
}

impl HttpClient {
    /// Create a client with the given retry policy.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if the TLS backend cannot be initialized.
    pub fn new(retry: RetryConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("appcast/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::invalid_config("http", e.to_string()))?;
        Ok(Self::with_client(client, retry))
    }

    /// Wrap an existing reqwest client.
    #[must_use]
    pub const fn with_client(client: Client, retry: RetryConfig) -> Self {
        Self { client, retry }
    }

    /// The retry policy in use.
    #[must_use]
    pub const fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Send a request, retrying transient failures.
    ///
    /// `build` is called once per attempt so request bodies can be rebuilt.
    /// Only responses with a success status are returned.
    ///
    /// # Errors
    ///
    /// - `Error::Cancelled` once `cancel` fires
    /// - `Error::Http` for non-success statuses (after retries for 5xx/429)
    /// - `Error::Network` when no response could be obtained
    pub async fn send<F>(
        &self,
        cancel: &CancellationToken,
        operation: &str,
        build: F,
    ) -> Result<Response>
    where
        F: Fn(&Client) -> RequestBuilder + Send + Sync,
    {
        let mut backoff = create_backoff(&self.retry);
        let mut attempts = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            attempts += 1;

            let request = build(&self.client).build().map_err(|e| {
                let url = e.url().map(ToString::to_string).unwrap_or_default();
                Error::network(url, e)
            })?;
            let url = request.url().to_string();
            debug!(operation, %url, attempt = attempts, "Sending request");

            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(Error::Cancelled),
                result = self.client.execute(request) => check_status(result, &url),
            };

            let err = match outcome {
                Ok(response) => {
                    if attempts > 1 {
                        debug!(operation, attempts, "Request succeeded after retry");
                    }
                    return Ok(response);
                }
                Err(err) => err,
            };

            if !is_retryable(&err) {
                debug!(operation, error = %err, "Error is not retryable, failing immediately");
                return Err(err);
            }

            if attempts >= self.retry.max_attempts {
                warn!(operation, attempts, error = %err, "Request failed after maximum retries");
                return Err(err);
            }

            let Some(delay) = backoff.next_backoff() else {
                return Err(err);
            };
            warn!(
                operation,
                attempts,
                error = %err,
                retry_in_ms = delay.as_millis(),
                "Request failed, retrying"
            );

            tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(Error::Cancelled),
                () = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// Send a request and decode a JSON response body.
    ///
    /// # Errors
    ///
    /// As [`send`](Self::send), plus `Error::InvalidResponse` when the body
    /// does not decode into `T`.
    pub async fn json<T, F>(&self, cancel: &CancellationToken, operation: &str, build: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn(&Client) -> RequestBuilder + Send + Sync,
    {
        let response = self.send(cancel, operation, build).await?;
        Self::decode_json(cancel, response).await
    }

    /// Decode a JSON body from a response obtained through [`send`](Self::send).
    ///
    /// For callers that need response headers (pagination) before the body.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidResponse` when the body does not decode into
    /// `T`, or `Error::Cancelled`.
    pub async fn decode_json<T>(cancel: &CancellationToken, response: Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = response.url().to_string();
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(Error::Cancelled),
            body = response.json::<T>() => body.map_err(|e| Error::invalid_response(url, e.to_string())),
        }
    }

    /// Send a request and collect the response body.
    ///
    /// # Errors
    ///
    /// As [`send`](Self::send), plus `Error::Network` if the body stream breaks.
    pub async fn bytes<F>(
        &self,
        cancel: &CancellationToken,
        operation: &str,
        build: F,
    ) -> Result<Vec<u8>>
    where
        F: Fn(&Client) -> RequestBuilder + Send + Sync,
    {
        let response = self.send(cancel, operation, build).await?;
        let url = response.url().to_string();
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(Error::Cancelled),
            body = response.bytes() => body.map(|b| b.to_vec()).map_err(|e| Error::network(url, e)),
        }
    }

    /// Size of the resource at `url` from a HEAD request's `Content-Length`.
    ///
    /// The body is never downloaded.
    ///
    /// # Errors
    ///
    /// As [`send`](Self::send), plus `Error::InvalidResponse` when the header
    /// is missing or not a number.
    pub async fn content_length<F>(
        &self,
        cancel: &CancellationToken,
        url: &str,
        decorate: F,
    ) -> Result<u64>
    where
        F: Fn(RequestBuilder) -> RequestBuilder + Send + Sync,
    {
        let response = self
            .send(cancel, "probe_size", |client| decorate(client.head(url)))
            .await?;

        response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .ok_or_else(|| Error::invalid_response(url, "missing or invalid Content-Length"))
    }
}

fn check_status(result: reqwest::Result<Response>, url: &str) -> Result<Response> {
    let response = result.map_err(|e| Error::network(url, e))?;
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(Error::http(status.as_u16(), url))
    }
}

/// Create exponential backoff from config
fn create_backoff(config: &RetryConfig) -> ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_initial_interval(config.initial_backoff())
        .with_max_interval(config.max_backoff())
        .with_multiplier(config.backoff_multiplier)
        .with_max_elapsed_time(None) // We use max_attempts instead
        .build()
}

/// Determine if an error is worth another attempt
#[must_use]
pub fn is_retryable(err: &Error) -> bool {
    match err {
        // Server-side trouble and rate limiting
        Error::Http { status, .. } => *status >= 500 || *status == 429,

        // Connection refused/reset and timeouts; decode and builder errors are final
        Error::Network { source, .. } => {
            source.is_connect() || source.is_timeout() || source.is_request()
        }

        Error::UnknownProviderKind { .. }
        | Error::InvalidConfig { .. }
        | Error::NotFound { .. }
        | Error::AssetNotFound { .. }
        | Error::ObjectNotFound { .. }
        | Error::InvalidResponse { .. }
        | Error::Cancelled
        | Error::Io(_) => false,
    }
}
