use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::backoff::Backoff;
use crate::error::EngineError;
use crate::transport::{HttpMethod, TransportClient};

/// Stateful wrapper over the transport client for one mining job against one
/// endpoint: method stickiness (GET falls back to POST and never reverts) and
/// retry-with-backoff around transient failures.
pub struct EndpointSession {
    endpoint: String,
    transport: TransportClient,
    requires_post: bool,
    timeout: Duration,
    max_retries: u32,
    backoff: Backoff,
    cancel: CancellationToken,
}

impl EndpointSession {
    pub fn new(endpoint: impl Into<String>, timeout: Duration, max_retries: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            transport: TransportClient::new(),
            requires_post: false,
            timeout,
            max_retries,
            backoff: Backoff::new(initial_backoff, max_backoff),
            cancel: CancellationToken::new(),
        }
    }

    /// Wire up an external cancellation signal. In-flight requests and
    /// backoff sleeps are cut at the next suspension point once cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn requires_post(&self) -> bool {
        self.requires_post
    }

    /// Execute one SPARQL query, honoring method stickiness and the retry
    /// policy. `EngineError::Timeout` is returned unwrapped so the caller (the
    /// paginated iterator) can apply adaptive chunk shrinking instead of a
    /// plain retry.
    pub async fn execute(&mut self, query: &str, accept: &str) -> Result<String, EngineError> {
        let mut attempt = 0u32;
        loop {
            let method = if self.requires_post { HttpMethod::Post } else { HttpMethod::Get };
            let request = self.transport.request(method, &self.endpoint, query, accept, self.timeout);

            let result = tokio::select! {
                result = request => result,
                () = self.cancel.cancelled() => return Err(EngineError::Other("mining job cancelled".to_string())),
            };

            match result {
                Ok(response) => {
                    if response.status >= 200 && response.status < 300 {
                        return Ok(response.body);
                    }
                    let err = EngineError::Http { status: response.status };
                    if err.is_method_switch() && method == HttpMethod::Get {
                        tracing::debug!(endpoint = %self.endpoint, status = response.status, "switching to POST");
                        self.requires_post = true;
                        continue;
                    }
                    if err.is_retryable() {
                        attempt = self.backoff_or_fail(attempt, &err).await?;
                        continue;
                    }
                    return Err(err);
                }
                Err(EngineError::HtmlResponse) => {
                    if method == HttpMethod::Get {
                        tracing::debug!(endpoint = %self.endpoint, "HTML error page on GET, switching to POST");
                        self.requires_post = true;
                        continue;
                    }
                    return Err(EngineError::HtmlResponse);
                }
                Err(err @ EngineError::Timeout(_)) => return Err(err),
                Err(err) if err.is_retryable() => {
                    attempt = self.backoff_or_fail(attempt, &err).await?;
                    continue;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn backoff_or_fail(&self, attempt: u32, err: &EngineError) -> Result<u32, EngineError> {
        if attempt >= self.max_retries {
            return Err(EngineError::Other(format!(
                "exhausted {} retries against {}: {err}",
                self.max_retries, self.endpoint
            )));
        }
        let delay = self.backoff.interval(attempt);
        tracing::warn!(endpoint = %self.endpoint, attempt, ?delay, %err, "retrying after backoff");
        self.sleep_or_cancel(delay).await?;
        Ok(attempt + 1)
    }

    pub(crate) async fn sleep_or_cancel(&self, delay: Duration) -> Result<(), EngineError> {
        tokio::select! {
            () = tokio::time::sleep(delay) => Ok(()),
            () = self.cancel.cancelled() => Err(EngineError::Other("mining job cancelled".to_string())),
        }
    }
}
