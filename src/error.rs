use thiserror::Error;

/// Errors raised while talking to a SPARQL endpoint or walking its result pages.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("http error: status {status}")]
    Http { status: u16 },

    #[error("endpoint returned an HTML error page")]
    HtmlResponse,

    #[error("endpoint timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("response did not decode as {expected}: {message}")]
    Decode { expected: &'static str, message: String },

    #[error("query error: {0}")]
    Query(String),

    #[error("unknown export format: {0}")]
    UnknownFormat(String),

    #[error("{0}")]
    Other(String),
}

impl EngineError {
    /// Status codes the session should retry with backoff.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status } => matches!(status, 429 | 500 | 502 | 503 | 504),
            Self::Transport(_) | Self::Decode { .. } => true,
            _ => false,
        }
    }

    /// Signals that came back on GET should flip the session to POST.
    pub fn is_method_switch(&self) -> bool {
        match self {
            Self::Http { status } => matches!(status, 405 | 414),
            Self::HtmlResponse => true,
            _ => false,
        }
    }
}

/// A mining failure attributed to one dataset row, as surfaced by the orchestrator.
#[derive(Debug, Error)]
#[error("{dataset}: {source}")]
pub struct JobError {
    pub dataset: String,
    #[source]
    pub source: EngineError,
}

impl JobError {
    pub fn new(dataset: impl Into<String>, source: EngineError) -> Self {
        Self {
            dataset: dataset.into(),
            source,
        }
    }
}
