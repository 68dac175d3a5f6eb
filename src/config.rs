use std::env;
use std::time::Duration;

/// Tuning knobs for the batch orchestrator and the schema miner it drives.
#[derive(Debug, Clone)]
pub struct Config {
    pub chunk_size: u32,
    pub timeout: Duration,
    pub delay: Duration,
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub counts: bool,
    pub output_dir: String,
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    JsonLd,
    Void,
    All,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jsonld" => Ok(Self::JsonLd),
            "void" => Ok(Self::Void),
            "all" => Ok(Self::All),
            other => Err(format!("unknown format: {other}")),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: 10_000,
            timeout: Duration::from_secs(120),
            delay: Duration::from_millis(500),
            max_retries: 10,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
            counts: true,
            output_dir: "mined_schemas".to_string(),
            format: OutputFormat::All,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = env::var("RDFSOLVE_CHUNK_SIZE") {
            match v.parse() {
                Ok(n) => {
                    config.chunk_size = n;
                    tracing::debug!(chunk_size = n, "RDFSOLVE_CHUNK_SIZE override applied");
                }
                Err(_) => tracing::warn!("RDFSOLVE_CHUNK_SIZE is not a valid integer, ignoring"),
            }
        }

        if let Ok(v) = env::var("RDFSOLVE_TIMEOUT_SECS") {
            match parse_positive_secs(&v) {
                Some(secs) => {
                    config.timeout = Duration::from_secs_f64(secs);
                    tracing::debug!(timeout_secs = secs, "RDFSOLVE_TIMEOUT_SECS override applied");
                }
                None => tracing::warn!("RDFSOLVE_TIMEOUT_SECS is not a positive, finite number, ignoring"),
            }
        }

        if let Ok(v) = env::var("RDFSOLVE_DELAY_MS") {
            match v.parse() {
                Ok(ms) => {
                    config.delay = Duration::from_millis(ms);
                    tracing::debug!(delay_ms = ms, "RDFSOLVE_DELAY_MS override applied");
                }
                Err(_) => tracing::warn!("RDFSOLVE_DELAY_MS is not a valid integer, ignoring"),
            }
        }

        if let Ok(v) = env::var("RDFSOLVE_MAX_RETRIES") {
            match v.parse() {
                Ok(n) => {
                    config.max_retries = n;
                    tracing::debug!(max_retries = n, "RDFSOLVE_MAX_RETRIES override applied");
                }
                Err(_) => tracing::warn!("RDFSOLVE_MAX_RETRIES is not a valid integer, ignoring"),
            }
        }

        if let Ok(v) = env::var("RDFSOLVE_COUNTS") {
            config.counts = matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
            tracing::debug!(counts = config.counts, "RDFSOLVE_COUNTS override applied");
        }

        if let Ok(v) = env::var("RDFSOLVE_OUTPUT_DIR") {
            tracing::debug!(output_dir = %v, "RDFSOLVE_OUTPUT_DIR override applied");
            config.output_dir = v;
        }

        if let Ok(v) = env::var("RDFSOLVE_FORMAT") {
            match v.parse() {
                Ok(fmt) => {
                    config.format = fmt;
                    tracing::debug!(format = %v, "RDFSOLVE_FORMAT override applied");
                }
                Err(_) => tracing::warn!("RDFSOLVE_FORMAT is not jsonld/void/all, ignoring"),
            }
        }

        config
    }
}

/// Rejects anything `Duration::from_secs_f64` can't represent as a timeout:
/// negative, zero, `NaN`, or infinite values.
fn parse_positive_secs(raw: &str) -> Option<f64> {
    let secs: f64 = raw.parse().ok()?;
    (secs.is_finite() && secs > 0.0).then_some(secs)
}
