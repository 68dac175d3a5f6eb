use std::time::Duration;

use reqwest::Client;

use crate::error::EngineError;

const USER_AGENT: &str = "rdfsolve/1.0 (SPARQL client)";
const HTML_MARKERS: [&str; 4] = ["<!DOCTYPE", "<!doctype", "<html", "<HTML"];

pub const SELECT_ACCEPT: &str = "application/sparql-results+json, application/sparql-results+xml;q=0.9";
pub const CONSTRUCT_ACCEPT: &str =
    "text/turtle, text/n3;q=0.9, application/n-triples;q=0.8, application/rdf+xml;q=0.7";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// The outcome of one HTTP round trip, before session-level retry policy is applied.
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Performs a single SPARQL HTTP request. Holds no retry or method-stickiness
/// state — that lives one layer up, in the endpoint session.
pub struct TransportClient {
    client: Client,
}

impl TransportClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .expect("failed to build HTTP client");
        Self { client }
    }

    pub async fn request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        query: &str,
        accept: &str,
        timeout: Duration,
    ) -> Result<RawResponse, EngineError> {
        let request = match method {
            HttpMethod::Get => self
                .client
                .get(endpoint)
                .query(&[("query", query)])
                .header(reqwest::header::ACCEPT, accept)
                .header(reqwest::header::USER_AGENT, USER_AGENT),
            HttpMethod::Post => self
                .client
                .post(endpoint)
                .form(&[("query", query)])
                .header(reqwest::header::ACCEPT, accept)
                .header(reqwest::header::USER_AGENT, USER_AGENT),
        };

        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_send_error(e, timeout))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(EngineError::Transport)?;

        if (200..300).contains(&status) && is_html_error(&body) {
            return Err(EngineError::HtmlResponse);
        }

        Ok(RawResponse { status, body })
    }
}

impl Default for TransportClient {
    fn default() -> Self {
        Self::new()
    }
}

fn classify_send_error(err: reqwest::Error, timeout: Duration) -> EngineError {
    if err.is_timeout() {
        EngineError::Timeout(timeout)
    } else {
        EngineError::Transport(err)
    }
}

/// A 2xx body that is actually an HTML error page (reverse proxy, WAF, gateway
/// timeout page) must be treated as an error regardless of its content-type.
fn is_html_error(body: &str) -> bool {
    let trimmed = body.trim_start();
    HTML_MARKERS.iter().any(|marker| trimmed.starts_with(marker))
}
