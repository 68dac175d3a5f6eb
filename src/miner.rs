use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::error::EngineError;
use crate::model::binding::{Binding, Term};
use crate::model::pattern::{ObjectKind, PatternKey, SchemaPattern};
use crate::model::schema::{MinedSchema, PatternAccumulator, Provenance};
use crate::pagination::PaginatedIterator;
use crate::query::QueryBuilder;
use crate::session::EndpointSession;
use crate::transport::SELECT_ACCEPT;

/// Drives the three discovery queries (and, optionally, their COUNT variants)
/// against one endpoint and assembles a [`MinedSchema`].
pub struct SchemaMiner {
    pub endpoint_url: String,
    pub graph_uris: Option<Vec<String>>,
    pub chunk_size: u32,
    pub delay: Duration,
    pub timeout: Duration,
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub counts: bool,
    pub cancel: CancellationToken,
}

impl SchemaMiner {
    pub async fn mine(&self, dataset_name: &str) -> Result<MinedSchema, EngineError> {
        url::Url::parse(&self.endpoint_url)
            .map_err(|e| EngineError::Other(format!("invalid endpoint URL {}: {e}", self.endpoint_url)))?;

        let mut session = EndpointSession::new(
            &self.endpoint_url,
            self.timeout,
            self.max_retries,
            self.initial_backoff,
            self.max_backoff,
        )
        .with_cancellation(self.cancel.clone());

        let graph_uris = self.graph_uris.as_deref();
        let mut accumulator = PatternAccumulator::new();

        let typed_object = self.run_discovery(&mut session, QueryBuilder::typed_object(graph_uris)).await?;
        for binding in &typed_object {
            if let Some(pattern) = typed_object_pattern(binding) {
                accumulator.insert(pattern);
            }
        }

        let literal = self.run_discovery(&mut session, QueryBuilder::literal(graph_uris)).await?;
        for binding in &literal {
            if let Some(pattern) = literal_pattern(binding) {
                accumulator.insert(pattern);
            }
        }

        let untyped_uri = self.run_discovery(&mut session, QueryBuilder::untyped_uri(graph_uris)).await?;
        for binding in &untyped_uri {
            if let Some(pattern) = untyped_uri_pattern(binding) {
                accumulator.insert(pattern);
            }
        }

        if self.counts {
            self.enrich_counts(&mut session, graph_uris, &mut accumulator).await;
        }

        let patterns = accumulator.into_patterns();
        let provenance = Provenance::new(
            self.endpoint_url.clone(),
            dataset_name.to_string(),
            self.graph_uris.clone().unwrap_or_default(),
            patterns.len(),
            Utc::now(),
        );

        Ok(MinedSchema { patterns, provenance })
    }

    async fn run_discovery(
        &self,
        session: &mut EndpointSession,
        query: crate::query::PagedQuery,
    ) -> Result<Vec<Binding>, EngineError> {
        let iterator = PaginatedIterator::new(session, query, SELECT_ACCEPT, self.chunk_size, self.delay);
        iterator.collect_all().await
    }

    /// COUNT queries are best-effort: a failure here is logged and swallowed,
    /// never fails the overall mining job.
    async fn enrich_counts(
        &self,
        session: &mut EndpointSession,
        graph_uris: Option<&[String]>,
        accumulator: &mut PatternAccumulator,
    ) {
        let jobs: [(&str, crate::query::PagedQuery); 3] = [
            ("typed-object counts", QueryBuilder::typed_object_count(graph_uris)),
            ("literal counts", QueryBuilder::literal_count(graph_uris)),
            ("untyped-uri counts", QueryBuilder::untyped_uri_count(graph_uris)),
        ];

        for (label, query) in jobs {
            match self.run_discovery(session, query).await {
                Ok(bindings) => {
                    for binding in &bindings {
                        if let Some((key, count)) = count_binding(binding) {
                            accumulator.apply_count(&key, count);
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(endpoint = %self.endpoint_url, %err, "{label} query failed, continuing without counts");
                }
            }
        }
    }
}

fn typed_object_pattern(binding: &Binding) -> Option<SchemaPattern> {
    let sc = binding.get("sc")?.as_str().to_string();
    let p = binding.get("p")?.as_str().to_string();
    let oc = binding.get("oc")?.as_str().to_string();
    Some(SchemaPattern::new(sc, p, ObjectKind::Class(oc)))
}

fn literal_pattern(binding: &Binding) -> Option<SchemaPattern> {
    let sc = binding.get("sc")?.as_str().to_string();
    let p = binding.get("p")?.as_str().to_string();
    let datatype = binding.get("dt").map(|t| t.as_str().to_string());
    Some(SchemaPattern::new(sc, p, ObjectKind::Literal { datatype }))
}

fn untyped_uri_pattern(binding: &Binding) -> Option<SchemaPattern> {
    let sc = binding.get("sc")?.as_str().to_string();
    let p = binding.get("p")?.as_str().to_string();
    Some(SchemaPattern::new(sc, p, ObjectKind::Resource))
}

/// Extract `(key, count)` from a COUNT result row, tolerating whichever of
/// `oc`/`dt` columns the variant actually carries. A count that fails to
/// parse as `u64` is treated as absent rather than erroring the whole phase.
fn count_binding(binding: &Binding) -> Option<(PatternKey, u64)> {
    let sc = binding.get("sc")?.as_str().to_string();
    let p = binding.get("p")?.as_str().to_string();
    let cnt = binding.get("cnt").and_then(parse_count)?;

    let pattern = if let Some(oc) = binding.get("oc") {
        SchemaPattern::new(sc, p, ObjectKind::Class(oc.as_str().to_string()))
    } else if binding.contains_key("dt") {
        let datatype = binding.get("dt").map(|t| t.as_str().to_string());
        SchemaPattern::new(sc, p, ObjectKind::Literal { datatype })
    } else {
        SchemaPattern::new(sc, p, ObjectKind::Resource)
    };

    Some((pattern.key(), cnt))
}

fn parse_count(term: &Term) -> Option<u64> {
    term.as_str().parse::<u64>().ok()
}
