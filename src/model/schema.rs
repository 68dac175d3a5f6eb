use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::model::pattern::{PatternKey, SchemaPattern};

/// Provenance block attached to every mined schema.
#[derive(Debug, Clone)]
pub struct Provenance {
    pub generator: String,
    pub timestamp: DateTime<Utc>,
    pub endpoint_url: String,
    pub dataset_name: String,
    pub graph_uris: Vec<String>,
    pub pattern_count: usize,
    pub strategy: &'static str,
}

impl Provenance {
    pub fn new(
        endpoint_url: impl Into<String>,
        dataset_name: impl Into<String>,
        graph_uris: Vec<String>,
        pattern_count: usize,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            generator: "rdfsolve".to_string(),
            timestamp,
            endpoint_url: endpoint_url.into(),
            dataset_name: dataset_name.into(),
            graph_uris,
            pattern_count,
            strategy: "miner",
        }
    }
}

/// The typed result of mining one endpoint: a deduplicated, insertion-ordered
/// list of schema patterns plus the provenance block describing how they were
/// produced.
#[derive(Debug, Clone)]
pub struct MinedSchema {
    pub patterns: Vec<SchemaPattern>,
    pub provenance: Provenance,
}

/// Accumulates patterns from multiple discovery queries, deduplicating on the
/// 4-tuple key and preserving first-seen order.
#[derive(Debug, Default)]
pub struct PatternAccumulator {
    seen: HashSet<PatternKey>,
    patterns: Vec<SchemaPattern>,
}

impl PatternAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the pattern was newly inserted.
    pub fn insert(&mut self, pattern: SchemaPattern) -> bool {
        let key = pattern.key();
        if self.seen.insert(key) {
            self.patterns.push(pattern);
            true
        } else {
            false
        }
    }

    /// Attach a count to the pattern matching `key`, if present.
    pub fn apply_count(&mut self, key: &PatternKey, count: u64) {
        if let Some(pattern) = self.patterns.iter_mut().find(|p| &p.key() == key) {
            pattern.count = Some(count);
        }
    }

    pub fn into_patterns(self) -> Vec<SchemaPattern> {
        self.patterns
    }
}
