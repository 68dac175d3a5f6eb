use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use crate::model::pattern::ObjectKind;
use crate::model::schema::MinedSchema;

/// Base prefix table, registered before any graph-derived prefix, matching
/// the standard vocabularies the original miner always bound.
const BASE_PREFIXES: &[(&str, &str)] = &[
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("skos", "http://www.w3.org/2004/02/skos/core#"),
    ("dc", "http://purl.org/dc/elements/1.1/"),
    ("dcterms", "http://purl.org/dc/terms/"),
    ("foaf", "http://xmlns.com/foaf/0.1/"),
    ("void", "http://rdfs.org/ns/void#"),
    ("sd", "http://www.w3.org/ns/sparql-service-description#"),
    ("sh", "http://www.w3.org/ns/shacl#"),
    ("schema", "http://schema.org/"),
    ("prov", "http://www.w3.org/ns/prov#"),
];

/// Serialize a mined schema as a JSON-LD document: `@context`, `@graph` (one
/// node per subject class), and an `@about` provenance block.
pub fn to_jsonld(schema: &MinedSchema) -> Value {
    let mut context = Map::new();
    let mut prefixes: Vec<(String, String)> =
        BASE_PREFIXES.iter().map(|(p, u)| ((*p).to_string(), (*u).to_string())).collect();
    for (prefix, uri) in BASE_PREFIXES {
        context.insert((*prefix).to_string(), json!(uri));
    }
    for (prefix, uri) in graph_derived_prefixes(schema) {
        context.entry(prefix.clone()).or_insert_with(|| json!(&uri));
        if !prefixes.iter().any(|(p, _)| p == &prefix) {
            prefixes.push((prefix, uri));
        }
    }

    let mut by_class: BTreeMap<&str, Vec<&crate::model::pattern::SchemaPattern>> = BTreeMap::new();
    for pattern in &schema.patterns {
        by_class.entry(pattern.subject_class.as_str()).or_default().push(pattern);
    }

    // Preserve first-seen class order rather than the BTreeMap's lexical order.
    let mut class_order = Vec::new();
    for pattern in &schema.patterns {
        if !class_order.contains(&pattern.subject_class.as_str()) {
            class_order.push(pattern.subject_class.as_str());
        }
    }

    let graph: Vec<Value> = class_order
        .into_iter()
        .map(|class| {
            let mut node = Map::new();
            node.insert("@id".to_string(), json!(class));

            let mut by_property: BTreeMap<&str, Vec<Value>> = BTreeMap::new();
            for pattern in &by_class[class] {
                by_property
                    .entry(pattern.property_uri.as_str())
                    .or_default()
                    .push(object_value(&pattern.object_kind, &prefixes));
            }

            let mut property_order = Vec::new();
            for pattern in &by_class[class] {
                if !property_order.contains(&pattern.property_uri.as_str()) {
                    property_order.push(pattern.property_uri.as_str());
                }
            }

            for property in property_order {
                let mut values = by_property.remove(property).unwrap_or_default();
                let value = if values.len() == 1 {
                    values.remove(0)
                } else {
                    json!(values)
                };
                node.insert(property.to_string(), value);
            }

            Value::Object(node)
        })
        .collect();

    json!({
        "@context": context,
        "@graph": graph,
        "@about": {
            "generator": schema.provenance.generator,
            "timestamp": schema.provenance.timestamp.to_rfc3339(),
            "endpoint": schema.provenance.endpoint_url,
            "dataset": schema.provenance.dataset_name,
            "graphs": schema.provenance.graph_uris,
            "patternCount": schema.provenance.pattern_count,
            "strategy": schema.provenance.strategy,
        }
    })
}

fn object_value(kind: &ObjectKind, prefixes: &[(String, String)]) -> Value {
    match kind {
        ObjectKind::Class(uri) => json!({ "@id": uri }),
        ObjectKind::Literal { datatype: Some(dt) } => json!({ "@id": uri_to_curie(dt, prefixes) }),
        ObjectKind::Literal { datatype: None } => json!("Literal"),
        ObjectKind::Resource => json!({ "@id": "rdfs:Resource" }),
    }
}

/// Compact a URI to a `prefix:local` CURIE against the registered prefix
/// table, falling back to the full URI when no prefix matches.
fn uri_to_curie(uri: &str, prefixes: &[(String, String)]) -> String {
    for (prefix, namespace) in prefixes {
        if let Some(local) = uri.strip_prefix(namespace.as_str()) {
            if !local.is_empty() {
                return format!("{prefix}:{local}");
            }
        }
    }
    uri.to_string()
}

/// Every URI seen in the schema that doesn't fall under a base prefix gets no
/// further compaction in this implementation; this hook exists so that a
/// future prefix-substitution pass (see Open Questions) has a single place to
/// register additional prefixes feeding both `@context` and `uri_to_curie`
/// without touching the graph-building logic.
fn graph_derived_prefixes(_schema: &MinedSchema) -> Vec<(String, String)> {
    Vec::new()
}
