use std::collections::HashMap;

use crate::error::EngineError;

/// One RDF term as it appears in a SPARQL JSON results binding.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    Uri(String),
    Literal {
        value: String,
        datatype: Option<String>,
        lang: Option<String>,
    },
    BNode(String),
}

impl Term {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Uri(v) | Self::BNode(v) => v,
            Self::Literal { value, .. } => value,
        }
    }
}

/// A single result row: variable name -> bound term. Unbound variables are absent.
pub type Binding = HashMap<String, Term>;

/// One page of SPARQL SELECT results.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub bindings: Vec<Binding>,
}

impl Page {
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Parse a SPARQL 1.1 `application/sparql-results+json` document into a [`Page`].
pub fn parse_select_results(body: &str) -> Result<Page, EngineError> {
    let doc: serde_json::Value = serde_json::from_str(body).map_err(|e| EngineError::Decode {
        expected: "sparql-results+json",
        message: e.to_string(),
    })?;

    let rows = doc
        .get("results")
        .and_then(|r| r.get("bindings"))
        .and_then(|b| b.as_array())
        .ok_or_else(|| EngineError::Decode {
            expected: "sparql-results+json",
            message: "missing results.bindings array".to_string(),
        })?;

    let mut bindings = Vec::with_capacity(rows.len());
    for row in rows {
        let obj = row.as_object().ok_or_else(|| EngineError::Decode {
            expected: "sparql-results+json",
            message: "binding row is not an object".to_string(),
        })?;

        let mut binding = Binding::new();
        for (var, cell) in obj {
            if let Some(term) = parse_term(cell) {
                binding.insert(var.clone(), term);
            }
        }
        bindings.push(binding);
    }

    Ok(Page { bindings })
}

fn parse_term(cell: &serde_json::Value) -> Option<Term> {
    let kind = cell.get("type")?.as_str()?;
    let value = cell.get("value")?.as_str()?.to_string();
    match kind {
        "uri" => Some(Term::Uri(value)),
        "bnode" => Some(Term::BNode(value)),
        "literal" | "typed-literal" => Some(Term::Literal {
            value,
            datatype: cell
                .get("datatype")
                .and_then(|d| d.as_str())
                .map(|s| s.to_string()),
            lang: cell
                .get("xml:lang")
                .and_then(|l| l.as_str())
                .map(|s| s.to_string()),
        }),
        _ => None,
    }
}
