/// A SPARQL query with an explicit offset/limit slot, rendered by direct
/// string splicing rather than a generic `str.format`-style template engine —
/// the SPARQL body's own `{ }` blocks never need escaping because the
/// placeholder is never embedded inside the body text.
#[derive(Debug, Clone)]
pub struct PagedQuery {
    body: String,
}

impl PagedQuery {
    fn new(body: String) -> Self {
        Self { body }
    }

    pub fn render(&self, offset: u64, limit: u32) -> String {
        format!("{}\nLIMIT {}\nOFFSET {}\n", self.body, limit, offset)
    }
}

fn graph_clause(graph_uris: Option<&[String]>, body: &str) -> String {
    match graph_uris {
        None => body.to_string(),
        Some([uri]) => format!("GRAPH <{uri}> {{ {body} }}"),
        Some(uris) => {
            let values = uris.iter().map(|u| format!("(<{u}>)")).collect::<Vec<_>>().join(" ");
            format!("VALUES (?_g) {{ {values} }} GRAPH ?_g {{ {body} }}")
        }
    }
}

/// The three discovery queries plus their COUNT variants, run in this fixed
/// order by the miner: typed-object, literal, untyped-URI.
pub struct QueryBuilder;

impl QueryBuilder {
    pub fn typed_object(graph_uris: Option<&[String]>) -> PagedQuery {
        let pattern = "?s ?p ?o . ?s a ?sc . ?o a ?oc .";
        let body = format!(
            "SELECT DISTINCT ?sc ?p ?oc WHERE {{ {} }}",
            graph_clause(graph_uris, pattern)
        );
        PagedQuery::new(body)
    }

    pub fn literal(graph_uris: Option<&[String]>) -> PagedQuery {
        let pattern = "?s ?p ?o . ?s a ?sc . FILTER(isLiteral(?o)) BIND(DATATYPE(?o) AS ?dt)";
        let body = format!(
            "SELECT DISTINCT ?sc ?p ?dt WHERE {{ {} }}",
            graph_clause(graph_uris, pattern)
        );
        PagedQuery::new(body)
    }

    pub fn untyped_uri(graph_uris: Option<&[String]>) -> PagedQuery {
        let pattern =
            "?s ?p ?o . ?s a ?sc . FILTER(isURI(?o)) FILTER NOT EXISTS { ?o a ?any }";
        let body = format!(
            "SELECT DISTINCT ?sc ?p WHERE {{ {} }}",
            graph_clause(graph_uris, pattern)
        );
        PagedQuery::new(body)
    }

    pub fn typed_object_count(graph_uris: Option<&[String]>) -> PagedQuery {
        let pattern = "?s ?p ?o . ?s a ?sc . ?o a ?oc .";
        let body = format!(
            "SELECT ?sc ?p ?oc (COUNT(*) AS ?cnt) WHERE {{ {} }} GROUP BY ?sc ?p ?oc",
            graph_clause(graph_uris, pattern)
        );
        PagedQuery::new(body)
    }

    pub fn literal_count(graph_uris: Option<&[String]>) -> PagedQuery {
        let pattern = "?s ?p ?o . ?s a ?sc . FILTER(isLiteral(?o)) BIND(DATATYPE(?o) AS ?dt)";
        let body = format!(
            "SELECT ?sc ?p ?dt (COUNT(*) AS ?cnt) WHERE {{ {} }} GROUP BY ?sc ?p ?dt",
            graph_clause(graph_uris, pattern)
        );
        PagedQuery::new(body)
    }

    pub fn untyped_uri_count(graph_uris: Option<&[String]>) -> PagedQuery {
        let pattern =
            "?s ?p ?o . ?s a ?sc . FILTER(isURI(?o)) FILTER NOT EXISTS { ?o a ?any }";
        let body = format!(
            "SELECT ?sc ?p (COUNT(*) AS ?cnt) WHERE {{ {} }} GROUP BY ?sc ?p",
            graph_clause(graph_uris, pattern)
        );
        PagedQuery::new(body)
    }
}
