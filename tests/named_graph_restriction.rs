use std::time::Duration;

use rdfsolve::query::QueryBuilder;
use rdfsolve::session::EndpointSession;
use rdfsolve::transport::SELECT_ACCEPT;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const EMPTY_RESULTS: &str = r#"{"head":{"vars":[]},"results":{"bindings":[]}}"#;

fn query_param_value(req: &Request) -> String {
    req.url
        .query_pairs()
        .find(|(k, _)| k == "query")
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}

#[tokio::test]
async fn single_graph_restriction_is_sent_on_the_wire() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(move |req: &Request| query_param_value(req).contains("GRAPH <http://example.org/g1> {"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_RESULTS))
        .mount(&server)
        .await;

    let mut session = EndpointSession::new(
        server.uri(),
        Duration::from_secs(5),
        1,
        Duration::from_millis(1),
        Duration::from_millis(5),
    );

    let graphs = vec!["http://example.org/g1".to_string()];
    let query = QueryBuilder::typed_object(Some(&graphs)).render(0, 100);

    let body = session.execute(&query, SELECT_ACCEPT).await.unwrap();
    assert!(body.contains("bindings"));
}

#[tokio::test]
async fn multiple_graph_restriction_uses_values_binding_on_the_wire() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(move |req: &Request| {
            let q = query_param_value(req);
            q.contains("VALUES (?_g)") && q.contains("GRAPH ?_g {")
        })
        .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_RESULTS))
        .mount(&server)
        .await;

    let mut session = EndpointSession::new(
        server.uri(),
        Duration::from_secs(5),
        1,
        Duration::from_millis(1),
        Duration::from_millis(5),
    );

    let graphs = vec!["http://example.org/g1".to_string(), "http://example.org/g2".to_string()];
    let query = QueryBuilder::literal(Some(&graphs)).render(0, 100);

    let body = session.execute(&query, SELECT_ACCEPT).await.unwrap();
    assert!(body.contains("bindings"));
}
