use std::time::Duration;

use rdfsolve::session::EndpointSession;
use rdfsolve::transport::SELECT_ACCEPT;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EMPTY_RESULTS: &str = r#"{"head":{"vars":[]},"results":{"bindings":[]}}"#;

#[tokio::test]
async fn get_that_returns_html_switches_to_post_and_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sparql"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<!DOCTYPE html><html>blocked</html>"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/sparql"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_RESULTS))
        .mount(&server)
        .await;

    let mut session = EndpointSession::new(
        format!("{}/sparql", server.uri()),
        Duration::from_secs(5),
        3,
        Duration::from_millis(1),
        Duration::from_millis(10),
    );

    assert!(!session.requires_post());
    let body = session.execute("SELECT * WHERE { ?s ?p ?o }", SELECT_ACCEPT).await.unwrap();
    assert!(body.contains("bindings"));
    assert!(session.requires_post());
}

#[tokio::test]
async fn method_stickiness_survives_a_second_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/sparql"))
        .respond_with(ResponseTemplate::new(405))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/sparql"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_RESULTS))
        .mount(&server)
        .await;

    let mut session = EndpointSession::new(
        format!("{}/sparql", server.uri()),
        Duration::from_secs(5),
        3,
        Duration::from_millis(1),
        Duration::from_millis(10),
    );

    session.execute("SELECT * WHERE { ?s ?p ?o }", SELECT_ACCEPT).await.unwrap();
    assert!(session.requires_post());

    // Second query never touches GET again: the mock would 405 it, but since
    // the mock for GET has no upper bound on hits, a regression back to GET
    // would still succeed against the mock. We assert on session state instead.
    session.execute("SELECT * WHERE { ?s ?p ?o }", SELECT_ACCEPT).await.unwrap();
    assert!(session.requires_post());
}
