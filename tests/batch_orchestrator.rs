use rdfsolve::config::Config;
use rdfsolve::model::source::SourceRecord;
use rdfsolve::orchestrator::{BatchOrchestrator, RowStatus};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

const EMPTY_RESULTS: &str = r#"{"head":{"vars":[]},"results":{"bindings":[]}}"#;

fn source(dataset_name: &str, endpoint_url: &str) -> SourceRecord {
    SourceRecord {
        dataset_name: dataset_name.to_string(),
        endpoint_url: endpoint_url.to_string(),
        graph_uri: String::new(),
        use_graph: false,
        two_phase: false,
    }
}

#[tokio::test]
async fn mixed_batch_preserves_row_order_and_writes_files_only_for_success() {
    let ok_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_RESULTS))
        .mount(&ok_server)
        .await;

    let fail_server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(400)).mount(&fail_server).await;

    let sources = vec![
        source("alpha", &ok_server.uri()),
        source("beta", ""),
        source("gamma", &fail_server.uri()),
        source("delta", &ok_server.uri()),
    ];

    let mut config = Config::default();
    config.max_retries = 0;
    config.delay = std::time::Duration::from_millis(0);

    let output_dir = tempfile::tempdir().unwrap();
    let orchestrator = BatchOrchestrator::new(config);

    let mut seen = Vec::new();
    let result = orchestrator
        .run(&sources, output_dir.path(), |name, idx, total, status| {
            seen.push((idx, total, name.to_string(), format!("{status:?}")));
        })
        .await
        .unwrap();

    assert_eq!(result.succeeded, vec!["alpha".to_string(), "delta".to_string()]);
    assert_eq!(result.skipped, vec!["beta".to_string()]);
    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].dataset, "gamma");

    // Row order is preserved in the progress callback too.
    let names: Vec<_> = seen.iter().map(|(_, _, name, _)| name.clone()).collect();
    assert_eq!(names, vec!["alpha", "beta", "gamma", "delta"]);
    assert!(seen.iter().all(|(_, total, ..)| *total == 4));

    assert!(output_dir.path().join("alpha_schema.jsonld").exists());
    assert!(output_dir.path().join("alpha_void.ttl").exists());
    assert!(output_dir.path().join("delta_schema.jsonld").exists());
    assert!(!output_dir.path().join("beta_schema.jsonld").exists());
    assert!(!output_dir.path().join("gamma_schema.jsonld").exists());
}

#[tokio::test]
async fn row_status_matches_the_callback_invocation() {
    let ok_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_RESULTS))
        .mount(&ok_server)
        .await;

    let sources = vec![source("only", &ok_server.uri())];
    let output_dir = tempfile::tempdir().unwrap();
    let orchestrator = BatchOrchestrator::new(Config::default());

    let mut statuses = Vec::new();
    orchestrator
        .run(&sources, output_dir.path(), |_, _, _, status| {
            statuses.push(matches!(status, RowStatus::Succeeded));
        })
        .await
        .unwrap();

    assert_eq!(statuses, vec![true]);
}
