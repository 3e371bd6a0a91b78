//! HTTP client behaviour against a mock MeSH service

use mesh_enrich_core::{
    ClientConfig, ConceptIdentifier, ConceptResolver, DiagnosticKind, HierarchyClassifier,
    HttpVocabularyClient, LookupError, NotFoundReason, OutputShape, RowEnricher, SourceRow,
    TopLevelLabelCache, VocabularyClient,
};
use serde_json::json;
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpVocabularyClient {
    HttpVocabularyClient::new(&ClientConfig {
        base_url: server.uri(),
        sparql_url: None,
        timeout: Duration::from_secs(2),
        request_spacing: Duration::ZERO,
    })
    .unwrap()
}

fn simvastatin() -> serde_json::Value {
    json!({
        "@id": "http://id.nlm.nih.gov/mesh/D015059",
        "label": {"@value": "Simvastatin", "@language": "en"},
        "treeNumber": [
            "http://id.nlm.nih.gov/mesh/D27.505.954.249",
            "http://id.nlm.nih.gov/mesh/D27.720.259"
        ]
    })
}

fn sparql_label(label: &str) -> serde_json::Value {
    json!({
        "head": {"vars": ["label"]},
        "results": {"bindings": [
            {"label": {"type": "literal", "xml:lang": "en", "value": label}}
        ]}
    })
}

#[tokio::test]
async fn test_fetch_descriptor_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/D015059.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(simvastatin()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let doc = client
        .fetch_descriptor(&ConceptIdentifier::from("MESH:D015059"))
        .await
        .unwrap();
    assert_eq!(doc["label"]["@value"], "Simvastatin");
}

#[tokio::test]
async fn test_404_is_unknown_identifier() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/D999999.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_descriptor(&"D999999".into())
        .await
        .unwrap_err();
    assert_eq!(
        err.not_found_reason(),
        Some(NotFoundReason::UnknownIdentifier)
    );
    assert_eq!(err.to_string(), "MeSH ID not found: D999999");
}

#[tokio::test]
async fn test_server_error_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_descriptor(&"D015059".into())
        .await
        .unwrap_err();
    assert!(err.is_unavailable());
    assert_eq!(err.to_string(), "API error (status 503): D015059");
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_descriptor(&"D015059".into())
        .await
        .unwrap_err();
    assert!(matches!(err, LookupError::Malformed { .. }), "{err:?}");
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(simvastatin())
                .set_delay(Duration::from_millis(800)),
        )
        .mount(&server)
        .await;

    let client = HttpVocabularyClient::new(&ClientConfig {
        base_url: server.uri(),
        sparql_url: None,
        timeout: Duration::from_millis(100),
        request_spacing: Duration::ZERO,
    })
    .unwrap();

    let err = client.fetch_descriptor(&"D015059".into()).await.unwrap_err();
    assert!(matches!(err, LookupError::Timeout { .. }), "{err:?}");
    assert_eq!(err.to_string(), "Timeout querying API for: D015059");
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Bind then drop to get a port with nothing listening
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let client = HttpVocabularyClient::new(&ClientConfig {
        base_url: format!("http://127.0.0.1:{port}"),
        ..ClientConfig::default()
    })
    .unwrap();

    let err = client.fetch_descriptor(&"D015059".into()).await.unwrap_err();
    assert!(matches!(err, LookupError::Network { .. }), "{err:?}");
}

#[tokio::test]
async fn test_sparql_label_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sparql"))
        .and(query_param("format", "JSON"))
        .and(query_param("limit", "1"))
        .and(query_param("inference", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sparql_label("Chemical Actions and Uses")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let label = client.descriptor_label_at("D27").await.unwrap();
    assert_eq!(label.as_deref(), Some("Chemical Actions and Uses"));

    let requests = server.received_requests().await.unwrap();
    let query = requests[0]
        .url
        .query_pairs()
        .find(|(k, _)| k == "query")
        .map(|(_, v)| v.into_owned())
        .unwrap();
    assert!(query.contains("meshv:treeNumber mesh:D27 ."));
    assert!(query.contains("rdfs:label ?label"));
}

#[tokio::test]
async fn test_sparql_empty_bindings_is_no_label() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sparql"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"head": {"vars": ["label"]}, "results": {"bindings": []}})),
        )
        .mount(&server)
        .await;

    let label = client_for(&server).descriptor_label_at("B01").await.unwrap();
    assert_eq!(label, None);
}

#[tokio::test]
async fn test_sparql_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sparql"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client_for(&server).descriptor_label_at("C01").await.unwrap_err();
    assert!(err.is_unavailable());
}

#[tokio::test]
async fn test_request_spacing_is_enforced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(simvastatin()))
        .mount(&server)
        .await;

    let client = HttpVocabularyClient::new(&ClientConfig {
        base_url: server.uri(),
        sparql_url: None,
        timeout: Duration::from_secs(2),
        request_spacing: Duration::from_millis(150),
    })
    .unwrap();

    let start = Instant::now();
    for _ in 0..3 {
        client.fetch_descriptor(&"D015059".into()).await.unwrap();
    }
    assert!(start.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn test_row_enrichment_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/D015059.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(simvastatin()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sparql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sparql_label("Chemical Actions and Uses")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/D999999.json"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client: Arc<dyn VocabularyClient> = Arc::new(client_for(&server));
    let enricher = RowEnricher::new(
        ConceptResolver::new(client.clone()),
        HierarchyClassifier::new(client, Arc::new(TopLevelLabelCache::default())),
        OutputShape::Hierarchical,
    );

    let ok = enricher
        .enrich(
            SourceRow {
                number: 1,
                values: vec!["simvastatin".into(), "MESH:D015059".into()],
            },
            Some(1),
        )
        .await;
    assert_eq!(
        ok.into_record(OutputShape::Hierarchical),
        vec![
            "simvastatin",
            "MESH:D015059",
            "Simvastatin",
            "D27.505.954.249;D27.720.259",
            "Simvastatin;Simvastatin",
            "D27",
            "Chemical Actions and Uses",
        ]
    );

    // Second row with the same top-level code is served from the cache
    let again = enricher
        .enrich(
            SourceRow {
                number: 2,
                values: vec!["simvastatin".into(), "MESH:D015059".into()],
            },
            Some(1),
        )
        .await;
    assert!(again.enrichment().is_some());

    let missing = enricher
        .enrich(
            SourceRow {
                number: 3,
                values: vec!["unknown".into(), "MESH:D999999".into()],
            },
            Some(1),
        )
        .await;
    assert_eq!(missing.diagnostic().unwrap().kind, DiagnosticKind::NotFound);
    assert_eq!(
        missing.diagnostic().unwrap().message,
        "MeSH ID not found: MESH:D999999"
    );
    assert_eq!(
        missing.into_record(OutputShape::Hierarchical)[2..],
        vec![String::new(); 5]
    );
}
