//! End-to-end orchestrator flows against a mock catalog service.

use edu_directory_engine::filter::{Criterion, FilterField, FilterState};
use edu_directory_engine::orchestrator::{Presentation, QueryOrchestrator};
use edu_directory_engine::{CatalogClient, CategoryKind, Config};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.catalog.base_url = base_url.to_string();
    config.catalog.retry_attempts = 0;
    config.catalog.retry_delay_ms = 10;
    config
}

async fn mount_schools(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/schools"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                { "id": "s1", "name": "Science Academy", "typeOfSchool": "CBSE",
                  "city": "Bengaluru", "feesPerYear": 120000 },
                { "id": "s2", "name": "Commerce Hub", "typeOfSchool": "ICSE",
                  "city": "Mysuru", "feesPerYear": 90000 }
            ]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn initial_load_then_client_side_search() {
    let server = MockServer::start().await;
    mount_schools(&server).await;

    let client = Arc::new(CatalogClient::new(&test_config(&server.uri())).unwrap());
    let mut orchestrator = QueryOrchestrator::new(client, CategoryKind::School);

    orchestrator.initial_load().await.unwrap();

    match orchestrator.presentation() {
        Presentation::Results(records) => assert_eq!(records.len(), 2),
        other => panic!("unexpected presentation: {:?}", other),
    }

    orchestrator.set_query("sci");
    match orchestrator.presentation() {
        Presentation::Results(records) => {
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].name, "Science Academy");
        }
        other => panic!("unexpected presentation: {:?}", other),
    }
}

#[tokio::test]
async fn empty_first_load_shows_empty_state() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/schools"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": [] })),
        )
        .mount(&server)
        .await;

    let client = Arc::new(CatalogClient::new(&test_config(&server.uri())).unwrap());
    let mut orchestrator = QueryOrchestrator::new(client, CategoryKind::School);

    orchestrator.initial_load().await.unwrap();

    assert_eq!(orchestrator.presentation(), Presentation::Empty);
    assert!(orchestrator.notice().is_none());
}

#[tokio::test]
async fn failed_server_filter_keeps_previous_working_set() {
    let server = MockServer::start().await;
    mount_schools(&server).await;

    // The search endpoint is down
    Mock::given(method("GET"))
        .and(path("/schools/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = Arc::new(CatalogClient::new(&test_config(&server.uri())).unwrap());
    let mut orchestrator = QueryOrchestrator::new(client, CategoryKind::School);

    orchestrator.initial_load().await.unwrap();

    let mut filters = FilterState::new();
    filters.set(FilterField::Fee, Criterion::Range { min: 0.0, max: 100_000.0 });
    orchestrator.apply_server_filters(filters).await.unwrap();

    // Previous working set survives, narrowed by the (client-replayed) filters
    match orchestrator.presentation() {
        Presentation::Results(records) => {
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].name, "Commerce Hub");
        }
        other => panic!("unexpected presentation: {:?}", other),
    }
    assert!(orchestrator.notice().is_some());
}

#[tokio::test]
async fn reset_refetches_full_collection() {
    let server = MockServer::start().await;
    mount_schools(&server).await;

    let client = Arc::new(CatalogClient::new(&test_config(&server.uri())).unwrap());
    let mut orchestrator = QueryOrchestrator::new(client, CategoryKind::School);

    orchestrator.initial_load().await.unwrap();
    orchestrator.set_query("sci");
    orchestrator.reset_filters().await.unwrap();

    match orchestrator.presentation() {
        Presentation::Results(records) => assert_eq!(records.len(), 2),
        other => panic!("unexpected presentation: {:?}", other),
    }
}
