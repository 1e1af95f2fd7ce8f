//! Integration tests for the catalog client against a mock catalog service.

use edu_directory_engine::catalog::{translate_filters, CatalogSource};
use edu_directory_engine::filter::{Criterion, FilterField, FilterState, MatchMode};
use edu_directory_engine::normalize::RatingPolicy;
use edu_directory_engine::{CatalogClient, CategoryKind, Config, DirectoryError};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.catalog.base_url = base_url.to_string();
    config.catalog.retry_attempts = 2;
    config.catalog.retry_delay_ms = 10;
    config
}

#[tokio::test]
async fn fetch_normalizes_and_dedupes_array_payload() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/schools"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                { "id": "a1", "name": "Sunrise School", "typeOfSchool": "CBSE", "city": "Bengaluru" },
                { "id": "a1", "name": "Sunrise School", "typeOfSchool": "CBSE", "city": "Bengaluru" },
                { "id": "b2", "name": "Hillside School", "location": "Mysuru" }
            ]
        })))
        .mount(&server)
        .await;

    let client =
        CatalogClient::with_rating_policy(&test_config(&server.uri()), RatingPolicy::Fixed(4.5))
            .unwrap();
    let records = client
        .fetch_and_normalize(CategoryKind::School, &[])
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, "a1");
    assert_eq!(records[0].category_type, "CBSE");
    assert_eq!(records[1].city, "Mysuru");
    assert_eq!(records[1].category_type, "Other");
    assert_eq!(records[1].rating, 4.5);

    let stats = client.stats(CategoryKind::School).await;
    assert_eq!(stats.fetched, 3);
    assert_eq!(stats.normalized, 2);
    assert_eq!(stats.duplicates_dropped, 1);
}

#[tokio::test]
async fn fetch_coerces_keyed_map_payload() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/coaching"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "c1": { "id": "c1", "name": "Prime Coaching", "city": "Bengaluru" },
                "c2": { "id": "c2", "name": "Apex Coaching", "city": "Hubballi" }
            }
        })))
        .mount(&server)
        .await;

    let client = CatalogClient::new(&test_config(&server.uri())).unwrap();
    let records = client
        .fetch_and_normalize(CategoryKind::Coaching, &[])
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    // Absent tags fall back to the coaching defaults
    assert_eq!(records[0].tags, vec!["JEE", "NEET"]);
}

#[tokio::test]
async fn recoverable_failure_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/schools"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/schools"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [ { "id": "a1", "name": "Recovered School", "city": "Bengaluru" } ]
        })))
        .mount(&server)
        .await;

    let client = CatalogClient::new(&test_config(&server.uri())).unwrap();
    let records = client
        .fetch_and_normalize(CategoryKind::School, &[])
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Recovered School");
}

#[tokio::test]
async fn rejected_envelope_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/teachers"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "success": false, "data": [] })),
        )
        .mount(&server)
        .await;

    let client = CatalogClient::new(&test_config(&server.uri())).unwrap();
    let outcome = client.fetch_and_normalize(CategoryKind::Teacher, &[]).await;

    assert!(matches!(outcome, Err(DirectoryError::CatalogRejected { .. })));
}

#[tokio::test]
async fn server_search_receives_translated_filters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/coaching/search"))
        .and(query_param("maxFee", "150000"))
        .and(query_param("courses", "JEE,NEET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [ { "id": "c1", "name": "Prime Coaching", "city": "Bengaluru" } ]
        })))
        .mount(&server)
        .await;

    let mut filters = FilterState::new();
    filters
        .set(FilterField::Fee, Criterion::Range { min: 0.0, max: 150_000.0 })
        .set(
            FilterField::Tags,
            Criterion::MultiSelect {
                values: vec!["JEE".to_string(), "NEET".to_string()],
                mode: MatchMode::Substring,
            },
        );
    assert_eq!(translate_filters(&filters).len(), 2);

    let client = CatalogClient::new(&test_config(&server.uri())).unwrap();
    let records = client
        .search_with_filters(CategoryKind::Coaching, &filters)
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn facet_load_degrades_per_category() {
    let server = MockServer::start().await;

    // Schools and colleges answer; the remaining categories 404
    Mock::given(method("GET"))
        .and(path("/schools"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                { "id": "s1", "name": "Sunrise School", "typeOfSchool": "CBSE", "city": "Bengaluru" },
                { "id": "s2", "name": "Lakeside School", "typeOfSchool": "CBSE", "city": "bengaluru " }
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/colleges"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                { "id": "c1", "name": "Metro College", "typeOfCollege": "Engineering", "city": "Mysuru" }
            ]
        })))
        .mount(&server)
        .await;

    let mut config = test_config(&server.uri());
    config.catalog.retry_attempts = 0;
    let client = CatalogClient::new(&config).unwrap();

    let load = client.load_facets().await;

    // Case/whitespace city variants collapse to one entry
    assert_eq!(load.facets["CBSE"], vec!["Bengaluru"]);
    assert_eq!(load.facets["Engineering"], vec!["Mysuru"]);
    assert_eq!(load.failed.len(), 3);
    assert!(load.failed.contains(&CategoryKind::Coaching));
}

#[tokio::test]
async fn health_check_reports_unreachable_catalog() {
    let server = MockServer::start().await;
    let config = test_config(&server.uri());
    let client = CatalogClient::new(&config).unwrap();

    // Mock server answers 404 for the bare root
    let health = client.health_check().await.unwrap();
    assert!(!health.is_healthy);
    assert!(health.error_message.is_some());
}
