mod common;

use common::test_config;
use draftsmith_core::store::{ContentStore, HttpStore, ListFilter};
use draftsmith_core::EngineError;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn store_for(server: &MockServer) -> HttpStore {
    let config = test_config(&[("DS_SITE_URL", server.uri().as_str())]);
    HttpStore::new(&config).expect("store should build")
}

fn post_body(id: u64) -> serde_json::Value {
    json!({
        "id": id,
        "title": {"rendered": "Home"},
        "content": {"rendered": "<p>Hello</p>"},
        "type": "page",
        "status": "draft",
        "link": "https://example.com/home/",
        "date": "2026-01-01T00:00:00"
    })
}

#[tokio::test]
async fn test_validate_auth_uses_basic_credentials() {
    let server = MockServer::start().await;
    // "admin:pw" base64-encoded
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/users/me"))
        .and(header("authorization", "Basic YWRtaW46cHc="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Admin", "slug": "admin"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server).await;
    assert!(store.validate_auth().await.expect("auth probe"));
}

#[tokio::test]
async fn test_validate_auth_rejection_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/users/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store = store_for(&server).await;
    assert!(!store.validate_auth().await.expect("auth probe"));
}

#[tokio::test]
async fn test_get_pages_sends_list_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/pages"))
        .and(query_param("per_page", "100"))
        .and(query_param("status", "publish,draft,private"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([post_body(12)])))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server).await;
    let pages = store
        .get_pages(&ListFilter::content())
        .await
        .expect("pages");
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].id, 12);
    assert_eq!(pages[0].title.as_str(), "Home");
}

#[tokio::test]
async fn test_create_log_record_is_hidden_and_carries_meta() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wp-json/wp/v2/posts"))
        .and(body_partial_json(json!({
            "title": "AI_SESSION: test",
            "status": "pending",
            "excerpt": "{\"k\":1}"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(post_body(900)))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server).await;
    let record = store
        .create_log_record("AI_SESSION: test", "{}", Some(&json!({"k": 1})))
        .await
        .expect("log record");
    assert_eq!(record.id, 900);
}

#[tokio::test]
async fn test_query_log_records_filters_by_title() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts"))
        .and(query_param("search", "AI_SESSION:"))
        .and(query_param("status", "pending"))
        .and(query_param("per_page", "20"))
        .and(query_param("orderby", "date"))
        .and(query_param("order", "desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server).await;
    let records = store.query_log_records("AI_SESSION:").await.expect("query");
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_non_success_status_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wp-json/wp/v2/settings"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store = store_for(&server).await;
    let err = store
        .update_settings(&json!({"title": "X"}))
        .await
        .unwrap_err();
    match err {
        EngineError::Status { status, path } => {
            assert_eq!(status, 500);
            assert_eq!(path, "/wp/v2/settings");
        }
        other => panic!("Expected Status error, got {other}"),
    }
}

#[tokio::test]
async fn test_session_headers_ride_every_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/settings"))
        .and(header("cookie", "wordpress_logged_in=abc"))
        .and(header("x-wp-nonce", "n0nce"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"title": "Site"})))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server).await.with_session_headers(&[
        ("Cookie".to_string(), "wordpress_logged_in=abc".to_string()),
        ("X-WP-Nonce".to_string(), "n0nce".to_string()),
    ]);
    let settings = store
        .expect("session store")
        .get_settings()
        .await
        .expect("settings");
    assert_eq!(settings.title.as_deref(), Some("Site"));
}

#[tokio::test]
async fn test_delete_raw_sends_force_flag() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/wp-json/wp/v2/posts/900"))
        .and(query_param("force", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"deleted": true})))
        .expect(1)
        .mount(&server)
        .await;

    let store = store_for(&server).await;
    store
        .delete_raw("/wp/v2/posts/900", true)
        .await
        .expect("delete");
}
