use httpmock::MockServer;
use serde_json::json;
use url::Url;

use storefront::application::source::{ContentSource, FetchError, Freshness, RemoteCollection};
use storefront::domain::content::ContentStatus;
use storefront::infra::wordpress::{WordPressClient, WordPressConfig};

fn client(server: &MockServer, with_credentials: bool) -> WordPressClient {
    let credential = |value: &str| with_credentials.then(|| value.to_string());
    WordPressClient::new(WordPressConfig {
        base_url: Some(Url::parse(&server.base_url()).expect("mock url")),
        consumer_key: credential("ck_test"),
        consumer_secret: credential("cs_test"),
        navigation_menu: "primary".to_string(),
        per_page: 2,
        max_pages: 10,
    })
    .expect("client should build")
}

#[tokio::test]
async fn products_follow_the_total_pages_header() {
    let server = MockServer::start();
    let first = server.mock(|when, then| {
        when.method("GET")
            .path("/wp-json/wc/v3/products")
            .query_param("consumer_key", "ck_test")
            .query_param("consumer_secret", "cs_test")
            .query_param("page", "1");
        then.status(200)
            .header("content-type", "application/json")
            .header("X-WP-TotalPages", "2")
            .json_body(json!([
                { "id": 1, "name": "Keyword Planner", "slug": "keyword-planner", "status": "publish",
                  "categories": [{ "slug": "tools" }], "price": "9.99" },
                { "id": 2, "name": "Starter &amp; Pro", "slug": "starter-pro", "status": "publish",
                  "categories": [{ "slug": "packages" }], "price": "49" }
            ]));
    });
    let second = server.mock(|when, then| {
        when.method("GET")
            .path("/wp-json/wc/v3/products")
            .query_param("page", "2");
        then.status(200)
            .header("content-type", "application/json")
            .header("X-WP-TotalPages", "2")
            .json_body(json!([
                { "id": 3, "name": "Old Tool", "slug": "old-tool", "status": "draft", "categories": [] }
            ]));
    });

    let products = client(&server, true)
        .fetch_list(RemoteCollection::Products, Freshness::Default)
        .await
        .expect("products load");

    first.assert();
    second.assert();
    assert_eq!(products.len(), 3);
    assert_eq!(products[1].title, "Starter & Pro");
    assert!(products[0].in_category("tools"));
    assert_eq!(products[2].status, ContentStatus::Draft);
}

#[tokio::test]
async fn no_cache_requests_send_revalidation_headers() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/wp-json/faditools/v1/chat-settings")
            .header("cache-control", "no-cache, no-store, must-revalidate")
            .header("pragma", "no-cache");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!({ "enabled": true, "greeting": "Hi" }));
    });

    let settings = client(&server, false)
        .fetch_chat_settings(Freshness::NoCache)
        .await
        .expect("chat settings load");

    mock.assert();
    assert_eq!(settings["greeting"], json!("Hi"));
}

#[tokio::test]
async fn navigation_requests_the_configured_menu() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/wp-json/wp/v2/menu-items")
            .query_param("menus", "primary");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(json!([
                { "id": 5, "title": { "rendered": "Blog" }, "url": "https://cms.example/blog",
                  "parent": 0, "menu_order": 1 }
            ]));
    });

    let entries = client(&server, false)
        .fetch_navigation(Freshness::NoCache)
        .await
        .expect("menu loads");

    mock.assert();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].label, "Blog");
}

#[tokio::test]
async fn missing_credentials_fail_before_any_request() {
    let server = MockServer::start();

    let err = client(&server, false)
        .fetch_list(RemoteCollection::Products, Freshness::Default)
        .await
        .expect_err("credentials are required");

    assert!(matches!(err, FetchError::Configuration { .. }));
}

#[tokio::test]
async fn error_statuses_surface_without_credentials_in_the_url() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET").path("/wp-json/wc/v3/products");
        then.status(500).body("fatal error");
    });

    let err = client(&server, true)
        .fetch_list(RemoteCollection::Products, Freshness::NoCache)
        .await
        .expect_err("500 is an error");

    mock.assert();
    match &err {
        FetchError::HttpStatus { status, url } => {
            assert_eq!(*status, 500);
            assert!(!url.contains("cs_test"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.code(), "http_status");
}

#[tokio::test]
async fn malformed_bodies_are_parse_errors() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET").path("/wp-json/wp/v2/pages");
        then.status(200)
            .header("content-type", "application/json")
            .body("<html>maintenance</html>");
    });

    let err = client(&server, false)
        .fetch_list(RemoteCollection::Pages, Freshness::Default)
        .await
        .expect_err("html is not json");

    mock.assert();
    assert!(matches!(err, FetchError::Parse { .. }));
}
