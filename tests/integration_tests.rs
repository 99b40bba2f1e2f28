//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: YAML listing → paginator → HTTP requests → accumulated items

use futures::{Stream, StreamExt};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use solidafy_pager::loader::load_listing_from_str;
use solidafy_pager::pagination::PaginatorUpdate;
use solidafy_pager::{JsonPaginator, StringMap};
use std::sync::Arc;
use std::time::Duration;
use tokio_test::assert_ok;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helpers
// ============================================================================

fn params(pairs: &[(&str, &str)]) -> StringMap {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

fn discover_listing(server: &MockServer, extra: &str) -> JsonPaginator {
    let yaml = format!(
        r#"
name: discover
base_url: {}
path: /discover
items_path: $.projects
token_path: $.urls.api.more_projects
http:
  timeout_secs: 5
  max_retries: 0
{extra}
"#,
        server.uri()
    );
    load_listing_from_str(&yaml).unwrap().paginator().unwrap()
}

/// Read updates until the current load terminates; returns the items it published
async fn until_idle<S>(updates: &mut S) -> Option<Arc<Vec<Value>>>
where
    S: Stream<Item = PaginatorUpdate<Value>> + Unpin,
{
    let mut items = None;
    loop {
        let update = tokio::time::timeout(Duration::from_secs(5), updates.next())
            .await
            .expect("paginator went quiet")
            .expect("update stream closed");
        match update {
            PaginatorUpdate::Items(list) => items = Some(list),
            PaginatorUpdate::Fetching(false) => return items,
            _ => {}
        }
    }
}

async fn assert_quiet<S>(updates: &mut S)
where
    S: Stream<Item = PaginatorUpdate<Value>> + Unpin,
{
    let next = tokio::time::timeout(Duration::from_millis(300), updates.next()).await;
    assert!(next.is_err(), "unexpected update: {next:?}");
}

fn ids(items: &[Value]) -> Vec<i64> {
    items.iter().filter_map(|item| item["id"].as_i64()).collect()
}

// ============================================================================
// Next-URL Listings
// ============================================================================

#[tokio::test]
async fn test_robots_next_url_then_restart() {
    let server = MockServer::start().await;
    let more = format!("{}/discover?term=robots&cursor=2", server.uri());

    Mock::given(method("GET"))
        .and(path("/discover"))
        .and(query_param("term", "robots"))
        .and(query_param_is_missing("cursor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "projects": [{"id": 1}, {"id": 2}],
            "urls": {"api": {"more_projects": more}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/discover"))
        .and(query_param("cursor", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "projects": [{"id": 3}],
            "urls": {"api": {"more_projects": null}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/discover"))
        .and(query_param("term", "cats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "projects": [{"id": 10}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let paginator = discover_listing(&server, "");
    let mut updates = Box::pin(paginator.updates());

    assert_ok!(paginator.start_over_with(params(&[("term", "robots")])));
    let items = until_idle(&mut updates).await.unwrap();
    assert_eq!(ids(&items), vec![1, 2]);
    assert!(paginator.snapshot().has_more);

    assert_ok!(paginator.next_page());
    let items = until_idle(&mut updates).await.unwrap();
    assert_eq!(ids(&items), vec![1, 2, 3]);

    let snapshot = paginator.snapshot();
    assert!(!snapshot.has_more);
    assert_eq!(snapshot.current_page, 2);

    // Last page reached: next page is a no-op
    assert_ok!(paginator.next_page());
    assert_quiet(&mut updates).await;

    assert_ok!(paginator.start_over_with(params(&[("term", "cats")])));
    let items = until_idle(&mut updates).await.unwrap();
    assert_eq!(ids(&items), vec![10]);
    assert_eq!(paginator.snapshot().generation, 2);

    paginator.shutdown().unwrap();
}

#[tokio::test]
async fn test_restart_discards_slow_first_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/discover"))
        .and(query_param("term", "slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"projects": [{"id": 99}]}))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/discover"))
        .and(query_param("term", "fast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"projects": [{"id": 1}]})))
        .mount(&server)
        .await;

    let paginator = discover_listing(&server, "");
    let mut updates = Box::pin(paginator.updates());

    assert_ok!(paginator.start_over_with(params(&[("term", "slow")])));
    assert_ok!(paginator.start_over_with(params(&[("term", "fast")])));

    let items = until_idle(&mut updates).await.unwrap();
    assert_eq!(ids(&items), vec![1]);

    // The slow response lands after the restart and is dropped
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_quiet(&mut updates).await;
    assert_eq!(ids(&paginator.snapshot().items), vec![1]);
}

#[tokio::test]
async fn test_single_flight_over_http() {
    let server = MockServer::start().await;
    let more = format!("{}/discover/page2", server.uri());

    Mock::given(method("GET"))
        .and(path("/discover"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "projects": [{"id": 1}],
            "urls": {"api": {"more_projects": more}}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/discover/page2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"projects": [{"id": 2}]}))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let paginator = discover_listing(&server, "");
    let mut updates = Box::pin(paginator.updates());

    assert_ok!(paginator.start_over_with(StringMap::new()));
    until_idle(&mut updates).await.unwrap();

    for _ in 0..5 {
        assert_ok!(paginator.next_page());
    }
    let items = until_idle(&mut updates).await.unwrap();
    assert_eq!(ids(&items), vec![1, 2]);
    assert_quiet(&mut updates).await;
}

#[tokio::test]
async fn test_restart_keeps_items_until_first_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/discover"))
        .and(query_param("sort", "new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"projects": [{"id": 1}, {"id": 2}]})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/discover"))
        .and(query_param("sort", "top"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"projects": [{"id": 7}]}))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;

    let paginator = discover_listing(&server, "clear_on_restart: false");
    let mut updates = Box::pin(paginator.updates());

    assert_ok!(paginator.start_over_with(params(&[("sort", "new")])));
    until_idle(&mut updates).await.unwrap();

    assert_ok!(paginator.start_over_with(params(&[("sort", "top")])));
    tokio::time::sleep(Duration::from_millis(50)).await;
    let during = paginator.snapshot();
    assert!(during.is_fetching);
    assert_eq!(ids(&during.items), vec![1, 2]);

    let items = until_idle(&mut updates).await.unwrap();
    assert_eq!(ids(&items), vec![7]);
}

// ============================================================================
// Failure Handling
// ============================================================================

#[tokio::test]
async fn test_failed_page_keeps_listing_and_can_retry() {
    let server = MockServer::start().await;
    let more = format!("{}/discover/page2", server.uri());

    Mock::given(method("GET"))
        .and(path("/discover"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "projects": [{"id": 1}],
            "urls": {"api": {"more_projects": more}}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/discover/page2"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/discover/page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"projects": [{"id": 2}]})))
        .mount(&server)
        .await;

    let paginator = discover_listing(&server, "");
    let mut updates = Box::pin(paginator.updates());

    assert_ok!(paginator.start_over_with(StringMap::new()));
    until_idle(&mut updates).await.unwrap();

    assert_ok!(paginator.next_page());
    assert!(until_idle(&mut updates).await.is_none());

    let snapshot = paginator.snapshot();
    assert_eq!(ids(&snapshot.items), vec![1]);
    assert!(snapshot.has_more);
    assert!(!snapshot.is_fetching);

    assert_ok!(paginator.next_page());
    let items = until_idle(&mut updates).await.unwrap();
    assert_eq!(ids(&items), vec![1, 2]);
}

#[tokio::test]
async fn test_non_json_page_is_a_failed_load() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/discover"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let paginator = discover_listing(&server, "");
    let mut updates = Box::pin(paginator.updates());

    assert_ok!(paginator.start_over_with(StringMap::new()));
    assert!(until_idle(&mut updates).await.is_none());
    assert!(paginator.snapshot().items.is_empty());
}

// ============================================================================
// Cursor Listings
// ============================================================================

#[tokio::test]
async fn test_cursor_listing_with_dedup() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "robots"))
        .and(query_param_is_missing("after"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": 1}, {"id": 2}],
            "paging": {"next": {"after": "2"}}
        })))
        .mount(&server)
        .await;

    // A new item was inserted server-side, so page 2 overlaps page 1
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "robots"))
        .and(query_param("after", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"id": 2}, {"id": 3}]
        })))
        .mount(&server)
        .await;

    let yaml = format!(
        r#"
name: search
base_url: {}
path: /search
items_path: results
token_path: paging.next.after
token_style:
  type: query_param
  param: after
dedup_path: id
http:
  max_retries: 0
"#,
        server.uri()
    );
    let paginator = load_listing_from_str(&yaml).unwrap().paginator().unwrap();
    let mut updates = Box::pin(paginator.updates());

    assert_ok!(paginator.start_over_with(params(&[("q", "robots")])));
    until_idle(&mut updates).await.unwrap();

    assert_ok!(paginator.next_page());
    let items = until_idle(&mut updates).await.unwrap();
    assert_eq!(ids(&items), vec![1, 2, 3]);
    assert!(!paginator.snapshot().has_more);
}

fn search_listing(server: &MockServer) -> JsonPaginator {
    let yaml = format!(
        r#"
name: search
base_url: {}
path: /search
items_path: results
token_path: next
token_style:
  type: query_param
  param: after
http:
  max_retries: 0
"#,
        server.uri()
    );
    load_listing_from_str(&yaml).unwrap().paginator().unwrap()
}

/// Two pages per term; ids are `base` and `base + 1`
async fn mount_search_term(server: &MockServer, term: &str, base: i64, first_delay: Duration) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", term))
        .and(query_param_is_missing("after"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"results": [{"id": base}], "next": format!("{term}-2")}))
                .set_delay(first_delay),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", term))
        .and(query_param("after", format!("{term}-2")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [{"id": base + 1}]})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_cursor_listing_restart_with_new_params() {
    let server = MockServer::start().await;
    mount_search_term(&server, "robots", 1, Duration::ZERO).await;
    mount_search_term(&server, "cats", 10, Duration::ZERO).await;

    let paginator = search_listing(&server);
    let mut updates = Box::pin(paginator.updates());

    assert_ok!(paginator.start_over_with(params(&[("q", "robots")])));
    until_idle(&mut updates).await.unwrap();
    assert_ok!(paginator.next_page());
    let items = until_idle(&mut updates).await.unwrap();
    assert_eq!(ids(&items), vec![1, 2]);

    assert_ok!(paginator.start_over_with(params(&[("q", "cats")])));
    let items = until_idle(&mut updates).await.unwrap();
    assert_eq!(ids(&items), vec![10]);

    assert_ok!(paginator.next_page());
    let items = until_idle(&mut updates).await.unwrap();
    assert_eq!(ids(&items), vec![10, 11]);
    assert!(!paginator.snapshot().has_more);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cursor_listing_back_to_back_restarts() {
    let server = MockServer::start().await;
    mount_search_term(&server, "robots", 1, Duration::from_millis(50)).await;
    mount_search_term(&server, "cats", 10, Duration::ZERO).await;

    // The superseded term must never be combined with the current cursor
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "robots"))
        .and(query_param("after", "cats-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [{"id": 666}]})))
        .with_priority(1)
        .expect(0)
        .mount(&server)
        .await;

    for _ in 0..20 {
        let paginator = search_listing(&server);
        let mut updates = Box::pin(paginator.updates());

        assert_ok!(paginator.start_over_with(params(&[("q", "robots")])));
        assert_ok!(paginator.start_over_with(params(&[("q", "cats")])));
        let items = until_idle(&mut updates).await.unwrap();
        assert_eq!(ids(&items), vec![10]);

        assert_ok!(paginator.next_page());
        let items = until_idle(&mut updates).await.unwrap();
        assert_eq!(ids(&items), vec![10, 11]);

        paginator.shutdown().unwrap();
    }
}

#[tokio::test]
async fn test_stripe_like_field_stop() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/customers"))
        .and(query_param_is_missing("starting_after"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "cus_1"}, {"id": "cus_2"}],
            "has_more": true
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/customers"))
        .and(query_param("starting_after", "cus_2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "cus_3"}],
            "has_more": false
        })))
        .mount(&server)
        .await;

    let yaml = format!(
        r#"
name: customers
base_url: {}
path: /v1/customers
items_path: data
token_path: data[-1].id
token_style:
  type: query_param
  param: starting_after
stop_when:
  type: field
  path: has_more
  value: false
"#,
        server.uri()
    );
    let paginator = load_listing_from_str(&yaml).unwrap().paginator().unwrap();
    let mut updates = Box::pin(paginator.updates());

    assert_ok!(paginator.start_over_with(StringMap::new()));
    until_idle(&mut updates).await.unwrap();
    assert!(paginator.snapshot().has_more);

    assert_ok!(paginator.next_page());
    let items = until_idle(&mut updates).await.unwrap();
    let customer_ids: Vec<&str> = items.iter().filter_map(|c| c["id"].as_str()).collect();
    assert_eq!(customer_ids, vec!["cus_1", "cus_2", "cus_3"]);
    assert!(!paginator.snapshot().has_more);
}

#[tokio::test]
async fn test_empty_first_page_is_terminal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/discover"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"projects": []})))
        .expect(1)
        .mount(&server)
        .await;

    let paginator = discover_listing(&server, "");
    let mut updates = Box::pin(paginator.updates());

    assert_ok!(paginator.start_over_with(StringMap::new()));
    let items = until_idle(&mut updates).await.unwrap();
    assert!(items.is_empty());

    let snapshot = paginator.snapshot();
    assert_eq!(snapshot.current_page, 1);
    assert!(!snapshot.has_more);

    assert_ok!(paginator.next_page());
    assert_quiet(&mut updates).await;
}
