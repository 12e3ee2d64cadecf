//! Record source integration: HTTP envelopes, snapshot files and the
//! hand-off into the hierarchy engine.

use category_tree::catalog::{CategoryBrowser, CategoryId};
use category_tree::source::{CategoryClient, RecordSource, SourceError, SourceOptions};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn options() -> SourceOptions {
    SourceOptions {
        timeout: Duration::from_secs(5),
    }
}

async fn serve(body: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;
    server
}

fn client(server: &MockServer) -> CategoryClient {
    CategoryClient::new(&server.uri(), "api/categories", None, options()).unwrap()
}

#[tokio::test]
async fn test_every_envelope_shape_yields_same_records() {
    let items = json!([
        { "_id": "1", "name": "Shoes", "status": true },
        { "_id": "2", "name": "Boots", "parentCategory": { "name": "Shoes" }, "status": false },
    ]);
    let envelopes = [
        items.clone(),
        json!({ "data": items.clone() }),
        json!({ "data": { "categories": items.clone() } }),
        json!({ "data": { "docs": items.clone() } }),
        json!({ "categories": items.clone() }),
    ];

    for envelope in envelopes {
        let server = serve(envelope.clone()).await;
        let records = client(&server).fetch_records().await.unwrap();

        let summary: Vec<(String, String, Option<String>, String)> = records
            .into_iter()
            .map(|r| (r.id.to_string(), r.title, r.parent_ref, r.status))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("1".into(), "Shoes".into(), None, "active".into()),
                ("2".into(), "Boots".into(), Some("Shoes".into()), "inactive".into()),
            ],
            "envelope: {envelope}"
        );
    }
}

#[tokio::test]
async fn test_fetched_snapshot_builds_tree() {
    let server = serve(json!({
        "data": [
            { "id": 10, "title": "Bags", "status": "active" },
            { "id": 11, "title": "Totes", "parentRef": "Bags", "status": "active" },
            { "id": 12, "title": "Clutches", "parentRef": "Bags", "status": "inactive" },
        ]
    }))
    .await;

    let source = RecordSource::Api(client(&server));
    let mut browser = CategoryBrowser::new(source.load().await.unwrap());
    browser.expand_all().unwrap();

    let rows: Vec<(String, usize)> = browser
        .rows()
        .unwrap()
        .iter()
        .map(|r| (r.title.clone(), r.level))
        .collect();
    assert_eq!(
        rows,
        vec![("Bags".into(), 0), ("Clutches".into(), 1), ("Totes".into(), 1)]
    );
    assert_eq!(
        browser.breadcrumb(&CategoryId::from("11")).unwrap(),
        vec!["Bags", "Totes"]
    );
}

#[tokio::test]
async fn test_server_error_surfaces_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/categories"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server).fetch_records().await;
    assert!(matches!(result, Err(SourceError::HttpStatus(502))), "{result:?}");
}

#[tokio::test]
async fn test_unrecognized_payload_is_rejected() {
    let server = serve(json!({ "message": "maintenance" })).await;

    let result = client(&server).fetch_records().await;
    assert!(matches!(result, Err(SourceError::Payload(_))), "{result:?}");
}

#[tokio::test]
async fn test_file_source_loads_snapshot() {
    let path = std::env::temp_dir().join(format!(
        "category_tree_record_source_{}.json",
        std::process::id()
    ));
    let body = json!({
        "categories": [
            { "id": "a", "title": "Hats", "status": "Hoạt động" },
            { "id": "b", "title": "   " },
            { "id": "c", "title": "Caps", "parent": "Hats" },
        ]
    });
    std::fs::write(&path, body.to_string()).unwrap();

    let source = RecordSource::File(path.clone());
    let records = source.load().await;
    std::fs::remove_file(&path).unwrap();

    let records = records.unwrap();
    let titles: Vec<&str> = records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Hats", "Caps"]);
    assert!(records[0].is_active());
    assert_eq!(source.to_string(), path.display().to_string());
}

#[tokio::test]
async fn test_missing_file_source() {
    let source = RecordSource::File(std::env::temp_dir().join("category_tree_does_not_exist.json"));
    assert!(matches!(source.load().await, Err(SourceError::Io(_))));
}
