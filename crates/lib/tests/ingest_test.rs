//! Integration tests for the text-extraction pipeline against a mocked
//! extraction service.

use std::time::Duration;

use nexusone::providers::db::sqlite::SqliteProvider;
use nexusone::{blob, ingest};
use nexusone::ingest::{ExtractOutcome, TextExtractor};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup() -> SqliteProvider {
    let provider = SqliteProvider::new(":memory:").await.unwrap();
    provider.initialize_schema().await.unwrap();
    provider
}

fn extractor_for(server: &MockServer) -> TextExtractor {
    TextExtractor::new(format!("{}/extract", server.uri()), Duration::from_secs(30)).unwrap()
}

#[tokio::test]
async fn test_extraction_service_success_returns_text_unmodified() {
    let provider = setup().await;
    let db = &provider.db;
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/extract"))
        .and(body_string_contains("handbook.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "text": "Vacation: 20 days.\nSick leave: unlimited."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let file = blob::store_file(db, "co", "handbook.pdf", "application/pdf", b"%PDF-1.7 ...", None)
        .await
        .unwrap();

    let outcome = ingest::extract_text(db, &extractor_for(&server), &file.id, "vacation")
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ExtractOutcome::Text("Vacation: 20 days.\nSick leave: unlimited.".to_string())
    );
}

#[tokio::test]
async fn test_empty_file_reports_empty_without_calling_service() {
    let provider = setup().await;
    let db = &provider.db;
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "text": "unused" })))
        .expect(0)
        .mount(&server)
        .await;

    let file = blob::store_file(db, "co", "empty.pdf", "application/pdf", &[], None)
        .await
        .unwrap();

    let outcome = ingest::extract_text(db, &extractor_for(&server), &file.id, "")
        .await
        .unwrap();
    assert_eq!(outcome, ExtractOutcome::Empty);
}

#[tokio::test]
async fn test_service_failure_falls_back_to_raw_utf8() {
    let provider = setup().await;
    let db = &provider.db;
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let file = blob::store_file(
        db,
        "co",
        "notes.txt",
        "text/plain",
        b"Plain-text policy notes survive the outage.",
        None,
    )
    .await
    .unwrap();

    let outcome = ingest::extract_text(db, &extractor_for(&server), &file.id, "")
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ExtractOutcome::Text("Plain-text policy notes survive the outage.".to_string())
    );
}

#[tokio::test]
async fn test_service_failure_on_pdf_bytes_is_unavailable() {
    let provider = setup().await;
    let db = &provider.db;
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let file = blob::store_file(db, "co", "handbook.pdf", "application/pdf", b"%PDF-1.4 blob", None)
        .await
        .unwrap();

    let outcome = ingest::extract_text(db, &extractor_for(&server), &file.id, "")
        .await
        .unwrap();
    assert_eq!(outcome, ExtractOutcome::Unavailable);
}

#[tokio::test]
async fn test_unknown_file_is_unavailable() {
    let provider = setup().await;
    let server = MockServer::start().await;

    let outcome = ingest::extract_text(&provider.db, &extractor_for(&server), "ghost", "")
        .await
        .unwrap();
    assert_eq!(outcome, ExtractOutcome::Unavailable);
}
