//! # Policy File Endpoint Integration Tests
//!
//! Upload validation, tenant-scoped listing, and cascading deletion through
//! the HTTP surface.

mod common;

use anyhow::Result;
use axum::http::StatusCode;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use common::{generate_jwt, TestApp};
use serde_json::{json, Value};

#[tokio::test]
async fn test_upload_then_list_round_trip() -> Result<()> {
    let app = TestApp::spawn().await?;
    let company_id = app.create_company("Acme Corp").await?;
    let token = generate_jwt("sam@acme.test", &company_id, "Sam")?;

    let payload = b"Vacation: 20 days per year.";
    let response = app
        .client
        .post(format!("{}/policies", app.address))
        .bearer_auth(&token)
        .json(&json!({
            "filename": "handbook.txt",
            "contentType": "text/plain",
            "fileData": BASE64.encode(payload),
        }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    let file_id = body["result"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["result"]["filename"], "handbook.txt");
    assert_eq!(body["result"]["url"], format!("/policies/{file_id}"));

    let response = app
        .client
        .get(format!("{}/policies", app.address))
        .bearer_auth(&token)
        .send()
        .await?;
    let body: Value = response.json().await?;
    let listing = body["result"].as_array().unwrap();
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0]["id"], file_id.as_str());
    assert_eq!(listing[0]["sizeBytes"], payload.len() as u64);
    assert_eq!(listing[0]["contentType"], "text/plain");

    Ok(())
}

#[tokio::test]
async fn test_upload_rejects_disallowed_content_type() -> Result<()> {
    let app = TestApp::spawn().await?;
    let company_id = app.create_company("Acme Corp").await?;
    let token = generate_jwt("sam@acme.test", &company_id, "Sam")?;

    let response = app
        .client
        .post(format!("{}/policies", app.address))
        .bearer_auth(&token)
        .json(&json!({
            "filename": "malware.exe",
            "contentType": "application/octet-stream",
            "fileData": BASE64.encode(b"MZ..."),
        }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_upload_rejects_invalid_base64() -> Result<()> {
    let app = TestApp::spawn().await?;
    let company_id = app.create_company("Acme Corp").await?;
    let token = generate_jwt("sam@acme.test", &company_id, "Sam")?;

    let response = app
        .client
        .post(format!("{}/policies", app.address))
        .bearer_auth(&token)
        .json(&json!({
            "filename": "handbook.txt",
            "contentType": "text/plain",
            "fileData": "!!!not-base64!!!",
        }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_upload_rejects_oversized_payload() -> Result<()> {
    let app = TestApp::spawn().await?;
    let company_id = app.create_company("Acme Corp").await?;
    let token = generate_jwt("sam@acme.test", &company_id, "Sam")?;

    // The harness configures a 64 KiB upload cap.
    let oversized = vec![b'x'; 128 * 1024];
    let response = app
        .client
        .post(format!("{}/policies", app.address))
        .bearer_auth(&token)
        .json(&json!({
            "filename": "big.txt",
            "contentType": "text/plain",
            "fileData": BASE64.encode(&oversized),
        }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_delete_removes_file_and_reports_absence_after() -> Result<()> {
    let app = TestApp::spawn().await?;
    let company_id = app.create_company("Acme Corp").await?;
    let token = generate_jwt("sam@acme.test", &company_id, "Sam")?;

    let file_id = app
        .upload_policy(&token, "handbook.txt", "text/plain", b"Rules.")
        .await?;

    let response = app
        .client
        .delete(format!("{}/policies/{file_id}", app.address))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .client
        .get(format!("{}/policies", app.address))
        .bearer_auth(&token)
        .send()
        .await?;
    let body: Value = response.json().await?;
    assert_eq!(body["result"].as_array().unwrap().len(), 0);

    // Deleting again is a 404, not a silent success.
    let response = app
        .client
        .delete(format!("{}/policies/{file_id}", app.address))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_listing_requires_auth() -> Result<()> {
    let app = TestApp::spawn().await?;

    let response = app
        .client
        .get(format!("{}/policies", app.address))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}
