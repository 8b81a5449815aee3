//! # Tenant Isolation Integration Test
//!
//! Verifies that the chat context assembled for one company never contains
//! another company's policy content, and that policy listings and deletions
//! are scoped to the caller's tenant.

mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{chat_completion_body, generate_jwt, TestApp};
use httpmock::Method;
use serde_json::{json, Value};

#[tokio::test]
async fn test_chat_context_never_leaks_across_tenants() -> Result<()> {
    let app = TestApp::spawn().await?;
    app.mock_server.mock(|when, then| {
        when.method(Method::POST).path("/extract");
        then.status(503);
    });

    let acme_id = app.create_company("Acme Corp").await?;
    let rival_id = app.create_company("Rival Inc").await?;
    let acme_token = generate_jwt("sam@acme.test", &acme_id, "Sam")?;
    let rival_token = generate_jwt("kim@rival.test", &rival_id, "Kim")?;

    app.upload_policy(
        &acme_token,
        "handbook.txt",
        "text/plain",
        b"Acme vacation allowance: 20 days.",
    )
    .await?;
    app.upload_policy(
        &rival_token,
        "handbook.txt",
        "text/plain",
        b"Rival vacation allowance: 5 days.",
    )
    .await?;

    // The mock only matches a prompt carrying Acme's content and not Rival's.
    let chat_mock = app.mock_server.mock(|when, then| {
        when.method(Method::POST)
            .path("/v1/chat/completions")
            .body_contains("Acme vacation allowance: 20 days.")
            .matches(|req| {
                let body = req
                    .body
                    .as_deref()
                    .map(String::from_utf8_lossy)
                    .unwrap_or_default()
                    .to_string();
                !body.contains("Rival vacation allowance")
            });
        then.status(200)
            .json_body(chat_completion_body("You get 20 days of vacation."));
    });

    let response = app
        .client
        .post(format!("{}/chat", app.address))
        .bearer_auth(&acme_token)
        .json(&json!({ "message": "what is the vacation policy?" }))
        .send()
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    chat_mock.assert();

    Ok(())
}

#[tokio::test]
async fn test_policy_listing_is_tenant_scoped() -> Result<()> {
    let app = TestApp::spawn().await?;

    let acme_id = app.create_company("Acme Corp").await?;
    let rival_id = app.create_company("Rival Inc").await?;
    let acme_token = generate_jwt("sam@acme.test", &acme_id, "Sam")?;
    let rival_token = generate_jwt("kim@rival.test", &rival_id, "Kim")?;

    app.upload_policy(&acme_token, "acme-only.txt", "text/plain", b"Acme rules.")
        .await?;

    let response = app
        .client
        .get(format!("{}/policies", app.address))
        .bearer_auth(&rival_token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["result"].as_array().unwrap().len(), 0);

    Ok(())
}

#[tokio::test]
async fn test_token_claiming_foreign_company_is_rejected() -> Result<()> {
    let app = TestApp::spawn().await?;

    let acme_id = app.create_company("Acme Corp").await?;
    let rival_id = app.create_company("Rival Inc").await?;

    // Register Sam under Acme.
    let acme_token = generate_jwt("sam@acme.test", &acme_id, "Sam")?;
    let response = app
        .client
        .get(format!("{}/policies", app.address))
        .bearer_auth(&acme_token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    // A signed token for the same subject claiming Rival must not resolve to
    // the Acme row.
    let forged_token = generate_jwt("sam@acme.test", &rival_id, "Sam")?;
    let response = app
        .client
        .get(format!("{}/policies", app.address))
        .bearer_auth(&forged_token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_cross_tenant_delete_is_refused() -> Result<()> {
    let app = TestApp::spawn().await?;

    let acme_id = app.create_company("Acme Corp").await?;
    let rival_id = app.create_company("Rival Inc").await?;
    let acme_token = generate_jwt("sam@acme.test", &acme_id, "Sam")?;
    let rival_token = generate_jwt("kim@rival.test", &rival_id, "Kim")?;

    let file_id = app
        .upload_policy(&acme_token, "handbook.txt", "text/plain", b"Acme rules.")
        .await?;

    let response = app
        .client
        .delete(format!("{}/policies/{file_id}", app.address))
        .bearer_auth(&rival_token)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The owner still sees the file.
    let response = app
        .client
        .get(format!("{}/policies", app.address))
        .bearer_auth(&acme_token)
        .send()
        .await?;
    let body: Value = response.json().await?;
    assert_eq!(body["result"].as_array().unwrap().len(), 1);

    Ok(())
}
