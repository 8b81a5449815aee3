//! # Policy File Route Handlers
//!
//! Upload, listing, and deletion of tenant policy documents. Uploads arrive
//! as base64 payloads, are checked against the content-type allow-list and
//! the configured size cap, and land in the chunked blob store.

use crate::{
    auth::middleware::AuthenticatedEmployee,
    errors::AppError,
    handlers::{wrap_response, ApiResponse, DebugParams},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use nexusone::blob;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

/// Content types accepted for policy uploads.
const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
];

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPolicyRequest {
    pub filename: String,
    pub content_type: String,
    /// The file payload, base64-encoded.
    pub file_data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPolicyResponse {
    pub id: String,
    pub filename: String,
    pub url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyFileResponse {
    pub id: String,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub uploaded_at: String,
}

/// Handler for `POST /policies`.
pub async fn upload_policy_handler(
    State(app_state): State<AppState>,
    employee: AuthenticatedEmployee,
    debug_params: Query<DebugParams>,
    Json(payload): Json<UploadPolicyRequest>,
) -> Result<Json<ApiResponse<UploadPolicyResponse>>, AppError> {
    let employee = employee.0;

    if payload.filename.trim().is_empty() {
        return Err(AppError::Validation(
            "Filename must not be empty.".to_string(),
        ));
    }
    if !ALLOWED_CONTENT_TYPES.contains(&payload.content_type.as_str()) {
        return Err(AppError::Validation(format!(
            "Unsupported content type '{}'. Allowed: PDF, DOC, DOCX, plain text.",
            payload.content_type
        )));
    }

    let bytes = BASE64
        .decode(payload.file_data.as_bytes())
        .map_err(|e| AppError::Validation(format!("Invalid base64 file data: {e}")))?;

    let max = app_state.config.upload.max_size_bytes;
    if bytes.len() as u64 > max {
        return Err(AppError::Validation(format!(
            "File exceeds the maximum upload size of {max} bytes."
        )));
    }

    let file = blob::store_file(
        &app_state.sqlite_provider.db,
        &employee.company_id,
        payload.filename.trim(),
        &payload.content_type,
        &bytes,
        None,
    )
    .await?;

    info!(
        company_id = %employee.company_id,
        file_id = %file.id,
        filename = %file.filename,
        size_bytes = file.size_bytes,
        "Stored policy file."
    );

    let debug_info = json!({
        "chunk_size_bytes": file.chunk_size_bytes,
        "size_bytes": file.size_bytes,
    });
    Ok(wrap_response(
        UploadPolicyResponse {
            url: format!("/policies/{}", file.id),
            id: file.id,
            filename: file.filename,
        },
        debug_params,
        Some(debug_info),
    ))
}

/// Handler for `GET /policies`.
pub async fn list_policies_handler(
    State(app_state): State<AppState>,
    employee: AuthenticatedEmployee,
    debug_params: Query<DebugParams>,
) -> Result<Json<ApiResponse<Vec<PolicyFileResponse>>>, AppError> {
    let employee = employee.0;

    let files = blob::list_files(&app_state.sqlite_provider.db, &employee.company_id).await?;
    let listing = files
        .into_iter()
        .map(|f| PolicyFileResponse {
            id: f.id,
            filename: f.filename,
            content_type: f.content_type,
            size_bytes: f.size_bytes,
            uploaded_at: f.uploaded_at,
        })
        .collect::<Vec<_>>();

    let debug_info = json!({ "company_id": employee.company_id, "count": listing.len() });
    Ok(wrap_response(listing, debug_params, Some(debug_info)))
}

/// Handler for `DELETE /policies/{id}`.
pub async fn delete_policy_handler(
    State(app_state): State<AppState>,
    employee: AuthenticatedEmployee,
    debug_params: Query<DebugParams>,
    Path(file_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let employee = employee.0;

    let deleted = blob::delete_file(
        &app_state.sqlite_provider.db,
        &employee.company_id,
        &file_id,
    )
    .await?;
    if !deleted {
        return Err(AppError::NotFound(format!(
            "Policy file '{file_id}' not found"
        )));
    }

    info!(company_id = %employee.company_id, file_id = %file_id, "Deleted policy file.");
    Ok(wrap_response(
        json!({ "deleted": true }),
        debug_params,
        None,
    ))
}
