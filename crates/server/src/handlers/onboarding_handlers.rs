//! # Onboarding Route Handlers
//!
//! Task transitions, policy acknowledgements, document review decisions, and
//! the derived progress aggregate.

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
use nexusone::onboarding::{self, DocumentStatus, OnboardingStatus, TaskStatus};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
pub struct UpdateTaskRequest {
    pub status: String,
    /// When present, the task row is created if it does not exist yet.
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateDocumentRequest {
    pub status: String,
}

/// Handler for `GET /onboarding/status`.
pub async fn onboarding_status_handler(
    State(app_state): State<AppState>,
    employee: AuthenticatedEmployee,
    debug_params: Query<DebugParams>,
) -> Result<Json<ApiResponse<OnboardingStatus>>, AppError> {
    let employee = employee.0;
    let status = onboarding::status(
        &app_state.sqlite_provider.db,
        &employee.company_id,
        &employee.id,
    )
    .await?;
    Ok(wrap_response(status, debug_params, None))
}

/// Handler for `PUT /onboarding/tasks/{task_id}`.
pub async fn update_task_handler(
    State(app_state): State<AppState>,
    employee: AuthenticatedEmployee,
    debug_params: Query<DebugParams>,
    Path(task_id): Path<String>,
    Json(payload): Json<UpdateTaskRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let employee = employee.0;
    let status = TaskStatus::parse(&payload.status).ok_or_else(|| {
        AppError::Validation(format!(
            "Invalid task status '{}'. Expected pending, in_progress, or completed.",
            payload.status
        ))
    })?;

    let db = &app_state.sqlite_provider.db;
    if let Some(title) = payload.title.as_deref() {
        onboarding::upsert_task(db, &employee.company_id, &employee.id, &task_id, title, status)
            .await?;
    } else {
        let updated =
            onboarding::set_task_status(db, &employee.company_id, &employee.id, &task_id, status)
                .await?;
        if !updated {
            return Err(AppError::NotFound(format!("Task '{task_id}' not found")));
        }
    }

    Ok(wrap_response(
        json!({ "taskId": task_id, "status": status.as_str() }),
        debug_params,
        None,
    ))
}

/// Handler for `POST /onboarding/policies/{policy_id}/ack`.
pub async fn acknowledge_policy_handler(
    State(app_state): State<AppState>,
    employee: AuthenticatedEmployee,
    debug_params: Query<DebugParams>,
    Path(policy_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let employee = employee.0;
    onboarding::acknowledge_policy(
        &app_state.sqlite_provider.db,
        &employee.company_id,
        &employee.id,
        &policy_id,
    )
    .await?;

    Ok(wrap_response(
        json!({ "policyId": policy_id, "acknowledged": true }),
        debug_params,
        None,
    ))
}

/// Handler for `PUT /onboarding/documents/{document_id}`.
pub async fn update_document_handler(
    State(app_state): State<AppState>,
    employee: AuthenticatedEmployee,
    debug_params: Query<DebugParams>,
    Path(document_id): Path<String>,
    Json(payload): Json<UpdateDocumentRequest>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let employee = employee.0;
    let status = DocumentStatus::parse(&payload.status).ok_or_else(|| {
        AppError::Validation(format!(
            "Invalid document status '{}'. Expected pending_review, approved, or rejected.",
            payload.status
        ))
    })?;

    onboarding::set_document_status(
        &app_state.sqlite_provider.db,
        &employee.company_id,
        &employee.id,
        &document_id,
        status,
    )
    .await?;

    Ok(wrap_response(
        json!({ "documentId": document_id, "status": status.as_str() }),
        debug_params,
        None,
    ))
}
