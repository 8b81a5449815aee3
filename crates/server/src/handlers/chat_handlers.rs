//! # Chat Route Handlers
//!
//! The onboarding chat endpoint. One request maps to one provider call; the
//! relay in `nexusone::chat` performs the policy-context assembly.

use crate::{
    auth::middleware::AuthenticatedEmployee,
    errors::AppError,
    handlers::{wrap_response, ApiResponse, DebugParams},
    state::AppState,
};
use axum::{
    extract::{Query, State},
    Json,
};
use nexusone::chat::{ChatPrompts, ChatRelay};
use nexusone::onboarding::OnboardingStatus;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
    pub onboarding_status: OnboardingStatus,
}

/// Handler for `POST /chat`.
pub async fn chat_handler(
    State(app_state): State<AppState>,
    employee: AuthenticatedEmployee,
    debug_params: Query<DebugParams>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ApiResponse<ChatResponse>>, AppError> {
    let employee = employee.0;

    if payload.message.trim().is_empty() {
        return Err(AppError::Validation(
            "Message must not be empty.".to_string(),
        ));
    }

    info!(
        company_id = %employee.company_id,
        employee_id = %employee.id,
        "Received chat message."
    );

    let (task, provider) = app_state.task_with_provider("chat")?;
    let prompts = ChatPrompts {
        system_prompt: &task.system_prompt,
        user_prompt_template: &task.user_prompt,
    };

    let relay = ChatRelay::new(
        &app_state.sqlite_provider.db,
        &app_state.extractor,
        provider,
        &app_state.config.relevance,
        app_state.config.context,
        prompts,
    );

    let reply = relay
        .handle_message(
            &employee.company_id,
            &employee.id,
            &employee.display_name,
            &payload.message,
            payload.session_id,
        )
        .await?;

    Ok(wrap_response(
        ChatResponse {
            response: reply.response,
            session_id: reply.session_id,
            onboarding_status: reply.onboarding_status,
        },
        debug_params,
        None,
    ))
}
