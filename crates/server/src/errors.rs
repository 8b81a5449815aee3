use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use nexusone::NexusError;
use serde_json::json;
use tracing::error;

/// A custom error type for the server application.
///
/// This enum encapsulates the different kinds of errors that can occur within
/// the server, allowing them to be converted into appropriate HTTP responses.
pub enum AppError {
    /// A requested resource does not exist for this tenant.
    NotFound(String),
    /// The request payload failed validation.
    Validation(String),
    /// Errors originating from the `nexusone` library.
    Nexus(NexusError),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

impl From<NexusError> for AppError {
    fn from(err: NexusError) -> Self {
        AppError::Nexus(err)
    }
}

impl From<tenancy::TenancyError> for AppError {
    fn from(err: tenancy::TenancyError) -> Self {
        AppError::Internal(err.into())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl From<turso::Error> for AppError {
    fn from(err: turso::Error) -> Self {
        AppError::Nexus(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Nexus(err) => {
                // Log the original error for debugging purposes
                error!("NexusError: {:?}", err);
                match err {
                    NexusError::AiRequest(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Request to AI provider failed: {e}"),
                    ),
                    NexusError::AiDeserialization(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Failed to deserialize AI provider response: {e}"),
                    ),
                    NexusError::AiApi(e) => {
                        (StatusCode::BAD_GATEWAY, format!("AI provider error: {e}"))
                    }
                    NexusError::CompanyNotFound(id) => {
                        (StatusCode::NOT_FOUND, format!("Company '{id}' not found"))
                    }
                    NexusError::PolicyFileNotFound(id) => (
                        StatusCode::NOT_FOUND,
                        format!("Policy file '{id}' not found"),
                    ),
                    NexusError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
                    // Storage and serialization details stay in the logs.
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "An internal server error occurred.".to_string(),
                    ),
                }
            }
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}
