//! # API Route Handlers
//!
//! Organizes all the Axum route handlers for the `nexusone-server`. The
//! handlers are split into logical sub-modules based on their functionality
//! (companies, policies, chat, onboarding).

// Sub-modules for different handler categories.
pub mod chat_handlers;
pub mod company_handlers;
pub mod general;
pub mod onboarding_handlers;
pub mod policy_handlers;

// Re-export all handlers from the sub-modules to make them easily accessible
// to the router under a single `handlers::` path.
pub use chat_handlers::*;
pub use company_handlers::*;
pub use general::*;
pub use onboarding_handlers::*;
pub use policy_handlers::*;

// Shared items used by multiple handler modules.
use super::{
    errors::AppError,
    state::AppState,
    types::{ApiResponse, DebugParams},
};
use axum::{extract::Query, Json};
use serde_json::Value;

/// A shared helper function to wrap a successful result in the standard
/// `ApiResponse` format, optionally including debug information if requested.
pub(crate) fn wrap_response<T>(
    result: T,
    debug_params: Query<DebugParams>,
    debug_info: Option<Value>,
) -> Json<ApiResponse<T>> {
    let debug = if debug_params.debug.unwrap_or(false) {
        debug_info
    } else {
        None
    };
    Json(ApiResponse { debug, result })
}
