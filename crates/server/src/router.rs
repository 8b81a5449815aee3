use super::{handlers, state::AppState};
use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

/// Creates the Axum router with all the application routes.
pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/companies", post(handlers::create_company_handler))
        .route(
            "/policies",
            get(handlers::list_policies_handler)
                .post(handlers::upload_policy_handler)
                .layer(DefaultBodyLimit::max(10 * 1024 * 1024)),
        )
        .route("/policies/{id}", delete(handlers::delete_policy_handler))
        .route("/chat", post(handlers::chat_handler))
        .route(
            "/onboarding/status",
            get(handlers::onboarding_status_handler),
        )
        .route(
            "/onboarding/tasks/{task_id}",
            put(handlers::update_task_handler),
        )
        .route(
            "/onboarding/policies/{policy_id}/ack",
            post(handlers::acknowledge_policy_handler),
        )
        .route(
            "/onboarding/documents/{document_id}",
            put(handlers::update_document_handler),
        )
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}
