//! # Company Route Handlers
//!
//! Tenant registration. Company creation is the bootstrap operation that
//! every other route depends on: tokens carry the company id this endpoint
//! returns.

use crate::{
    errors::AppError,
    handlers::{wrap_response, ApiResponse, DebugParams},
    state::AppState,
};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Deserialize)]
pub struct CreateCompanyRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
}

#[derive(Serialize)]
pub struct CreateCompanyResponse {
    pub id: String,
    pub name: String,
}

/// Handler for `POST /companies`.
pub async fn create_company_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
    Json(payload): Json<CreateCompanyRequest>,
) -> Result<Json<ApiResponse<CreateCompanyResponse>>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation(
            "Company name must not be empty.".to_string(),
        ));
    }

    let company = tenancy::create_company(
        &app_state.sqlite_provider.db,
        payload.name.trim(),
        payload.description.as_deref(),
        payload.industry.as_deref(),
    )
    .await?;

    info!(company_id = %company.id, name = %company.name, "Registered new company.");

    Ok(wrap_response(
        CreateCompanyResponse {
            id: company.id,
            name: company.name,
        },
        debug_params,
        None,
    ))
}
