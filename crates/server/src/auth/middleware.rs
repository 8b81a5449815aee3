//! # Authentication Middleware
//!
//! Provides the Axum extractor for JWT-based authentication. Every tenant
//! route uses `AuthenticatedEmployee` to resolve the calling employee and the
//! company they belong to; there is no anonymous tier, so a missing or
//! invalid token rejects the request with `401 Unauthorized`.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};
use tenancy::Employee;
use tracing::{error, warn};

use crate::state::AppState;

/// Represents the claims we expect to find in the JWT.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The subject of the token, which we use as the unique employee identifier.
    pub sub: String,
    /// The expiration timestamp.
    pub exp: usize,
    /// The id of the company the employee belongs to.
    pub company_id: String,
    /// The employee's display name. Falls back to the subject when absent.
    #[serde(default)]
    pub name: String,
}

/// An Axum extractor that provides the currently authenticated employee.
///
/// The employee row is created lazily on first sight of a new subject, keyed
/// by a deterministic UUID of the token's `sub` claim.
#[derive(Debug, Clone)]
pub struct AuthenticatedEmployee(pub Employee);

/// A custom rejection type for authentication failures.
pub struct AuthError(StatusCode, String);

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.0, Json(json!({ "error": self.1 }))).into_response()
    }
}

impl FromRequestParts<AppState> for AuthenticatedEmployee {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    AuthError(
                        StatusCode::UNAUTHORIZED,
                        "Missing or malformed Authorization header.".to_string(),
                    )
                })?;

        let jwt_secret =
            std::env::var("JWT_SECRET").unwrap_or_else(|_| "a-secure-secret-key".to_string());

        let token_data = decode::<Claims>(
            bearer.token(),
            &DecodingKey::from_secret(jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|e| {
            warn!("JWT validation failed: {}", e);
            AuthError(
                StatusCode::UNAUTHORIZED,
                "Invalid or expired token.".to_string(),
            )
        })?;

        // Manually verify the expiration to be absolutely sure.
        let current_timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| {
                AuthError(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "System time is before UNIX EPOCH.".to_string(),
                )
            })?
            .as_secs();

        if token_data.claims.exp < current_timestamp as usize {
            warn!(
                "Token has expired. exp: {}, current: {}",
                token_data.claims.exp, current_timestamp
            );
            return Err(AuthError(
                StatusCode::UNAUTHORIZED,
                "Invalid or expired token.".to_string(),
            ));
        }

        let claims = token_data.claims;
        if claims.company_id.is_empty() {
            return Err(AuthError(
                StatusCode::UNAUTHORIZED,
                "Token is missing the company_id claim.".to_string(),
            ));
        }

        let display_name = if claims.name.is_empty() {
            claims.sub.clone()
        } else {
            claims.name.clone()
        };

        let employee = tenancy::get_or_create_employee(
            &state.sqlite_provider.db,
            &claims.sub,
            &claims.company_id,
            &display_name,
        )
        .await
        .map_err(|e| {
            // This is an internal error because the DB should be available.
            error!("Failed to get or create employee: {}", e);
            AuthError(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Could not retrieve employee: {e}"),
            )
        })?;

        // An existing subject stays bound to the company it was first
        // registered under; a token claiming a different company is rejected
        // rather than silently resolved to the stored row.
        if employee.company_id != claims.company_id {
            warn!(
                sub = %claims.sub,
                claimed = %claims.company_id,
                registered = %employee.company_id,
                "Token company claim does not match the employee's registration."
            );
            return Err(AuthError(
                StatusCode::UNAUTHORIZED,
                "Token company does not match the employee's registration.".to_string(),
            ));
        }

        Ok(AuthenticatedEmployee(employee))
    }
}
