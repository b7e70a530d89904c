//! Bearer-token extractor resolving the operator behind a request.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::UserRole;
use crate::services::auth as auth_service;
use crate::AppState;

/// Operator identity carried by a valid access token.
///
/// Taking it as a handler argument makes the route require login.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Resolve an access token. Refresh tokens, unknown roles and malformed
    /// ids are all `Unauthorized`.
    pub fn from_access_token(token: &str, jwt_secret: &str) -> Result<Self, AppError> {
        let claims = auth_service::validate_token(token, jwt_secret)?;
        if claims.token_type != "access" {
            return Err(AppError::Unauthorized);
        }

        let id = claims
            .user_id
            .parse()
            .map_err(|_| AppError::Unauthorized)?;
        let role = claims.role.parse::<UserRole>().map_err(|e| {
            tracing::warn!(error = %e, "Rejected token with unknown role");
            AppError::Unauthorized
        })?;

        Ok(Self {
            id,
            username: claims.sub,
            role,
        })
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;
        Self::from_access_token(token, &state.config.jwt_secret)
    }
}
