//! Authentication middleware for JWT token validation

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, State},
    http::{Request, request::Parts},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::{error::ApiError, models::Role, state::AppState};

/// Authenticated user information
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
    pub roles: Vec<Role>,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }
}

/// Authenticated user holding the ADMIN role
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

/// Authentication middleware
///
/// Validates the bearer token and stores the caller as an [`AuthUser`]
/// request extension.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

    let claims = state.jwt_service.verify(token).map_err(|e| {
        warn!("Rejected bearer token: {}", e);
        ApiError::Unauthorized("Invalid or expired token".to_string())
    })?;

    let user = AuthUser {
        id: claims.uid,
        roles: claims.roles(),
        username: claims.sub,
    };

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            warn!("User {} attempted an admin operation", user.username);
            return Err(ApiError::Forbidden);
        }

        Ok(AdminUser(user))
    }
}
