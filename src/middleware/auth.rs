//! Bearer-token authentication for the `/api` routes.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::auth::Claims;
use crate::error::AppError;
use crate::handlers::http::AppState;

const BEARER_SCHEME: &str = "Bearer";

/// Pulls the token out of `Authorization: Bearer <token>`. Anything else is
/// rejected before the token itself is looked at.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Auth("Authorization header required".to_string()))?;
    let malformed =
        || AppError::Auth("Invalid authorization format. Use: Bearer <token>".to_string());
    let value = value.to_str().map_err(|_| malformed())?;

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(BEARER_SCHEME), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(malformed()),
    }
}

/// Authenticated caller, as stored in request extensions by [`require_auth`].
/// Only usable on routes behind that layer.
#[derive(Clone, Debug)]
pub struct AuthUser(pub Claims);

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| {
                AppError::Internal(anyhow::anyhow!("AuthUser extracted without require_auth"))
            })
    }
}

/// Middleware: reject unauthenticated requests, otherwise attach [`AuthUser`].
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?;
    let claims = state.tokens().validate(token).map_err(|e| {
        debug!(error = %e, "rejected bearer token");
        AppError::Jwt(e)
    })?;
    request.extensions_mut().insert(AuthUser(claims));
    Ok(next.run(request).await)
}
