//! Auth HTTP handlers: sign-up, sign-in.

use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use tracing::{info, warn};

use super::password::{hash_password_blocking, verify_password_blocking};
use crate::error::AppError;
use crate::handlers::http::AppState;
use crate::models::validation::normalize_email;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// POST /sign-up
pub async fn sign_up(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let Json(body) =
        body.map_err(|_| AppError::Validation("Invalid registration data".to_string()))?;
    let role = body.check()?;

    let password_hash = hash_password_blocking(body.password).await?;
    let user = state
        .repo()
        .user_create(&normalize_email(&body.email), &password_hash, role)
        .await?;
    let token = state.tokens().issue(&user)?;
    info!(user_id = %user.id, role = %user.role, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: UserResponse::from(&user),
            token,
        }),
    ))
}

/// POST /sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let Json(body) = body.map_err(|_| AppError::Validation("Invalid login data".to_string()))?;
    body.check()?;

    // Unknown email and wrong password look identical to the caller.
    let user = match state
        .repo()
        .user_find_by_email(&normalize_email(&body.email))
        .await?
    {
        Some(user) => user,
        None => {
            warn!("sign-in for unknown email");
            return Err(AppError::Auth(INVALID_CREDENTIALS.to_string()));
        }
    };

    if !verify_password_blocking(body.password, user.password_hash.clone()).await? {
        warn!(user_id = %user.id, "sign-in with wrong password");
        return Err(AppError::Auth(INVALID_CREDENTIALS.to_string()));
    }

    let token = state.tokens().issue(&user)?;
    Ok(Json(AuthResponse {
        user: UserResponse::from(&user),
        token,
    }))
}
