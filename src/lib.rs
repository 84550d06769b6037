//! Startup directory backend built with Rust.
//!
//! Accounts with argon2-hashed passwords, JWT bearer auth, and a public
//! directory of starthubs backed by PostgreSQL.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::AppError;
pub use handlers::http::AppState;

use std::time::Duration;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use handlers::{http, starthubs};

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::HEAD,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ])
}

/// Build the API router (auth, public reads, protected writes, health). Used by main and by integration tests.
pub fn create_app(state: AppState) -> axum::Router {
    let protected = axum::Router::new()
        .route("/starthubs", post(starthubs::create_starthub))
        .route(
            "/starthubs/:id",
            put(starthubs::update_starthub).delete(starthubs::delete_starthub),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    axum::Router::new()
        .route("/health", get(http::health))
        .route("/sign-up", post(auth::sign_up))
        .route("/sign-in", post(auth::sign_in))
        .route("/starthubs", get(starthubs::list_starthubs))
        .route("/starthubs/search", get(starthubs::search_starthubs))
        .route("/starthubs/:id", get(starthubs::get_starthub))
        .nest("/api", protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors())
        .with_state(state)
}

/// Bound every request to `timeout`. The timeout layer answers with a bare
/// 408, which is rewritten into the usual error body.
pub fn with_request_timeout(app: axum::Router, timeout: Duration) -> axum::Router {
    app.layer(TimeoutLayer::new(timeout))
        .layer(axum::middleware::map_response(timeout_body))
}

async fn timeout_body(res: Response) -> Response {
    if res.status() == StatusCode::REQUEST_TIMEOUT {
        return AppError::Timeout.into_response();
    }
    res
}
