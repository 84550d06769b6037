//! Shared handler state and the health probe.

use std::sync::Arc;

use axum::{http::StatusCode, Json};
use serde_json::json;

use crate::auth::TokenService;
use crate::db::Repository;
use crate::services::ImageSearch;

/// Shared application state. Everything in it is either immutable or
/// internally synchronized (the pool), so clones are cheap and safe.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repository>,
    pub tokens: TokenService,
    pub images: Arc<dyn ImageSearch>,
}

impl AppState {
    pub fn new(
        repo: Arc<dyn Repository>,
        tokens: TokenService,
        images: Arc<dyn ImageSearch>,
    ) -> Self {
        Self {
            repo,
            tokens,
            images,
        }
    }

    pub fn repo(&self) -> &dyn Repository {
        self.repo.as_ref()
    }
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }
    pub fn images(&self) -> &dyn ImageSearch {
        self.images.as_ref()
    }
}

/// GET /health — liveness probe.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "starthub" })),
    )
}
