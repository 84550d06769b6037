//! Shared fixtures: an in-memory repository, a stub image search and
//! request helpers for driving the router with `oneshot`.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use starthub::auth::TokenService;
use starthub::db::Repository;
use starthub::error::{AppError, AppResult};
use starthub::models::{Role, StartHub, StartHubFields, User};
use starthub::services::ImageSearch;
use starthub::{create_app, AppState};
use tokio::sync::Mutex;
use tower::util::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-jwt-secret-min-32-chars!!!!";

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    starthubs: Vec<StartHub>,
}

/// Keeps everything in memory. `poison_category` makes any create that
/// references it fail without leaving a row behind.
#[derive(Default)]
pub struct MemoryRepository {
    tables: Mutex<Tables>,
    pub poison_category: Option<String>,
}

impl MemoryRepository {
    pub fn failing_on(category: &str) -> Self {
        Self {
            poison_category: Some(category.to_string()),
            ..Default::default()
        }
    }

    pub async fn starthub_count(&self) -> usize {
        self.tables.lock().await.starthubs.len()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn user_create(&self, email: &str, password_hash: &str, role: Role) -> AppResult<User> {
        let mut t = self.tables.lock().await;
        if t.users.iter().any(|u| u.email == email) {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role,
            created_at: Utc::now(),
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn user_find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let t = self.tables.lock().await;
        Ok(t.users.iter().find(|u| u.email == email).cloned())
    }

    async fn starthubs_list(&self) -> AppResult<Vec<StartHub>> {
        let t = self.tables.lock().await;
        Ok(t.starthubs.iter().rev().cloned().collect())
    }

    async fn starthubs_search_by_name(&self, term: &str) -> AppResult<Vec<StartHub>> {
        let needle = term.to_lowercase();
        let t = self.tables.lock().await;
        Ok(t
            .starthubs
            .iter()
            .rev()
            .filter(|s| s.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn starthub_get_by_id(&self, id: Uuid) -> AppResult<Option<StartHub>> {
        let t = self.tables.lock().await;
        Ok(t.starthubs.iter().find(|s| s.id == id).cloned())
    }

    async fn starthub_create(
        &self,
        owner_id: Uuid,
        fields: &StartHubFields,
        categories: &[String],
    ) -> AppResult<StartHub> {
        if let Some(poison) = &self.poison_category {
            if categories.iter().any(|c| c == poison) {
                return Err(AppError::Db(sqlx::Error::Protocol(
                    "category insert failed".to_string(),
                )));
            }
        }
        let mut linked: Vec<String> = Vec::new();
        for c in categories.iter().filter(|c| !c.trim().is_empty()) {
            if !linked.contains(c) {
                linked.push(c.clone());
            }
        }
        let starthub = StartHub {
            id: Uuid::new_v4(),
            name: fields.name.clone(),
            description: fields.description.clone(),
            location: fields.location.clone(),
            team_size: fields.team_size,
            url: fields.url.clone(),
            email: fields.email.clone(),
            join_date: Utc::now(),
            image_url: fields.image_url.clone(),
            categories: linked,
            created_by: owner_id,
        };
        self.tables.lock().await.starthubs.push(starthub.clone());
        Ok(starthub)
    }

    async fn starthub_update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        fields: &StartHubFields,
    ) -> AppResult<Option<StartHub>> {
        let mut t = self.tables.lock().await;
        let Some(s) = t
            .starthubs
            .iter_mut()
            .find(|s| s.id == id && s.created_by == owner_id)
        else {
            return Ok(None);
        };
        s.name = fields.name.clone();
        s.description = fields.description.clone();
        s.location = fields.location.clone();
        s.team_size = fields.team_size;
        s.url = fields.url.clone();
        s.email = fields.email.clone();
        Ok(Some(s.clone()))
    }

    async fn starthub_delete(&self, id: Uuid, owner_id: Uuid) -> AppResult<bool> {
        let mut t = self.tables.lock().await;
        let before = t.starthubs.len();
        t.starthubs
            .retain(|s| !(s.id == id && s.created_by == owner_id));
        Ok(t.starthubs.len() < before)
    }
}

/// Image search that answers every term with a deterministic URL, or
/// nothing at all.
pub struct StubImages {
    pub enabled: bool,
}

#[async_trait]
impl ImageSearch for StubImages {
    async fn find_image(&self, term: &str) -> Option<String> {
        self.enabled
            .then(|| format!("https://images.test/{}.jpg", term.trim().to_lowercase()))
    }
}

pub fn tokens() -> TokenService {
    TokenService::new(JWT_SECRET, chrono::Duration::hours(24))
}

pub fn test_app(repo: Arc<MemoryRepository>, images_enabled: bool) -> axum::Router {
    let state = AppState::new(
        repo,
        tokens(),
        Arc::new(StubImages {
            enabled: images_enabled,
        }),
    );
    create_app(state)
}

pub fn json_request(method: &str, uri: &str, body: &serde_json::Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

/// Registers a fresh user and returns its token.
pub async fn sign_up(app: &axum::Router, email: &str, role: &str) -> String {
    let body = serde_json::json!({ "email": email, "password": "secret1", "role": role });
    let (status, json) = send(app, json_request("POST", "/sign-up", &body, None)).await;
    assert_eq!(status, StatusCode::CREATED, "sign-up failed: {json}");
    json["token"].as_str().unwrap().to_string()
}
