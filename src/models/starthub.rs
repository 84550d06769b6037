//! Starthub listings: stored shape, request payloads, search results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::validation::require;
use crate::error::{AppError, AppResult};

/// Width of the `categories.name` column.
pub const MAX_CATEGORY_LENGTH: usize = 100;

/// A directory entry as stored and as served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct StartHub {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub location: String,
    pub team_size: i32,
    pub url: String,
    pub email: String,
    pub join_date: DateTime<Utc>,
    pub image_url: Option<String>,
    pub categories: Vec<String>,
    pub created_by: Uuid,
}

/// Body of `POST /api/starthubs` and `PUT /api/starthubs/:id`.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct StartHubRequest {
    pub name: String,
    pub description: String,
    pub location: String,
    #[validate(range(min = 0, message = "Team size cannot be negative"))]
    pub team_size: i32,
    pub url: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub categories: Vec<String>,
}

/// Scalar columns written on create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct StartHubFields {
    pub name: String,
    pub description: String,
    pub location: String,
    pub team_size: i32,
    pub url: String,
    pub email: String,
    pub image_url: Option<String>,
}

impl StartHubRequest {
    /// Required fields first, in order, then the derived format checks,
    /// then category widths.
    pub fn check(&self) -> AppResult<()> {
        require(&self.name, "Name is required")?;
        require(&self.email, "Email is required")?;
        self.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        if self
            .category_names()
            .iter()
            .any(|c| c.chars().count() > MAX_CATEGORY_LENGTH)
        {
            return Err(AppError::Validation("Category name too long".to_string()));
        }
        Ok(())
    }

    pub fn fields(&self, image_url: Option<String>) -> StartHubFields {
        StartHubFields {
            name: self.name.trim().to_string(),
            description: self.description.clone(),
            location: self.location.clone(),
            team_size: self.team_size,
            url: self.url.clone(),
            email: self.email.trim().to_string(),
            image_url,
        }
    }

    pub fn category_names(&self) -> Vec<String> {
        normalize_categories(&self.categories)
    }
}

/// Trims names, drops empty ones and repeats, keeps first-seen order.
pub fn normalize_categories(raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for name in raw {
        let name = name.trim();
        if !name.is_empty() && !out.iter().any(|n| n == name) {
            out.push(name.to_string());
        }
    }
    out
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub search_term: String,
    pub found: usize,
    pub results: Vec<StartHub>,
}
