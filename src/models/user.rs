//! Users, roles and the auth request/response payloads.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::validation::{is_valid_email, require};
use crate::error::{AppError, AppResult};

/// Shortest password accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// What kind of account a user holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Starthub,
    Investor,
    Donator,
    Collaborator,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Starthub,
        Role::Investor,
        Role::Donator,
        Role::Collaborator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Starthub => "starthub",
            Role::Investor => "investor",
            Role::Donator => "donator",
            Role::Collaborator => "collaborator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Stored account. Deliberately not `Serialize`.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub role: String,
}

impl RegisterRequest {
    /// Checks fields in order and stops at the first failure. Returns the
    /// parsed role on success.
    pub fn check(&self) -> AppResult<Role> {
        require(&self.email, "Email is required")?;
        require(&self.password, "Password is required")?;
        require(&self.role, "Role is required")?;
        if !is_valid_email(&self.email) {
            return Err(AppError::Validation("Invalid email format".to_string()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters long",
                MIN_PASSWORD_LENGTH
            )));
        }
        self.role.parse::<Role>().map_err(|_| {
            AppError::Validation(
                "Role must be either 'starthub', 'investor', 'donator' or 'collaborator'"
                    .to_string(),
            )
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn check(&self) -> AppResult<()> {
        require(&self.email, "Email is required")?;
        require(&self.password, "Password is required")?;
        if !is_valid_email(&self.email) {
            return Err(AppError::Validation("Invalid email format".to_string()));
        }
        Ok(())
    }
}
