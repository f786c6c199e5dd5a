use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const HOME_PAGE: &str = "home";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Visit {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub page: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserForm {
    pub username: String,
    pub email: String,
}

/// Result of an add-user attempt. Only `Created` mutates the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateUserOutcome {
    Created(String),
    UsernameTaken(String),
    EmailTaken(String),
}

impl CreateUserOutcome {
    pub fn message(&self) -> String {
        match self {
            CreateUserOutcome::Created(username) => {
                format!("User {} created successfully!", username)
            }
            CreateUserOutcome::UsernameTaken(username) => {
                format!("User {} already exists!", username)
            }
            CreateUserOutcome::EmailTaken(email) => format!("Email {} already in use!", email),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordHealth {
    pub status: String,
    pub users: i64,
    pub visits: i64,
    pub db_exists: bool,
}
