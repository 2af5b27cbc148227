use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user account as returned by the API. The password hash is never part of it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    /// Superusers see every resource and may change any of them.
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
}

/// Everything needed to insert a user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_superuser: bool,
}

/// The slice of a user row that login needs.
#[derive(Debug, FromRow)]
pub struct UserCredentials {
    pub id: i32,
    pub password_hash: String,
}

impl NewUser {
    pub fn regular(username: String, email: String, password_hash: String) -> Self {
        Self {
            username,
            email,
            password_hash,
            is_superuser: false,
        }
    }
}
