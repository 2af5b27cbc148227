//! Accounts and bearer tokens.
//!
//! [`AuthMiddleware`] turns a `Bearer` header into [`Claims`]; [`Identity`] hands them to
//! handlers. Passwords are bcrypt hashes, tokens are HS256 JWTs.

pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::config::Config;
use crate::error::AppError;

pub use extractors::Identity;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{generate_token, verify_token, Claims};

lazy_static! {
    // Letters, digits, underscores and hyphens.
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Secrets and work factors shared by every handler that issues tokens or stores passwords.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_lifetime_hours: i64,
    /// bcrypt cost for new password hashes. Existing hashes carry their own cost.
    pub password_cost: u32,
}

impl AuthSettings {
    pub fn issue_token(&self, user_id: i32) -> Result<String, AppError> {
        generate_token(user_id, &self.jwt_secret, self.token_lifetime_hours)
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        hash_password(password, self.password_cost)
    }
}

impl From<&Config> for AuthSettings {
    fn from(config: &Config) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            token_lifetime_hours: config.jwt_expiration_hours,
            password_cost: config.bcrypt_cost,
        }
    }
}

/// `POST /auth/login` body.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

/// A new account, as posted to `/auth/register` or `/users/`. Any `is_superuser` field in
/// the body is ignored.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        length(min = 3, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
}

/// Returned by login and registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user_id: i32,
}
