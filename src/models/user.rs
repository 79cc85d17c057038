//! User model
//!
//! Registered accounts of the dealership site. Only the password hash is
//! stored; it is never serialized.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    /// Email address, may be empty
    pub email: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with an already hashed password.
    ///
    /// Use `services::password::hash_password()` to produce the hash.
    pub fn new(username: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            username,
            password_hash,
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// "First Last", or the username when no name was given
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// Input for registering a new user (before password hashing)
#[derive(Debug, Clone, Default)]
pub struct CreateUserInput {
    pub username: String,
    /// Plaintext password (will be hashed)
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}
