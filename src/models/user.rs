use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A user record as stored in the database.
///
/// `password` holds the bcrypt digest, never the plaintext, and is skipped
/// when serializing.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    /// Small integer UI preference. Deliberately not validated against an
    /// enumerated set; a value whitelist can be added here without changing
    /// the contract.
    pub theme: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user from a username and an already-hashed password.
    pub fn new(username: String, password_digest: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            username,
            password: password_digest,
            theme: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Per-user status summary: the pending count is the headline figure, the
/// completed count and username ride along for the client's header display.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatus {
    pub username: String,
    pub pending: i64,
    pub completed: i64,
}
