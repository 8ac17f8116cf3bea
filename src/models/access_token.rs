//! Access token model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bearer token issued to a user on registration or login
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessToken {
    /// Unique identifier
    pub id: i64,
    /// Opaque token string (unique)
    pub token: String,
    /// Owning user ID
    pub user_id: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(token: String, user_id: i64) -> Self {
        Self {
            id: 0, // Will be set by the database
            token,
            user_id,
            created_at: Utc::now(),
        }
    }
}
