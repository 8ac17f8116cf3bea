//! User model
//!
//! This module defines the User entity for Postboard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity representing a registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given parameters.
    ///
    /// Note: The password should already be hashed before calling this function.
    /// Use `services::password::hash_password()` to hash the password.
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            id: 0, // Will be set by the database
            username,
            password_hash,
            created_at: Utc::now(),
        }
    }
}

/// Username and password as submitted for registration or login
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new() {
        let user = User::new("kiki@mac.com".to_string(), "$argon2id$hash".to_string());

        assert_eq!(user.id, 0);
        assert_eq!(user.username, "kiki@mac.com");
        assert_eq!(user.password_hash, "$argon2id$hash");
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User::new("u3".to_string(), "$argon2id$secret".to_string());
        let json = serde_json::to_string(&user).unwrap();

        assert!(json.contains("\"username\":\"u3\""));
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("secret"));
    }
}
