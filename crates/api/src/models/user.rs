//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use juniper_core::{Email, UserId, UserRole};

/// A registered account.
///
/// Carries the credential hash, so this type is never serialized directly;
/// responses go through [`UserProfile`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login email, unique and lowercased.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Argon2 credential hash.
    pub password_hash: String,
    /// Account role.
    pub role: UserRole,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The client-safe projection of a [`User`].
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub role: UserRole,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}
