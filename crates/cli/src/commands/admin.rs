//! Admin account management commands.
//!
//! # Usage
//!
//! ```bash
//! juniper-cli admin promote -e shopkeeper@example.com
//! ```
//!
//! There is no "create admin" path: accounts sign up through the API
//! like everyone else, then get promoted here.

use secrecy::ExposeSecret;
use sqlx::PgPool;

use juniper_core::{Email, UserRole};

use super::{CommandError, database_url};

/// Promote an existing account to the admin role.
///
/// # Errors
///
/// Returns `CommandError` for a malformed email, an unknown account, or
/// a database failure.
pub async fn promote(email: &str) -> Result<i64, CommandError> {
    let email = Email::parse(email).map_err(|e| CommandError::InvalidEmail(e.to_string()))?;

    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Promoting {} to admin...", email);

    let user_id = sqlx::query_scalar::<_, i64>(
        "UPDATE app_user SET role = $1, updated_at = now() WHERE email = $2 RETURNING id",
    )
    .bind(UserRole::Admin)
    .bind(&email)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| CommandError::UserNotFound(email.to_string()))?;

    tracing::info!("Account promoted. ID: {}, Email: {}", user_id, email);

    Ok(user_id)
}
