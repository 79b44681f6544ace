//! Authentication service.
//!
//! Owns signup and login, the access/refresh token pair, and the
//! refresh-token mirror in the key-value store. A refresh token is only
//! honored while its mirror at `refresh_token:{user_id}` matches the
//! presented token byte for byte, so logout revokes the whole pair at
//! once.

pub mod error;
pub mod tokens;

pub use error::AuthError;
pub use tokens::{Claims, TokenKind};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use sqlx::PgPool;

use juniper_core::{Email, UserId};

use crate::config::TokenConfig;
use crate::db::{RepositoryError, users::UserRepository};
use crate::models::User;

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_NAME_LENGTH: usize = 100;

/// A freshly minted access/refresh pair.
#[derive(Debug)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Authentication service backed by Postgres and the key-value store.
pub struct AuthService<'a> {
    pool: &'a PgPool,
    redis: ConnectionManager,
    tokens: &'a TokenConfig,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, redis: ConnectionManager, tokens: &'a TokenConfig) -> Self {
        Self { pool, redis, tokens }
    }

    /// Register a new account and issue its first token pair.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserAlreadyExists` if the email is taken, a
    /// validation error for a bad email, name, or password, and
    /// `AuthError::Repository` for database failures.
    pub async fn signup(
        &self,
        email: &str,
        name: &str,
        password: &str,
    ) -> Result<(User, TokenPair), AuthError> {
        let email = Email::parse(email)?;
        let name = validate_name(name)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let user = UserRepository::new(self.pool)
            .create(&email, &name, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        let pair = self.issue_tokens(user.id).await?;
        Ok((user, pair))
    }

    /// Verify credentials and issue a fresh token pair.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown email or a
    /// wrong password; the two cases are deliberately indistinguishable.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, TokenPair), AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let user = UserRepository::new(self.pool)
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let pair = self.issue_tokens(user.id).await?;
        Ok((user, pair))
    }

    /// Mint a token pair and mirror the refresh token in the store.
    ///
    /// The mirror expires alongside the token, so a pair that is never
    /// refreshed or revoked simply ages out.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenSigning` or `AuthError::TokenStore`.
    pub async fn issue_tokens(&self, user_id: UserId) -> Result<TokenPair, AuthError> {
        let access = tokens::mint(self.tokens, TokenKind::Access, user_id)?;
        let refresh = tokens::mint(self.tokens, TokenKind::Refresh, user_id)?;

        let mut conn = self.redis.clone();
        let () = conn
            .set_ex(
                refresh_key(user_id),
                refresh.as_str(),
                self.tokens.refresh_ttl.as_secs(),
            )
            .await?;

        Ok(TokenPair { access, refresh })
    }

    /// Exchange a valid refresh token for a new access token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenExpired` for a stale token and
    /// `AuthError::TokenInvalid` if the signature fails or the mirror
    /// does not match (revoked or superseded pair).
    pub async fn refresh_access(&self, refresh_token: &str) -> Result<String, AuthError> {
        let user_id = tokens::verify(self.tokens, TokenKind::Refresh, refresh_token)?;

        let mut conn = self.redis.clone();
        let stored: Option<String> = conn.get(refresh_key(user_id)).await?;

        if !mirror_matches(stored.as_deref(), refresh_token) {
            return Err(AuthError::TokenInvalid);
        }

        tokens::mint(self.tokens, TokenKind::Access, user_id)
    }

    /// Revoke the refresh token's mirror.
    ///
    /// A token that no longer verifies is treated as already revoked.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenStore` if the delete fails.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        let Ok(user_id) = tokens::verify(self.tokens, TokenKind::Refresh, refresh_token) else {
            return Ok(());
        };

        let mut conn = self.redis.clone();
        let () = conn.del(refresh_key(user_id)).await?;

        Ok(())
    }

    /// Resolve an access token to its user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenExpired`/`AuthError::TokenInvalid` for a
    /// bad token and `AuthError::UserNotFound` if the account is gone.
    pub async fn current_user(&self, access_token: &str) -> Result<User, AuthError> {
        let user_id = tokens::verify(self.tokens, TokenKind::Access, access_token)?;

        UserRepository::new(self.pool)
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

fn refresh_key(user_id: UserId) -> String {
    format!("refresh_token:{user_id}")
}

/// A refresh token is honored only if the stored mirror exists and is
/// byte-for-byte identical to the presented token.
fn mirror_matches(stored: Option<&str>, presented: &str) -> bool {
    stored == Some(presented)
}

fn validate_name(name: &str) -> Result<String, AuthError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AuthError::InvalidName("name cannot be empty".to_string()));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(AuthError::InvalidName(format!(
            "name cannot exceed {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(name.to_string())
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password with Argon2id and a fresh salt.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Check a password against a stored Argon2 hash.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if the stored hash cannot be parsed.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AuthError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| AuthError::PasswordHash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same password").unwrap();
        let b = hash_password("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::PasswordHash)
        ));
    }

    #[test]
    fn test_short_password_rejected() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_name_is_trimmed_and_bounded() {
        assert_eq!(validate_name("  Ada Lovelace ").unwrap(), "Ada Lovelace");
        assert!(matches!(
            validate_name("   "),
            Err(AuthError::InvalidName(_))
        ));
        assert!(matches!(
            validate_name(&"x".repeat(MAX_NAME_LENGTH + 1)),
            Err(AuthError::InvalidName(_))
        ));
    }

    #[test]
    fn test_refresh_key_shape() {
        assert_eq!(refresh_key(juniper_core::UserId::new(9)), "refresh_token:9");
    }

    #[test]
    fn test_refresh_honored_only_on_exact_mirror_match() {
        let token = "header.payload.signature";

        assert!(mirror_matches(Some(token), token));
        // A superseded pair leaves a different token in the mirror.
        assert!(!mirror_matches(Some("header.payload.other"), token));
        // Logout or expiry removes the mirror entirely.
        assert!(!mirror_matches(None, token));
        // Near-misses do not count.
        assert!(!mirror_matches(Some("header.payload.signature "), token));
        assert!(!mirror_matches(Some("Header.payload.signature"), token));
    }
}
