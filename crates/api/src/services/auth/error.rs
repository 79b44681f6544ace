//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] juniper_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Display name missing or invalid.
    #[error("name validation failed: {0}")]
    InvalidName(String),

    /// No token cookie was presented.
    #[error("missing token")]
    TokenMissing,

    /// Token failed signature or claim checks, or does not match the
    /// stored mirror.
    #[error("invalid token")]
    TokenInvalid,

    /// Token is past its expiry.
    #[error("token expired")]
    TokenExpired,

    /// Token signing failed.
    #[error("token signing error: {0}")]
    TokenSigning(#[from] jsonwebtoken::errors::Error),

    /// Refresh-token mirror store failure.
    #[error("token store error: {0}")]
    TokenStore(#[from] redis::RedisError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
