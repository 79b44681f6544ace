//! Minting and verification of the signed token pair.
//!
//! Both tokens are HS256 JWTs whose `sub` is the user id. Access and
//! refresh tokens are signed with different secrets so one can never be
//! presented as the other.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use juniper_core::UserId;

use super::AuthError;
use crate::config::TokenConfig;

/// Claims carried by both token kinds.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id, as a decimal string.
    pub sub: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Which of the two tokens to mint or verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenConfig {
    fn secret_for(&self, kind: TokenKind) -> &SecretString {
        match kind {
            TokenKind::Access => &self.access_secret,
            TokenKind::Refresh => &self.refresh_secret,
        }
    }

    fn ttl_for(&self, kind: TokenKind) -> std::time::Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }
}

/// Mint a token of the given kind for a user.
///
/// # Errors
///
/// Returns `AuthError::TokenSigning` if encoding fails.
pub fn mint(config: &TokenConfig, kind: TokenKind, user_id: UserId) -> Result<String, AuthError> {
    let now = chrono::Utc::now().timestamp();
    #[allow(clippy::cast_possible_wrap)]
    let ttl = config.ttl_for(kind).as_secs() as i64;

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + ttl,
    };

    let key = EncodingKey::from_secret(config.secret_for(kind).expose_secret().as_bytes());
    Ok(encode(&Header::default(), &claims, &key)?)
}

/// Verify a token's signature and expiry and extract the user id.
///
/// # Errors
///
/// Returns `AuthError::TokenExpired` for a stale token and
/// `AuthError::TokenInvalid` for anything else that fails validation.
pub fn verify(config: &TokenConfig, kind: TokenKind, token: &str) -> Result<UserId, AuthError> {
    let key = DecodingKey::from_secret(config.secret_for(kind).expose_secret().as_bytes());

    let data = decode::<Claims>(token, &key, &Validation::default()).map_err(|e| {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid,
        }
    })?;

    data.claims
        .sub
        .parse::<UserId>()
        .map_err(|_| AuthError::TokenInvalid)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_config() -> TokenConfig {
        TokenConfig {
            access_secret: SecretString::from("k9#mQ2$vX7!pL4@nR8^wZ3&jT6*bF1%d"),
            refresh_secret: SecretString::from("e5@hY8!uC2#sK6$xM9^qA4&gV7*nD3%f"),
            access_ttl: Duration::from_secs(15 * 60),
            refresh_ttl: Duration::from_secs(7 * 24 * 60 * 60),
        }
    }

    #[test]
    fn test_mint_and_verify_roundtrip() {
        let config = test_config();
        let user = UserId::new(42);

        for kind in [TokenKind::Access, TokenKind::Refresh] {
            let token = mint(&config, kind, user).unwrap();
            assert_eq!(verify(&config, kind, &token).unwrap(), user);
        }
    }

    #[test]
    fn test_kinds_are_not_interchangeable() {
        let config = test_config();
        let access = mint(&config, TokenKind::Access, UserId::new(1)).unwrap();

        assert!(matches!(
            verify(&config, TokenKind::Refresh, &access),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[test]
    fn test_garbage_is_invalid() {
        let config = test_config();
        assert!(matches!(
            verify(&config, TokenKind::Access, "not.a.token"),
            Err(AuthError::TokenInvalid)
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let config = test_config();
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: "7".to_string(),
            iat: now - 3600,
            exp: now - 1800, // well past the default validation leeway
        };
        let key =
            EncodingKey::from_secret(config.access_secret.expose_secret().as_bytes());
        let token = encode(&Header::default(), &claims, &key).unwrap();

        assert!(matches!(
            verify(&config, TokenKind::Access, &token),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn test_tampered_signature_is_rejected() {
        let config = test_config();
        let mut token = mint(&config, TokenKind::Access, UserId::new(3)).unwrap();
        token.pop();
        token.push('A');

        assert!(matches!(
            verify(&config, TokenKind::Access, &token),
            Err(AuthError::TokenInvalid)
        ));
    }
}
