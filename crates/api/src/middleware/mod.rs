//! Request middleware and extractors.

pub mod auth;

pub use auth::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, RequireAdmin, RequireAuth};
