//! Application services.
//!
//! Services own the logic between route handlers and the stores:
//! authentication and the token pair, the featured-products cache, the
//! uploaded-image store, and the hosted checkout client.

pub mod auth;
pub mod cache;
pub mod images;
pub mod payments;
