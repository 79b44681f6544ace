//! Domain models.
//!
//! Row-backed types (`sqlx::FromRow`) and the response shapes derived from
//! them. Validation happens at the edges via `juniper-core` newtypes.

pub mod cart;
pub mod coupon;
pub mod order;
pub mod product;
pub mod user;

pub use cart::CartLine;
pub use coupon::Coupon;
pub use order::{Order, OrderItem};
pub use product::Product;
pub use user::{User, UserProfile};
