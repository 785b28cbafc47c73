//! Tribal Heritage - role-based marketplace for tribal crafts.
//!
//! Customers keep a persistent cart and check out into retail orders.
//! Consultants place bulk orders and run exhibitions. Artisans and admins
//! move orders through `pending -> shipped -> delivered`. Every order change
//! goes through a versioned compare-and-swap in the store.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod state;
pub mod store;

pub use config::AppConfig;
pub use error::{Result, StorefrontError};
pub use services::Storefront;
pub use state::AppState;
