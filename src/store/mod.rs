//! Record store.
//!
//! One repository trait per entity, implemented by [`MemoryStore`] and
//! [`PgStore`]. Services only ever see [`Repositories`], so the backend is
//! chosen once at startup and there is a single code path above this module.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use std::sync::Arc;
use async_trait::async_trait;
use crate::domain::aggregates::{Cart, Exhibition, Interest, Order, Product, User};
use crate::domain::value_objects::Email;
use crate::error::Result;

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Fails with `Conflict` when the email is already registered and with
    /// `Forbidden` when inserting an admin while one exists.
    async fn insert(&self, user: &User) -> Result<()>;
    async fn find(&self, id: &str) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>>;
    async fn list(&self) -> Result<Vec<User>>;
    /// Flips the blocked flag in one step. Returns the new value.
    async fn toggle_blocked(&self, id: &str) -> Result<bool>;
}

#[async_trait]
pub trait ProductRepo: Send + Sync {
    async fn insert(&self, product: &Product) -> Result<()>;
    async fn update(&self, product: &Product) -> Result<()>;
    /// Returns whether a product was removed.
    async fn delete(&self, id: &str) -> Result<bool>;
    async fn find(&self, id: &str) -> Result<Option<Product>>;
    /// All products, oldest listing first.
    async fn list(&self) -> Result<Vec<Product>>;
}

#[async_trait]
pub trait CartRepo: Send + Sync {
    /// The customer's cart, empty if none was ever saved.
    async fn load(&self, customer_id: &str) -> Result<Cart>;
    /// Stores `cart` only if the stored version still equals `read_version`.
    /// A cart never saved counts as version 0. `Conflict` otherwise.
    async fn save(&self, cart: &Cart, read_version: i64) -> Result<()>;
}

#[async_trait]
pub trait OrderRepo: Send + Sync {
    async fn insert(&self, order: &Order) -> Result<()>;
    /// Inserts a retail order and stores the buyer's emptied `cart` as one
    /// unit, under the same version check as [`CartRepo::save`].
    async fn insert_checkout(&self, order: &Order, cart: &Cart, read_version: i64) -> Result<()>;
    async fn find(&self, id: &str) -> Result<Option<Order>>;
    /// All orders, newest first.
    async fn list(&self) -> Result<Vec<Order>>;
    /// Writes `order.status` and `order.version` only if the stored version
    /// still equals `read_version`. `Conflict` otherwise.
    async fn update_status(&self, order: &Order, read_version: i64) -> Result<()>;
}

#[async_trait]
pub trait ExhibitionRepo: Send + Sync {
    async fn insert(&self, exhibition: &Exhibition) -> Result<()>;
    async fn find(&self, id: &str) -> Result<Option<Exhibition>>;
    /// All exhibitions by start date, earliest first.
    async fn list(&self) -> Result<Vec<Exhibition>>;
    /// Atomically counts a visitor. Returns the new visitor count.
    async fn register_interest(&self, id: &str, interest: Interest) -> Result<u64>;
}

/// The repositories a service works against.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepo>,
    pub products: Arc<dyn ProductRepo>,
    pub carts: Arc<dyn CartRepo>,
    pub orders: Arc<dyn OrderRepo>,
    pub exhibitions: Arc<dyn ExhibitionRepo>,
}

impl Repositories {
    /// Every repository backed by the same store.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserRepo + ProductRepo + CartRepo + OrderRepo + ExhibitionRepo + 'static,
    {
        Self {
            users: store.clone(),
            products: store.clone(),
            carts: store.clone(),
            orders: store.clone(),
            exhibitions: store,
        }
    }

    pub fn in_memory() -> Self { Self::from_store(Arc::new(MemoryStore::default())) }
}
