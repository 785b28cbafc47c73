//! In-memory store. Each collection sits behind its own `RwLock`; checkout
//! takes `orders` then `carts`, and nothing else holds two locks.

use std::collections::HashMap;
use async_trait::async_trait;
use tokio::sync::RwLock;
use crate::domain::aggregates::{Cart, Exhibition, Interest, Order, Product, Role, User};
use crate::domain::value_objects::Email;
use crate::error::{Result, StorefrontError};
use super::{CartRepo, ExhibitionRepo, OrderRepo, ProductRepo, UserRepo};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    products: RwLock<Vec<Product>>,
    carts: RwLock<HashMap<String, Cart>>,
    orders: RwLock<Vec<Order>>,
    exhibitions: RwLock<Vec<Exhibition>>,
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn insert(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(StorefrontError::conflict("email already registered"));
        }
        if user.role == Role::Admin && users.iter().any(|u| u.role == Role::Admin) {
            return Err(StorefrontError::forbidden("admin accounts cannot be self-registered"));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>> {
        Ok(self.users.read().await.iter().find(|u| &u.email == email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>> { Ok(self.users.read().await.clone()) }

    async fn toggle_blocked(&self, id: &str) -> Result<bool> {
        let mut users = self.users.write().await;
        let user = users.iter_mut().find(|u| u.id == id).ok_or_else(|| StorefrontError::not_found(format!("user {id}")))?;
        user.is_blocked = !user.is_blocked;
        Ok(user.is_blocked)
    }
}

#[async_trait]
impl ProductRepo for MemoryStore {
    async fn insert(&self, product: &Product) -> Result<()> {
        let mut products = self.products.write().await;
        if products.iter().any(|p| p.id == product.id) {
            return Err(StorefrontError::conflict(format!("product {} already exists", product.id)));
        }
        products.push(product.clone());
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<()> {
        let mut products = self.products.write().await;
        let slot = products.iter_mut().find(|p| p.id == product.id)
            .ok_or_else(|| StorefrontError::not_found(format!("product {}", product.id)))?;
        *slot = product.clone();
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| p.id != id);
        Ok(products.len() != before)
    }

    async fn find(&self, id: &str) -> Result<Option<Product>> {
        Ok(self.products.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>> { Ok(self.products.read().await.clone()) }
}

#[async_trait]
impl CartRepo for MemoryStore {
    async fn load(&self, customer_id: &str) -> Result<Cart> {
        Ok(self.carts.read().await.get(customer_id).cloned().unwrap_or_else(|| Cart::new(customer_id)))
    }

    async fn save(&self, cart: &Cart, read_version: i64) -> Result<()> {
        let mut carts = self.carts.write().await;
        swap_cart(&mut carts, cart, read_version, "cart was modified concurrently")
    }
}

fn swap_cart(carts: &mut HashMap<String, Cart>, cart: &Cart, read_version: i64, stale: &str) -> Result<()> {
    let stored = carts.get(cart.customer_id()).map_or(0, Cart::version);
    if stored != read_version {
        return Err(StorefrontError::conflict(stale));
    }
    carts.insert(cart.customer_id().to_string(), cart.clone());
    Ok(())
}

#[async_trait]
impl OrderRepo for MemoryStore {
    async fn insert(&self, order: &Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        if orders.iter().any(|o| o.id == order.id) {
            return Err(StorefrontError::conflict(format!("order {} already exists", order.id)));
        }
        orders.push(order.clone());
        Ok(())
    }

    async fn insert_checkout(&self, order: &Order, cart: &Cart, read_version: i64) -> Result<()> {
        let mut orders = self.orders.write().await;
        let mut carts = self.carts.write().await;
        if orders.iter().any(|o| o.id == order.id) {
            return Err(StorefrontError::conflict(format!("order {} already exists", order.id)));
        }
        swap_cart(&mut carts, cart, read_version, "cart changed during checkout")?;
        orders.push(order.clone());
        Ok(())
    }

    async fn find(&self, id: &str) -> Result<Option<Order>> {
        Ok(self.orders.read().await.iter().find(|o| o.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Order>> {
        Ok(self.orders.read().await.iter().rev().cloned().collect())
    }

    async fn update_status(&self, order: &Order, read_version: i64) -> Result<()> {
        let mut orders = self.orders.write().await;
        let stored = orders.iter_mut().find(|o| o.id == order.id)
            .ok_or_else(|| StorefrontError::not_found(format!("order {}", order.id)))?;
        if stored.version != read_version {
            return Err(StorefrontError::conflict(format!("order {} was modified concurrently", order.id)));
        }
        stored.status = order.status;
        stored.version = order.version;
        Ok(())
    }
}

#[async_trait]
impl ExhibitionRepo for MemoryStore {
    async fn insert(&self, exhibition: &Exhibition) -> Result<()> {
        self.exhibitions.write().await.push(exhibition.clone());
        Ok(())
    }

    async fn find(&self, id: &str) -> Result<Option<Exhibition>> {
        Ok(self.exhibitions.read().await.iter().find(|e| e.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<Exhibition>> {
        let mut all = self.exhibitions.read().await.clone();
        all.sort_by_key(|e| e.start_date);
        Ok(all)
    }

    async fn register_interest(&self, id: &str, interest: Interest) -> Result<u64> {
        let mut exhibitions = self.exhibitions.write().await;
        let exhibition = exhibitions.iter_mut().find(|e| e.id == id)
            .ok_or_else(|| StorefrontError::not_found(format!("exhibition {id}")))?;
        Ok(exhibition.register_interest(interest))
    }
}
