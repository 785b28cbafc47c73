//! PostgreSQL store. Line items, cart contents and interest payloads are
//! JSONB columns; everything else is relational.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use crate::config::DatabaseConfig;
use crate::domain::aggregates::{
    Cart, CartItem, Exhibition, ExhibitionDraft, Interest, LineItem, Order, Product, ProductDraft, User,
};
use crate::domain::value_objects::{Email, Money};
use crate::error::{Result, StorefrontError};
use super::{CartRepo, ExhibitionRepo, OrderRepo, ProductRepo, UserRepo};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(config.url.expose_secret())
            .await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn corrupt(column: &str, err: impl std::fmt::Display) -> StorefrontError {
    StorefrontError::Storage(format!("bad {column} in store: {err}"))
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    is_blocked: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StorefrontError;
    fn try_from(r: UserRow) -> Result<Self> {
        let email = Email::new(r.email).map_err(|e| corrupt("email", e))?;
        let role = r.role.parse().map_err(|e: String| corrupt("role", e))?;
        Ok(User::restore(r.id, r.name, email, r.password_hash, role, r.is_blocked, r.created_at))
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: String,
    artisan_id: String,
    artisan_name: String,
    name: String,
    price: Decimal,
    mrp: Decimal,
    discount: Option<Decimal>,
    category: String,
    description: String,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        let draft = ProductDraft {
            name: r.name, price: Money::new(r.price), mrp: Money::new(r.mrp), discount: r.discount,
            category: r.category, description: r.description, image_url: r.image_url,
        };
        Product::restore(r.id, r.artisan_id, r.artisan_name, draft, r.created_at, r.updated_at)
    }
}

#[derive(sqlx::FromRow)]
struct CartRow {
    customer_id: String,
    items: Json<Vec<CartItem>>,
    updated_at: DateTime<Utc>,
    version: i64,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: String,
    kind: String,
    buyer_id: String,
    buyer_name: String,
    items: Json<Vec<LineItem>>,
    total: Decimal,
    status: String,
    payment_method: Option<String>,
    address: Option<String>,
    phone: Option<String>,
    purpose: Option<String>,
    version: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StorefrontError;
    fn try_from(r: OrderRow) -> Result<Self> {
        let kind = r.kind.parse().map_err(|e: String| corrupt("order kind", e))?;
        let status = r.status.parse().map_err(|e: String| corrupt("order status", e))?;
        let payment_method = r.payment_method
            .map(|m| m.parse().map_err(|e: String| corrupt("payment method", e)))
            .transpose()?;
        Ok(Order::restore(
            r.id, kind, r.buyer_id, r.buyer_name, r.items.0, Money::new(r.total), status,
            payment_method, r.address, r.phone, r.purpose, r.version, r.created_at,
        ))
    }
}

#[derive(sqlx::FromRow)]
struct ExhibitionRow {
    id: String,
    consultant_id: String,
    consultant_name: String,
    name: String,
    description: String,
    location: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    status: String,
    products: Vec<String>,
    visitors: i64,
    interested: Json<Vec<Interest>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ExhibitionRow> for Exhibition {
    type Error = StorefrontError;
    fn try_from(r: ExhibitionRow) -> Result<Self> {
        let status = r.status.parse().map_err(|e: String| corrupt("exhibition status", e))?;
        let visitors = u64::try_from(r.visitors).map_err(|e| corrupt("visitors", e))?;
        let draft = ExhibitionDraft {
            name: r.name, description: r.description, location: r.location,
            start_date: r.start_date, end_date: r.end_date, status, products: r.products,
        };
        Ok(Exhibition::restore(r.id, r.consultant_id, r.consultant_name, draft, visitors, r.interested.0, r.created_at))
    }
}

/// Partial unique index that admits at most one admin row.
const SINGLE_ADMIN_INDEX: &str = "users_single_admin";

const ORDER_COLUMNS: &str = "id, kind, buyer_id, buyer_name, items, total, status, payment_method, address, phone, purpose, version, created_at";

#[async_trait]
impl UserRepo for PgStore {
    async fn insert(&self, user: &User) -> Result<()> {
        sqlx::query("INSERT INTO users (id, name, email, password_hash, role, is_blocked, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7)")
            .bind(&user.id).bind(&user.name).bind(user.email.as_str()).bind(&user.password_hash)
            .bind(user.role.as_str()).bind(user.is_blocked).bind(user.created_at)
            .execute(&self.pool).await
            .map_err(|e| {
                let single_admin = matches!(&e, sqlx::Error::Database(db) if db.constraint() == Some(SINGLE_ADMIN_INDEX));
                match StorefrontError::from(e) {
                    _ if single_admin => StorefrontError::forbidden("admin accounts cannot be self-registered"),
                    StorefrontError::Conflict(_) => StorefrontError::conflict("email already registered"),
                    other => other,
                }
            })?;
        Ok(())
    }

    async fn find(&self, id: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id).fetch_optional(&self.pool).await?
            .map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
            .bind(email.as_str()).fetch_optional(&self.pool).await?
            .map(User::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<User>> {
        sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY created_at, id")
            .fetch_all(&self.pool).await?
            .into_iter().map(User::try_from).collect()
    }

    async fn toggle_blocked(&self, id: &str) -> Result<bool> {
        let row: Option<(bool,)> = sqlx::query_as("UPDATE users SET is_blocked = NOT is_blocked WHERE id = $1 RETURNING is_blocked")
            .bind(id).fetch_optional(&self.pool).await?;
        row.map(|(blocked,)| blocked).ok_or_else(|| StorefrontError::not_found(format!("user {id}")))
    }
}

#[async_trait]
impl ProductRepo for PgStore {
    async fn insert(&self, p: &Product) -> Result<()> {
        sqlx::query("INSERT INTO products (id, artisan_id, artisan_name, name, price, mrp, discount, category, description, image_url, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)")
            .bind(&p.id).bind(&p.artisan_id).bind(&p.artisan_name).bind(&p.name)
            .bind(p.price.amount()).bind(p.mrp.amount()).bind(p.discount).bind(&p.category)
            .bind(&p.description).bind(&p.image_url).bind(p.created_at).bind(p.updated_at)
            .execute(&self.pool).await?;
        Ok(())
    }

    async fn update(&self, p: &Product) -> Result<()> {
        let done = sqlx::query("UPDATE products SET name = $2, price = $3, mrp = $4, discount = $5, category = $6, description = $7, image_url = $8, updated_at = $9 WHERE id = $1")
            .bind(&p.id).bind(&p.name).bind(p.price.amount()).bind(p.mrp.amount()).bind(p.discount)
            .bind(&p.category).bind(&p.description).bind(&p.image_url).bind(p.updated_at)
            .execute(&self.pool).await?;
        if done.rows_affected() == 0 {
            return Err(StorefrontError::not_found(format!("product {}", p.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let done = sqlx::query("DELETE FROM products WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(done.rows_affected() > 0)
    }

    async fn find(&self, id: &str) -> Result<Option<Product>> {
        Ok(sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE id = $1")
            .bind(id).fetch_optional(&self.pool).await?
            .map(Product::from))
    }

    async fn list(&self) -> Result<Vec<Product>> {
        Ok(sqlx::query_as::<_, ProductRow>("SELECT * FROM products ORDER BY created_at, id")
            .fetch_all(&self.pool).await?
            .into_iter().map(Product::from).collect())
    }
}

#[async_trait]
impl CartRepo for PgStore {
    async fn load(&self, customer_id: &str) -> Result<Cart> {
        let row = sqlx::query_as::<_, CartRow>("SELECT * FROM carts WHERE customer_id = $1")
            .bind(customer_id).fetch_optional(&self.pool).await?;
        match row {
            Some(r) => Cart::restore(r.customer_id, r.items.0, r.updated_at, r.version).map_err(|e| corrupt("cart", e)),
            None => Ok(Cart::new(customer_id)),
        }
    }

    async fn save(&self, cart: &Cart, read_version: i64) -> Result<()> {
        Self::swap_cart(&self.pool, cart, read_version, "cart was modified concurrently").await
    }
}

impl PgStore {
    /// Upserts a cart whose stored version, 0 when absent, equals `read_version`.
    async fn swap_cart<'e, E>(executor: E, cart: &Cart, read_version: i64, stale: &str) -> Result<()>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let done = sqlx::query("INSERT INTO carts (customer_id, items, updated_at, version) VALUES ($1, $2, $3, $4) ON CONFLICT (customer_id) DO UPDATE SET items = EXCLUDED.items, updated_at = EXCLUDED.updated_at, version = EXCLUDED.version WHERE carts.version = $5")
            .bind(cart.customer_id()).bind(Json(cart.items())).bind(cart.updated_at())
            .bind(cart.version()).bind(read_version)
            .execute(executor).await?;
        if done.rows_affected() == 0 {
            return Err(StorefrontError::conflict(stale));
        }
        Ok(())
    }

    async fn insert_order<'e, E>(executor: E, o: &Order) -> Result<()>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        sqlx::query("INSERT INTO orders (id, kind, buyer_id, buyer_name, items, total, status, payment_method, address, phone, purpose, version, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)")
            .bind(&o.id).bind(o.kind.as_str()).bind(&o.buyer_id).bind(&o.buyer_name)
            .bind(Json(&o.items)).bind(o.total.amount()).bind(o.status.as_str())
            .bind(o.payment_method.map(|m| m.as_str())).bind(&o.address).bind(&o.phone).bind(&o.purpose)
            .bind(o.version).bind(o.created_at)
            .execute(executor).await?;
        Ok(())
    }
}

#[async_trait]
impl OrderRepo for PgStore {
    async fn insert(&self, order: &Order) -> Result<()> {
        Self::insert_order(&self.pool, order).await
    }

    async fn insert_checkout(&self, order: &Order, cart: &Cart, read_version: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        Self::swap_cart(&mut *tx, cart, read_version, "cart changed during checkout").await?;
        Self::insert_order(&mut *tx, order).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn find(&self, id: &str) -> Result<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id).fetch_optional(&self.pool).await?
            .map(Order::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, OrderRow>(&sql)
            .fetch_all(&self.pool).await?
            .into_iter().map(Order::try_from).collect()
    }

    async fn update_status(&self, order: &Order, read_version: i64) -> Result<()> {
        let done = sqlx::query("UPDATE orders SET status = $2, version = $3 WHERE id = $1 AND version = $4")
            .bind(&order.id).bind(order.status.as_str()).bind(order.version).bind(read_version)
            .execute(&self.pool).await?;
        if done.rows_affected() == 1 {
            return Ok(());
        }
        let exists: Option<(i64,)> = sqlx::query_as("SELECT version FROM orders WHERE id = $1")
            .bind(&order.id).fetch_optional(&self.pool).await?;
        Err(match exists {
            Some(_) => StorefrontError::conflict(format!("order {} was modified concurrently", order.id)),
            None => StorefrontError::not_found(format!("order {}", order.id)),
        })
    }
}

#[async_trait]
impl ExhibitionRepo for PgStore {
    async fn insert(&self, e: &Exhibition) -> Result<()> {
        sqlx::query("INSERT INTO exhibitions (id, consultant_id, consultant_name, name, description, location, start_date, end_date, status, products, visitors, interested, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)")
            .bind(&e.id).bind(&e.consultant_id).bind(&e.consultant_name).bind(&e.name)
            .bind(&e.description).bind(&e.location).bind(e.start_date).bind(e.end_date)
            .bind(e.status.as_str()).bind(&e.products)
            .bind(i64::try_from(e.visitors).unwrap_or(i64::MAX)).bind(Json(&e.interested)).bind(e.created_at)
            .execute(&self.pool).await?;
        Ok(())
    }

    async fn find(&self, id: &str) -> Result<Option<Exhibition>> {
        sqlx::query_as::<_, ExhibitionRow>("SELECT * FROM exhibitions WHERE id = $1")
            .bind(id).fetch_optional(&self.pool).await?
            .map(Exhibition::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<Exhibition>> {
        sqlx::query_as::<_, ExhibitionRow>("SELECT * FROM exhibitions ORDER BY start_date, created_at")
            .fetch_all(&self.pool).await?
            .into_iter().map(Exhibition::try_from).collect()
    }

    async fn register_interest(&self, id: &str, interest: Interest) -> Result<u64> {
        let visitors: Option<(i64,)> = sqlx::query_as(
            "UPDATE exhibitions SET visitors = visitors + 1, interested = interested || $2::jsonb WHERE id = $1 RETURNING visitors",
        )
        .bind(id).bind(Json(vec![interest]))
        .fetch_optional(&self.pool).await?;
        let (visitors,) = visitors.ok_or_else(|| StorefrontError::not_found(format!("exhibition {id}")))?;
        u64::try_from(visitors).map_err(|e| corrupt("visitors", e))
    }
}
