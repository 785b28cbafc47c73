//! HTTP surface: routes, extractors and request bodies.

mod admin;
mod auth;
mod cart;
mod exhibitions;
pub mod extract;
mod orders;
mod products;
mod reports;

use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use crate::state::AppState;

pub const SERVICE_NAME: &str = "tribal-heritage";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/captcha", get(auth::captcha))
        .route("/api/products", get(products::list).post(products::create))
        .route("/api/products/categories", get(products::categories))
        .route("/api/products/mine", get(products::mine))
        .route("/api/products/:id", get(products::get).put(products::update).delete(products::delete))
        .route("/api/cart", get(cart::show).delete(cart::clear))
        .route("/api/cart/items", post(cart::add))
        .route("/api/cart/items/:product_id", put(cart::set_quantity).delete(cart::remove))
        .route("/api/checkout", post(orders::checkout))
        .route("/api/bulk-orders", post(orders::bulk))
        .route("/api/orders", get(orders::list))
        .route("/api/orders/:id/status", put(orders::set_status))
        .route("/api/reports/sales", get(reports::sales))
        .route("/api/reports/dashboard", get(reports::dashboard))
        .route("/api/exhibitions", get(exhibitions::list).post(exhibitions::create))
        .route("/api/exhibitions/mine", get(exhibitions::mine))
        .route("/api/exhibitions/:id/register", post(exhibitions::register_interest))
        .route("/api/admin/users", get(admin::users))
        .route("/api/admin/users/:id/block", put(admin::toggle_block))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": SERVICE_NAME }))
}
