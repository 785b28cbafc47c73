use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;
use crate::domain::aggregates::{Actor, Product, ProductDraft};
use crate::domain::value_objects::Money;
use crate::error::Result;
use crate::state::AppState;
use super::extract::{Body, Params};

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub price: Money,
    pub mrp: Money,
    pub discount: Option<Decimal>,
    #[validate(length(min = 1, max = 60))]
    pub category: String,
    #[validate(length(max = 5000))]
    pub description: String,
    pub image_url: Option<String>,
}

impl From<ProductRequest> for ProductDraft {
    fn from(req: ProductRequest) -> Self {
        Self {
            name: req.name,
            price: req.price,
            mrp: req.mrp,
            discount: req.discount,
            category: req.category,
            description: req.description,
            image_url: req.image_url.filter(|url| !url.trim().is_empty()),
        }
    }
}

pub async fn list(State(state): State<AppState>, Params(query): Params<ProductQuery>) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.search_products(query.category.as_deref(), query.q.as_deref()).await?))
}

pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    Ok(Json(state.categories().await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>> {
    Ok(Json(state.product(&id).await?))
}

pub async fn mine(State(state): State<AppState>, actor: Actor) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.artisan_products(&actor).await?))
}

pub async fn create(State(state): State<AppState>, actor: Actor, Body(req): Body<ProductRequest>) -> Result<(StatusCode, Json<Product>)> {
    req.validate()?;
    let product = state.create_product(&actor, req.into()).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    Body(req): Body<ProductRequest>,
) -> Result<Json<Product>> {
    req.validate()?;
    Ok(Json(state.update_product(&actor, &id, req.into()).await?))
}

pub async fn delete(State(state): State<AppState>, actor: Actor, Path(id): Path<String>) -> Result<Json<Value>> {
    state.delete_product(&actor, &id).await?;
    Ok(Json(json!({ "success": true, "message": "Product deleted" })))
}
