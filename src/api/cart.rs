use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use crate::domain::aggregates::{Actor, Cart};
use crate::error::Result;
use crate::state::AppState;
use super::extract::Body;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItem {
    pub product_id: String,
}

#[derive(Debug, Deserialize)]
pub struct QuantityUpdate {
    pub quantity: i64,
}

pub async fn show(State(state): State<AppState>, actor: Actor) -> Result<Json<Cart>> {
    Ok(Json(state.cart(&actor).await?))
}

pub async fn clear(State(state): State<AppState>, actor: Actor) -> Result<Json<Cart>> {
    Ok(Json(state.clear_cart(&actor).await?))
}

pub async fn add(State(state): State<AppState>, actor: Actor, Body(req): Body<AddItem>) -> Result<Json<Cart>> {
    Ok(Json(state.add_to_cart(&actor, &req.product_id).await?))
}

pub async fn set_quantity(
    State(state): State<AppState>,
    actor: Actor,
    Path(product_id): Path<String>,
    Body(req): Body<QuantityUpdate>,
) -> Result<Json<Cart>> {
    Ok(Json(state.update_cart_quantity(&actor, &product_id, req.quantity).await?))
}

pub async fn remove(State(state): State<AppState>, actor: Actor, Path(product_id): Path<String>) -> Result<Json<Cart>> {
    Ok(Json(state.remove_from_cart(&actor, &product_id).await?))
}
