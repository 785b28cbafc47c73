use std::collections::HashMap;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;
use crate::domain::aggregates::{Actor, Delivery, Order, OrderStatus, PaymentMethod};
use crate::error::Result;
use crate::services::{BulkRequest, OrderListing};
use crate::state::AppState;
use super::extract::{parse_param, Body, Params};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[validate(length(max = 500, message = "address is too long"))]
    pub address: String,
    #[validate(length(max = 20, message = "phone number is too long"))]
    pub phone: String,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BulkOrderRequest {
    #[validate(length(max = 500, message = "purpose is too long"))]
    pub purpose: String,
    #[serde(default)]
    pub selections: HashMap<String, i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: OrderStatus,
    pub expected_version: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    pub status: Option<String>,
}

pub async fn checkout(State(state): State<AppState>, actor: Actor, Body(req): Body<CheckoutRequest>) -> Result<(StatusCode, Json<Order>)> {
    req.validate()?;
    let delivery = Delivery { address: req.address, phone: req.phone, payment_method: req.payment_method };
    let order = state.place_order(&actor, delivery).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn bulk(State(state): State<AppState>, actor: Actor, Body(req): Body<BulkOrderRequest>) -> Result<(StatusCode, Json<Order>)> {
    req.validate()?;
    let order = state
        .place_bulk_order(&actor, BulkRequest { purpose: req.purpose, selections: req.selections })
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn list(State(state): State<AppState>, actor: Actor, Params(query): Params<OrderQuery>) -> Result<Json<OrderListing>> {
    let status = parse_param::<OrderStatus>(query.status.as_deref())?;
    Ok(Json(state.list_orders(&actor, status).await?))
}

pub async fn set_status(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    Body(req): Body<StatusUpdate>,
) -> Result<Json<Order>> {
    Ok(Json(state.set_order_status(&actor, &id, req.status, req.expected_version).await?))
}
