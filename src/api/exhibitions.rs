use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use validator::Validate;
use crate::domain::aggregates::{Actor, Exhibition, ExhibitionDraft, ExhibitionStatus};
use crate::error::Result;
use crate::state::AppState;
use super::extract::Body;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ExhibitionRequest {
    #[validate(length(max = 200))]
    pub name: String,
    #[validate(length(max = 5000))]
    pub description: String,
    #[validate(length(max = 200))]
    pub location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub status: ExhibitionStatus,
    #[serde(default)]
    pub products: Vec<String>,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Exhibition>>> {
    Ok(Json(state.exhibitions().await?))
}

pub async fn mine(State(state): State<AppState>, actor: Actor) -> Result<Json<Vec<Exhibition>>> {
    Ok(Json(state.consultant_exhibitions(&actor).await?))
}

pub async fn create(State(state): State<AppState>, actor: Actor, Body(req): Body<ExhibitionRequest>) -> Result<(StatusCode, Json<Exhibition>)> {
    req.validate()?;
    let draft = ExhibitionDraft {
        name: req.name,
        description: req.description,
        location: req.location,
        start_date: req.start_date,
        end_date: req.end_date,
        status: req.status,
        products: req.products,
    };
    let exhibition = state.create_exhibition(&actor, draft).await?;
    Ok((StatusCode::CREATED, Json(exhibition)))
}

/// The body is optional; anything sent is stored alongside the timestamp.
pub async fn register_interest(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<Body<Map<String, Value>>>,
) -> Result<Json<Value>> {
    let payload = body.map(|Body(map)| map).unwrap_or_default();
    let visitors = state.register_interest(&id, payload).await?;
    Ok(Json(json!({ "success": true, "visitors": visitors })))
}
