use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use crate::domain::aggregates::{Actor, User};
use crate::error::Result;
use crate::state::AppState;
use super::extract::Params;

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub q: Option<String>,
}

pub async fn users(State(state): State<AppState>, actor: Actor, Params(query): Params<UserQuery>) -> Result<Json<Vec<User>>> {
    Ok(Json(state.list_users(&actor, query.q.as_deref()).await?))
}

pub async fn toggle_block(State(state): State<AppState>, actor: Actor, Path(id): Path<String>) -> Result<Json<User>> {
    Ok(Json(state.toggle_block(&actor, &id).await?))
}
