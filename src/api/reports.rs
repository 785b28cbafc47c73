use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use crate::domain::aggregates::Actor;
use crate::domain::reporting::{Dashboard, Period, SalesBucket};
use crate::error::Result;
use crate::state::AppState;
use super::extract::{parse_param, Params};

#[derive(Debug, Default, Deserialize)]
pub struct SalesQuery {
    pub period: Option<String>,
}

pub async fn sales(State(state): State<AppState>, actor: Actor, Params(query): Params<SalesQuery>) -> Result<Json<Vec<SalesBucket>>> {
    let period = parse_param::<Period>(query.period.as_deref())?.unwrap_or_default();
    Ok(Json(state.sales_report(&actor, period).await?))
}

pub async fn dashboard(State(state): State<AppState>, actor: Actor) -> Result<Json<Dashboard>> {
    Ok(Json(state.dashboard(&actor).await?))
}
