use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;
use crate::domain::aggregates::Role;
use crate::error::Result;
use crate::services::{CaptchaChallenge, Registration, Session};
use crate::state::AppState;
use super::extract::Body;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(max = 120, message = "name is too long"))]
    pub name: Option<String>,
    #[validate(email(message = "invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub captcha_id: Option<String>,
    /// Accepted as a string or a bare number.
    pub captcha_answer: Option<Value>,
}

pub async fn register(State(state): State<AppState>, Body(req): Body<RegisterRequest>) -> Result<(StatusCode, Json<Session>)> {
    req.validate()?;
    let session = state
        .register(Registration { name: req.name, email: req.email, password: req.password, role: req.role })
        .await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn login(State(state): State<AppState>, Body(req): Body<LoginRequest>) -> Result<Json<Session>> {
    let answer = req.captcha_answer.map(|value| match value {
        Value::String(s) => s,
        other => other.to_string(),
    });
    let captcha = req.captcha_id.as_deref().zip(answer.as_deref());
    Ok(Json(state.login(&req.email, &req.password, captcha).await?))
}

pub async fn captcha(State(state): State<AppState>) -> Json<CaptchaChallenge> {
    Json(state.captcha.issue().await)
}
