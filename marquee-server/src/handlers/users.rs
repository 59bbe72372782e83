use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use marquee_model::{User, UserDraft};
use serde_json::{Value, json};

use crate::auth::password;
use crate::errors::{AppError, AppResult};
use crate::state::AppState;

// Admin-only account management. Self-service lives in the auth handlers.

pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    Ok(Json(state.users.find_all().await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<User>> {
    Ok(Json(state.users.find_by_id(id).await?))
}

#[derive(Debug, serde::Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: marquee_model::UserRole,
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    if state.users.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::conflict("email already registered"));
    }

    let draft = UserDraft {
        name: req.name,
        email: req.email,
        password_hash: password::hash_password(&req.password)?,
        phone: None,
        birthday: None,
        role: req.role,
        poster_url: None,
    };
    let id = state.users.create(&draft).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

#[derive(Debug, serde::Deserialize)]
pub struct UpdateUserRequest {
    pub name: String,
    pub email: String,
    pub role: marquee_model::UserRole,
}

/// Replaces identity fields and role; credentials stay as stored.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateUserRequest>,
) -> AppResult<StatusCode> {
    let current = state.users.find_by_id(id).await?;

    if req.email != current.email
        && state.users.find_by_email(&req.email).await?.is_some()
    {
        return Err(AppError::conflict("email already registered"));
    }

    let draft = UserDraft {
        name: req.name,
        email: req.email,
        password_hash: current.password_hash,
        phone: current.phone,
        birthday: current.birthday,
        role: req.role,
        poster_url: current.poster_url,
    };
    state.users.update(id, &draft).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
