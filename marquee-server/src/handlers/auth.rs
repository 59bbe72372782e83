use axum::{Extension, Json, extract::State, http::StatusCode};
use marquee_model::{User, UserDraft, UserProfileUpdate, UserRole};
use serde::{Deserialize, Serialize};

use crate::auth::{CurrentUser, jwt, password};
use crate::errors::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> AppResult<(StatusCode, Json<TokenResponse>)> {
    if req.password.len() < 8 {
        return Err(AppError::bad_request(
            "password must be at least 8 characters",
        ));
    }
    if state.users.find_by_email(&req.email).await?.is_some() {
        return Err(AppError::conflict("email already registered"));
    }

    let draft = UserDraft {
        name: req.name,
        email: req.email,
        password_hash: password::hash_password(&req.password)?,
        phone: None,
        birthday: None,
        role: UserRole::Member,
        poster_url: None,
    };
    let id = state.users.create(&draft).await?;

    let token = issue_token(&state, id)?;
    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> AppResult<Json<TokenResponse>> {
    // One error for both unknown email and bad password, so callers
    // cannot probe which emails exist.
    let user = state
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or_else(|| AppError::unauthorized("invalid credentials"))?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::unauthorized("invalid credentials"));
    }

    let token = issue_token(&state, user.id)?;
    Ok(Json(TokenResponse { token }))
}

/// Tokens are stateless, so sign-out is an acknowledgement; the client
/// discards its copy.
pub async fn sign_out() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub async fn user_info(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<User>> {
    Ok(Json(state.users.find_by_id(user.0).await?))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(update): Json<UserProfileUpdate>,
) -> AppResult<StatusCode> {
    state.users.update_profile(user.0, &update).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    if req.new_password.len() < 8 {
        return Err(AppError::bad_request(
            "password must be at least 8 characters",
        ));
    }

    let current = state.users.find_by_id(user.0).await?;
    if !password::verify_password(&req.current_password, &current.password_hash)? {
        return Err(AppError::unauthorized("invalid credentials"));
    }

    let hash = password::hash_password(&req.new_password)?;
    state.users.update_password(user.0, &hash).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn issue_token(state: &AppState, user_id: i32) -> Result<String, AppError> {
    jwt::generate_token(
        user_id,
        &state.config.jwt_secret,
        state.config.jwt_expiry_secs,
    )
    .map_err(|err| {
        tracing::error!(error = %err, "token generation failed");
        AppError::internal("internal server error")
    })
}
