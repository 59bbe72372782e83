use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::auth::jwt;
use crate::errors::AppError;
use crate::state::AppState;

/// Identity of the authenticated caller, inserted as a request extension
/// by [`require_auth`].
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub i32);

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&req)
        .ok_or_else(|| AppError::unauthorized("missing bearer token"))?;

    let claims = jwt::validate_token(token, &state.config.jwt_secret)
        .map_err(|_| AppError::unauthorized("invalid or expired token"))?;

    req.extensions_mut().insert(CurrentUser(claims.sub));
    Ok(next.run(req).await)
}

/// Runs after [`require_auth`], so the extension is always present.
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .copied()
        .ok_or_else(|| AppError::unauthorized("missing bearer token"))?;

    if !state.users.is_admin(user.0).await? {
        return Err(AppError::forbidden("admin access required"));
    }

    Ok(next.run(req).await)
}

fn bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
