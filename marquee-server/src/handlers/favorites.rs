use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use marquee_model::Title;

use crate::auth::CurrentUser;
use crate::errors::AppResult;
use crate::state::AppState;

/// Full title aggregates for everything the caller marked, in the order
/// the marks were made.
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Title>>> {
    let ids = state.favorites.list_title_ids(user.0).await?;

    let mut titles = Vec::with_capacity(ids.len());
    for id in ids {
        let mut title = state.titles.find_by_id(id).await?;
        title.is_favourite = true;
        titles.push(title);
    }

    Ok(Json(titles))
}

pub async fn add(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(title_id): Path<i32>,
) -> AppResult<StatusCode> {
    // Surfaces a 404 for unknown titles before touching the link table.
    state.titles.find_by_id(title_id).await?;
    state.favorites.add(user.0, title_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(title_id): Path<i32>,
) -> AppResult<StatusCode> {
    state.favorites.remove(user.0, title_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
