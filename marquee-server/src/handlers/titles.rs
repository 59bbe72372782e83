use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use marquee_model::{Title, TitleDraft, TitleFilters};
use serde_json::{Value, json};

use crate::auth::CurrentUser;
use crate::errors::AppResult;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(filters): Query<TitleFilters>,
) -> AppResult<Json<Vec<Title>>> {
    let mut titles = state.titles.find_all(&filters).await?;
    mark_favourites(&state, user.0, &mut titles).await?;
    Ok(Json(titles))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> AppResult<Json<Title>> {
    let mut title = state.titles.find_by_id(id).await?;
    title.is_favourite = state.favorites.contains(user.0, id).await?;
    Ok(Json(title))
}

pub async fn create(
    State(state): State<AppState>,
    Json(draft): Json<TitleDraft>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let id = state.titles.create(&draft).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(draft): Json<TitleDraft>,
) -> AppResult<StatusCode> {
    state.titles.update(id, &draft).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.titles.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Registers one watch of the title. Kept separate from `get` so reads
/// through admin tooling do not inflate the count.
pub async fn mark_watched(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.titles.increment_view_count(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn mark_favourites(
    state: &AppState,
    user_id: i32,
    titles: &mut [Title],
) -> AppResult<()> {
    let favourite_ids = state.favorites.list_title_ids(user_id).await?;
    for title in titles.iter_mut() {
        title.is_favourite = favourite_ids.contains(&title.id);
    }
    Ok(())
}
