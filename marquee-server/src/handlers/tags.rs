use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use marquee_model::{Tag, TagDraft, TagKind};
use serde_json::{Value, json};

use crate::errors::AppResult;
use crate::state::AppState;

/// The three tag vocabularies share one handler set. The router layers the
/// vocabulary kind in as an extension when mounting each group.
fn repo<'a>(
    state: &'a AppState,
    kind: TagKind,
) -> &'a marquee_core::repo::PostgresTagRepository {
    match kind {
        TagKind::Genre => &state.genres,
        TagKind::Category => &state.categories,
        TagKind::AgeRating => &state.age_ratings,
    }
}

pub async fn list(
    State(state): State<AppState>,
    Extension(kind): Extension<TagKind>,
) -> AppResult<Json<Vec<Tag>>> {
    Ok(Json(repo(&state, kind).find_all().await?))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(kind): Extension<TagKind>,
    Path(id): Path<i32>,
) -> AppResult<Json<Tag>> {
    Ok(Json(repo(&state, kind).find_by_id(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(kind): Extension<TagKind>,
    Json(draft): Json<TagDraft>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let id = repo(&state, kind).create(&draft).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(kind): Extension<TagKind>,
    Path(id): Path<i32>,
    Json(draft): Json<TagDraft>,
) -> AppResult<StatusCode> {
    repo(&state, kind).update(id, &draft).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(kind): Extension<TagKind>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    repo(&state, kind).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
