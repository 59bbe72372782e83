use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use marquee_model::{Episode, EpisodeDraft};
use serde_json::{Value, json};

use crate::errors::AppResult;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Episode>>> {
    Ok(Json(state.episodes.find_all().await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Episode>> {
    Ok(Json(state.episodes.find_by_id(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(draft): Json<EpisodeDraft>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let id = state.episodes.create(&draft).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(draft): Json<EpisodeDraft>,
) -> AppResult<StatusCode> {
    state.episodes.update(id, &draft).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.episodes.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
