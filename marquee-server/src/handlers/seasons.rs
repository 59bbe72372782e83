use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use marquee_model::{Season, SeasonDraft};
use serde_json::{Value, json};

use crate::errors::AppResult;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Season>>> {
    Ok(Json(state.seasons.find_all().await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Season>> {
    Ok(Json(state.seasons.find_by_id(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(draft): Json<SeasonDraft>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let id = state.seasons.create(&draft).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(draft): Json<SeasonDraft>,
) -> AppResult<StatusCode> {
    state.seasons.update(id, &draft).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.seasons.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
