use axum::{
    Extension, Json, Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
};
use marquee_model::TagKind;
use serde_json::json;
use tower_http::services::ServeDir;

use crate::auth::middleware::{require_admin, require_auth};
use crate::handlers;
use crate::state::AppState;

pub fn build(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/sign-up", post(handlers::auth::sign_up))
        .route("/auth/sign-in", post(handlers::auth::sign_in));

    let authorized = Router::new()
        .route("/auth/sign-out", post(handlers::auth::sign_out))
        .route(
            "/auth/me",
            get(handlers::auth::user_info).put(handlers::auth::update_profile),
        )
        .route("/auth/me/password", put(handlers::auth::change_password))
        .route("/titles", get(handlers::titles::list))
        .route("/titles/{id}", get(handlers::titles::get))
        .route("/titles/{id}/watch", post(handlers::titles::mark_watched))
        .route("/episodes", get(handlers::episodes::list))
        .route("/episodes/{id}", get(handlers::episodes::get))
        .route("/seasons", get(handlers::seasons::list))
        .route("/seasons/{id}", get(handlers::seasons::get))
        .route("/favorites", get(handlers::favorites::list))
        .route(
            "/favorites/{id}",
            post(handlers::favorites::add).delete(handlers::favorites::remove),
        )
        .merge(tag_read_routes("/genres", TagKind::Genre))
        .merge(tag_read_routes("/categories", TagKind::Category))
        .merge(tag_read_routes("/age-ratings", TagKind::AgeRating))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let admin = Router::new()
        .route("/titles", post(handlers::titles::create))
        .route(
            "/titles/{id}",
            put(handlers::titles::update).delete(handlers::titles::delete),
        )
        .route("/episodes", post(handlers::episodes::create))
        .route(
            "/episodes/{id}",
            put(handlers::episodes::update).delete(handlers::episodes::delete),
        )
        .route("/seasons", post(handlers::seasons::create))
        .route(
            "/seasons/{id}",
            put(handlers::seasons::update).delete(handlers::seasons::delete),
        )
        .merge(tag_write_routes("/genres", TagKind::Genre))
        .merge(tag_write_routes("/categories", TagKind::Category))
        .merge(tag_write_routes("/age-ratings", TagKind::AgeRating))
        .route("/users", get(handlers::users::list).post(handlers::users::create))
        .route(
            "/users/{id}",
            get(handlers::users::get)
                .put(handlers::users::update)
                .delete(handlers::users::delete),
        )
        .route(
            "/assets",
            post(handlers::assets::upload)
                .layer(DefaultBodyLimit::max(handlers::assets::MAX_UPLOAD_BYTES)),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let uploads = ServeDir::new(&state.config.upload_root);

    Router::new()
        .nest("/api", public.merge(authorized).merge(admin))
        .nest_service("/uploads", uploads)
        .with_state(state)
}

fn tag_read_routes(prefix: &str, kind: TagKind) -> Router<AppState> {
    Router::new()
        .route(prefix, get(handlers::tags::list))
        .route(&format!("{}/{{id}}", prefix), get(handlers::tags::get))
        .layer(Extension(kind))
}

fn tag_write_routes(prefix: &str, kind: TagKind) -> Router<AppState> {
    Router::new()
        .route(prefix, post(handlers::tags::create))
        .route(
            &format!("{}/{{id}}", prefix),
            put(handlers::tags::update).delete(handlers::tags::delete),
        )
        .layer(Extension(kind))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
