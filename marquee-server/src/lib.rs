//! HTTP API for the Marquee catalog.
//!
//! Thin axum layer over `marquee-core`: handlers translate requests into
//! repository calls and map [`marquee_core::CatalogError`] onto HTTP
//! statuses. Route groups are split by access level (public, signed-in,
//! admin).

pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::Config;
pub use errors::{AppError, AppResult};
pub use state::AppState;
