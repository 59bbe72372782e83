//! Core library for the Marquee catalog backend.
//!
//! The interesting part of this crate is the [`catalog`] module: it turns
//! the flat, fanned-out rows produced by multi-table join queries back into
//! deduplicated, order-preserving nested aggregates. The [`repo`] module
//! wires that engine to Postgres, and [`stats`] overlays externally sourced
//! trailer view counts onto already-built aggregates.

pub mod catalog;
pub mod error;
pub mod repo;
pub mod stats;

pub use error::{CatalogError, Result};

pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
