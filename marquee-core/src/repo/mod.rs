//! Postgres repositories.
//!
//! Each repository owns a cloned [`sqlx::PgPool`] handed in by the caller
//! at construction; nothing here reaches for global state. Connections are
//! checked out per query and returned on every exit path, including decode
//! errors. Queries are built at runtime with bound parameters.

pub mod episodes;
pub mod favorites;
pub mod seasons;
pub mod tags;
pub mod titles;
pub mod users;

pub use episodes::PostgresEpisodeRepository;
pub use favorites::PostgresFavoriteRepository;
pub use seasons::PostgresSeasonRepository;
pub use tags::PostgresTagRepository;
pub use titles::PostgresTitleRepository;
pub use users::PostgresUserRepository;
