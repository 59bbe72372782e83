pub mod assets;
pub mod auth;
pub mod episodes;
pub mod favorites;
pub mod seasons;
pub mod tags;
pub mod titles;
pub mod users;
