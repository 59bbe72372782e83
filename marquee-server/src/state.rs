use std::sync::Arc;

use marquee_core::repo::{
    PostgresEpisodeRepository, PostgresFavoriteRepository,
    PostgresSeasonRepository, PostgresTagRepository, PostgresTitleRepository,
    PostgresUserRepository,
};
use marquee_core::stats::{OverlayOptions, YouTubeStatsClient};
use marquee_model::TagKind;
use sqlx::PgPool;

use crate::config::Config;

/// Shared handler state. Repositories hold pool clones, so cloning the
/// state per request is cheap.
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<Config>,
    pub titles: PostgresTitleRepository,
    pub seasons: PostgresSeasonRepository,
    pub episodes: PostgresEpisodeRepository,
    pub genres: PostgresTagRepository,
    pub categories: PostgresTagRepository,
    pub age_ratings: PostgresTagRepository,
    pub users: PostgresUserRepository,
    pub favorites: PostgresFavoriteRepository,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        let titles = match &config.youtube_api_key {
            Some(key) => PostgresTitleRepository::with_stats(
                pool.clone(),
                Arc::new(YouTubeStatsClient::new(key.clone())),
                OverlayOptions::default(),
            ),
            None => PostgresTitleRepository::new(pool.clone()),
        };

        Self {
            config: Arc::new(config),
            titles,
            seasons: PostgresSeasonRepository::new(pool.clone()),
            episodes: PostgresEpisodeRepository::new(pool.clone()),
            genres: PostgresTagRepository::new(pool.clone(), TagKind::Genre),
            categories: PostgresTagRepository::new(pool.clone(), TagKind::Category),
            age_ratings: PostgresTagRepository::new(pool.clone(), TagKind::AgeRating),
            users: PostgresUserRepository::new(pool.clone()),
            favorites: PostgresFavoriteRepository::new(pool),
        }
    }
}
