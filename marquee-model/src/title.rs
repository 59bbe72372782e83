use serde::{Deserialize, Serialize};

use crate::{episode::Episode, season::Season, tag::Tag};

/// A fully reconstructed catalog title with its dimension tags, its flat
/// episode list and its season groupings.
///
/// Instances are built fresh per request from join-query results and are
/// never mutated after being handed to the response layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Title {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub release_year: i32,
    pub director: String,
    pub producer: Option<String>,
    pub rating: i32,
    pub is_favourite: bool,
    pub trailer_url: String,
    pub poster_url: String,
    /// View count of the trailer on the external video platform. Null until
    /// the enrichment overlay has run (and stays at the stored value when
    /// enrichment is skipped or fails).
    pub trailer_views: Option<i64>,
    pub duration: Option<String>,
    pub video_url: Option<String>,
    /// Internal view counter, bumped each time a user fetches the title.
    pub view_count: Option<i32>,
    pub screen_url: Option<String>,
    pub genres: Vec<Tag>,
    pub categories: Vec<Tag>,
    pub age_ratings: Vec<Tag>,
    /// Episodes associated directly with the title, independent of seasons.
    pub episodes: Vec<Episode>,
    pub seasons: Vec<Season>,
}

/// Payload for creating or replacing a title. Associations are supplied as
/// id lists; empty lists are valid and yield a title with empty tag lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TitleDraft {
    pub title: String,
    pub description: String,
    pub release_year: i32,
    pub director: String,
    pub producer: Option<String>,
    pub trailer_url: String,
    pub poster_url: String,
    pub duration: Option<String>,
    pub video_url: Option<String>,
    pub screen_url: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
    #[serde(default)]
    pub category_ids: Vec<i32>,
    #[serde(default)]
    pub age_rating_ids: Vec<i32>,
    #[serde(default)]
    pub episode_ids: Vec<i32>,
}

/// Optional, string-typed filter criteria as supplied by the caller.
///
/// Everything is optional; id filters and the watched flag arrive as raw
/// strings from the query layer and are interpreted by the predicate
/// builder.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleFilters {
    pub search: Option<String>,
    pub genre_id: Option<String>,
    pub category_id: Option<String>,
    pub age_rating_id: Option<String>,
    pub watched: Option<String>,
    pub sort: Option<String>,
}
