use serde::{Deserialize, Serialize};

/// One episode of a title.
///
/// Episodes appear both directly under a title (the flat list) and under a
/// season. Only the id is guaranteed; the remaining columns are nullable in
/// storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub id: i32,
    /// Ordinal number within its run.
    pub number: Option<i32>,
    pub title: Option<String>,
    pub trailer_url: Option<String>,
    pub duration: Option<String>,
    pub poster_url: Option<String>,
}

/// Payload for creating or replacing an episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeDraft {
    pub number: Option<i32>,
    pub title: Option<String>,
    pub trailer_url: Option<String>,
    pub duration: Option<String>,
    pub poster_url: Option<String>,
}
