use serde::{Deserialize, Serialize};

use crate::episode::Episode;

/// A season grouping episodes of a title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub id: i32,
    pub number: i32,
    pub title: String,
    /// Episodes attached through the season association, in the order they
    /// were first seen. Empty when the season has no episodes yet.
    pub episodes: Vec<Episode>,
}

/// Payload for creating or replacing a season.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonDraft {
    pub number: i32,
    pub title: String,
}
