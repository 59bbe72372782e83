use std::fmt;

use serde::{Deserialize, Serialize};

/// The three many-to-many classification dimensions a title can carry.
///
/// All three share the same row shape (id, label, poster), so a single
/// [`Tag`] value type serves every kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    Genre,
    Category,
    AgeRating,
}

impl TagKind {
    pub fn all() -> &'static [TagKind] {
        &[TagKind::Genre, TagKind::Category, TagKind::AgeRating]
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TagKind::Genre => "genre",
            TagKind::Category => "category",
            TagKind::AgeRating => "age rating",
        };
        write!(f, "{}", name)
    }
}

/// One classification value (a genre, a category or an age rating).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i32,
    pub label: String,
    pub poster_url: Option<String>,
}

/// Payload for creating or replacing a tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagDraft {
    pub label: String,
    pub poster_url: Option<String>,
}
