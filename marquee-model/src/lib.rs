//! Core data model definitions shared across Marquee crates.

pub mod episode;
pub mod season;
pub mod tag;
pub mod title;
pub mod user;

pub use episode::{Episode, EpisodeDraft};
pub use season::{Season, SeasonDraft};
pub use tag::{Tag, TagDraft, TagKind};
pub use title::{Title, TitleDraft, TitleFilters};
pub use user::{User, UserDraft, UserProfileUpdate, UserRole};
