use marquee_model::{Episode, Season, Tag, Title};
use sqlx::{Postgres, Row, postgres::PgRow};

use crate::error::{CatalogError, Result};

/// The scalar columns of the titles table, as selected by both join
/// queries. Association lists live on the accumulator side.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleScalars {
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
    pub trailer_views: Option<i64>,
    pub duration: Option<String>,
    pub video_url: Option<String>,
    pub view_count: Option<i32>,
    pub screen_url: Option<String>,
}

impl TitleScalars {
    pub fn into_title(self) -> Title {
        Title {
            id: self.id,
            title: self.title,
            description: self.description,
            release_year: self.release_year,
            director: self.director,
            producer: self.producer,
            rating: self.rating,
            is_favourite: self.is_favourite,
            trailer_url: self.trailer_url,
            poster_url: self.poster_url,
            trailer_views: self.trailer_views,
            duration: self.duration,
            video_url: self.video_url,
            view_count: self.view_count,
            screen_url: self.screen_url,
            genres: Vec::new(),
            categories: Vec::new(),
            age_ratings: Vec::new(),
            episodes: Vec::new(),
            seasons: Vec::new(),
        }
    }
}

/// Scalar columns of one season, before any episodes are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonRecord {
    pub id: i32,
    pub number: i32,
    pub title: String,
}

impl SeasonRecord {
    pub fn into_season(self) -> Season {
        Season {
            id: self.id,
            number: self.number,
            title: self.title,
            episodes: Vec::new(),
        }
    }
}

/// One decoded row of the flat-children query: title scalars, exactly one
/// instance of each inner-joined dimension, and the outer-joined episode
/// when one matched.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRow {
    pub title: TitleScalars,
    pub genre: Tag,
    pub category: Tag,
    pub age_rating: Tag,
    pub episode: Option<Episode>,
}

/// One decoded row of the season (grouped-children) query.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedRow {
    pub title: TitleScalars,
    pub season: SeasonRecord,
    pub episode: Option<Episode>,
}

pub fn decode_flat_row(row: &PgRow) -> Result<FlatRow> {
    Ok(FlatRow {
        title: decode_title_scalars(row)?,
        genre: decode_tag(row, "genre_id", "genre_label", "genre_poster")?,
        category: decode_tag(
            row,
            "category_id",
            "category_label",
            "category_poster",
        )?,
        age_rating: decode_tag(
            row,
            "age_rating_id",
            "age_rating_label",
            "age_rating_poster",
        )?,
        episode: decode_episode(row)?,
    })
}

pub fn decode_grouped_row(row: &PgRow) -> Result<GroupedRow> {
    Ok(GroupedRow {
        title: decode_title_scalars(row)?,
        season: SeasonRecord {
            id: col(row, "season_id")?,
            number: col(row, "season_number")?,
            title: col(row, "season_title")?,
        },
        episode: decode_episode(row)?,
    })
}

fn decode_title_scalars(row: &PgRow) -> Result<TitleScalars> {
    Ok(TitleScalars {
        id: col(row, "title_id")?,
        title: col(row, "title")?,
        description: col(row, "description")?,
        release_year: col(row, "release_year")?,
        director: col(row, "director")?,
        producer: col(row, "producer")?,
        rating: col(row, "rating")?,
        is_favourite: col(row, "is_favourite")?,
        trailer_url: col(row, "trailer_url")?,
        poster_url: col(row, "poster_url")?,
        trailer_views: col(row, "trailer_views")?,
        duration: col(row, "duration")?,
        video_url: col(row, "video_url")?,
        view_count: col(row, "views_count")?,
        screen_url: col(row, "screen_url")?,
    })
}

fn decode_tag(
    row: &PgRow,
    id_column: &str,
    label_column: &str,
    poster_column: &str,
) -> Result<Tag> {
    Ok(Tag {
        id: col(row, id_column)?,
        label: col(row, label_column)?,
        poster_url: col(row, poster_column)?,
    })
}

/// An outer-joined episode decodes to `None` when its id column is NULL.
/// An id of 0 is a real episode, not an absent one.
fn decode_episode(row: &PgRow) -> Result<Option<Episode>> {
    let id: Option<i32> = col(row, "episode_id")?;
    let Some(id) = id else {
        return Ok(None);
    };

    Ok(Some(Episode {
        id,
        number: col(row, "episode_number")?,
        title: col(row, "episode_title")?,
        trailer_url: col(row, "episode_trailer_url")?,
        duration: col(row, "episode_duration")?,
        poster_url: col(row, "episode_poster")?,
    }))
}

/// A column that fails to decode aborts the whole query pass; the error
/// names the offending column.
fn col<'r, T>(row: &'r PgRow, name: &str) -> Result<T>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name)
        .map_err(|e| CatalogError::Decode(format!("column `{}`: {}", name, e)))
}
