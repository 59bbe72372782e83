use std::fmt;
use std::sync::Arc;

use marquee_model::{Title, TitleDraft, TitleFilters};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::catalog::row::{decode_flat_row, decode_grouped_row};
use crate::catalog::{TitleAccumulator, TitlePredicate};
use crate::error::{CatalogError, Result};
use crate::stats::{OverlayOptions, TrailerStatsProvider, overlay_trailer_views};

/// Flat-children query: title scalars, the three inner-joined dimensions,
/// and the directly associated episode (outer-joined, so titles without
/// episodes still appear). Fan-out across the joins is collapsed by the
/// accumulator, not by the query.
const FLAT_SELECT: &str = r#"
SELECT
    m.id AS title_id,
    m.title,
    m.description,
    m.release_year,
    m.director,
    m.producer,
    m.rating,
    m.is_favourite,
    m.trailer_url,
    m.poster_url,
    m.trailer_views,
    m.duration,
    m.video_url,
    m.views_count,
    m.screen_url,
    g.id AS genre_id,
    g.label AS genre_label,
    g.poster_url AS genre_poster,
    c.id AS category_id,
    c.label AS category_label,
    c.poster_url AS category_poster,
    a.id AS age_rating_id,
    a.label AS age_rating_label,
    a.poster_url AS age_rating_poster,
    e.id AS episode_id,
    e.number AS episode_number,
    e.title AS episode_title,
    e.trailer_url AS episode_trailer_url,
    e.duration AS episode_duration,
    e.poster_url AS episode_poster
FROM titles m
JOIN titles_genres mg ON mg.title_id = m.id
JOIN genres g ON g.id = mg.genre_id
JOIN titles_categories mc ON mc.title_id = m.id
JOIN categories c ON c.id = mc.category_id
JOIN titles_age_ratings ma ON ma.title_id = m.id
JOIN age_ratings a ON a.id = ma.age_rating_id
LEFT JOIN titles_episodes me ON me.title_id = m.id
LEFT JOIN episodes e ON e.id = me.episode_id
WHERE 1=1"#;

/// Grouped-children query: the same title scalars plus season records and
/// the episodes attached through each season.
const GROUPED_SELECT: &str = r#"
SELECT
    m.id AS title_id,
    m.title,
    m.description,
    m.release_year,
    m.director,
    m.producer,
    m.rating,
    m.is_favourite,
    m.trailer_url,
    m.poster_url,
    m.trailer_views,
    m.duration,
    m.video_url,
    m.views_count,
    m.screen_url,
    s.id AS season_id,
    s.number AS season_number,
    s.title AS season_title,
    e.id AS episode_id,
    e.number AS episode_number,
    e.title AS episode_title,
    e.trailer_url AS episode_trailer_url,
    e.duration AS episode_duration,
    e.poster_url AS episode_poster
FROM titles m
JOIN titles_seasons ms ON ms.title_id = m.id
JOIN seasons s ON s.id = ms.season_id
LEFT JOIN seasons_episodes se ON se.season_id = s.id
LEFT JOIN episodes e ON e.id = se.episode_id
WHERE 1=1"#;

/// Repository for the title aggregate.
///
/// `find_all` and `find_by_id` run the two-phase rebuild: the flat query
/// first (fixing canonical title order), the season query second over the
/// same accumulator, then the optional trailer-stats overlay.
#[derive(Clone)]
pub struct PostgresTitleRepository {
    pool: PgPool,
    stats: Option<Arc<dyn TrailerStatsProvider>>,
    overlay: OverlayOptions,
}

impl fmt::Debug for PostgresTitleRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresTitleRepository")
            .field("stats", &self.stats.is_some())
            .field("overlay", &self.overlay)
            .finish_non_exhaustive()
    }
}

impl PostgresTitleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            stats: None,
            overlay: OverlayOptions::default(),
        }
    }

    /// Enable the trailer view-count overlay on read paths.
    pub fn with_stats(
        pool: PgPool,
        provider: Arc<dyn TrailerStatsProvider>,
        overlay: OverlayOptions,
    ) -> Self {
        Self {
            pool,
            stats: Some(provider),
            overlay,
        }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn find_all(
        &self,
        filters: &TitleFilters,
    ) -> Result<Vec<Title>> {
        let predicate = TitlePredicate::from_filters(filters);

        // Phase one: the flat query, with all caller criteria applied.
        let mut builder = QueryBuilder::<Postgres>::new(FLAT_SELECT);
        predicate.apply(&mut builder);
        predicate.push_order_by(&mut builder);

        let rows = builder.build().fetch_all(self.pool()).await?;
        tracing::debug!(rows = rows.len(), "flat title query returned");

        let mut acc = TitleAccumulator::new();
        for row in &rows {
            acc.push_flat(decode_flat_row(row)?);
        }

        // Phase two: seasons for every title, merged into the same arena.
        // Titles that only have seasons are created here (outer union).
        let rows = QueryBuilder::<Postgres>::new(GROUPED_SELECT)
            .build()
            .fetch_all(self.pool())
            .await?;
        for row in &rows {
            acc.push_grouped(decode_grouped_row(row)?);
        }

        let mut titles = acc.finish();

        if let Some(provider) = &self.stats {
            overlay_trailer_views(&mut titles, provider.as_ref(), &self.overlay)
                .await;
        }

        Ok(titles)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Title> {
        let mut builder = QueryBuilder::<Postgres>::new(FLAT_SELECT);
        builder.push(" AND m.id = ");
        builder.push_bind(id);

        let rows = builder.build().fetch_all(self.pool()).await?;
        if rows.is_empty() {
            return Err(CatalogError::NotFound(format!("title {}", id)));
        }

        let mut acc = TitleAccumulator::new();
        for row in &rows {
            acc.push_flat(decode_flat_row(row)?);
        }

        let mut builder = QueryBuilder::<Postgres>::new(GROUPED_SELECT);
        builder.push(" AND m.id = ");
        builder.push_bind(id);

        let rows = builder.build().fetch_all(self.pool()).await?;
        for row in &rows {
            acc.push_grouped(decode_grouped_row(row)?);
        }

        let mut titles = acc.finish();

        if let Some(provider) = &self.stats {
            overlay_trailer_views(&mut titles, provider.as_ref(), &self.overlay)
                .await;
        }

        titles
            .into_iter()
            .find(|title| title.id == id)
            .ok_or_else(|| CatalogError::NotFound(format!("title {}", id)))
    }

    /// Insert the title and all four association link tables in a single
    /// transaction. Any failure rolls everything back (the transaction is
    /// dropped on the error return), so no partial association writes are
    /// observable. Empty id lists are valid and simply produce a title
    /// with empty association lists.
    pub async fn create(&self, draft: &TitleDraft) -> Result<i32> {
        let mut tx = self.pool().begin().await?;

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO titles (
                title, description, release_year, director, producer,
                trailer_url, poster_url, duration, video_url, screen_url
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.release_year)
        .bind(&draft.director)
        .bind(&draft.producer)
        .bind(&draft.trailer_url)
        .bind(&draft.poster_url)
        .bind(&draft.duration)
        .bind(&draft.video_url)
        .bind(&draft.screen_url)
        .fetch_one(&mut *tx)
        .await?;

        Self::insert_links(&mut tx, id, &link_rows(draft)).await?;

        tx.commit().await?;

        tracing::info!(title_id = id, title = %draft.title, "title created");
        Ok(id)
    }

    /// Replace the scalar fields and rewrite all four association tables
    /// (delete then reinsert) atomically. Prior associations stay intact
    /// when any step fails.
    pub async fn update(&self, id: i32, draft: &TitleDraft) -> Result<()> {
        let mut tx = self.pool().begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE titles
            SET title = $1,
                description = $2,
                release_year = $3,
                director = $4,
                producer = $5,
                trailer_url = $6,
                poster_url = $7,
                duration = $8,
                video_url = $9,
                screen_url = $10
            WHERE id = $11
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.release_year)
        .bind(&draft.director)
        .bind(&draft.producer)
        .bind(&draft.trailer_url)
        .bind(&draft.poster_url)
        .bind(&draft.duration)
        .bind(&draft.video_url)
        .bind(&draft.screen_url)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(CatalogError::NotFound(format!("title {}", id)));
        }

        for table in [
            "titles_genres",
            "titles_categories",
            "titles_age_ratings",
            "titles_episodes",
        ] {
            Self::clear_links(&mut tx, table, id).await?;
        }

        Self::insert_links(&mut tx, id, &link_rows(draft)).await?;

        tx.commit().await?;

        tracing::info!(title_id = id, "title updated");
        Ok(())
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        let mut tx = self.pool().begin().await?;

        for table in [
            "titles_genres",
            "titles_categories",
            "titles_age_ratings",
            "titles_episodes",
            "titles_seasons",
        ] {
            Self::clear_links(&mut tx, table, id).await?;
        }

        let deleted = sqlx::query("DELETE FROM titles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(CatalogError::NotFound(format!("title {}", id)));
        }

        tx.commit().await?;

        tracing::info!(title_id = id, "title deleted");
        Ok(())
    }

    pub async fn increment_view_count(&self, id: i32) -> Result<()> {
        sqlx::query(
            "UPDATE titles SET views_count = COALESCE(views_count, 0) + 1 WHERE id = $1",
        )
        .bind(id)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// One INSERT per link row; an empty row list issues no statements.
    async fn insert_links(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        title_id: i32,
        rows: &[LinkRow],
    ) -> Result<()> {
        // Table and column names come from link_rows, never from caller
        // input.
        for (table, column, linked_id) in rows {
            sqlx::query(&format!(
                "INSERT INTO {} (title_id, {}) VALUES ($1, $2)",
                table, column
            ))
            .bind(title_id)
            .bind(linked_id)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    async fn clear_links(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        table: &str,
        title_id: i32,
    ) -> Result<()> {
        sqlx::query(&format!("DELETE FROM {} WHERE title_id = $1", table))
            .bind(title_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }
}

type LinkRow = (&'static str, &'static str, i32);

/// Flatten a draft's association id lists into (table, column, id) link
/// rows. Empty id lists contribute nothing, so a draft with no
/// associations produces zero inserts and the title is created with empty
/// tag and episode lists.
fn link_rows(draft: &TitleDraft) -> Vec<LinkRow> {
    let mut rows = Vec::new();
    for (table, column, ids) in [
        ("titles_genres", "genre_id", &draft.genre_ids),
        ("titles_categories", "category_id", &draft.category_ids),
        ("titles_age_ratings", "age_rating_id", &draft.age_rating_ids),
        ("titles_episodes", "episode_id", &draft.episode_ids),
    ] {
        for id in ids {
            rows.push((table, column, *id));
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(
        genre_ids: Vec<i32>,
        category_ids: Vec<i32>,
        age_rating_ids: Vec<i32>,
        episode_ids: Vec<i32>,
    ) -> TitleDraft {
        TitleDraft {
            title: "A Title".to_string(),
            description: "About a title".to_string(),
            release_year: 2021,
            director: "Director".to_string(),
            producer: None,
            trailer_url: "https://youtu.be/dQw4w9WgXcQ".to_string(),
            poster_url: "/posters/p.jpg".to_string(),
            duration: None,
            video_url: None,
            screen_url: None,
            genre_ids,
            category_ids,
            age_rating_ids,
            episode_ids,
        }
    }

    #[test]
    fn test_empty_association_lists_produce_no_link_rows() {
        let draft = draft(vec![], vec![], vec![], vec![]);
        assert!(link_rows(&draft).is_empty());
    }

    #[test]
    fn test_link_rows_cover_every_association_table() {
        let draft = draft(vec![1, 2], vec![3], vec![4], vec![5, 6]);
        let rows = link_rows(&draft);

        assert_eq!(
            rows,
            vec![
                ("titles_genres", "genre_id", 1),
                ("titles_genres", "genre_id", 2),
                ("titles_categories", "category_id", 3),
                ("titles_age_ratings", "age_rating_id", 4),
                ("titles_episodes", "episode_id", 5),
                ("titles_episodes", "episode_id", 6),
            ]
        );
    }

    #[test]
    fn test_partially_empty_lists_skip_only_their_table() {
        let draft = draft(vec![7], vec![], vec![], vec![]);
        let rows = link_rows(&draft);

        assert_eq!(rows, vec![("titles_genres", "genre_id", 7)]);
    }
}
