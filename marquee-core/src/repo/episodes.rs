use marquee_model::{Episode, EpisodeDraft};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::error::{CatalogError, Result};

const EPISODE_COLUMNS: &str =
    "id, number, title, trailer_url, duration, poster_url";

#[derive(Clone, Debug)]
pub struct PostgresEpisodeRepository {
    pool: PgPool,
}

impl PostgresEpisodeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn find_all(&self) -> Result<Vec<Episode>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM episodes ORDER BY id",
            EPISODE_COLUMNS
        ))
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(decode_episode).collect()
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Episode> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM episodes WHERE id = $1",
            EPISODE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| CatalogError::NotFound(format!("episode {}", id)))?;

        decode_episode(&row)
    }

    pub async fn find_all_by_ids(&self, ids: &[i32]) -> Result<Vec<Episode>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM episodes WHERE id = ANY($1)",
            EPISODE_COLUMNS
        ))
        .bind(ids)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(decode_episode).collect()
    }

    pub async fn create(&self, draft: &EpisodeDraft) -> Result<i32> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO episodes (number, title, trailer_url, duration, poster_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(draft.number)
        .bind(&draft.title)
        .bind(&draft.trailer_url)
        .bind(&draft.duration)
        .bind(&draft.poster_url)
        .fetch_one(self.pool())
        .await?;

        Ok(id)
    }

    pub async fn update(&self, id: i32, draft: &EpisodeDraft) -> Result<()> {
        let updated = sqlx::query(
            r#"
            UPDATE episodes
            SET number = $1,
                title = $2,
                trailer_url = $3,
                duration = $4,
                poster_url = $5
            WHERE id = $6
            "#,
        )
        .bind(draft.number)
        .bind(&draft.title)
        .bind(&draft.trailer_url)
        .bind(&draft.duration)
        .bind(&draft.poster_url)
        .bind(id)
        .execute(self.pool())
        .await?;

        if updated.rows_affected() == 0 {
            return Err(CatalogError::NotFound(format!("episode {}", id)));
        }

        Ok(())
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        let mut tx = self.pool().begin().await?;

        sqlx::query("DELETE FROM titles_episodes WHERE episode_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM seasons_episodes WHERE episode_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM episodes WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(CatalogError::NotFound(format!("episode {}", id)));
        }

        tx.commit().await?;
        Ok(())
    }
}

fn decode_episode(row: &PgRow) -> Result<Episode> {
    Ok(Episode {
        id: row.try_get("id")?,
        number: row.try_get("number")?,
        title: row.try_get("title")?,
        trailer_url: row.try_get("trailer_url")?,
        duration: row.try_get("duration")?,
        poster_url: row.try_get("poster_url")?,
    })
}
