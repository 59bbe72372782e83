use sqlx::{PgPool, Row};

use crate::error::Result;

/// Per-user favourite title sets. Adding twice is a no-op, as is removing
/// an absent pair.
#[derive(Clone, Debug)]
pub struct PostgresFavoriteRepository {
    pool: PgPool,
}

impl PostgresFavoriteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn add(&self, user_id: i32, title_id: i32) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO favorites (user_id, title_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, title_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(title_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn remove(&self, user_id: i32, title_id: i32) -> Result<()> {
        sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND title_id = $2")
            .bind(user_id)
            .bind(title_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Title ids the user marked, oldest mark first.
    pub async fn list_title_ids(&self, user_id: i32) -> Result<Vec<i32>> {
        let rows = sqlx::query(
            "SELECT title_id FROM favorites WHERE user_id = $1 ORDER BY marked_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Ok(row.try_get::<i32, _>("title_id")?))
            .collect()
    }

    pub async fn contains(&self, user_id: i32, title_id: i32) -> Result<bool> {
        let found: Option<i32> = sqlx::query_scalar(
            "SELECT 1 FROM favorites WHERE user_id = $1 AND title_id = $2",
        )
        .bind(user_id)
        .bind(title_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found.is_some())
    }
}
