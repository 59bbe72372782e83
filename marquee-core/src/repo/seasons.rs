use marquee_model::{Season, SeasonDraft};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};

use crate::catalog::SeasonAccumulator;
use crate::catalog::row::SeasonRecord;
use crate::error::{CatalogError, Result};

/// Season listing joins out to episodes; seasons without episodes must
/// survive the join, so the episode side is outer-joined.
const SEASON_SELECT: &str = r#"
SELECT
    s.id AS season_id,
    s.number AS season_number,
    s.title AS season_title,
    e.id AS episode_id,
    e.number AS episode_number,
    e.title AS episode_title,
    e.trailer_url AS episode_trailer_url,
    e.duration AS episode_duration,
    e.poster_url AS episode_poster
FROM seasons s
LEFT JOIN seasons_episodes se ON se.season_id = s.id
LEFT JOIN episodes e ON e.id = se.episode_id
WHERE 1=1"#;

#[derive(Clone, Debug)]
pub struct PostgresSeasonRepository {
    pool: PgPool,
}

impl PostgresSeasonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn find_all(&self) -> Result<Vec<Season>> {
        let rows = QueryBuilder::<Postgres>::new(SEASON_SELECT)
            .build()
            .fetch_all(self.pool())
            .await?;

        let mut acc = SeasonAccumulator::new();
        for row in &rows {
            let (record, episode) = decode_season_row(row)?;
            acc.push(record, episode);
        }

        Ok(acc.finish())
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Season> {
        let mut builder = QueryBuilder::<Postgres>::new(SEASON_SELECT);
        builder.push(" AND s.id = ");
        builder.push_bind(id);

        let rows = builder.build().fetch_all(self.pool()).await?;
        if rows.is_empty() {
            return Err(CatalogError::NotFound(format!("season {}", id)));
        }

        let mut acc = SeasonAccumulator::new();
        for row in &rows {
            let (record, episode) = decode_season_row(row)?;
            acc.push(record, episode);
        }

        acc.finish()
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::NotFound(format!("season {}", id)))
    }

    pub async fn find_all_by_ids(&self, ids: &[i32]) -> Result<Vec<Season>> {
        let rows = sqlx::query(
            "SELECT id, number, title FROM seasons WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(self.pool())
        .await?;

        rows.iter()
            .map(|row| {
                Ok(Season {
                    id: row.try_get("id")?,
                    number: row.try_get("number")?,
                    title: row.try_get("title")?,
                    episodes: Vec::new(),
                })
            })
            .collect()
    }

    pub async fn create(&self, draft: &SeasonDraft) -> Result<i32> {
        let id: i32 = sqlx::query_scalar(
            "INSERT INTO seasons (number, title) VALUES ($1, $2) RETURNING id",
        )
        .bind(draft.number)
        .bind(&draft.title)
        .fetch_one(self.pool())
        .await?;

        Ok(id)
    }

    pub async fn update(&self, id: i32, draft: &SeasonDraft) -> Result<()> {
        let updated = sqlx::query(
            "UPDATE seasons SET number = $1, title = $2 WHERE id = $3",
        )
        .bind(draft.number)
        .bind(&draft.title)
        .bind(id)
        .execute(self.pool())
        .await?;

        if updated.rows_affected() == 0 {
            return Err(CatalogError::NotFound(format!("season {}", id)));
        }

        Ok(())
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        let mut tx = self.pool().begin().await?;

        sqlx::query("DELETE FROM seasons_episodes WHERE season_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM titles_seasons WHERE season_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM seasons WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(CatalogError::NotFound(format!("season {}", id)));
        }

        tx.commit().await?;

        tracing::info!(season_id = id, "season deleted");
        Ok(())
    }
}

fn decode_season_row(
    row: &PgRow,
) -> Result<(SeasonRecord, Option<marquee_model::Episode>)> {
    let record = SeasonRecord {
        id: get(row, "season_id")?,
        number: get(row, "season_number")?,
        title: get(row, "season_title")?,
    };

    let episode_id: Option<i32> = get(row, "episode_id")?;
    let episode = match episode_id {
        Some(id) => Some(marquee_model::Episode {
            id,
            number: get(row, "episode_number")?,
            title: get(row, "episode_title")?,
            trailer_url: get(row, "episode_trailer_url")?,
            duration: get(row, "episode_duration")?,
            poster_url: get(row, "episode_poster")?,
        }),
        None => None,
    };

    Ok((record, episode))
}

fn get<'r, T>(row: &'r PgRow, name: &str) -> Result<T>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name)
        .map_err(|e| CatalogError::Decode(format!("column `{}`: {}", name, e)))
}
