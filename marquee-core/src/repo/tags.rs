use marquee_model::{Tag, TagDraft, TagKind};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::error::{CatalogError, Result};

/// One repository serves all three tag vocabularies. The kind picks the
/// backing table and the title link table, everything else is identical.
#[derive(Clone, Debug)]
pub struct PostgresTagRepository {
    pool: PgPool,
    kind: TagKind,
}

fn table(kind: TagKind) -> &'static str {
    match kind {
        TagKind::Genre => "genres",
        TagKind::Category => "categories",
        TagKind::AgeRating => "age_ratings",
    }
}

fn link_table(kind: TagKind) -> &'static str {
    match kind {
        TagKind::Genre => "titles_genres",
        TagKind::Category => "titles_categories",
        TagKind::AgeRating => "titles_age_ratings",
    }
}

fn link_column(kind: TagKind) -> &'static str {
    match kind {
        TagKind::Genre => "genre_id",
        TagKind::Category => "category_id",
        TagKind::AgeRating => "age_rating_id",
    }
}

impl PostgresTagRepository {
    pub fn new(pool: PgPool, kind: TagKind) -> Self {
        Self { pool, kind }
    }

    pub fn kind(&self) -> TagKind {
        self.kind
    }

    pub async fn find_all(&self) -> Result<Vec<Tag>> {
        let rows = sqlx::query(&format!(
            "SELECT id, label, poster_url FROM {} ORDER BY id",
            table(self.kind)
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(decode_tag).collect()
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Tag> {
        let row = sqlx::query(&format!(
            "SELECT id, label, poster_url FROM {} WHERE id = $1",
            table(self.kind)
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| CatalogError::NotFound(format!("{} {}", self.kind, id)))?;

        decode_tag(&row)
    }

    pub async fn find_all_by_ids(&self, ids: &[i32]) -> Result<Vec<Tag>> {
        let rows = sqlx::query(&format!(
            "SELECT id, label, poster_url FROM {} WHERE id = ANY($1)",
            table(self.kind)
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(decode_tag).collect()
    }

    pub async fn create(&self, draft: &TagDraft) -> Result<i32> {
        let id: i32 = sqlx::query_scalar(&format!(
            "INSERT INTO {} (label, poster_url) VALUES ($1, $2) RETURNING id",
            table(self.kind)
        ))
        .bind(&draft.label)
        .bind(&draft.poster_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    pub async fn update(&self, id: i32, draft: &TagDraft) -> Result<()> {
        let updated = sqlx::query(&format!(
            "UPDATE {} SET label = $1, poster_url = $2 WHERE id = $3",
            table(self.kind)
        ))
        .bind(&draft.label)
        .bind(&draft.poster_url)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(CatalogError::NotFound(format!("{} {}", self.kind, id)));
        }

        Ok(())
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!(
            "DELETE FROM {} WHERE {} = $1",
            link_table(self.kind),
            link_column(self.kind)
        ))
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let deleted = sqlx::query(&format!(
            "DELETE FROM {} WHERE id = $1",
            table(self.kind)
        ))
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if deleted.rows_affected() == 0 {
            return Err(CatalogError::NotFound(format!("{} {}", self.kind, id)));
        }

        tx.commit().await?;
        Ok(())
    }
}

fn decode_tag(row: &PgRow) -> Result<Tag> {
    Ok(Tag {
        id: row.try_get("id")?,
        label: row.try_get("label")?,
        poster_url: row.try_get("poster_url")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_table_names_are_distinct() {
        let tables: Vec<&str> = TagKind::all().iter().map(|k| table(*k)).collect();
        assert_eq!(tables, vec!["genres", "categories", "age_ratings"]);

        let links: Vec<&str> = TagKind::all().iter().map(|k| link_table(*k)).collect();
        assert_eq!(
            links,
            vec!["titles_genres", "titles_categories", "titles_age_ratings"]
        );
    }
}
