use marquee_model::{User, UserDraft, UserProfileUpdate, UserRole};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::error::{CatalogError, Result};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, phone, birthday, role, poster_url";

#[derive(Clone, Debug)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_all(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users ORDER BY id",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(decode_user).collect()
    }

    pub async fn find_by_id(&self, id: i32) -> Result<User> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| CatalogError::NotFound(format!("user {}", id)))?;

        decode_user(&row)
    }

    /// Absence is an expected outcome during sign-in, not an error.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(decode_user).transpose()
    }

    pub async fn is_admin(&self, id: i32) -> Result<bool> {
        let role: Option<String> =
            sqlx::query_scalar("SELECT role FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match role {
            Some(role) => Ok(UserRole::from_column(Some(&role)).is_admin()),
            None => Err(CatalogError::NotFound(format!("user {}", id))),
        }
    }

    pub async fn create(&self, draft: &UserDraft) -> Result<i32> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO users (name, email, password_hash, phone, birthday, role, poster_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.email)
        .bind(&draft.password_hash)
        .bind(&draft.phone)
        .bind(draft.birthday)
        .bind(draft.role.as_column())
        .bind(&draft.poster_url)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(user_id = id, "created user");
        Ok(id)
    }

    /// Full replacement of an account, admin-side.
    pub async fn update(&self, id: i32, draft: &UserDraft) -> Result<()> {
        let updated = sqlx::query(
            r#"
            UPDATE users
            SET name = $1,
                email = $2,
                password_hash = $3,
                phone = $4,
                birthday = $5,
                role = $6,
                poster_url = $7
            WHERE id = $8
            "#,
        )
        .bind(&draft.name)
        .bind(&draft.email)
        .bind(&draft.password_hash)
        .bind(&draft.phone)
        .bind(draft.birthday)
        .bind(draft.role.as_column())
        .bind(&draft.poster_url)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(CatalogError::NotFound(format!("user {}", id)));
        }

        Ok(())
    }

    /// Partial self-service update. Unset fields keep their stored value.
    pub async fn update_profile(
        &self,
        id: i32,
        update: &UserProfileUpdate,
    ) -> Result<()> {
        let updated = sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE($1, name),
                phone = COALESCE($2, phone),
                birthday = COALESCE($3, birthday),
                poster_url = COALESCE($4, poster_url)
            WHERE id = $5
            "#,
        )
        .bind(&update.name)
        .bind(&update.phone)
        .bind(update.birthday)
        .bind(&update.poster_url)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(CatalogError::NotFound(format!("user {}", id)));
        }

        Ok(())
    }

    pub async fn update_password(&self, id: i32, password_hash: &str) -> Result<()> {
        let updated =
            sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
                .bind(password_hash)
                .bind(id)
                .execute(&self.pool)
                .await?;

        if updated.rows_affected() == 0 {
            return Err(CatalogError::NotFound(format!("user {}", id)));
        }

        Ok(())
    }

    pub async fn delete(&self, id: i32) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM favorites WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(CatalogError::NotFound(format!("user {}", id)));
        }

        tx.commit().await?;
        Ok(())
    }
}

fn decode_user(row: &PgRow) -> Result<User> {
    let role: Option<String> = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        phone: row.try_get("phone")?,
        birthday: row.try_get("birthday")?,
        role: UserRole::from_column(role.as_deref()),
        poster_url: row.try_get("poster_url")?,
    })
}
