//! User repository for database operations.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use domain::models::User;
use domain::services::directory::{DirectoryEmployee, UserStore};
use domain::StoreError;

use crate::entities::UserEntity;
use crate::metrics::QueryTimer;
use crate::repositories::map_sqlx_err;

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn list_all(&self) -> Result<Vec<User>, StoreError> {
        let timer = QueryTimer::new("list_all_users");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, email, full_name, photo_url, is_active, created_at, updated_at
            FROM users
            ORDER BY email
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        Ok(result
            .map_err(map_sqlx_err)?
            .into_iter()
            .map(Into::into)
            .collect())
    }

    async fn upsert(&self, employee: &DirectoryEmployee) -> Result<User, StoreError> {
        let timer = QueryTimer::new("upsert_user");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            INSERT INTO users (email, full_name, photo_url)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE
            SET full_name = EXCLUDED.full_name,
                photo_url = EXCLUDED.photo_url,
                is_active = true,
                updated_at = NOW()
            RETURNING id, email, full_name, photo_url, is_active, created_at, updated_at
            "#,
        )
        .bind(employee.email.to_lowercase())
        .bind(&employee.full_name)
        .bind(&employee.photo_url)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result.map(Into::into).map_err(map_sqlx_err)
    }

    async fn deactivate(&self, user_id: Uuid) -> Result<(), StoreError> {
        let timer = QueryTimer::new("deactivate_user");
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_active = false, updated_at = NOW()
            WHERE id = $1 AND is_active = true
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await;
        timer.record();

        let affected = result.map_err(map_sqlx_err)?.rows_affected();
        if affected == 0 {
            return Err(StoreError::NotFound(format!("User {}", user_id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    // UserRepository tests require a database connection and are covered
    // by integration tests.
}
