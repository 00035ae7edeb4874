use super::{StoreError, StudentStore};
use crate::model::{Student, StudentFields};
use async_trait::async_trait;
use sqlx::PgPool;

const COLUMNS: &str = "id, name, email, gender";

#[derive(Clone)]
pub struct PgStudentStore {
    pool: PgPool,
}

impl PgStudentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl StudentStore for PgStudentStore {
    async fn find_all(&self) -> Result<Vec<Student>, StoreError> {
        let sql = format!("SELECT {} FROM students", COLUMNS);
        tracing::debug!(sql = %sql, "query");
        let rows = sqlx::query_as::<_, Student>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Student>, StoreError> {
        let sql = format!("SELECT {} FROM students WHERE id = $1", COLUMNS);
        tracing::debug!(sql = %sql, id, "query");
        let row = sqlx::query_as::<_, Student>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn exists_by_email_excluding(
        &self,
        email: &str,
        excluded_id: Option<i64>,
    ) -> Result<bool, StoreError> {
        let sql = "SELECT EXISTS(SELECT 1 FROM students WHERE email = $1 AND ($2::BIGINT IS NULL OR id <> $2))";
        tracing::debug!(sql = %sql, email, excluded_id = ?excluded_id, "query");
        let exists: (bool,) = sqlx::query_as(sql)
            .bind(email)
            .bind(excluded_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists.0)
    }

    async fn insert(&self, fields: &StudentFields) -> Result<Option<Student>, StoreError> {
        let sql = format!(
            "INSERT INTO students (name, email, gender) VALUES ($1, $2, $3) RETURNING {}",
            COLUMNS
        );
        tracing::debug!(sql = %sql, email = %fields.email, "query");
        let row = sqlx::query_as::<_, Student>(&sql)
            .bind(&fields.name)
            .bind(&fields.email)
            .bind(&fields.gender)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_by_id(
        &self,
        id: i64,
        fields: &StudentFields,
    ) -> Result<Option<Student>, StoreError> {
        let sql = format!(
            "UPDATE students SET name = $2, email = $3, gender = $4, updated_at = NOW() WHERE id = $1 RETURNING {}",
            COLUMNS
        );
        tracing::debug!(sql = %sql, id, "query");
        let row = sqlx::query_as::<_, Student>(&sql)
            .bind(id)
            .bind(&fields.name)
            .bind(&fields.email)
            .bind(&fields.gender)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, StoreError> {
        let sql = "DELETE FROM students WHERE id = $1";
        tracing::debug!(sql = %sql, id, "query");
        let result = sqlx::query(sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}
