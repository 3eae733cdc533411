//! PostgreSQL sweet repository

use async_trait::async_trait;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::PgPool;
use tracing::info;

use super::SweetRepository;
use crate::models::{Sweet, SweetFilter, SweetRequest};

const SWEET_COLUMNS: &str = "id, name, category, price, quantity, created_at, updated_at";

/// Sweet repository backed by the `sweets` table
#[derive(Clone)]
pub struct PgSweetRepository {
    pool: PgPool,
}

impl PgSweetRepository {
    /// Create a new sweet repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escape LIKE wildcards so user input only ever matches literally.
fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait]
impl SweetRepository for PgSweetRepository {
    async fn find_all(&self) -> DatabaseResult<Vec<Sweet>> {
        let sql = format!("SELECT {SWEET_COLUMNS} FROM sweets ORDER BY id");

        sqlx::query_as::<_, Sweet>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::query)
    }

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Sweet>> {
        let sql = format!("SELECT {SWEET_COLUMNS} FROM sweets WHERE id = $1");

        sqlx::query_as::<_, Sweet>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::query)
    }

    async fn search(&self, filter: &SweetFilter) -> DatabaseResult<Vec<Sweet>> {
        info!("Searching sweets with filter: {:?}", filter);

        let sql = format!(
            r#"
            SELECT {SWEET_COLUMNS}
            FROM sweets
            WHERE ($1::TEXT IS NULL OR name ILIKE '%' || $1 || '%' ESCAPE '\')
              AND ($2::TEXT IS NULL OR category ILIKE '%' || $2 || '%' ESCAPE '\')
              AND ($3::NUMERIC IS NULL OR price >= $3)
              AND ($4::NUMERIC IS NULL OR price <= $4)
            ORDER BY id
            "#
        );

        sqlx::query_as::<_, Sweet>(&sql)
            .bind(filter.name.as_deref().map(escape_like))
            .bind(filter.category.as_deref().map(escape_like))
            .bind(filter.min_price)
            .bind(filter.max_price)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::query)
    }

    async fn insert(&self, sweet: &SweetRequest) -> DatabaseResult<Sweet> {
        let sql = format!(
            r#"
            INSERT INTO sweets (name, category, price, quantity)
            VALUES ($1, $2, $3, $4)
            RETURNING {SWEET_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Sweet>(&sql)
            .bind(&sweet.name)
            .bind(&sweet.category)
            .bind(sweet.price)
            .bind(sweet.quantity)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::query)
    }

    async fn update(&self, id: i64, sweet: &SweetRequest) -> DatabaseResult<Option<Sweet>> {
        let sql = format!(
            r#"
            UPDATE sweets
            SET name = $2, category = $3, price = $4, quantity = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {SWEET_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Sweet>(&sql)
            .bind(id)
            .bind(&sweet.name)
            .bind(&sweet.category)
            .bind(sweet.price)
            .bind(sweet.quantity)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::query)
    }

    async fn delete(&self, id: i64) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM sweets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::query)?;

        Ok(result.rows_affected() > 0)
    }

    async fn decrement_stock(&self, id: i64) -> DatabaseResult<Option<Sweet>> {
        let sql = format!(
            r#"
            UPDATE sweets
            SET quantity = quantity - 1, updated_at = NOW()
            WHERE id = $1 AND quantity > 0
            RETURNING {SWEET_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Sweet>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::query)
    }

    async fn increment_stock(&self, id: i64, amount: i32) -> DatabaseResult<Option<Sweet>> {
        let sql = format!(
            r#"
            UPDATE sweets
            SET quantity = quantity + $2, updated_at = NOW()
            WHERE id = $1 AND quantity <= 2147483647 - $2
            RETURNING {SWEET_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Sweet>(&sql)
            .bind(id)
            .bind(amount)
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::query)
    }
}
