//! Credit application repository for database operations

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{ApplicationQuery, CreditApplication};

pub(crate) const APPLICATION_COLUMNS: &str = r#"
    id, user_id, credit_type, credit_value, activity_id, proof_refs, reason,
    status, reviewer_id, review_comments, reviewed_at, created_at, updated_at
"#;

/// Credit application repository
///
/// Read-side access only; submission and review go through the review
/// service.
#[derive(Clone)]
pub struct ApplicationRepository {
    pool: PgPool,
}

impl ApplicationRepository {
    /// Create a new application repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an application by ID
    pub async fn find_by_id(&self, id: Uuid) -> sqlx::Result<Option<CreditApplication>> {
        sqlx::query_as::<_, CreditApplication>(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS}
            FROM credit_applications
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// List applications with pagination and optional filters
    pub async fn list(
        &self,
        query: &ApplicationQuery,
    ) -> sqlx::Result<(Vec<CreditApplication>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) as i64 * limit as i64;

        let items = sqlx::query_as::<_, CreditApplication>(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS}
            FROM credit_applications
            WHERE ($1::uuid IS NULL OR user_id = $1)
              AND ($2::application_status IS NULL OR status = $2)
              AND ($3::credit_type IS NULL OR credit_type = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        ))
        .bind(query.user_id)
        .bind(query.status)
        .bind(query.credit_type)
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM credit_applications
            WHERE ($1::uuid IS NULL OR user_id = $1)
              AND ($2::application_status IS NULL OR status = $2)
              AND ($3::credit_type IS NULL OR credit_type = $3)
            "#,
        )
        .bind(query.user_id)
        .bind(query.status)
        .bind(query.credit_type)
        .fetch_one(&self.pool)
        .await?;

        Ok((items, total))
    }
}
