//! Activity repository for database operations

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Activity, ActivityQuery};

pub(crate) const ACTIVITY_COLUMNS: &str = r#"
    id, title, description, organizer_id, capacity, current_participants,
    status, credit_type, credit_value, start_time, end_time,
    created_at, updated_at
"#;

/// Activity repository
///
/// Read-side access only; activity rows are written exclusively by the
/// enrollment service.
#[derive(Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    /// Create a new activity repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an activity by ID
    pub async fn find_by_id(&self, id: Uuid) -> sqlx::Result<Option<Activity>> {
        sqlx::query_as::<_, Activity>(&format!(
            r#"
            SELECT {ACTIVITY_COLUMNS}
            FROM activities
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// List activities with pagination and an optional status filter
    pub async fn list(&self, query: &ActivityQuery) -> sqlx::Result<(Vec<Activity>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) as i64 * limit as i64;

        let items = sqlx::query_as::<_, Activity>(&format!(
            r#"
            SELECT {ACTIVITY_COLUMNS}
            FROM activities
            WHERE ($1::activity_status IS NULL OR status = $1)
            ORDER BY start_time DESC
            LIMIT $2 OFFSET $3
            "#,
        ))
        .bind(query.status)
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM activities
            WHERE ($1::activity_status IS NULL OR status = $1)
            "#,
        )
        .bind(query.status)
        .fetch_one(&self.pool)
        .await?;

        Ok((items, total))
    }
}
