//! Registration repository for database operations

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::ActivityRegistration;

pub(crate) const REGISTRATION_COLUMNS: &str = r#"
    id, activity_id, user_id, status, register_time, completion_time,
    created_at, updated_at
"#;

/// Registration repository
///
/// Read-side access only; state transitions go through the enrollment
/// service.
#[derive(Clone)]
pub struct RegistrationRepository {
    pool: PgPool,
}

impl RegistrationRepository {
    /// Create a new registration repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the unique registration row for a (activity, user) pair
    pub async fn find_by_activity_and_user(
        &self,
        activity_id: Uuid,
        user_id: Uuid,
    ) -> sqlx::Result<Option<ActivityRegistration>> {
        sqlx::query_as::<_, ActivityRegistration>(&format!(
            r#"
            SELECT {REGISTRATION_COLUMNS}
            FROM activity_registrations
            WHERE activity_id = $1 AND user_id = $2
            "#,
        ))
        .bind(activity_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// List registrations for an activity, newest first
    pub async fn list_by_activity(
        &self,
        activity_id: Uuid,
    ) -> sqlx::Result<Vec<ActivityRegistration>> {
        sqlx::query_as::<_, ActivityRegistration>(&format!(
            r#"
            SELECT {REGISTRATION_COLUMNS}
            FROM activity_registrations
            WHERE activity_id = $1
            ORDER BY register_time DESC
            "#,
        ))
        .bind(activity_id)
        .fetch_all(&self.pool)
        .await
    }

    /// List a user's registrations across activities, newest first
    pub async fn list_by_user(&self, user_id: Uuid) -> sqlx::Result<Vec<ActivityRegistration>> {
        sqlx::query_as::<_, ActivityRegistration>(&format!(
            r#"
            SELECT {REGISTRATION_COLUMNS}
            FROM activity_registrations
            WHERE user_id = $1
            ORDER BY register_time DESC
            "#,
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }
}
