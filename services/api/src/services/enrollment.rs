//! Enrollment service
//!
//! Owns every write to activity rows: lifecycle transitions, the
//! `current_participants` counter, and all registration-row transitions.
//! Each mutating operation runs in its own transaction and locks the
//! activity row first (`FOR UPDATE`), so a capacity check can never
//! interleave with a concurrent registration on the same activity.

use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::middleware::Principal;
use crate::models::{
    Activity, ActivityRegistration, ActivityStatus, NewActivity, RegistrationStatus,
};
use crate::repositories::activity::ACTIVITY_COLUMNS;
use crate::repositories::registration::REGISTRATION_COLUMNS;

/// Enrollment manager for capacity-limited activities
#[derive(Clone)]
pub struct EnrollmentService {
    pool: PgPool,
}

impl EnrollmentService {
    /// Create a new enrollment service
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new activity owned by the acting user
    pub async fn create_activity(
        &self,
        acting: &Principal,
        payload: &NewActivity,
    ) -> CoreResult<Activity> {
        if !acting.role.can_organize() {
            return Err(CoreError::Forbidden(
                "only teachers or admins may create activities",
            ));
        }
        if payload.title.trim().is_empty() {
            return Err(CoreError::InvalidArgument("title is required".into()));
        }
        if payload.capacity <= 0 {
            return Err(CoreError::InvalidArgument(
                "capacity must be positive".into(),
            ));
        }
        if payload.credit_value <= 0.0 {
            return Err(CoreError::InvalidArgument(
                "credit value must be positive".into(),
            ));
        }
        if payload.end_time <= payload.start_time {
            return Err(CoreError::InvalidArgument(
                "end time must be after start time".into(),
            ));
        }

        let activity = sqlx::query_as::<_, Activity>(&format!(
            r#"
            INSERT INTO activities
                (title, description, organizer_id, capacity, credit_type,
                 credit_value, start_time, end_time)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {ACTIVITY_COLUMNS}
            "#,
        ))
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(acting.user_id)
        .bind(payload.capacity)
        .bind(payload.credit_type)
        .bind(payload.credit_value)
        .bind(payload.start_time)
        .bind(payload.end_time)
        .fetch_one(&self.pool)
        .await?;

        info!(activity = %activity.id, organizer = %acting.user_id, "activity created");
        Ok(activity)
    }

    /// Move an activity along its lifecycle
    pub async fn update_activity_status(
        &self,
        activity_id: Uuid,
        acting: &Principal,
        next: ActivityStatus,
    ) -> CoreResult<Activity> {
        let mut tx = self.pool.begin().await?;

        let activity = lock_activity(&mut tx, activity_id).await?;

        if !acting.may_manage(activity.organizer_id) {
            return Err(CoreError::Forbidden(
                "only the organizer or an admin may change the activity status",
            ));
        }
        if !activity.status.can_transition_to(next) {
            return Err(CoreError::InvalidState(format!(
                "cannot move activity from {} to {}",
                activity.status.as_str(),
                next.as_str()
            )));
        }

        let updated = sqlx::query_as::<_, Activity>(&format!(
            r#"
            UPDATE activities
            SET status = $2, updated_at = now()
            WHERE id = $1 AND status = $3
            RETURNING {ACTIVITY_COLUMNS}
            "#,
        ))
        .bind(activity_id)
        .bind(next)
        .bind(activity.status)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(CoreError::ConflictRetry)?;

        tx.commit().await?;
        info!(activity = %activity_id, status = next.as_str(), "activity status changed");
        Ok(updated)
    }

    /// Register a student into an activity
    ///
    /// The capacity check and the counter increment happen under the
    /// activity row lock: two concurrent registrations for the last free
    /// slot can never both succeed.
    pub async fn register(
        &self,
        activity_id: Uuid,
        user_id: Uuid,
    ) -> CoreResult<ActivityRegistration> {
        let mut tx = self.pool.begin().await?;

        let activity = lock_activity(&mut tx, activity_id).await?;

        if !activity.status.accepts_registrations() {
            return Err(CoreError::InvalidState(format!(
                "activity is {}",
                activity.status.as_str()
            )));
        }
        if activity.current_participants >= activity.capacity {
            return Err(CoreError::CapacityExceeded);
        }

        let existing = sqlx::query_as::<_, ActivityRegistration>(&format!(
            r#"
            SELECT {REGISTRATION_COLUMNS}
            FROM activity_registrations
            WHERE activity_id = $1 AND user_id = $2
            FOR UPDATE
            "#,
        ))
        .bind(activity_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let registration = match existing {
            Some(row) => match row.status {
                RegistrationStatus::Registered => return Err(CoreError::AlreadyRegistered),
                RegistrationStatus::Completed => {
                    return Err(CoreError::InvalidState(
                        "registration is already completed".into(),
                    ));
                }
                // The one legal reactivation path: cancelled -> registered,
                // reusing the existing row.
                RegistrationStatus::Cancelled => reactivate_registration(&mut tx, row.id).await?,
            },
            None => insert_registration(&mut tx, activity_id, user_id).await?,
        };

        sqlx::query(
            r#"
            UPDATE activities
            SET current_participants = current_participants + 1, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(activity_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(activity = %activity_id, user = %user_id, "student registered");
        Ok(registration)
    }

    /// Withdraw a student from an activity
    pub async fn cancel(
        &self,
        activity_id: Uuid,
        user_id: Uuid,
    ) -> CoreResult<ActivityRegistration> {
        let mut tx = self.pool.begin().await?;

        let activity = lock_activity(&mut tx, activity_id).await?;

        if activity.status == ActivityStatus::Ended {
            return Err(CoreError::InvalidState(
                "cannot cancel a registration after the activity has ended".into(),
            ));
        }

        let row = lock_registration(&mut tx, activity_id, user_id).await?;

        if !row.status.can_transition_to(RegistrationStatus::Cancelled) {
            return Err(CoreError::InvalidState(match row.status {
                RegistrationStatus::Cancelled => "registration is already cancelled".into(),
                _ => "cannot cancel a completed registration".into(),
            }));
        }

        let updated = sqlx::query_as::<_, ActivityRegistration>(&format!(
            r#"
            UPDATE activity_registrations
            SET status = 'cancelled', updated_at = now()
            WHERE id = $1 AND status = 'registered'
            RETURNING {REGISTRATION_COLUMNS}
            "#,
        ))
        .bind(row.id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(CoreError::ConflictRetry)?;

        // The counter floors at zero. Hitting the floor here means it was
        // already inconsistent with the registration rows.
        if activity.current_participants == 0 {
            warn!(
                activity = %activity_id,
                "participant counter underflow clamped to 0"
            );
        }
        sqlx::query(
            r#"
            UPDATE activities
            SET current_participants = GREATEST(current_participants - 1, 0),
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(activity_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(activity = %activity_id, user = %user_id, "registration cancelled");
        Ok(updated)
    }

    /// Mark a student's participation as completed
    pub async fn complete(
        &self,
        activity_id: Uuid,
        user_id: Uuid,
        acting: &Principal,
    ) -> CoreResult<ActivityRegistration> {
        let mut tx = self.pool.begin().await?;

        let activity = sqlx::query_as::<_, Activity>(&format!(
            r#"
            SELECT {ACTIVITY_COLUMNS}
            FROM activities
            WHERE id = $1
            "#,
        ))
        .bind(activity_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(CoreError::NotFound("activity"))?;

        if !acting.may_manage(activity.organizer_id) {
            return Err(CoreError::Forbidden(
                "only the organizer or an admin may mark completion",
            ));
        }

        let row = lock_registration(&mut tx, activity_id, user_id).await?;

        if !row.status.can_transition_to(RegistrationStatus::Completed) {
            return Err(CoreError::InvalidState(match row.status {
                RegistrationStatus::Completed => "registration is already completed".into(),
                _ => "cannot complete a cancelled registration".into(),
            }));
        }

        let updated = sqlx::query_as::<_, ActivityRegistration>(&format!(
            r#"
            UPDATE activity_registrations
            SET status = 'completed', completion_time = now(), updated_at = now()
            WHERE id = $1 AND status = 'registered'
            RETURNING {REGISTRATION_COLUMNS}
            "#,
        ))
        .bind(row.id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(CoreError::ConflictRetry)?;

        tx.commit().await?;
        info!(activity = %activity_id, user = %user_id, "participation completed");
        Ok(updated)
    }
}

/// Fetch the activity row and hold its lock until the transaction ends
async fn lock_activity(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    activity_id: Uuid,
) -> CoreResult<Activity> {
    sqlx::query_as::<_, Activity>(&format!(
        r#"
        SELECT {ACTIVITY_COLUMNS}
        FROM activities
        WHERE id = $1
        FOR UPDATE
        "#,
    ))
    .bind(activity_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(CoreError::NotFound("activity"))
}

/// Fetch the registration row and hold its lock until the transaction ends
async fn lock_registration(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    activity_id: Uuid,
    user_id: Uuid,
) -> CoreResult<ActivityRegistration> {
    sqlx::query_as::<_, ActivityRegistration>(&format!(
        r#"
        SELECT {REGISTRATION_COLUMNS}
        FROM activity_registrations
        WHERE activity_id = $1 AND user_id = $2
        FOR UPDATE
        "#,
    ))
    .bind(activity_id)
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(CoreError::NotFound("registration"))
}

async fn reactivate_registration(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    registration_id: Uuid,
) -> CoreResult<ActivityRegistration> {
    sqlx::query_as::<_, ActivityRegistration>(&format!(
        r#"
        UPDATE activity_registrations
        SET status = 'registered', register_time = now(),
            completion_time = NULL, updated_at = now()
        WHERE id = $1 AND status = 'cancelled'
        RETURNING {REGISTRATION_COLUMNS}
        "#,
    ))
    .bind(registration_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(CoreError::ConflictRetry)
}

async fn insert_registration(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    activity_id: Uuid,
    user_id: Uuid,
) -> CoreResult<ActivityRegistration> {
    sqlx::query_as::<_, ActivityRegistration>(&format!(
        r#"
        INSERT INTO activity_registrations (activity_id, user_id)
        VALUES ($1, $2)
        RETURNING {REGISTRATION_COLUMNS}
        "#,
    ))
    .bind(activity_id)
    .bind(user_id)
    .fetch_one(&mut **tx)
    .await
    .map_err(CoreError::from_write)
}
