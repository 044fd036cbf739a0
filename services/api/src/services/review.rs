//! Credit review service
//!
//! Owns the credit-application lifecycle and the only writes to the user
//! balance columns. Review is one-shot: the application row is locked
//! (`FOR UPDATE`), the transition is validated against the state machine,
//! and on approval the status change and the balance increment commit in
//! the same transaction, so an approved application without its balance
//! increment (or the reverse) cannot be observed.

use sqlx::PgPool;
use sqlx::types::Json;
use tracing::info;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::middleware::Principal;
use crate::models::{
    Activity, ApplicationStatus, CreditApplication, NewCreditApplication, ReviewDecision,
    ReviewRequest,
};
use crate::repositories::activity::ACTIVITY_COLUMNS;
use crate::repositories::application::APPLICATION_COLUMNS;
use crate::validation::validate_proof_refs;

/// Review engine for credit applications
#[derive(Clone)]
pub struct CreditReviewService {
    pool: PgPool,
}

impl CreditReviewService {
    /// Create a new review service
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Submit a new credit application on behalf of a student
    pub async fn submit(
        &self,
        user_id: Uuid,
        payload: &NewCreditApplication,
    ) -> CoreResult<CreditApplication> {
        if payload.credit_value <= 0.0 {
            return Err(CoreError::InvalidArgument(
                "credit value must be positive".into(),
            ));
        }
        validate_proof_refs(&payload.proof_refs).map_err(CoreError::InvalidArgument)?;

        let applicant_exists: Option<i32> = sqlx::query_scalar("SELECT 1 FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        if applicant_exists.is_none() {
            return Err(CoreError::NotFound("user"));
        }

        if let Some(activity_id) = payload.activity_id {
            let activity = sqlx::query_as::<_, Activity>(&format!(
                r#"
                SELECT {ACTIVITY_COLUMNS}
                FROM activities
                WHERE id = $1
                "#,
            ))
            .bind(activity_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(CoreError::NotFound("activity"))?;

            if activity.status.is_terminal() {
                return Err(CoreError::InvalidArgument(format!(
                    "activity is {}",
                    activity.status.as_str()
                )));
            }
            if payload.credit_value > activity.credit_value {
                return Err(CoreError::InvalidArgument(format!(
                    "credit value exceeds the activity's configured maximum of {}",
                    activity.credit_value
                )));
            }
        }

        let application = sqlx::query_as::<_, CreditApplication>(&format!(
            r#"
            INSERT INTO credit_applications
                (user_id, credit_type, credit_value, activity_id, proof_refs, reason)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {APPLICATION_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(payload.credit_type)
        .bind(payload.credit_value)
        .bind(payload.activity_id)
        .bind(Json(&payload.proof_refs))
        .bind(&payload.reason)
        .fetch_one(&self.pool)
        .await
        .map_err(CoreError::from_write)?;

        info!(application = %application.id, user = %user_id, "credit application submitted");
        Ok(application)
    }

    /// Review a pending application, exactly once
    pub async fn review(
        &self,
        application_id: Uuid,
        acting: &Principal,
        payload: &ReviewRequest,
    ) -> CoreResult<CreditApplication> {
        if !acting.role.can_review() {
            return Err(CoreError::Forbidden(
                "only teachers or admins may review applications",
            ));
        }

        let mut tx = self.pool.begin().await?;

        let application = sqlx::query_as::<_, CreditApplication>(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS}
            FROM credit_applications
            WHERE id = $1
            FOR UPDATE
            "#,
        ))
        .bind(application_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(CoreError::NotFound("application"))?;

        let target = match payload.decision {
            ReviewDecision::Approve => ApplicationStatus::Approved,
            ReviewDecision::Reject => ApplicationStatus::Rejected,
        };
        if !application.status.can_transition_to(target) {
            return Err(CoreError::InvalidState(format!(
                "application is already {}",
                application.status.as_str()
            )));
        }

        let reviewed = match payload.decision {
            ReviewDecision::Reject => {
                let comments = payload
                    .comments
                    .as_deref()
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .ok_or_else(|| {
                        CoreError::InvalidArgument(
                            "review comments are required when rejecting".into(),
                        )
                    })?;

                sqlx::query_as::<_, CreditApplication>(&format!(
                    r#"
                    UPDATE credit_applications
                    SET status = 'rejected', reviewer_id = $2, review_comments = $3,
                        reviewed_at = now(), updated_at = now()
                    WHERE id = $1 AND status = 'pending'
                    RETURNING {APPLICATION_COLUMNS}
                    "#,
                ))
                .bind(application_id)
                .bind(acting.user_id)
                .bind(comments)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(CoreError::ConflictRetry)?
            }
            ReviewDecision::Approve => {
                let resolved = payload.adjusted_value.unwrap_or(application.credit_value);
                if resolved <= 0.0 {
                    return Err(CoreError::InvalidArgument(
                        "approved credit value must be positive".into(),
                    ));
                }

                let reviewed = sqlx::query_as::<_, CreditApplication>(&format!(
                    r#"
                    UPDATE credit_applications
                    SET status = 'approved', credit_value = $2, reviewer_id = $3,
                        review_comments = $4, reviewed_at = now(), updated_at = now()
                    WHERE id = $1 AND status = 'pending'
                    RETURNING {APPLICATION_COLUMNS}
                    "#,
                ))
                .bind(application_id)
                .bind(resolved)
                .bind(acting.user_id)
                .bind(payload.comments.as_deref())
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(CoreError::ConflictRetry)?;

                // Same transaction as the status flip: the balance column
                // name comes from a closed enum, never from input.
                let column = application.credit_type.balance_column();
                let affected = sqlx::query(&format!(
                    "UPDATE users SET {column} = {column} + $1, updated_at = now() WHERE id = $2",
                ))
                .bind(resolved)
                .bind(application.user_id)
                .execute(&mut *tx)
                .await?
                .rows_affected();

                if affected != 1 {
                    return Err(CoreError::Internal(format!(
                        "applicant {} missing during approval",
                        application.user_id
                    )));
                }

                reviewed
            }
        };

        tx.commit().await?;
        info!(
            application = %application_id,
            reviewer = %acting.user_id,
            decision = ?payload.decision,
            "application reviewed"
        );
        Ok(reviewed)
    }
}
