//! Read-only reporting over the ledger
//!
//! Everything here is a plain query; no method writes. The credit summary
//! intentionally returns balances next to the approved-application sums
//! they must equal, which makes the ledger invariant observable.

use sqlx::{PgPool, Row};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::models::{
    ApplicationListResponse, ApplicationReportQuery, CreditApplication, CreditSummaryEntry,
    CreditType, ParticipationReport, User, UserCreditSummary,
};
use crate::repositories::application::APPLICATION_COLUMNS;

/// Reporting service over users, activities, and applications
#[derive(Clone)]
pub struct ReportingService {
    pool: PgPool,
}

impl ReportingService {
    /// Create a new reporting service
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Per-type balances and approved totals for one user
    pub async fn credit_summary(&self, user_id: Uuid) -> CoreResult<UserCreditSummary> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, role,
                   suketuo_credits, lecture_credits, labor_credits,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CoreError::NotFound("user"))?;

        let rows = sqlx::query(
            r#"
            SELECT credit_type,
                   COALESCE(SUM(credit_value), 0) AS approved_total,
                   COUNT(*) AS approved_count
            FROM credit_applications
            WHERE user_id = $1 AND status = 'approved'
            GROUP BY credit_type
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut approved: HashMap<CreditType, (f64, i64)> = HashMap::new();
        for row in rows {
            let credit_type: CreditType = row.get("credit_type");
            approved.insert(
                credit_type,
                (row.get("approved_total"), row.get("approved_count")),
            );
        }

        let entries = CreditType::ALL
            .into_iter()
            .map(|credit_type| {
                let (approved_total, approved_count) =
                    approved.get(&credit_type).copied().unwrap_or((0.0, 0));
                CreditSummaryEntry {
                    credit_type,
                    balance: user.balance_for(credit_type),
                    approved_total,
                    approved_count,
                }
            })
            .collect();

        Ok(UserCreditSummary { user_id, entries })
    }

    /// Registration counts by status for one activity
    pub async fn participation(&self, activity_id: Uuid) -> CoreResult<ParticipationReport> {
        let activity = sqlx::query(
            r#"
            SELECT capacity, current_participants
            FROM activities
            WHERE id = $1
            "#,
        )
        .bind(activity_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CoreError::NotFound("activity"))?;

        let counts = sqlx::query(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE status = 'registered') AS registered,
                COUNT(*) FILTER (WHERE status = 'cancelled') AS cancelled,
                COUNT(*) FILTER (WHERE status = 'completed') AS completed
            FROM activity_registrations
            WHERE activity_id = $1
            "#,
        )
        .bind(activity_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(ParticipationReport {
            activity_id,
            capacity: activity.get("capacity"),
            current_participants: activity.get("current_participants"),
            registered: counts.get("registered"),
            cancelled: counts.get("cancelled"),
            completed: counts.get("completed"),
        })
    }

    /// Date-range application listing for dashboards
    pub async fn applications_report(
        &self,
        query: &ApplicationReportQuery,
    ) -> CoreResult<ApplicationListResponse> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) as i64 * limit as i64;

        let items = sqlx::query_as::<_, CreditApplication>(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS}
            FROM credit_applications
            WHERE ($1::timestamptz IS NULL OR created_at >= $1)
              AND ($2::timestamptz IS NULL OR created_at < $2)
              AND ($3::uuid IS NULL OR user_id = $3)
              AND ($4::uuid IS NULL OR activity_id = $4)
              AND ($5::application_status IS NULL OR status = $5)
              AND ($6::credit_type IS NULL OR credit_type = $6)
            ORDER BY created_at DESC
            LIMIT $7 OFFSET $8
            "#,
        ))
        .bind(query.from)
        .bind(query.to)
        .bind(query.user_id)
        .bind(query.activity_id)
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
            WHERE ($1::timestamptz IS NULL OR created_at >= $1)
              AND ($2::timestamptz IS NULL OR created_at < $2)
              AND ($3::uuid IS NULL OR user_id = $3)
              AND ($4::uuid IS NULL OR activity_id = $4)
              AND ($5::application_status IS NULL OR status = $5)
              AND ($6::credit_type IS NULL OR credit_type = $6)
            "#,
        )
        .bind(query.from)
        .bind(query.to)
        .bind(query.user_id)
        .bind(query.activity_id)
        .bind(query.status)
        .bind(query.credit_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(ApplicationListResponse {
            items,
            page,
            limit,
            total,
        })
    }
}
