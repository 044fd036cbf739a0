//! Credit application model and review state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::credit::CreditType;

/// Review status of a credit application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    /// Review is one-shot: pending -> approved or pending -> rejected,
    /// both terminal. There is no way back into pending.
    pub fn can_transition_to(self, next: ApplicationStatus) -> bool {
        use ApplicationStatus::*;
        matches!((self, next), (Pending, Approved) | (Pending, Rejected))
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ApplicationStatus::Approved | ApplicationStatus::Rejected)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

/// A student's claim for a credit award
///
/// Reviewer metadata (`reviewer_id`, `review_comments`, `reviewed_at`) is
/// populated exactly when the application leaves `pending`. On approval
/// `credit_value` holds the resolved (possibly adjusted) amount that was
/// added to the applicant's balance.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CreditApplication {
    pub id: Uuid,
    pub user_id: Uuid,
    pub credit_type: CreditType,
    pub credit_value: f64,
    pub activity_id: Option<Uuid>,
    /// Opaque stored-file references attached as evidence; never interpreted
    #[sqlx(json)]
    pub proof_refs: Vec<String>,
    pub reason: String,
    pub status: ApplicationStatus,
    pub reviewer_id: Option<Uuid>,
    pub review_comments: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Submission payload for a new credit application
#[derive(Debug, Clone, Deserialize)]
pub struct NewCreditApplication {
    pub credit_type: CreditType,
    pub credit_value: f64,
    /// Optional link to the activity the claim originates from
    pub activity_id: Option<Uuid>,
    #[serde(default)]
    pub proof_refs: Vec<String>,
    #[serde(default)]
    pub reason: String,
}

/// Reviewer decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

/// Review request payload
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewRequest {
    pub decision: ReviewDecision,
    /// Overrides the requested credit value on approval when present
    pub adjusted_value: Option<f64>,
    pub comments: Option<String>,
}

/// Query parameters for application listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationQuery {
    /// Page number (1-based)
    pub page: Option<u32>,
    /// Number of items per page
    pub limit: Option<u32>,
    pub user_id: Option<Uuid>,
    pub status: Option<ApplicationStatus>,
    pub credit_type: Option<CreditType>,
}

/// Response for application listing with pagination
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationListResponse {
    pub items: Vec<CreditApplication>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
}
