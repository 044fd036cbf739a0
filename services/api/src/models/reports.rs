//! Read-only reporting payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::application::ApplicationStatus;
use super::credit::CreditType;

/// One credit type's slice of a user's ledger
#[derive(Debug, Clone, Serialize)]
pub struct CreditSummaryEntry {
    pub credit_type: CreditType,
    /// Current balance column value
    pub balance: f64,
    /// Sum of approved application values for this type
    pub approved_total: f64,
    /// Number of approved applications for this type
    pub approved_count: i64,
}

/// Balances next to the approved-application sums they must equal
#[derive(Debug, Clone, Serialize)]
pub struct UserCreditSummary {
    pub user_id: Uuid,
    pub entries: Vec<CreditSummaryEntry>,
}

/// Registration counts for one activity, grouped by status
#[derive(Debug, Clone, Serialize)]
pub struct ParticipationReport {
    pub activity_id: Uuid,
    pub capacity: i32,
    pub current_participants: i32,
    pub registered: i64,
    pub cancelled: i64,
    pub completed: i64,
}

/// Query parameters for the application report
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationReportQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub user_id: Option<Uuid>,
    pub activity_id: Option<Uuid>,
    pub status: Option<ApplicationStatus>,
    pub credit_type: Option<CreditType>,
    /// Page number (1-based)
    pub page: Option<u32>,
    /// Number of items per page
    pub limit: Option<u32>,
}
