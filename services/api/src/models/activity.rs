//! Activity model and lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::credit::CreditType;

/// Activity lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "activity_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    NotStarted,
    InProgress,
    Ended,
    Cancelled,
}

impl ActivityStatus {
    /// Whether students may register while the activity is in this state
    pub fn accepts_registrations(self) -> bool {
        matches!(self, ActivityStatus::NotStarted | ActivityStatus::InProgress)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ActivityStatus::Ended | ActivityStatus::Cancelled)
    }

    /// Legal lifecycle edges: not_started -> in_progress -> ended, with
    /// cancellation possible from either non-terminal state.
    pub fn can_transition_to(self, next: ActivityStatus) -> bool {
        use ActivityStatus::*;
        matches!(
            (self, next),
            (NotStarted, InProgress)
                | (InProgress, Ended)
                | (NotStarted, Cancelled)
                | (InProgress, Cancelled)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityStatus::NotStarted => "not_started",
            ActivityStatus::InProgress => "in_progress",
            ActivityStatus::Ended => "ended",
            ActivityStatus::Cancelled => "cancelled",
        }
    }
}

/// Activity entity
///
/// `current_participants` is owned by the enrollment service and always
/// stays within `0..=capacity`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Activity {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub organizer_id: Uuid,
    pub capacity: i32,
    pub current_participants: i32,
    pub status: ActivityStatus,
    pub credit_type: CreditType,
    pub credit_value: f64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New activity creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewActivity {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub capacity: i32,
    pub credit_type: CreditType,
    pub credit_value: f64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Lifecycle transition request
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateActivityStatus {
    pub status: ActivityStatus,
}

/// Query parameters for activity listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityQuery {
    /// Page number (1-based)
    pub page: Option<u32>,
    /// Number of items per page
    pub limit: Option<u32>,
    /// Filter by lifecycle status
    pub status: Option<ActivityStatus>,
}

/// Response for activity listing with pagination
#[derive(Debug, Clone, Serialize)]
pub struct ActivityListResponse {
    pub items: Vec<Activity>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::ActivityStatus::*;

    #[test]
    fn lifecycle_edges() {
        assert!(NotStarted.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Ended));
        assert!(NotStarted.can_transition_to(Cancelled));
        assert!(InProgress.can_transition_to(Cancelled));

        assert!(!Ended.can_transition_to(InProgress));
        assert!(!Ended.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(NotStarted));
        assert!(!NotStarted.can_transition_to(Ended));
        assert!(!InProgress.can_transition_to(NotStarted));
    }

    #[test]
    fn registration_window() {
        assert!(NotStarted.accepts_registrations());
        assert!(InProgress.accepts_registrations());
        assert!(!Ended.accepts_registrations());
        assert!(!Cancelled.accepts_registrations());
    }
}
