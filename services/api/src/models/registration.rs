//! Activity registration model and state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Per-row registration status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "registration_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Registered,
    Cancelled,
    Completed,
}

impl RegistrationStatus {
    /// Legal edges: registered <-> cancelled, registered -> completed.
    /// `cancelled -> registered` is the only reactivation path and
    /// `completed` is terminal.
    pub fn can_transition_to(self, next: RegistrationStatus) -> bool {
        use RegistrationStatus::*;
        matches!(
            (self, next),
            (Registered, Cancelled) | (Registered, Completed) | (Cancelled, Registered)
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RegistrationStatus::Registered => "registered",
            RegistrationStatus::Cancelled => "cancelled",
            RegistrationStatus::Completed => "completed",
        }
    }
}

/// Join entity between a user and an activity
///
/// At most one row exists per (activity, user); cancellation keeps the row
/// around so a later registration reactivates it instead of inserting a
/// duplicate.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ActivityRegistration {
    pub id: Uuid,
    pub activity_id: Uuid,
    pub user_id: Uuid,
    pub status: RegistrationStatus,
    pub register_time: DateTime<Utc>,
    pub completion_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::RegistrationStatus::*;

    #[test]
    fn legal_edges() {
        assert!(Registered.can_transition_to(Cancelled));
        assert!(Registered.can_transition_to(Completed));
        assert!(Cancelled.can_transition_to(Registered));
    }

    #[test]
    fn completed_is_terminal() {
        assert!(!Completed.can_transition_to(Registered));
        assert!(!Completed.can_transition_to(Cancelled));
    }

    #[test]
    fn no_self_or_backward_edges() {
        assert!(!Registered.can_transition_to(Registered));
        assert!(!Cancelled.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Completed));
    }
}
