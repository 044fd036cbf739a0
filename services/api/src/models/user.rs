//! User model and credit balances

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use super::credit::CreditType;

/// Account role resolved by the upstream auth gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Student,
    Teacher,
    Admin,
}

impl UserRole {
    /// Roles allowed to review credit applications
    pub fn can_review(self) -> bool {
        matches!(self, UserRole::Teacher | UserRole::Admin)
    }

    /// Roles allowed to create and run activities
    pub fn can_organize(self) -> bool {
        matches!(self, UserRole::Teacher | UserRole::Admin)
    }

    pub fn is_admin(self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(UserRole::Student),
            "teacher" => Ok(UserRole::Teacher),
            "admin" => Ok(UserRole::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// User entity with the three credit-balance accumulators
///
/// Balance fields are mutated only by the review service when an
/// application is approved.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub suketuo_credits: f64,
    pub lecture_credits: f64,
    pub labor_credits: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Current balance for the given credit type
    pub fn balance_for(&self, credit_type: CreditType) -> f64 {
        match credit_type {
            CreditType::Suketuo => self.suketuo_credits,
            CreditType::Lecture => self.lecture_credits,
            CreditType::Labor => self.labor_credits,
        }
    }
}

/// New user creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    /// Honored only when the caller is an admin; defaults to student
    pub role: Option<UserRole>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_rights_follow_role() {
        assert!(!UserRole::Student.can_review());
        assert!(UserRole::Teacher.can_review());
        assert!(UserRole::Admin.can_review());
    }

    #[test]
    fn role_parses_from_gateway_header_values() {
        assert_eq!("student".parse::<UserRole>().unwrap(), UserRole::Student);
        assert_eq!("teacher".parse::<UserRole>().unwrap(), UserRole::Teacher);
        assert_eq!("admin".parse::<UserRole>().unwrap(), UserRole::Admin);
        assert!("Admin".parse::<UserRole>().is_err());
        assert!("".parse::<UserRole>().is_err());
    }
}
