//! Entities and request/response payloads for the credit service

pub mod activity;
pub mod application;
pub mod credit;
pub mod registration;
pub mod reports;
pub mod user;

// Re-export for convenience
pub use activity::{
    Activity, ActivityListResponse, ActivityQuery, ActivityStatus, NewActivity,
    UpdateActivityStatus,
};
pub use application::{
    ApplicationListResponse, ApplicationQuery, ApplicationStatus, CreditApplication,
    NewCreditApplication, ReviewDecision, ReviewRequest,
};
pub use credit::CreditType;
pub use registration::{ActivityRegistration, RegistrationStatus};
pub use reports::{
    ApplicationReportQuery, CreditSummaryEntry, ParticipationReport, UserCreditSummary,
};
pub use user::{NewUser, User, UserRole};
