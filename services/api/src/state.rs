//! Application state shared across handlers

use sqlx::PgPool;

use crate::repositories::{
    ActivityRepository, ApplicationRepository, RegistrationRepository, UserRepository,
};
use crate::services::{CreditReviewService, EnrollmentService, ReportingService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub user_repository: UserRepository,
    pub activity_repository: ActivityRepository,
    pub registration_repository: RegistrationRepository,
    pub application_repository: ApplicationRepository,
    pub enrollment: EnrollmentService,
    pub review: CreditReviewService,
    pub reporting: ReportingService,
}

impl AppState {
    /// Wire all repositories and services onto one pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            user_repository: UserRepository::new(pool.clone()),
            activity_repository: ActivityRepository::new(pool.clone()),
            registration_repository: RegistrationRepository::new(pool.clone()),
            application_repository: ApplicationRepository::new(pool.clone()),
            enrollment: EnrollmentService::new(pool.clone()),
            review: CreditReviewService::new(pool.clone()),
            reporting: ReportingService::new(pool.clone()),
            db_pool: pool,
        }
    }
}
