//! Shared helpers for the integration suites
//!
//! These suites run against the live PostgreSQL instance addressed by
//! `DATABASE_URL`. Every test creates its own users and activities, so the
//! suites never depend on pre-existing rows.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use api::middleware::Principal;
use api::models::{Activity, CreditType, NewActivity, NewUser, User, UserRole};
use api::repositories::UserRepository;
use api::services::EnrollmentService;
use common::database::{DatabaseConfig, init_pool, run_migrations};

/// Connect to the test database and bring the schema up to date
pub async fn setup_pool() -> PgPool {
    let config = DatabaseConfig::from_env().expect("database config");
    let pool = init_pool(&config).await.expect("database pool");
    run_migrations(&pool).await.expect("migrations");
    pool
}

/// Create a fresh user with a unique username
pub async fn create_user(pool: &PgPool, role: UserRole) -> User {
    let suffix = Uuid::new_v4().simple().to_string();
    let username = format!("u{}", &suffix[..12]);
    let new_user = NewUser {
        username: username.clone(),
        email: format!("{}@campus.test", username),
        role: None,
    };

    UserRepository::new(pool.clone())
        .create(&new_user, role)
        .await
        .expect("create user")
}

pub fn principal_for(user: &User) -> Principal {
    Principal {
        user_id: user.id,
        role: user.role,
    }
}

/// Create an activity owned by the given organizer
pub async fn create_activity(
    pool: &PgPool,
    organizer: &Principal,
    capacity: i32,
    credit_value: f64,
) -> Activity {
    let now = Utc::now();
    let payload = NewActivity {
        title: format!("Activity {}", Uuid::new_v4()),
        description: "integration test activity".into(),
        capacity,
        credit_type: CreditType::Suketuo,
        credit_value,
        start_time: now + Duration::hours(1),
        end_time: now + Duration::hours(3),
    };

    EnrollmentService::new(pool.clone())
        .create_activity(organizer, &payload)
        .await
        .expect("create activity")
}

/// Re-read an activity row
pub async fn fetch_activity(pool: &PgPool, id: Uuid) -> Activity {
    api::repositories::ActivityRepository::new(pool.clone())
        .find_by_id(id)
        .await
        .expect("fetch activity")
        .expect("activity exists")
}

/// Re-read a user row
pub async fn fetch_user(pool: &PgPool, id: Uuid) -> User {
    UserRepository::new(pool.clone())
        .find_by_id(id)
        .await
        .expect("fetch user")
        .expect("user exists")
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
