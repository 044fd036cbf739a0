//! Integration tests for the enrollment service
//!
//! Runs against the live database addressed by `DATABASE_URL`.

mod support;

use futures::future::join_all;
use serial_test::serial;

use api::error::CoreError;
use api::models::{ActivityStatus, RegistrationStatus, UserRole};
use api::services::EnrollmentService;
use support::*;

/// Capacity-1 scenario: A registers, B is rejected, A cancels, B registers.
#[tokio::test]
#[serial]
async fn capacity_one_lifecycle() {
    let pool = setup_pool().await;
    let enrollment = EnrollmentService::new(pool.clone());

    let organizer = create_user(&pool, UserRole::Teacher).await;
    let activity = create_activity(&pool, &principal_for(&organizer), 1, 2.0).await;
    let student_a = create_user(&pool, UserRole::Student).await;
    let student_b = create_user(&pool, UserRole::Student).await;

    let reg_a = enrollment
        .register(activity.id, student_a.id)
        .await
        .expect("student A registers");
    assert_eq!(reg_a.status, RegistrationStatus::Registered);
    assert_eq!(fetch_activity(&pool, activity.id).await.current_participants, 1);

    let err = enrollment
        .register(activity.id, student_b.id)
        .await
        .expect_err("activity is full");
    assert!(matches!(err, CoreError::CapacityExceeded));

    let cancelled = enrollment
        .cancel(activity.id, student_a.id)
        .await
        .expect("student A cancels");
    assert_eq!(cancelled.status, RegistrationStatus::Cancelled);
    assert_eq!(fetch_activity(&pool, activity.id).await.current_participants, 0);

    let reg_b = enrollment
        .register(activity.id, student_b.id)
        .await
        .expect("slot freed for student B");
    assert_eq!(reg_b.status, RegistrationStatus::Registered);
    assert_eq!(fetch_activity(&pool, activity.id).await.current_participants, 1);
}

/// Register -> cancel -> register reactivates the same row instead of
/// inserting a duplicate.
#[tokio::test]
#[serial]
async fn reactivation_reuses_the_same_row() {
    let pool = setup_pool().await;
    let enrollment = EnrollmentService::new(pool.clone());

    let organizer = create_user(&pool, UserRole::Teacher).await;
    let activity = create_activity(&pool, &principal_for(&organizer), 5, 1.0).await;
    let student = create_user(&pool, UserRole::Student).await;

    let first = enrollment
        .register(activity.id, student.id)
        .await
        .expect("first registration");
    enrollment
        .cancel(activity.id, student.id)
        .await
        .expect("cancellation");
    let second = enrollment
        .register(activity.id, student.id)
        .await
        .expect("re-registration");

    assert_eq!(first.id, second.id, "row must be reused");
    assert_eq!(second.status, RegistrationStatus::Registered);

    let rows: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM activity_registrations WHERE activity_id = $1 AND user_id = $2",
    )
    .bind(activity.id)
    .bind(student.id)
    .fetch_one(&pool)
    .await
    .expect("count rows");
    assert_eq!(rows, 1, "exactly one row per (activity, user)");
}

#[tokio::test]
#[serial]
async fn duplicate_registration_is_rejected() {
    let pool = setup_pool().await;
    let enrollment = EnrollmentService::new(pool.clone());

    let organizer = create_user(&pool, UserRole::Teacher).await;
    let activity = create_activity(&pool, &principal_for(&organizer), 5, 1.0).await;
    let student = create_user(&pool, UserRole::Student).await;

    enrollment
        .register(activity.id, student.id)
        .await
        .expect("first registration");
    let err = enrollment
        .register(activity.id, student.id)
        .await
        .expect_err("second registration must fail");
    assert!(matches!(err, CoreError::AlreadyRegistered));

    assert_eq!(fetch_activity(&pool, activity.id).await.current_participants, 1);
}

#[tokio::test]
#[serial]
async fn ended_activity_rejects_registration_and_cancellation() {
    let pool = setup_pool().await;
    let enrollment = EnrollmentService::new(pool.clone());

    let organizer = create_user(&pool, UserRole::Teacher).await;
    let org_principal = principal_for(&organizer);
    let activity = create_activity(&pool, &org_principal, 5, 1.0).await;
    let student = create_user(&pool, UserRole::Student).await;

    enrollment
        .register(activity.id, student.id)
        .await
        .expect("registration while open");

    enrollment
        .update_activity_status(activity.id, &org_principal, ActivityStatus::InProgress)
        .await
        .expect("start activity");
    enrollment
        .update_activity_status(activity.id, &org_principal, ActivityStatus::Ended)
        .await
        .expect("end activity");

    let late_student = create_user(&pool, UserRole::Student).await;
    let err = enrollment
        .register(activity.id, late_student.id)
        .await
        .expect_err("registration after end");
    assert!(matches!(err, CoreError::InvalidState(_)));

    let err = enrollment
        .cancel(activity.id, student.id)
        .await
        .expect_err("cancellation after end");
    assert!(matches!(err, CoreError::InvalidState(_)));
}

#[tokio::test]
#[serial]
async fn activity_lifecycle_rejects_illegal_edges() {
    let pool = setup_pool().await;
    let enrollment = EnrollmentService::new(pool.clone());

    let organizer = create_user(&pool, UserRole::Teacher).await;
    let org_principal = principal_for(&organizer);
    let activity = create_activity(&pool, &org_principal, 5, 1.0).await;

    // not_started -> ended skips in_progress
    let err = enrollment
        .update_activity_status(activity.id, &org_principal, ActivityStatus::Ended)
        .await
        .expect_err("cannot end an unstarted activity");
    assert!(matches!(err, CoreError::InvalidState(_)));

    // Only the organizer or an admin may drive the lifecycle
    let outsider = create_user(&pool, UserRole::Teacher).await;
    let err = enrollment
        .update_activity_status(activity.id, &principal_for(&outsider), ActivityStatus::InProgress)
        .await
        .expect_err("outsider cannot manage the activity");
    assert!(matches!(err, CoreError::Forbidden(_)));
}

#[tokio::test]
#[serial]
async fn completion_is_organizer_only_and_one_shot() {
    let pool = setup_pool().await;
    let enrollment = EnrollmentService::new(pool.clone());

    let organizer = create_user(&pool, UserRole::Teacher).await;
    let org_principal = principal_for(&organizer);
    let activity = create_activity(&pool, &org_principal, 5, 1.0).await;
    let student = create_user(&pool, UserRole::Student).await;

    enrollment
        .register(activity.id, student.id)
        .await
        .expect("registration");

    // A student cannot mark completion, not even their own.
    let err = enrollment
        .complete(activity.id, student.id, &principal_for(&student))
        .await
        .expect_err("student cannot complete");
    assert!(matches!(err, CoreError::Forbidden(_)));

    let completed = enrollment
        .complete(activity.id, student.id, &org_principal)
        .await
        .expect("organizer completes");
    assert_eq!(completed.status, RegistrationStatus::Completed);
    assert!(completed.completion_time.is_some());

    let err = enrollment
        .complete(activity.id, student.id, &org_principal)
        .await
        .expect_err("completion is one-shot");
    assert!(matches!(err, CoreError::InvalidState(_)));

    // A completed registration can be neither cancelled nor re-registered.
    let err = enrollment
        .cancel(activity.id, student.id)
        .await
        .expect_err("cannot cancel a completed registration");
    assert!(matches!(err, CoreError::InvalidState(_)));

    let err = enrollment
        .register(activity.id, student.id)
        .await
        .expect_err("cannot re-register a completed registration");
    assert!(matches!(err, CoreError::InvalidState(_)));
}

/// N concurrent registrations against capacity C end with exactly C
/// successes and a counter equal to C.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[serial]
async fn concurrent_registrations_never_overshoot_capacity() {
    const CAPACITY: i32 = 3;
    const ATTEMPTS: usize = 8;

    let pool = setup_pool().await;
    let enrollment = EnrollmentService::new(pool.clone());

    let organizer = create_user(&pool, UserRole::Teacher).await;
    let activity = create_activity(&pool, &principal_for(&organizer), CAPACITY, 1.0).await;

    let mut students = Vec::new();
    for _ in 0..ATTEMPTS {
        students.push(create_user(&pool, UserRole::Student).await);
    }

    let tasks = students.into_iter().map(|student| {
        let enrollment = enrollment.clone();
        let activity_id = activity.id;
        tokio::spawn(async move { enrollment.register(activity_id, student.id).await })
    });

    let outcomes = join_all(tasks).await;

    let mut successes = 0;
    for outcome in outcomes {
        match outcome.expect("task panicked") {
            Ok(_) => successes += 1,
            Err(CoreError::CapacityExceeded) | Err(CoreError::ConflictRetry) => {}
            Err(other) => panic!("unexpected failure: {other:?}"),
        }
    }

    assert_eq!(successes, CAPACITY as usize);
    let after = fetch_activity(&pool, activity.id).await;
    assert_eq!(after.current_participants, CAPACITY);
    assert!(after.current_participants <= after.capacity);
}
