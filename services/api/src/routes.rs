//! Credit service routes

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    error::CoreError,
    middleware::Principal,
    models::{
        ActivityListResponse, ActivityQuery, ApplicationListResponse, ApplicationQuery,
        ApplicationReportQuery, NewActivity, NewCreditApplication, NewUser, ReviewRequest,
        UpdateActivityStatus, UserRole,
    },
    state::AppState,
    validation::{validate_email, validate_username},
};

/// Create the router for the credit service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/users", post(create_user))
        .route("/users/:id", get(get_user))
        .route("/users/:id/registrations", get(list_user_registrations))
        .route("/users/:id/credit-summary", get(credit_summary))
        .route("/activities", get(list_activities).post(create_activity))
        .route("/activities/:id", get(get_activity))
        .route("/activities/:id/status", post(update_activity_status))
        .route(
            "/activities/:id/registrations",
            get(list_activity_registrations)
                .post(register)
                .delete(withdraw),
        )
        .route(
            "/activities/:id/registrations/:user_id/complete",
            post(mark_complete),
        )
        .route("/applications", get(list_applications).post(submit_application))
        .route("/applications/:id", get(get_application))
        .route("/applications/:id/review", post(review_application))
        .route(
            "/reports/activities/:id/participation",
            get(participation_report),
        )
        .route("/reports/applications", get(applications_report))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "credit-service"
    }))
}

/// Create a new user account
///
/// The requested role is honored only for admin callers; everyone else gets
/// a student account.
pub async fn create_user(
    State(state): State<AppState>,
    principal: Option<Principal>,
    Json(payload): Json<NewUser>,
) -> Result<impl IntoResponse, CoreError> {
    validate_username(&payload.username).map_err(CoreError::InvalidArgument)?;
    validate_email(&payload.email).map_err(CoreError::InvalidArgument)?;

    let role = match payload.role {
        Some(role) if principal.is_some_and(|p| p.role.is_admin()) => role,
        _ => UserRole::Student,
    };

    let user = state
        .user_repository
        .create(&payload, role)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                CoreError::InvalidArgument("username or email is already taken".into())
            }
            _ => CoreError::from(e),
        })?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Get a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, CoreError> {
    let user = state
        .user_repository
        .find_by_id(id)
        .await?
        .ok_or(CoreError::NotFound("user"))?;

    Ok(Json(user))
}

/// List a user's registrations
pub async fn list_user_registrations(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, CoreError> {
    let registrations = state.registration_repository.list_by_user(id).await?;
    Ok(Json(registrations))
}

/// Per-type balances next to the approved totals they must equal
pub async fn credit_summary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, CoreError> {
    let summary = state.reporting.credit_summary(id).await?;
    Ok(Json(summary))
}

/// Create a new activity
pub async fn create_activity(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<NewActivity>,
) -> Result<impl IntoResponse, CoreError> {
    let activity = state.enrollment.create_activity(&principal, &payload).await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

/// List activities with pagination and an optional status filter
pub async fn list_activities(
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<impl IntoResponse, CoreError> {
    let (items, total) = state.activity_repository.list(&query).await?;

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    Ok(Json(ActivityListResponse {
        items,
        page,
        limit,
        total,
    }))
}

/// Get an activity by ID
pub async fn get_activity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, CoreError> {
    let activity = state
        .activity_repository
        .find_by_id(id)
        .await?
        .ok_or(CoreError::NotFound("activity"))?;

    Ok(Json(activity))
}

/// Move an activity along its lifecycle
pub async fn update_activity_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    principal: Principal,
    Json(payload): Json<UpdateActivityStatus>,
) -> Result<impl IntoResponse, CoreError> {
    let activity = state
        .enrollment
        .update_activity_status(id, &principal, payload.status)
        .await?;
    Ok(Json(activity))
}

/// List registrations for an activity
pub async fn list_activity_registrations(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, CoreError> {
    let registrations = state.registration_repository.list_by_activity(id).await?;
    Ok(Json(registrations))
}

/// Register the calling student into an activity
pub async fn register(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    principal: Principal,
) -> Result<impl IntoResponse, CoreError> {
    let registration = state.enrollment.register(id, principal.user_id).await?;
    Ok((StatusCode::CREATED, Json(registration)))
}

/// Withdraw the calling student from an activity
pub async fn withdraw(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    principal: Principal,
) -> Result<impl IntoResponse, CoreError> {
    let registration = state.enrollment.cancel(id, principal.user_id).await?;
    Ok(Json(registration))
}

/// Mark a student's participation as completed
pub async fn mark_complete(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
    principal: Principal,
) -> Result<impl IntoResponse, CoreError> {
    let registration = state.enrollment.complete(id, user_id, &principal).await?;
    Ok(Json(registration))
}

/// Submit a credit application for the calling student
pub async fn submit_application(
    State(state): State<AppState>,
    principal: Principal,
    Json(payload): Json<NewCreditApplication>,
) -> Result<impl IntoResponse, CoreError> {
    let application = state.review.submit(principal.user_id, &payload).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

/// List applications; students only see their own
pub async fn list_applications(
    State(state): State<AppState>,
    principal: Principal,
    Query(mut query): Query<ApplicationQuery>,
) -> Result<impl IntoResponse, CoreError> {
    if !principal.role.can_review() {
        query.user_id = Some(principal.user_id);
    }

    let (items, total) = state.application_repository.list(&query).await?;

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    Ok(Json(ApplicationListResponse {
        items,
        page,
        limit,
        total,
    }))
}

/// Get an application by ID; students may only view their own
pub async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    principal: Principal,
) -> Result<impl IntoResponse, CoreError> {
    let application = state
        .application_repository
        .find_by_id(id)
        .await?
        .ok_or(CoreError::NotFound("application"))?;

    if !principal.role.can_review() && application.user_id != principal.user_id {
        return Err(CoreError::Forbidden(
            "cannot view another student's application",
        ));
    }

    Ok(Json(application))
}

/// Review a pending application
pub async fn review_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    principal: Principal,
    Json(payload): Json<ReviewRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let application = state.review.review(id, &principal, &payload).await?;
    Ok(Json(application))
}

/// Registration counts for one activity
pub async fn participation_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, CoreError> {
    let report = state.reporting.participation(id).await?;
    Ok(Json(report))
}

/// Date-range application listing for dashboards
pub async fn applications_report(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<ApplicationReportQuery>,
) -> Result<impl IntoResponse, CoreError> {
    if !principal.role.can_review() {
        return Err(CoreError::Forbidden(
            "only teachers or admins may run reports",
        ));
    }

    let report = state.reporting.applications_report(&query).await?;
    Ok(Json(report))
}
