use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{patch, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    applications::model::{Application, ApplicationStatus, Job},
    auth::{extractors::AuthUser, gate},
    error::AppError,
    state::AppState,
    users::model::Role,
};

pub fn application_routes() -> Router<AppState> {
    Router::new()
        .route("/jobs", post(create_job))
        .route("/jobs/:id/apply", post(apply_to_job))
        .route("/applications/:id", patch(update_application))
}

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
}

#[instrument(skip(state, claims, payload))]
pub async fn create_job(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    gate::require_role(&claims, &[Role::JobPoster, Role::Admin])?;

    let title = payload.title.trim();
    if title.is_empty() {
        return Err(AppError::validation("title is required"));
    }

    let job = Job::create(&state.db, title, claims.sub).await?;
    info!(job = %job.id, posted_by = %claims.sub, "job created");
    Ok((StatusCode::CREATED, Json(job)))
}

#[instrument(skip(state, claims))]
pub async fn apply_to_job(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(job_id): Path<Uuid>,
) -> Result<(StatusCode, Json<Application>), AppError> {
    gate::require_role(&claims, &[Role::JobSeeker])?;

    if Job::find_by_id(&state.db, job_id).await?.is_none() {
        return Err(AppError::not_found("job not found"));
    }

    let application = Application::create(&state.db, job_id, claims.sub).await?;
    info!(application = %application.id, job = %job_id, seeker = %claims.sub, "application submitted");
    Ok((StatusCode::CREATED, Json(application)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateApplicationRequest {
    pub status: String,
}

/// Status mutation gated on ownership: a job_poster may only touch
/// applications for jobs they posted; admins bypass the ownership check.
#[instrument(skip(state, claims, payload))]
pub async fn update_application(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateApplicationRequest>,
) -> Result<Json<Application>, AppError> {
    gate::require_role(&claims, &[Role::Admin, Role::JobPoster])?;

    let status: ApplicationStatus = payload
        .status
        .parse()
        .map_err(|_| AppError::validation("invalid application status"))?;

    let existing = Application::find_with_poster(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("application not found"))?;

    if let Err(e) = gate::check_ownership(existing.posted_by, &claims) {
        warn!(user_id = %claims.sub, application = %id, "ownership check failed");
        return Err(e);
    }

    let application = Application::update_status(&state.db, id, status).await?;
    info!(application = %id, status = ?status, "application status updated");
    Ok(Json(application))
}
