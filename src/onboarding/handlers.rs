use axum::{
    extract::{DefaultBodyLimit, FromRef, Multipart, Path, State},
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{AuthResponse, PublicUser},
        extractors::AuthUser,
        gate,
        jwt::JwtKeys,
    },
    error::AppError,
    state::AppState,
    users::model::{CandidateDetails, Role, User},
};

const MAX_RESUME_BYTES: usize = 10 * 1024 * 1024;

pub fn onboarding_routes() -> Router<AppState> {
    Router::new()
        .route("/seeker/onboarding", post(complete_onboarding))
        .route("/users/:id/resume", get(download_resume))
        .layer(DefaultBodyLimit::max(MAX_RESUME_BYTES))
}

#[derive(Default)]
struct OnboardingForm {
    full_name: Option<String>,
    phone: Option<String>,
    skills: Option<String>,
    experience: Option<String>,
    resume: Option<(String, Bytes)>,
}

/// One-time profile completion for job seekers. Persists the profile and
/// resume, then converges on the ready state: `onboarding_status =
/// completed` AND `first_login = false`. Clearing `first_login` here is
/// intentional — completing onboarding is accepted proof the temporary
/// password was exercised. The response carries a re-minted token so the
/// session reflects both changes without re-login.
#[instrument(skip(state, claims, multipart))]
pub async fn complete_onboarding(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    mut multipart: Multipart,
) -> Result<Json<AuthResponse>, AppError> {
    gate::require_role(&claims, &[Role::JobSeeker])?;

    let mut form = OnboardingForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("invalid multipart body: {e}")))?
    {
        let read_text = |e: axum::extract::multipart::MultipartError| {
            AppError::validation(format!("invalid multipart field: {e}"))
        };
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("fullName") => form.full_name = Some(field.text().await.map_err(read_text)?),
            Some("phone") => form.phone = Some(field.text().await.map_err(read_text)?),
            Some("skills") => form.skills = Some(field.text().await.map_err(read_text)?),
            Some("experience") => form.experience = Some(field.text().await.map_err(read_text)?),
            Some("resume") => {
                if field.content_type() != Some("application/pdf") {
                    return Err(AppError::validation(
                        "only PDF files are allowed for resumes",
                    ));
                }
                let filename = field
                    .file_name()
                    .map(sanitize_filename)
                    .unwrap_or_else(|| "resume.pdf".to_string());
                let data = field.bytes().await.map_err(read_text)?;
                form.resume = Some((filename, data));
            }
            _ => {}
        }
    }

    let full_name = required(form.full_name, "fullName")?;
    let phone = required(form.phone, "phone")?;
    let skills_raw = required(form.skills, "skills")?;
    let experience = required(form.experience, "experience")?;
    let (filename, resume) = form
        .resume
        .ok_or_else(|| AppError::validation("resume is required"))?;

    let skills: Vec<String> = skills_raw
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if skills.is_empty() {
        return Err(AppError::validation("at least one skill is required"));
    }

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| AppError::not_found("user not found"))?;

    // A re-armed seeker onboarding again replaces their previous resume.
    if let Some(old) = &user.resume_path {
        if let Err(e) = state.storage.delete_object(old.trim_start_matches('/')).await {
            warn!(user_id = %user.id, error = %e, "failed to delete previous resume");
        }
    }

    let key = format!(
        "resumes/{}_{}_{}",
        user.id,
        OffsetDateTime::now_utc().unix_timestamp(),
        filename
    );
    state
        .storage
        .put_object(&key, resume, "application/pdf")
        .await?;
    let resume_path = format!("/{key}");

    let details = CandidateDetails {
        full_name,
        phone,
        skills,
        experience,
    };
    let user = User::complete_onboarding(
        &state.db,
        user.id,
        sqlx::types::Json(details),
        &resume_path,
    )
    .await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&user)?;
    let fresh = keys.verify(&token)?;

    info!(user_id = %user.id, resume = %resume_path, "onboarding completed");
    Ok(Json(AuthResponse {
        token,
        user: PublicUser::from(&user),
        redirect_to: fresh.post_login_destination().to_string(),
    }))
}

/// 302 to a short-lived presigned URL for a seeker's resume. The seeker may
/// fetch their own; admins may fetch anyone's.
#[instrument(skip(state, claims))]
pub async fn download_resume(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Redirect, AppError> {
    gate::check_ownership(id, &claims)?;

    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("user not found"))?;
    let path = user
        .resume_path
        .as_deref()
        .ok_or_else(|| AppError::not_found("no resume on file"))?;

    let url = state
        .storage
        .presign_get(path.trim_start_matches('/'), 600)
        .await?;
    Ok(Redirect::temporary(&url))
}

fn required(value: Option<String>, name: &str) -> Result<String, AppError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(AppError::validation(format!("{name} is required"))),
    }
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_missing_and_blank() {
        assert!(required(None, "phone").is_err());
        assert!(required(Some("   ".into()), "phone").is_err());
        assert_eq!(required(Some(" x ".into()), "phone").unwrap(), "x");
    }

    #[test]
    fn filenames_are_sanitized_for_storage_keys() {
        assert_eq!(sanitize_filename("my resume (1).pdf"), "my_resume__1_.pdf");
        assert_eq!(sanitize_filename("cv.pdf"), "cv.pdf");
    }
}
