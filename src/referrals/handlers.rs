use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::instrument;

use crate::{
    auth::{extractors::AuthUser, gate},
    error::AppError,
    referrals::{
        dto::{GenerateReferralCodeRequest, GenerateReferralCodeResponse},
        service,
    },
    state::AppState,
    users::model::Role,
};

pub fn referral_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/generate-referral-code", post(admin_generate_code))
        .route(
            "/referrer/generate-referral-code",
            post(referrer_generate_code),
        )
}

#[instrument(skip(state, claims, payload))]
pub async fn admin_generate_code(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<GenerateReferralCodeRequest>,
) -> Result<(StatusCode, Json<GenerateReferralCodeResponse>), AppError> {
    gate::require_role(&claims, &[Role::Admin])?;
    generate(state, claims, payload).await
}

#[instrument(skip(state, claims, payload))]
pub async fn referrer_generate_code(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(payload): Json<GenerateReferralCodeRequest>,
) -> Result<(StatusCode, Json<GenerateReferralCodeResponse>), AppError> {
    gate::require_role(&claims, &[Role::JobReferrer])?;
    generate(state, claims, payload).await
}

async fn generate(
    state: AppState,
    claims: crate::auth::jwt::Claims,
    payload: GenerateReferralCodeRequest,
) -> Result<(StatusCode, Json<GenerateReferralCodeResponse>), AppError> {
    let issued = service::issue_code(&state, &claims, &payload.candidate_email).await?;
    Ok((
        StatusCode::CREATED,
        Json(GenerateReferralCodeResponse {
            code: issued.code,
            expires_at: issued.expires_at,
            is_new_user: issued.is_new_user,
        }),
    ))
}
