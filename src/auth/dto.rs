use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::model::{CandidateDetails, OnboardingStatus, Role, User};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyReferralCodeRequest {
    pub code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyReferralCodeResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Response returned after login and after any mutation that re-mints the
/// token. `redirect_to` is the routing contract UI layers must honor.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
    pub redirect_to: String,
}

/// Client-safe projection of a user; the password hash never leaves the
/// server.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub is_super_admin: bool,
    pub first_login: bool,
    pub onboarding_status: OnboardingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate_details: Option<CandidateDetails>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            is_super_admin: user.is_super_admin,
            first_login: user.first_login,
            onboarding_status: user.onboarding_status,
            resume_path: user.resume_path.clone(),
            candidate_details: user.candidate_details.as_ref().map(|d| d.0.clone()),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_strips_the_hash() {
        let user = User {
            id: Uuid::new_v4(),
            username: "bob".into(),
            email: "bob@x.com".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            role: Role::JobPoster,
            is_super_admin: false,
            first_login: true,
            onboarding_status: OnboardingStatus::Completed,
            created_by: None,
            referral_code: None,
            referral_code_expires_at: None,
            referred_by: None,
            referral_status: None,
            referred_on: None,
            candidate_details: None,
            resume_path: None,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&PublicUser::from(&user)).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(json.contains("\"role\":\"job_poster\""));
        assert!(json.contains("\"firstLogin\":true"));
    }
}
