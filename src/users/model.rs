use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Closed role enumeration. Membership checks live in `auth::gate`, so
/// adding a role is a one-place change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
pub enum Role {
    Admin,
    JobPoster,
    JobSeeker,
    JobReferrer,
}

/// Profile-completion state for job seekers. Only `Pending` and `Completed`
/// are ever assigned; `NotStarted` and `InProgress` are declared but dead,
/// kept for wire compatibility pending product clarification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "onboarding_status", rename_all = "snake_case")]
pub enum OnboardingStatus {
    NotStarted,
    Pending,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "referral_status", rename_all = "snake_case")]
pub enum ReferralStatus {
    PendingOnboarding,
    OnboardingComplete,
}

/// Seeker profile captured at onboarding completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateDetails {
    pub full_name: String,
    pub phone: String,
    pub skills: Vec<String>,
    pub experience: String,
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub is_super_admin: bool,
    pub first_login: bool,
    pub onboarding_status: OnboardingStatus,
    pub created_by: Option<Uuid>,
    pub referral_code: Option<String>,
    pub referral_code_expires_at: Option<OffsetDateTime>,
    pub referred_by: Option<Uuid>,
    pub referral_status: Option<ReferralStatus>,
    pub referred_on: Option<OffsetDateTime>,
    pub candidate_details: Option<Json<CandidateDetails>>,
    pub resume_path: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Insert payload for the single creation query all paths share.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_super_admin: bool,
    pub onboarding_status: OnboardingStatus,
    pub created_by: Option<Uuid>,
    pub referral_code: Option<String>,
    pub referral_code_expires_at: Option<OffsetDateTime>,
    pub referred_by: Option<Uuid>,
    pub referral_status: Option<ReferralStatus>,
    pub referred_on: Option<OffsetDateTime>,
}

impl NewUser {
    /// Direct-create payload; referral fields stay empty.
    pub fn direct(
        username: String,
        email: String,
        password_hash: String,
        role: Role,
        is_super_admin: bool,
        created_by: Uuid,
    ) -> Self {
        let onboarding_status = if role == Role::JobSeeker {
            OnboardingStatus::Pending
        } else {
            OnboardingStatus::Completed
        };
        Self {
            username,
            email,
            password_hash,
            role,
            is_super_admin,
            onboarding_status,
            created_by: Some(created_by),
            referral_code: None,
            referral_code_expires_at: None,
            referred_by: None,
            referral_status: None,
            referred_on: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Role::JobSeeker).unwrap(),
            "\"job_seeker\""
        );
        assert_eq!(
            serde_json::from_str::<Role>("\"job_referrer\"").unwrap(),
            Role::JobReferrer
        );
    }

    #[test]
    fn direct_create_sets_onboarding_by_role() {
        let admin = Uuid::new_v4();
        let seeker = NewUser::direct(
            "s".into(),
            "s@x.com".into(),
            "h".into(),
            Role::JobSeeker,
            false,
            admin,
        );
        assert_eq!(seeker.onboarding_status, OnboardingStatus::Pending);

        let poster = NewUser::direct(
            "p".into(),
            "p@x.com".into(),
            "h".into(),
            Role::JobPoster,
            false,
            admin,
        );
        assert_eq!(poster.onboarding_status, OnboardingStatus::Completed);
    }

    #[test]
    fn password_hash_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "alice@x.com".into(),
            password_hash: "$argon2id$secret".into(),
            role: Role::Admin,
            is_super_admin: true,
            first_login: false,
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
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password_hash"));
    }
}
