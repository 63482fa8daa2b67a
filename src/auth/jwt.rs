use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::config::{JwtConfig, TOKEN_TTL_MINUTES};
use crate::error::AuthError;
use crate::state::AppState;
use crate::users::model::{OnboardingStatus, Role, User};

/// Signed claim set. A token is minted at login and re-minted by any
/// server-side mutation that changes a claim (password change, onboarding
/// completion), so the client's cached claims stay consistent. Stateless;
/// revocation is expiry-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub first_login: bool,
    pub is_super_admin: bool,
    pub onboarding_status: OnboardingStatus,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}

impl Claims {
    /// Routing contract every entry point honors: a `first_login` user goes
    /// to the password-change flow before anything else; a seeker who has
    /// not completed onboarding goes there next; only then role routing.
    pub fn post_login_destination(&self) -> &'static str {
        if self.first_login {
            return "/change-password";
        }
        if self.role == Role::JobSeeker && self.onboarding_status != OnboardingStatus::Completed {
            return "/seeker/onboarding";
        }
        match self.role {
            Role::Admin => "/admin/dashboard",
            Role::JobPoster => "/poster/dashboard",
            Role::JobSeeker => "/seeker/dashboard",
            Role::JobReferrer => "/referrer/dashboard",
        }
    }
}

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            issuer,
            audience,
        } = state.config.jwt.clone();
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            audience,
        }
    }
}

impl JwtKeys {
    /// Signs the user's full current claim set with the fixed 24h expiry.
    pub fn sign(&self, user: &User) -> anyhow::Result<String> {
        self.sign_with_ttl(user, TOKEN_TTL_MINUTES)
    }

    pub(crate) fn sign_with_ttl(&self, user: &User, ttl_minutes: i64) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::minutes(ttl_minutes);
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            first_login: user.first_login,
            is_super_admin: user.is_super_admin,
            onboarding_status: user.onboarding_status,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user.id, role = ?user.role, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidSignature => AuthError::SignatureInvalid,
                _ => AuthError::Malformed,
            }
        })?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(role: Role, first_login: bool, status: OnboardingStatus) -> User {
        User {
            id: Uuid::new_v4(),
            username: "candidate".into(),
            email: "candidate@example.com".into(),
            password_hash: "hash".into(),
            role,
            is_super_admin: false,
            first_login,
            onboarding_status: status,
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
        }
    }

    fn make_keys() -> JwtKeys {
        JwtKeys::from_ref(&AppState::fake())
    }

    #[tokio::test]
    async fn sign_and_verify_round_trips_the_claim_set() {
        let keys = make_keys();
        let user = sample_user(Role::JobSeeker, true, OnboardingStatus::Pending);
        let token = keys.sign(&user).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role, Role::JobSeeker);
        assert!(claims.first_login);
        assert!(!claims.is_super_admin);
        assert_eq!(claims.onboarding_status, OnboardingStatus::Pending);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
    }

    #[tokio::test]
    async fn expired_token_is_rejected_as_expired() {
        let keys = make_keys();
        let user = sample_user(Role::Admin, false, OnboardingStatus::Completed);
        let token = keys.sign_with_ttl(&user, -5).expect("sign");
        assert_eq!(keys.verify(&token), Err(AuthError::Expired));
    }

    #[tokio::test]
    async fn wrong_secret_is_rejected_as_signature_invalid() {
        let keys = make_keys();
        let other = JwtKeys {
            encoding: EncodingKey::from_secret(b"other-secret"),
            decoding: DecodingKey::from_secret(b"other-secret"),
            issuer: keys.issuer.clone(),
            audience: keys.audience.clone(),
        };
        let user = sample_user(Role::Admin, false, OnboardingStatus::Completed);
        let token = other.sign(&user).expect("sign");
        assert_eq!(keys.verify(&token), Err(AuthError::SignatureInvalid));
    }

    #[tokio::test]
    async fn garbage_token_is_rejected_as_malformed() {
        let keys = make_keys();
        assert_eq!(keys.verify("not.a.jwt"), Err(AuthError::Malformed));
    }

    #[tokio::test]
    async fn first_login_routes_before_onboarding() {
        let keys = make_keys();
        // first_login wins even for a seeker who still has onboarding to do
        let user = sample_user(Role::JobSeeker, true, OnboardingStatus::Pending);
        let token = keys.sign(&user).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.post_login_destination(), "/change-password");
    }

    #[tokio::test]
    async fn pending_seeker_routes_to_onboarding() {
        let keys = make_keys();
        let user = sample_user(Role::JobSeeker, false, OnboardingStatus::Pending);
        let token = keys.sign(&user).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.post_login_destination(), "/seeker/onboarding");
    }

    #[tokio::test]
    async fn onboarded_users_route_to_their_dashboards() {
        let keys = make_keys();
        for (role, dest) in [
            (Role::Admin, "/admin/dashboard"),
            (Role::JobPoster, "/poster/dashboard"),
            (Role::JobSeeker, "/seeker/dashboard"),
            (Role::JobReferrer, "/referrer/dashboard"),
        ] {
            let user = sample_user(role, false, OnboardingStatus::Completed);
            let claims = keys.verify(&keys.sign(&user).unwrap()).unwrap();
            assert_eq!(claims.post_login_destination(), dest);
        }
    }
}
