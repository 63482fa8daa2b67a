use sqlx::PgPool;
use time::{Duration, OffsetDateTime};
use tracing::info;

use crate::{
    auth::{is_valid_email, jwt::Claims, password::hash_password},
    config::REFERRAL_CODE_VALIDITY_DAYS,
    email::{send_best_effort, EmailMessage},
    error::{conflict_on_unique, AppError},
    referrals::code::{generate_code, temp_password, REFERRAL_CODE_LEN},
    state::AppState,
    users::model::{NewUser, OnboardingStatus, ReferralStatus, Role, User},
};

pub struct IssuedCode {
    pub user: User,
    pub code: String,
    pub expires_at: OffsetDateTime,
    pub is_new_user: bool,
    temp_password: Option<String>,
}

/// Issues an onboarding code for a candidate email, shared by the admin and
/// referrer endpoints (`referred_by` is set only on the referrer path).
///
/// New email: creates a placeholder job_seeker on a temporary password.
/// Existing email: converts/re-arms the account — forces job_seeker, resets
/// `first_login` and onboarding to pending, installs a fresh code. The
/// reset of an existing account's state is intentional behavior, not an
/// accident.
pub async fn issue_code(
    state: &AppState,
    actor: &Claims,
    candidate_email: &str,
) -> Result<IssuedCode, AppError> {
    let email = candidate_email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(AppError::validation("valid candidate email is required"));
    }

    let referred_by = (actor.role == Role::JobReferrer).then_some(actor.sub);
    let code = unique_code(&state.db).await?;
    let expires_at = OffsetDateTime::now_utc() + Duration::days(REFERRAL_CODE_VALIDITY_DAYS);

    let issued = match User::find_by_email(&state.db, &email).await? {
        Some(existing) => {
            let user =
                User::rearm_referral(&state.db, existing.id, &code, expires_at, referred_by)
                    .await?;
            info!(user_id = %user.id, "re-armed existing user with fresh referral code");
            IssuedCode {
                user,
                code,
                expires_at,
                is_new_user: false,
                temp_password: None,
            }
        }
        None => {
            let username = unique_username(&state.db, &email).await?;
            let password = temp_password();
            let hash = hash_password(&password)?;
            let user = User::create(
                &state.db,
                NewUser {
                    username,
                    email: email.clone(),
                    password_hash: hash,
                    role: Role::JobSeeker,
                    is_super_admin: false,
                    onboarding_status: OnboardingStatus::Pending,
                    created_by: Some(actor.sub),
                    referral_code: Some(code.clone()),
                    referral_code_expires_at: Some(expires_at),
                    referred_by,
                    referral_status: referred_by.map(|_| ReferralStatus::PendingOnboarding),
                    referred_on: referred_by.map(|_| OffsetDateTime::now_utc()),
                },
            )
            .await
            .map_err(|e| conflict_on_unique(e, "a user with this email already exists"))?;
            info!(user_id = %user.id, "created placeholder job_seeker for referral code");
            IssuedCode {
                user,
                code,
                expires_at,
                is_new_user: true,
                temp_password: Some(password),
            }
        }
    };

    notify_candidate(state, &issued).await;
    Ok(issued)
}

/// Retry-until-unique against the store. The loop, not the alphabet size,
/// is the correctness mechanism; concurrent generation of the same code is
/// a known benign race resolved by the unique index at insert time.
async fn unique_code(db: &PgPool) -> anyhow::Result<String> {
    loop {
        let code = generate_code(REFERRAL_CODE_LEN);
        if !User::referral_code_exists(db, &code).await? {
            return Ok(code);
        }
    }
}

/// Username derived from the email local part, de-duplicated with a numeric
/// suffix.
async fn unique_username(db: &PgPool, email: &str) -> anyhow::Result<String> {
    let base: String = email
        .split('@')
        .next()
        .unwrap_or(email)
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    let base = if base.is_empty() {
        "candidate".to_string()
    } else {
        base
    };

    let mut candidate = base.clone();
    let mut n = 0u32;
    while User::username_exists(db, &candidate).await? {
        n += 1;
        candidate = format!("{base}{n}");
    }
    Ok(candidate)
}

async fn notify_candidate(state: &AppState, issued: &IssuedCode) {
    let login_url = format!("{}/login", state.config.base_url);
    let password_line = issued
        .temp_password
        .as_deref()
        .map(|p| format!("Your temporary password is: {p}\n\n"))
        .unwrap_or_default();
    let password_html = issued
        .temp_password
        .as_deref()
        .map(|p| {
            format!(
                "<p>Your temporary password is: <strong>{p}</strong> \
                 (you will be prompted to change it on first login).</p>"
            )
        })
        .unwrap_or_default();

    send_best_effort(
        state.mailer.as_ref(),
        EmailMessage {
            to: issued.user.email.clone(),
            subject: "Your job portal access code".into(),
            text: format!(
                "Hello {},\n\nAn access code has been generated for you.\n\n\
                 Your access code: {}\n\nThis code is valid for {} days. \
                 Use it to log in and complete your profile: {}\n\n{}Thank you!",
                issued.user.username,
                issued.code,
                REFERRAL_CODE_VALIDITY_DAYS,
                login_url,
                password_line,
            ),
            html: format!(
                "<p>Hello <strong>{}</strong>,</p>\
                 <p>An access code has been generated for you.</p>\
                 <p>Your access code: <strong>{}</strong></p>\
                 <p>This code is valid for {} days. \
                 Please use it to <a href=\"{}\">log in</a> and complete your profile.</p>{}",
                issued.user.username,
                issued.code,
                REFERRAL_CODE_VALIDITY_DAYS,
                login_url,
                password_html,
            ),
        },
    )
    .await;
}
