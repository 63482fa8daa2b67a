use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::model::{NewUser, User};

const USER_COLUMNS: &str = "id, username, email, password_hash, role, is_super_admin, \
     first_login, onboarding_status, created_by, referral_code, referral_code_expires_at, \
     referred_by, referral_status, referred_on, candidate_details, resume_path, \
     created_at, updated_at";

impl User {
    /// Find a user by email. Callers normalize the email first.
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_referral_code(
        db: &PgPool,
        code: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE referral_code = $1"
        ))
        .bind(code)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn referral_code_exists(db: &PgPool, code: &str) -> anyhow::Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE referral_code = $1)")
                .bind(code)
                .fetch_one(db)
                .await?;
        Ok(exists)
    }

    pub async fn username_exists(db: &PgPool, username: &str) -> anyhow::Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(db)
                .await?;
        Ok(exists)
    }

    /// Single creation query shared by every path. Brand-new accounts always
    /// start with `first_login = true`; the unique indexes on email, username
    /// and referral_code are the authoritative tie-break under concurrency.
    pub async fn create(db: &PgPool, new: NewUser) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, password_hash, role, is_super_admin, \
             first_login, onboarding_status, created_by, referral_code, \
             referral_code_expires_at, referred_by, referral_status, referred_on) \
             VALUES ($1, $2, $3, $4, $5, true, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(new.username)
        .bind(new.email)
        .bind(new.password_hash)
        .bind(new.role)
        .bind(new.is_super_admin)
        .bind(new.onboarding_status)
        .bind(new.created_by)
        .bind(new.referral_code)
        .bind(new.referral_code_expires_at)
        .bind(new.referred_by)
        .bind(new.referral_status)
        .bind(new.referred_on)
        .fetch_one(db)
        .await
    }

    /// The only path that clears `first_login` explicitly; onboarding status
    /// is untouched here.
    pub async fn update_password(db: &PgPool, id: Uuid, hash: &str) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET password_hash = $2, first_login = false, updated_at = now() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(hash)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Onboarding completion: persists the profile, records the resume path,
    /// and converges on the ready state (`completed` + `first_login = false`).
    /// A referred seeker also flips to `onboarding_complete`.
    pub async fn complete_onboarding(
        db: &PgPool,
        id: Uuid,
        details: sqlx::types::Json<crate::users::model::CandidateDetails>,
        resume_path: &str,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET candidate_details = $2, resume_path = $3, \
             onboarding_status = 'completed', first_login = false, \
             referral_status = CASE WHEN referred_by IS NOT NULL \
                 THEN 'onboarding_complete'::referral_status ELSE referral_status END, \
             updated_at = now() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(details)
        .bind(resume_path)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Converts/re-arms an existing account for the referral path: force
    /// job_seeker, reset lifecycle flags, install a fresh code. Resets state
    /// on purpose; see the referral flow contract.
    pub async fn rearm_referral(
        db: &PgPool,
        id: Uuid,
        code: &str,
        expires_at: OffsetDateTime,
        referred_by: Option<Uuid>,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET role = 'job_seeker', first_login = true, \
             onboarding_status = 'pending', referral_code = $2, \
             referral_code_expires_at = $3, \
             referred_by = COALESCE($4, referred_by), \
             referral_status = CASE WHEN $4 IS NOT NULL \
                 THEN 'pending_onboarding'::referral_status ELSE referral_status END, \
             referred_on = CASE WHEN $4 IS NOT NULL THEN now() ELSE referred_on END, \
             updated_at = now() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(code)
        .bind(expires_at)
        .bind(referred_by)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// Login implicitly touches `updated_at`.
    pub async fn touch(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Hard delete. Returns whether a row was removed.
    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Admin listing. `created_by = None` means the unfiltered set (only a
    /// super-admin may request that); `search` matches email/username
    /// substrings case-insensitively.
    pub async fn list(
        db: &PgPool,
        created_by: Option<Uuid>,
        search: Option<&str>,
    ) -> anyhow::Result<Vec<User>> {
        let pattern = search.map(|s| format!("%{}%", s));
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE ($1::uuid IS NULL OR created_by = $1) \
               AND ($2::text IS NULL OR email ILIKE $2 OR username ILIKE $2) \
             ORDER BY created_at DESC"
        ))
        .bind(created_by)
        .bind(pattern)
        .fetch_all(db)
        .await?;
        Ok(users)
    }
}
