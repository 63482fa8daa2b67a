use sqlx::PgPool;
use uuid::Uuid;

use crate::applications::model::{Application, ApplicationStatus, ApplicationWithPoster, Job};

impl Job {
    pub async fn create(db: &PgPool, title: &str, posted_by: Uuid) -> anyhow::Result<Job> {
        let job = sqlx::query_as::<_, Job>(
            "INSERT INTO jobs (title, posted_by) VALUES ($1, $2) \
             RETURNING id, title, posted_by, created_at",
        )
        .bind(title)
        .bind(posted_by)
        .fetch_one(db)
        .await?;
        Ok(job)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Job>> {
        let job = sqlx::query_as::<_, Job>(
            "SELECT id, title, posted_by, created_at FROM jobs WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(job)
    }
}

impl Application {
    pub async fn create(db: &PgPool, job_id: Uuid, seeker_id: Uuid) -> anyhow::Result<Application> {
        let application = sqlx::query_as::<_, Application>(
            "INSERT INTO applications (job_id, seeker_id) VALUES ($1, $2) \
             RETURNING id, job_id, seeker_id, status, created_at, updated_at",
        )
        .bind(job_id)
        .bind(seeker_id)
        .fetch_one(db)
        .await?;
        Ok(application)
    }

    /// Fetch an application together with the poster of its parent job.
    pub async fn find_with_poster(
        db: &PgPool,
        id: Uuid,
    ) -> anyhow::Result<Option<ApplicationWithPoster>> {
        let row = sqlx::query_as::<_, ApplicationWithPoster>(
            "SELECT a.id, a.job_id, a.seeker_id, a.status, a.created_at, a.updated_at, \
                    j.posted_by \
             FROM applications a \
             JOIN jobs j ON j.id = a.job_id \
             WHERE a.id = $1",
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn update_status(
        db: &PgPool,
        id: Uuid,
        status: ApplicationStatus,
    ) -> anyhow::Result<Application> {
        let application = sqlx::query_as::<_, Application>(
            "UPDATE applications SET status = $2, updated_at = now() \
             WHERE id = $1 \
             RETURNING id, job_id, seeker_id, status, created_at, updated_at",
        )
        .bind(id)
        .bind(status)
        .fetch_one(db)
        .await?;
        Ok(application)
    }
}
