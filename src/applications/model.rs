use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Reviewed,
    Interview,
    Accepted,
    Rejected,
}

impl FromStr for ApplicationStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "reviewed" => Ok(Self::Reviewed),
            "interview" => Ok(Self::Interview),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            _ => Err(()),
        }
    }
}

/// Job posting. Only the slice the ownership gate needs: `posted_by` is the
/// job_poster whose ownership controls application mutations.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub posted_by: Uuid,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub seeker_id: Uuid,
    pub status: ApplicationStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// An application joined with its job's poster, for ownership checks.
#[derive(Debug, Clone, FromRow)]
pub struct ApplicationWithPoster {
    pub id: Uuid,
    pub job_id: Uuid,
    pub seeker_id: Uuid,
    pub status: ApplicationStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub posted_by: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_the_closed_set_only() {
        assert_eq!(
            "interview".parse::<ApplicationStatus>(),
            Ok(ApplicationStatus::Interview)
        );
        assert!("archived".parse::<ApplicationStatus>().is_err());
        assert!("Pending".parse::<ApplicationStatus>().is_err());
    }
}
