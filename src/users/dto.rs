use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::users::model::Role;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub is_super_admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    /// Super-admins may request the unfiltered set with `all=true`.
    #[serde(default)]
    pub all: bool,
    pub search: Option<String>,
    /// Super-admins may scope the listing to another admin's creations.
    #[serde(rename = "createdBy")]
    pub created_by: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_request_parses_camel_case() {
        let req: CreateUserRequest =
            serde_json::from_str(r#"{"email":"p@x.com","role":"job_poster"}"#).unwrap();
        assert_eq!(req.role, Role::JobPoster);
        assert!(!req.is_super_admin);

        let req: CreateUserRequest = serde_json::from_str(
            r#"{"email":"a@x.com","role":"admin","isSuperAdmin":true}"#,
        )
        .unwrap();
        assert!(req.is_super_admin);
    }

    #[test]
    fn list_query_parses_created_by() {
        let owner = Uuid::new_v4();
        let q: ListUsersQuery =
            serde_json::from_str(&format!(r#"{{"createdBy":"{owner}"}}"#)).unwrap();
        assert_eq!(q.created_by, Some(owner));
        assert!(!q.all);

        let q: ListUsersQuery = serde_json::from_str(r#"{"all":true}"#).unwrap();
        assert_eq!(q.created_by, None);
        assert!(q.all);
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(
            serde_json::from_str::<CreateUserRequest>(r#"{"email":"x@x.com","role":"root"}"#)
                .is_err()
        );
    }
}
