//! Role-set membership and ownership checks, centralized so role rules are
//! a one-place change.

use uuid::Uuid;

use crate::auth::jwt::Claims;
use crate::error::AppError;
use crate::users::model::{Role, User};

/// Role-membership check applied immediately after authentication wherever
/// an endpoint restricts by role.
pub fn require_role(claims: &Claims, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&claims.role) {
        Ok(())
    } else {
        Err(AppError::forbidden("insufficient role"))
    }
}

/// Ownership check layered on top of role membership. Admins bypass
/// unconditionally.
pub fn check_ownership(resource_owner: Uuid, claims: &Claims) -> Result<(), AppError> {
    if claims.role == Role::Admin || claims.sub == resource_owner {
        Ok(())
    } else {
        Err(AppError::forbidden("you do not own this resource"))
    }
}

/// Role-assignment hierarchy for direct creation: only a super-admin may
/// mint admins or other super-admins.
pub fn can_assign_role(actor: &Claims, role: Role, as_super_admin: bool) -> Result<(), AppError> {
    if as_super_admin && role != Role::Admin {
        return Err(AppError::validation(
            "super admin flag requires the admin role",
        ));
    }
    if as_super_admin && !actor.is_super_admin {
        return Err(AppError::forbidden(
            "only super admins can create super admins",
        ));
    }
    if !actor.is_super_admin
        && !matches!(role, Role::JobPoster | Role::JobSeeker | Role::JobReferrer)
    {
        return Err(AppError::forbidden("insufficient privileges for this role"));
    }
    Ok(())
}

/// Deletion hierarchy: no self-deletion; only a super-admin may delete a
/// super-admin (including other super-admins).
pub fn can_delete(actor: &Claims, target: &User) -> Result<(), AppError> {
    if actor.sub == target.id {
        return Err(AppError::forbidden("you cannot delete your own account"));
    }
    if target.is_super_admin && !actor.is_super_admin {
        return Err(AppError::forbidden(
            "only super administrators can delete super administrators",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::model::OnboardingStatus;
    use time::OffsetDateTime;

    fn claims(role: Role, is_super_admin: bool) -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            email: "actor@example.com".into(),
            role,
            first_login: false,
            is_super_admin,
            onboarding_status: OnboardingStatus::Completed,
            iat: 0,
            exp: usize::MAX,
            iss: "test".into(),
            aud: "test".into(),
        }
    }

    fn target(id: Uuid, is_super_admin: bool) -> User {
        User {
            id,
            username: "target".into(),
            email: "target@example.com".into(),
            password_hash: "h".into(),
            role: Role::Admin,
            is_super_admin,
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
        }
    }

    #[test]
    fn role_membership() {
        let admin = claims(Role::Admin, false);
        assert!(require_role(&admin, &[Role::Admin]).is_ok());
        assert!(require_role(&admin, &[Role::JobPoster, Role::Admin]).is_ok());
        assert!(require_role(&admin, &[Role::JobSeeker]).is_err());
    }

    #[test]
    fn owners_and_admins_pass_ownership() {
        let poster = claims(Role::JobPoster, false);
        assert!(check_ownership(poster.sub, &poster).is_ok());
        assert!(check_ownership(Uuid::new_v4(), &poster).is_err());

        let admin = claims(Role::Admin, false);
        assert!(check_ownership(Uuid::new_v4(), &admin).is_ok());
    }

    #[test]
    fn regular_admins_cannot_mint_admins() {
        let admin = claims(Role::Admin, false);
        assert!(can_assign_role(&admin, Role::JobPoster, false).is_ok());
        assert!(can_assign_role(&admin, Role::JobSeeker, false).is_ok());
        assert!(can_assign_role(&admin, Role::JobReferrer, false).is_ok());
        assert!(can_assign_role(&admin, Role::Admin, false).is_err());
        assert!(can_assign_role(&admin, Role::Admin, true).is_err());
    }

    #[test]
    fn super_admins_may_mint_anyone() {
        let root = claims(Role::Admin, true);
        assert!(can_assign_role(&root, Role::Admin, false).is_ok());
        assert!(can_assign_role(&root, Role::Admin, true).is_ok());
        assert!(can_assign_role(&root, Role::JobSeeker, false).is_ok());
    }

    #[test]
    fn super_admin_flag_requires_admin_role() {
        let root = claims(Role::Admin, true);
        assert!(can_assign_role(&root, Role::JobPoster, true).is_err());
    }

    #[test]
    fn deletion_rejects_self() {
        let admin = claims(Role::Admin, true);
        assert!(can_delete(&admin, &target(admin.sub, false)).is_err());
    }

    #[test]
    fn regular_admin_cannot_delete_super_admin() {
        let admin = claims(Role::Admin, false);
        assert!(can_delete(&admin, &target(Uuid::new_v4(), true)).is_err());
        assert!(can_delete(&admin, &target(Uuid::new_v4(), false)).is_ok());
    }

    #[test]
    fn super_admin_can_delete_other_super_admins() {
        let root = claims(Role::Admin, true);
        assert!(can_delete(&root, &target(Uuid::new_v4(), true)).is_ok());
    }
}
