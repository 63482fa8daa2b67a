use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::PublicUser,
        extractors::AuthUser,
        gate,
        is_valid_email,
        jwt::Claims,
        password::hash_password,
    },
    email::{send_best_effort, EmailMessage},
    error::{conflict_on_unique, AppError},
    referrals::code::temp_password,
    state::AppState,
    users::{
        dto::{CreateUserRequest, ListUsersQuery, MessageResponse},
        model::{NewUser, Role, User},
    },
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/create-user", post(create_user))
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id", axum::routing::delete(delete_user))
}

/// Admin direct-create. The account starts on a temporary password with
/// `first_login = true`; seekers additionally owe onboarding.
#[instrument(skip(state, claims, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(mut payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<PublicUser>), AppError> {
    gate::require_role(&claims, &[Role::Admin])?;

    payload.email = payload.email.trim().to_lowercase();
    if !is_valid_email(&payload.email) {
        return Err(AppError::validation("invalid email format"));
    }
    gate::can_assign_role(&claims, payload.role, payload.is_super_admin)?;

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "create-user duplicate email");
        return Err(AppError::Conflict("email already in use".into()));
    }

    let username = payload
        .email
        .split('@')
        .next()
        .unwrap_or(&payload.email)
        .to_string();
    let password = temp_password();
    let hash = hash_password(&password)?;

    let user = User::create(
        &state.db,
        NewUser::direct(
            username.clone(),
            payload.email.clone(),
            hash,
            payload.role,
            payload.is_super_admin,
            claims.sub,
        ),
    )
    .await
    .map_err(|e| conflict_on_unique(e, "email or username already in use"))?;

    send_best_effort(
        state.mailer.as_ref(),
        EmailMessage {
            to: user.email.clone(),
            subject: "Your new account".into(),
            text: format!(
                "Username: {username}\nTemporary password: {password}\n\
                 Please change your password after first login.",
            ),
            html: format!(
                "<p>Welcome to our platform!</p>\
                 <p>Username: <strong>{username}</strong></p>\
                 <p>Temporary password: <strong>{password}</strong></p>\
                 <p>Please change your password after first login.</p>",
            ),
        },
    )
    .await;

    info!(user_id = %user.id, role = ?user.role, created_by = %claims.sub, "user created");
    Ok((StatusCode::CREATED, Json(PublicUser::from(&user))))
}

#[instrument(skip(state, claims))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    gate::require_role(&claims, &[Role::Admin])?;

    let target = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::not_found("user not found"))?;

    gate::can_delete(&claims, &target)?;

    if !User::delete(&state.db, id).await? {
        // Deleted concurrently between the lookup and the delete.
        return Err(AppError::not_found("user not found"));
    }

    info!(target = %id, acting_admin = %claims.sub, "user deleted");
    Ok(Json(MessageResponse {
        message: "user deleted".into(),
    }))
}

/// A non-super-admin only ever sees users they created; a super-admin may
/// scope to another admin with `createdBy` or ask for everyone with
/// `all=true`.
#[instrument(skip(state, claims))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<PublicUser>>, AppError> {
    gate::require_role(&claims, &[Role::Admin])?;

    let scope = listing_scope(&claims, &query);

    let users = User::list(&state.db, scope, query.search.as_deref()).await?;
    Ok(Json(users.iter().map(PublicUser::from).collect()))
}

/// `None` means the unfiltered set. Non-super-admins stay pinned to their
/// own creations regardless of what the query asks for; `createdBy` wins
/// over `all` when a super-admin sends both.
fn listing_scope(claims: &Claims, query: &ListUsersQuery) -> Option<Uuid> {
    if !claims.is_super_admin {
        return Some(claims.sub);
    }
    if let Some(owner) = query.created_by {
        return Some(owner);
    }
    if query.all {
        None
    } else {
        Some(claims.sub)
    }
}
