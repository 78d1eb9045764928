use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::auth::CurrentUser;
use crate::error::{ApiError, ErrorKind};
use crate::extract::Lang;
use crate::role::Role;
use crate::state::AppState;
use crate::users::dto::UserResponse;
use crate::users::repo;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:login", get(get_user).delete(delete_user))
        .route("/users/:login/roles", post(add_role).delete(remove_role))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Lang(locale): Lang,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = repo::list_all(&state.db)
        .await
        .map_err(|e| e.localized(locale))?;
    let mut out = Vec::with_capacity(users.len());
    for user in users {
        let roles = repo::roles_of(&state.db, user.id)
            .await
            .map_err(|e| e.localized(locale))?;
        out.push(UserResponse::from_parts(user, roles));
    }
    Ok(Json(out))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Lang(locale): Lang,
    Path(login): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = repo::get_by_login(&state.db, &login)
        .await
        .map_err(|e| e.localized(locale))?;
    let roles = repo::roles_of(&state.db, user.id)
        .await
        .map_err(|e| e.localized(locale))?;
    Ok(Json(UserResponse::from_parts(user, roles)))
}

/// Role name arrives as a raw text body, not JSON.
#[instrument(skip(state, role_name))]
pub async fn add_role(
    State(state): State<AppState>,
    Lang(locale): Lang,
    Path(login): Path<String>,
    role_name: String,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let role = parse_role(&role_name).map_err(|e| e.localized(locale))?;
    let (user, roles) = repo::add_role(&state.db, &login, role)
        .await
        .map_err(|e| e.localized(locale))?;
    info!(%login, %role, "role granted");
    Ok((
        StatusCode::CREATED,
        Json(UserResponse::from_parts(user, roles)),
    ))
}

#[instrument(skip(state, role_name))]
pub async fn remove_role(
    State(state): State<AppState>,
    Lang(locale): Lang,
    Path(login): Path<String>,
    role_name: String,
) -> Result<Json<UserResponse>, ApiError> {
    let role = parse_role(&role_name).map_err(|e| e.localized(locale))?;
    let (user, roles) = repo::remove_role(&state.db, &login, role)
        .await
        .map_err(|e| e.localized(locale))?;
    info!(%login, %role, "role revoked");
    Ok(Json(UserResponse::from_parts(user, roles)))
}

/// The route policy already demands ADMIN for `/users/**`; the service-level
/// re-check on the caller principal is kept from the original contract.
#[instrument(skip(state, caller), fields(caller = %caller.login))]
pub async fn delete_user(
    State(state): State<AppState>,
    Lang(locale): Lang,
    caller: CurrentUser,
    Path(login): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !caller.has_role(Role::Admin) {
        warn!(%login, "non-admin attempted user deletion");
        return Err(ErrorKind::Forbidden.localized(locale));
    }
    repo::delete_by_login(&state.db, &login)
        .await
        .map_err(|e| e.localized(locale))?;
    info!(%login, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn parse_role(raw: &str) -> Result<Role, ErrorKind> {
    raw.trim().parse().map_err(|_| ErrorKind::UnprocessableBody)
}

#[cfg(test)]
mod tests {
    use axum::response::IntoResponse;

    use super::*;
    use crate::i18n::Locale;

    #[tokio::test]
    async fn delete_user_rejects_non_admin_caller() {
        // The role check fires before any query, so a lazy pool suffices.
        let caller = CurrentUser {
            id: 1,
            login: "tech".into(),
            roles: vec![Role::Technician],
        };
        let err = delete_user(
            State(AppState::fake()),
            Lang(Locale::En),
            caller,
            Path("alice".into()),
        )
        .await
        .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn parse_role_trims_and_validates() {
        assert_eq!(parse_role("ADMIN").unwrap(), Role::Admin);
        assert_eq!(parse_role(" TECHNICIAN\n").unwrap(), Role::Technician);
        assert!(matches!(
            parse_role("SUPERUSER"),
            Err(ErrorKind::UnprocessableBody)
        ));
    }
}
