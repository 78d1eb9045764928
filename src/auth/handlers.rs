use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::auth::dto::{AuthRequest, TokenResponse};
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{ApiError, ErrorKind};
use crate::extract::{AppJson, Lang};
use crate::state::AppState;
use crate::users;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

#[instrument(skip(state, payload), fields(login = %payload.login))]
pub async fn register(
    State(state): State<AppState>,
    Lang(locale): Lang,
    AppJson(payload): AppJson<AuthRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    if users::repo::find_by_login(&state.db, &payload.login)
        .await
        .map_err(|e| e.localized(locale))?
        .is_some()
    {
        warn!("login already taken");
        return Err(ErrorKind::AlreadyExists.localized(locale));
    }

    let hash = hash_password(&payload.password)
        .map_err(|e| ErrorKind::Internal(e).localized(locale))?;
    let user = users::repo::create(&state.db, &payload.login, &hash)
        .await
        .map_err(|e| e.localized(locale))?;

    let token = JwtKeys::from_ref(&state)
        .sign(&user.login)
        .map_err(|e| ErrorKind::Internal(e).localized(locale))?;

    info!(user_id = user.id, "user registered");
    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

#[instrument(skip(state, payload), fields(login = %payload.login))]
pub async fn login(
    State(state): State<AppState>,
    Lang(locale): Lang,
    AppJson(payload): AppJson<AuthRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = users::repo::find_by_login(&state.db, &payload.login)
        .await
        .map_err(|e| e.localized(locale))?
        .ok_or_else(|| {
            warn!("login with unknown login");
            ErrorKind::InvalidCredentials.localized(locale)
        })?;

    let ok = verify_password(&payload.password, &user.password_hash)
        .map_err(|e| ErrorKind::Internal(e).localized(locale))?;
    if !ok {
        warn!(user_id = user.id, "invalid password");
        return Err(ErrorKind::InvalidCredentials.localized(locale));
    }

    let token = JwtKeys::from_ref(&state)
        .sign(&user.login)
        .map_err(|e| ErrorKind::Internal(e).localized(locale))?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(TokenResponse { token }))
}
