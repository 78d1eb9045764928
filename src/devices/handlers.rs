use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::devices::dto::{CreateDeviceRequest, DeleteDeviceRequest, DeviceResponse};
use crate::devices::repo;
use crate::error::ApiError;
use crate::extract::{AppJson, Lang};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/devices", post(create_device).delete(delete_device))
        .route("/devices/:user_login", get(list_user_devices))
}

#[instrument(skip(state))]
pub async fn list_user_devices(
    State(state): State<AppState>,
    Lang(locale): Lang,
    Path(user_login): Path<String>,
) -> Result<Json<Vec<DeviceResponse>>, ApiError> {
    let devices = repo::list_by_user_login(&state.db, &user_login)
        .await
        .map_err(|e| e.localized(locale))?;
    Ok(Json(devices.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, payload), fields(user_login = %payload.user_login, name = %payload.name))]
pub async fn create_device(
    State(state): State<AppState>,
    Lang(locale): Lang,
    AppJson(payload): AppJson<CreateDeviceRequest>,
) -> Result<(StatusCode, Json<DeviceResponse>), ApiError> {
    let device = repo::create(&state.db, &payload.user_login, &payload.name)
        .await
        .map_err(|e| e.localized(locale))?;
    info!(device_id = device.id, "device created");
    Ok((StatusCode::CREATED, Json(device.into())))
}

#[instrument(skip(state, payload), fields(user_login = %payload.user_login, name = %payload.name))]
pub async fn delete_device(
    State(state): State<AppState>,
    Lang(locale): Lang,
    AppJson(payload): AppJson<DeleteDeviceRequest>,
) -> Result<StatusCode, ApiError> {
    repo::delete_from_user(&state.db, &payload.user_login, &payload.name)
        .await
        .map_err(|e| e.localized(locale))?;
    info!("device deleted");
    Ok(StatusCode::NO_CONTENT)
}
