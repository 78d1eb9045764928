use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::extract::{AppJson, Lang};
use crate::lamps::dto::{CreateLampRequest, DeleteLampRequest, EditLampRequest, LampResponse};
use crate::lamps::repo;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/lamps",
            get(list_lamps)
                .post(create_lamp)
                .patch(edit_lamp)
                .delete(delete_lamp),
        )
        .route("/lamps/:device_id", get(list_device_lamps))
}

#[instrument(skip(state))]
pub async fn list_lamps(
    State(state): State<AppState>,
    Lang(locale): Lang,
) -> Result<Json<Vec<LampResponse>>, ApiError> {
    let lamps = repo::list_all(&state.db)
        .await
        .map_err(|e| e.localized(locale))?;
    Ok(Json(lamps.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state))]
pub async fn list_device_lamps(
    State(state): State<AppState>,
    Lang(locale): Lang,
    Path(device_id): Path<i64>,
) -> Result<Json<Vec<LampResponse>>, ApiError> {
    let lamps = repo::list_by_device(&state.db, device_id)
        .await
        .map_err(|e| e.localized(locale))?;
    Ok(Json(lamps.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, payload), fields(device_id = payload.device_id, name = %payload.name))]
pub async fn create_lamp(
    State(state): State<AppState>,
    Lang(locale): Lang,
    AppJson(payload): AppJson<CreateLampRequest>,
) -> Result<(StatusCode, Json<LampResponse>), ApiError> {
    let lamp = repo::create(&state.db, payload.device_id, &payload.name, payload.light_level)
        .await
        .map_err(|e| e.localized(locale))?;
    info!(lamp_id = lamp.id, "lamp attached");
    Ok((StatusCode::CREATED, Json(lamp.into())))
}

// 201 on PATCH mirrors the documented interface.
#[instrument(skip(state, payload), fields(device_id = payload.device_id, name = %payload.name))]
pub async fn edit_lamp(
    State(state): State<AppState>,
    Lang(locale): Lang,
    AppJson(payload): AppJson<EditLampRequest>,
) -> Result<(StatusCode, Json<LampResponse>), ApiError> {
    let lamp = repo::set_light_level(
        &state.db,
        payload.device_id,
        &payload.name,
        payload.new_value,
    )
    .await
    .map_err(|e| e.localized(locale))?;
    info!(lamp_id = lamp.id, light_level = lamp.light_level, "lamp edited");
    Ok((StatusCode::CREATED, Json(lamp.into())))
}

#[instrument(skip(state, payload), fields(device_id = payload.device_id, name = %payload.name))]
pub async fn delete_lamp(
    State(state): State<AppState>,
    Lang(locale): Lang,
    AppJson(payload): AppJson<DeleteLampRequest>,
) -> Result<StatusCode, ApiError> {
    repo::delete_from_device(&state.db, payload.device_id, &payload.name)
        .await
        .map_err(|e| e.localized(locale))?;
    info!("lamp detached");
    Ok(StatusCode::NO_CONTENT)
}
