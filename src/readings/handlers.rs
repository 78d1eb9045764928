use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::extract::{AppJson, Lang};
use crate::readings::dto::{CreateReadingRequest, ReadingResponse};
use crate::readings::repo;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/readings", post(create_reading))
        .route("/readings/:device_id", get(list_device_readings))
        .route("/readings/warnings/:user_login", get(list_user_warnings))
}

#[instrument(skip(state))]
pub async fn list_device_readings(
    State(state): State<AppState>,
    Lang(locale): Lang,
    Path(device_id): Path<i64>,
) -> Result<Json<Vec<ReadingResponse>>, ApiError> {
    let readings = repo::list_by_device(&state.db, device_id)
        .await
        .map_err(|e| e.localized(locale))?;
    Ok(Json(readings.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state))]
pub async fn list_user_warnings(
    State(state): State<AppState>,
    Lang(locale): Lang,
    Path(user_login): Path<String>,
) -> Result<Json<Vec<ReadingResponse>>, ApiError> {
    let readings = repo::warnings_by_user(&state.db, &user_login)
        .await
        .map_err(|e| e.localized(locale))?;
    Ok(Json(readings.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, payload), fields(device_id = payload.device_id, name = %payload.name))]
pub async fn create_reading(
    State(state): State<AppState>,
    Lang(locale): Lang,
    AppJson(payload): AppJson<CreateReadingRequest>,
) -> Result<(StatusCode, Json<ReadingResponse>), ApiError> {
    let reading = repo::create(
        &state.db,
        payload.device_id,
        &payload.name,
        payload.value,
        payload.is_warning,
    )
    .await
    .map_err(|e| e.localized(locale))?;
    info!(reading_id = reading.id, is_warning = reading.is_warning, "reading recorded");
    Ok((StatusCode::CREATED, Json(reading.into())))
}
