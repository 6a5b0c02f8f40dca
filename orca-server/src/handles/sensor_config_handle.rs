use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde_json::json;

use orca_api::{SensorConfigPayload, SensorConfigView, SensorConfigsResponse};

use crate::configs::Storage;
use crate::errors::{AccessError, ApiError, DeviceError, IngestError};
use crate::middlewares::Principal;
use crate::models::SensorConfig;
use crate::models::sensor_config::{DATA_TYPE_LOOP, DATA_TYPE_REAL};
use crate::repositories::{DeviceRepository, SensorConfigRepository};
use crate::services::AccessService;

#[derive(Clone)]
pub struct SensorConfigState {
    pub storage: Arc<Storage>,
    pub access_service: Arc<AccessService>,
}

async fn require_device_access(
    state: &SensorConfigState,
    principal: &Principal,
    device_id: i32,
) -> Result<(), ApiError> {
    DeviceRepository::new(state.storage.clone())
        .find_by_id(device_id)
        .await?
        .ok_or(DeviceError::DeviceNotFound)?;

    if !state
        .access_service
        .has_access_to_device(principal.user_id, device_id)
        .await?
    {
        return Err(AccessError::AccessDenied.into());
    }

    Ok(())
}

fn view(config: SensorConfig) -> SensorConfigView {
    SensorConfigView {
        device_id: config.device_id,
        log_key: config.log_key,
        config: SensorConfigPayload {
            data_type: config.data_type,
            zero_value: Some(config.zero_value),
            span_value: Some(config.span_value),
            unit: config.unit,
            decimals: Some(config.decimals),
            min_alarm: config.min_alarm,
            max_alarm: config.max_alarm,
            alarm_enabled: config.alarm_enabled,
            label: config.label,
        },
    }
}

pub async fn get_sensor_configs(
    Extension(principal): Extension<Principal>,
    Path(device_id): Path<i32>,
    State(state): State<SensorConfigState>,
) -> Result<impl IntoResponse, ApiError> {
    require_device_access(&state, &principal, device_id).await?;

    let configs = SensorConfigRepository::new(state.storage.clone())
        .find_by_device_id(device_id)
        .await?;

    Ok(Json(SensorConfigsResponse {
        success: true,
        configs: configs.into_iter().map(view).collect(),
    }))
}

pub async fn upsert_sensor_config(
    Extension(principal): Extension<Principal>,
    Path((device_id, log_key)): Path<(i32, String)>,
    State(state): State<SensorConfigState>,
    Json(payload): Json<SensorConfigPayload>,
) -> Result<impl IntoResponse, ApiError> {
    require_device_access(&state, &principal, device_id).await?;

    if payload.data_type != DATA_TYPE_LOOP && payload.data_type != DATA_TYPE_REAL {
        return Err(IngestError::InvalidPayload("Unsupported data_type").into());
    }
    if log_key.is_empty() {
        return Err(IngestError::InvalidPayload("Log key is required").into());
    }

    let config = SensorConfig {
        id: 0,
        device_id,
        log_key,
        data_type: payload.data_type,
        zero_value: payload.zero_value.unwrap_or(0.0),
        span_value: payload.span_value.unwrap_or(100.0),
        unit: payload.unit,
        decimals: payload.decimals.unwrap_or(2),
        min_alarm: payload.min_alarm,
        max_alarm: payload.max_alarm,
        alarm_enabled: payload.alarm_enabled,
        label: payload.label,
    };

    SensorConfigRepository::new(state.storage.clone())
        .upsert(&config)
        .await?;

    Ok(Json(json!({ "success": true })))
}

pub async fn delete_sensor_config(
    Extension(principal): Extension<Principal>,
    Path((device_id, log_key)): Path<(i32, String)>,
    State(state): State<SensorConfigState>,
) -> Result<impl IntoResponse, ApiError> {
    require_device_access(&state, &principal, device_id).await?;

    let deleted = SensorConfigRepository::new(state.storage.clone())
        .delete(device_id, &log_key)
        .await?;
    if !deleted {
        return Ok((StatusCode::NOT_FOUND, Json(json!({ "success": false }))));
    }

    Ok((StatusCode::OK, Json(json!({ "success": true }))))
}
