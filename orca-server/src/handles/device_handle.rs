use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;
use time::{Duration, OffsetDateTime};

use orca_api::{
    DeviceLogRow, DeviceLogsResponse, DeviceStatus, DevicesStatusResponse, LastUpdateResponse,
    ReadingStatus,
};

use crate::configs::Storage;
use crate::errors::{AccessError, ApiError, DeviceError};
use crate::middlewares::Principal;
use crate::repositories::{DeviceLogRepository, DeviceRepository};
use crate::services::{AccessService, liveness};

#[derive(Clone)]
pub struct DeviceState {
    pub storage: Arc<Storage>,
    pub access_service: Arc<AccessService>,
}

#[derive(Debug, Deserialize)]
pub struct DevicesStatusQuery {
    /// Comma-separated device ids
    pub device_ids: Option<String>,
    pub company_id: Option<i32>,
}

/// Bulk liveness for an explicit id list or a whole company, filtered to
/// the devices the caller can see. Liveness is derived here, at query
/// time, from each device's heartbeat.
pub async fn get_devices_status(
    Extension(principal): Extension<Principal>,
    Query(query): Query<DevicesStatusQuery>,
    State(state): State<DeviceState>,
) -> Result<impl IntoResponse, ApiError> {
    let devices = DeviceRepository::new(state.storage.clone());

    let mut candidates = Vec::new();
    if let Some(ids) = &query.device_ids {
        let ids: Vec<i32> = ids.split(',').filter_map(|id| id.trim().parse().ok()).collect();
        candidates = devices.find_by_ids(&ids).await?;
    } else if let Some(company_id) = query.company_id {
        if !state
            .access_service
            .has_access_to_company(principal.user_id, company_id)
            .await?
        {
            return Err(AccessError::AccessDenied.into());
        }
        candidates = devices.find_by_company_id(company_id).await?;
    }

    let now = OffsetDateTime::now_utc();
    let mut statuses = Vec::new();
    for device in candidates {
        if !state
            .access_service
            .has_access_to_device(principal.user_id, device.id)
            .await?
        {
            continue;
        }

        statuses.push(DeviceStatus {
            id: device.id,
            is_online: liveness::is_online(device.last_seen_at, now),
            last_seen_at: device.last_seen_at,
            seconds_ago: liveness::seconds_ago(device.last_seen_at, now),
        });
    }

    Ok(Json(DevicesStatusResponse {
        success: true,
        devices: statuses,
    }))
}

#[derive(Debug, Deserialize)]
pub struct LastUpdateQuery {
    pub key: Option<String>,
}

pub async fn get_device_last_update(
    Extension(principal): Extension<Principal>,
    Path(device_id): Path<i32>,
    Query(query): Query<LastUpdateQuery>,
    State(state): State<DeviceState>,
) -> Result<impl IntoResponse, ApiError> {
    if !state
        .access_service
        .has_access_to_device(principal.user_id, device_id)
        .await?
    {
        return Err(AccessError::AccessDenied.into());
    }

    DeviceRepository::new(state.storage.clone())
        .find_by_id(device_id)
        .await?
        .ok_or(DeviceError::DeviceNotFound)?;

    let latest = DeviceLogRepository::new(state.storage.clone())
        .latest_for_device(device_id, query.key.as_deref())
        .await?;

    let now = OffsetDateTime::now_utc();
    let logged_at = latest.map(|log| log.logged_at);

    Ok(Json(LastUpdateResponse {
        success: true,
        device_id,
        log_key: query.key,
        logged_at,
        seconds_ago: liveness::seconds_ago(logged_at, now),
    }))
}

#[derive(Debug, Deserialize)]
pub struct DeviceLogsQuery {
    pub from: Option<OffsetDateTime>,
    pub to: Option<OffsetDateTime>,
    pub key: Option<String>,
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: i64,
}

/// Windowed reading history for one device, newest first, allow-list
/// filtered. Defaults to the trailing 24 hours.
pub async fn get_device_logs(
    Extension(principal): Extension<Principal>,
    Path(device_id): Path<i32>,
    Query(query): Query<DeviceLogsQuery>,
    State(state): State<DeviceState>,
) -> Result<impl IntoResponse, ApiError> {
    if !state
        .access_service
        .has_access_to_device(principal.user_id, device_id)
        .await?
    {
        return Err(AccessError::AccessDenied.into());
    }

    if let Some(key) = &query.key {
        if !state
            .access_service
            .has_access_to_sensor(principal.user_id, device_id, key)
            .await?
        {
            return Err(AccessError::AccessDenied.into());
        }
    }

    let now = OffsetDateTime::now_utc();
    let from = query.from.unwrap_or(now - Duration::hours(24));
    let to = query.to.unwrap_or(now);

    let repo = DeviceLogRepository::new(state.storage.clone());
    let total = repo
        .count_in_range_for_device(device_id, query.key.as_deref(), from, to)
        .await?;
    let rows = repo
        .find_in_range_for_device(
            device_id,
            query.key.as_deref(),
            from,
            to,
            query.limit,
            query.offset,
        )
        .await?;

    let visible = state
        .access_service
        .filter_logs_by_access(principal.user_id, device_id, rows)
        .await?;

    let logs = visible
        .into_iter()
        .map(|log| DeviceLogRow {
            id: log.id,
            log_key: log.log_key,
            log_value: log.log_value,
            status: log.status.parse().unwrap_or(ReadingStatus::Normal),
            logged_at: log.logged_at,
        })
        .collect();

    Ok(Json(DeviceLogsResponse {
        success: true,
        logs,
        total,
    }))
}
