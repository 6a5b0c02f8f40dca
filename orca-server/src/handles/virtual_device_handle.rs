use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;
use time::{Duration, OffsetDateTime};

use orca_api::VirtualDeviceLogsResponse;

use crate::errors::{AccessError, ApiError};
use crate::middlewares::Principal;
use crate::services::{AccessService, VirtualDeviceService};

#[derive(Clone)]
pub struct VirtualDeviceState {
    pub virtual_device_service: Arc<VirtualDeviceService>,
    pub access_service: Arc<AccessService>,
}

async fn require_access(
    state: &VirtualDeviceState,
    principal: &Principal,
    virtual_device_id: i32,
) -> Result<(), ApiError> {
    if !state
        .access_service
        .has_access_to_virtual_device(principal.user_id, virtual_device_id)
        .await?
    {
        return Err(AccessError::AccessDenied.into());
    }

    Ok(())
}

pub async fn get_virtual_device(
    Extension(principal): Extension<Principal>,
    Path(virtual_device_id): Path<i32>,
    State(state): State<VirtualDeviceState>,
) -> Result<impl IntoResponse, ApiError> {
    require_access(&state, &principal, virtual_device_id).await?;

    let data = state
        .virtual_device_service
        .full_data(virtual_device_id, OffsetDateTime::now_utc())
        .await?;

    Ok(Json(json!({ "success": true, "virtual_device": data })))
}

pub async fn get_virtual_device_status(
    Extension(principal): Extension<Principal>,
    Path(virtual_device_id): Path<i32>,
    State(state): State<VirtualDeviceState>,
) -> Result<impl IntoResponse, ApiError> {
    require_access(&state, &principal, virtual_device_id).await?;

    let status = state
        .virtual_device_service
        .status_summary(virtual_device_id, OffsetDateTime::now_utc())
        .await?;

    Ok(Json(json!({ "success": true, "status": status })))
}

#[derive(Debug, Deserialize)]
pub struct VirtualDeviceLogsQuery {
    pub from: Option<OffsetDateTime>,
    pub to: Option<OffsetDateTime>,
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: i64,
}

/// Log history across every mapped channel. Defaults to the trailing
/// 24 hours when no window is given.
pub async fn get_virtual_device_logs(
    Extension(principal): Extension<Principal>,
    Path(virtual_device_id): Path<i32>,
    Query(query): Query<VirtualDeviceLogsQuery>,
    State(state): State<VirtualDeviceState>,
) -> Result<impl IntoResponse, ApiError> {
    require_access(&state, &principal, virtual_device_id).await?;

    let now = OffsetDateTime::now_utc();
    let from = query.from.unwrap_or(now - Duration::hours(24));
    let to = query.to.unwrap_or(now);

    let (logs, total) = state
        .virtual_device_service
        .logs_in_range(virtual_device_id, from, to, query.limit, query.offset)
        .await?;

    Ok(Json(VirtualDeviceLogsResponse {
        success: true,
        logs,
        total,
        from,
        to,
    }))
}
