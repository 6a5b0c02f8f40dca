use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;

use orca_api::WarningSummaryResponse;

use crate::errors::{AccessError, ApiError, IngestError};
use crate::middlewares::Principal;
use crate::services::{AccessService, DEFAULT_SUMMARY_HOURS, StatusService};

#[derive(Clone)]
pub struct SummaryState {
    pub status_service: Arc<StatusService>,
    pub access_service: Arc<AccessService>,
}

#[derive(Debug, Deserialize)]
pub struct WarningSummaryQuery {
    /// installation (default), company, or device
    pub level: Option<String>,
    pub company_id: Option<i32>,
    pub device_id: Option<i32>,
    pub hours: Option<i64>,
}

/// Warning/critical rollups at installation, company or device level,
/// over a trailing window (default 24 h).
pub async fn get_warning_summary(
    Extension(principal): Extension<Principal>,
    Query(query): Query<WarningSummaryQuery>,
    State(state): State<SummaryState>,
) -> Result<impl IntoResponse, ApiError> {
    let hours = query.hours.unwrap_or(DEFAULT_SUMMARY_HOURS).max(1);

    match query.level.as_deref().unwrap_or("installation") {
        "installation" => {
            let companies = state
                .status_service
                .installation_summary(principal.user_id, hours)
                .await?;

            Ok(Json(json!(WarningSummaryResponse {
                success: true,
                hours,
                companies,
            })))
        }
        "company" => {
            let company_id = query
                .company_id
                .ok_or(IngestError::InvalidPayload("Company ID is required"))?;
            if !state
                .access_service
                .has_access_to_company(principal.user_id, company_id)
                .await?
            {
                return Err(AccessError::AccessDenied.into());
            }

            let company = state
                .status_service
                .company_summary(principal.user_id, company_id, hours)
                .await?;

            Ok(Json(json!(WarningSummaryResponse {
                success: true,
                hours,
                companies: vec![company],
            })))
        }
        "device" => {
            let device_id = query
                .device_id
                .ok_or(IngestError::InvalidPayload("Device ID is required"))?;

            let device = state
                .status_service
                .device_summary(principal.user_id, device_id, hours)
                .await?;

            Ok(Json(
                json!({ "success": true, "hours": hours, "device": device }),
            ))
        }
        _ => Err(IngestError::InvalidPayload("Unknown summary level").into()),
    }
}
