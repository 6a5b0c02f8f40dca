use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::IntoResponse;

use orca_api::{DeviceAuthRequest, DeviceAuthResponse};

use crate::errors::ApiError;
use crate::services::CredentialService;

#[derive(Clone)]
pub struct DeviceAuthState {
    pub credential_service: Arc<CredentialService>,
}

/// Bootstrap exchange: a device trades its provisioned secret for a fresh
/// API key it will sign telemetry submissions with.
pub async fn authenticate_device(
    State(state): State<DeviceAuthState>,
    Json(request): Json<DeviceAuthRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (device, api_key) = state
        .credential_service
        .authenticate(&request.serial_number, &request.device_secret)
        .await?;

    tracing::info!(serial_number = %device.serial_number, "device api key issued");

    Ok(Json(DeviceAuthResponse {
        success: true,
        api_key,
    }))
}
