use serde::{Deserialize, Serialize};

/// Bootstrap exchange: trade the provisioned device secret for an API key.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceAuthRequest {
    /// Device serial number
    pub serial_number: String,
    /// Plaintext device secret
    pub device_secret: String,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceAuthResponse {
    pub success: bool,
    /// Freshly issued API key, hex encoded
    pub api_key: String,
}
