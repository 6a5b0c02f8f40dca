use axum::http::StatusCode;

/// Device resolution failures. Inactive is distinct from NotFound so an
/// operator can tell "exists but disabled" apart from a typo.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Device not found")]
    DeviceNotFound,

    #[error("Device is inactive")]
    DeviceInactive,

    #[error("Company is inactive")]
    CompanyInactive,
}

impl DeviceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DeviceError::DeviceNotFound => StatusCode::NOT_FOUND,
            DeviceError::DeviceInactive => StatusCode::FORBIDDEN,
            DeviceError::CompanyInactive => StatusCode::FORBIDDEN,
        }
    }
}
