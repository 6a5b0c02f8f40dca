use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum VirtualDeviceError {
    #[error("Virtual device not found")]
    VirtualDeviceNotFound,
}

impl VirtualDeviceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            VirtualDeviceError::VirtualDeviceNotFound => StatusCode::NOT_FOUND,
        }
    }
}
