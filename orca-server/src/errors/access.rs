use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("Access denied")]
    AccessDenied,
}

impl AccessError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AccessError::AccessDenied => StatusCode::FORBIDDEN,
        }
    }
}
