use axum::http::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("{0}")]
    InvalidPayload(&'static str),

    #[error("Failed to save any logs")]
    NothingSaved,
}

impl IngestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            IngestError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            IngestError::NothingSaved => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
