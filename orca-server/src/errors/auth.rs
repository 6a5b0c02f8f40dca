use axum::http::StatusCode;

/// Failures from the device credential verifier and the portal bearer
/// check. Messages stay generic so a caller cannot probe which factor
/// failed.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Device secret not configured")]
    SecretNotConfigured,

    #[error("Invalid device secret")]
    InvalidSecret,

    #[error("Request timestamp outside the accepted window")]
    TimestampExpired,

    #[error("Invalid request signature")]
    InvalidSignature,

    #[error("No authentication token provided")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::SecretNotConfigured => StatusCode::FORBIDDEN,
            AuthError::InvalidSecret => StatusCode::UNAUTHORIZED,
            AuthError::TimestampExpired => StatusCode::UNAUTHORIZED,
            AuthError::InvalidSignature => StatusCode::UNAUTHORIZED,
            AuthError::MissingToken => StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
        }
    }
}
