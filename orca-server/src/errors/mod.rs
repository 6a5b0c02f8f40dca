pub mod access;
pub mod auth;
pub mod device;
pub mod ingest;
pub mod virtual_device;

pub use access::AccessError;
pub use auth::AuthError;
pub use device::DeviceError;
pub use ingest::IngestError;
pub use virtual_device::VirtualDeviceError;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    AuthError(#[from] AuthError),

    #[error(transparent)]
    AccessError(#[from] AccessError),

    #[error(transparent)]
    DeviceError(#[from] DeviceError),

    #[error(transparent)]
    IngestError(#[from] IngestError),

    #[error(transparent)]
    VirtualDeviceError(#[from] VirtualDeviceError),

    #[error(transparent)]
    DatabaseError(#[from] sqlx::Error),

    #[error(transparent)]
    InternalError(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Extract status code and error message from the specific error type
        let (status, error_message, log_message) = match self {
            ApiError::AuthError(e) => (e.status_code(), e.to_string(), None),
            ApiError::AccessError(e) => (e.status_code(), e.to_string(), None),
            ApiError::DeviceError(e) => (e.status_code(), e.to_string(), None),
            ApiError::IngestError(e) => (e.status_code(), e.to_string(), None),
            ApiError::VirtualDeviceError(e) => (e.status_code(), e.to_string(), None),
            ApiError::DatabaseError(e) => {
                let error_id = Uuid::new_v4();
                tracing::error!(error_id = ?error_id, "Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Some(error_id.to_string()),
                )
            }
            ApiError::InternalError(e) => {
                let error_id = Uuid::new_v4();
                tracing::error!(error_id = ?error_id, "Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Some(error_id.to_string()),
                )
            }
        };

        // Device and portal clients both key off the success flag, so the
        // error envelope always carries it alongside the structured error.
        let mut error_obj = json!({
            "code": status.as_u16(),
            "message": error_message
        });

        if let Some(error_id) = log_message {
            error_obj["error_id"] = json!(error_id);
        }

        let body = Json(json!({
            "success": false,
            "error": error_obj
        }));

        (status, body).into_response()
    }
}
