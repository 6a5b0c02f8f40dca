use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{AlarmType, Id, ReadingStatus};

/// One reading inside a batch submission.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Sensor key; entries without one are skipped, not rejected
    #[serde(default)]
    pub key: Option<String>,
    /// Raw instrument value
    #[serde(default)]
    pub value: Option<f64>,
    /// Optional structured payload stored alongside the value
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    /// Per-reading logged-at time, overriding the batch fallback
    #[serde(default)]
    pub timestamp: Option<OffsetDateTime>,
}

/// Signed batch submission from a device.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchLogRequest {
    /// Device serial number
    pub serial_number: String,
    /// Unix seconds the request was signed at
    pub timestamp: i64,
    /// Hex-encoded SHA-256 over api_key and timestamp
    pub signature: String,
    /// Shared logged-at fallback for entries without their own timestamp
    #[serde(default)]
    pub logged_at: Option<OffsetDateTime>,
    pub logs: Vec<LogEntry>,
}

/// Signed single-reading submission.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingleLogRequest {
    /// Device serial number
    pub serial_number: String,
    /// Unix seconds the request was signed at
    pub timestamp: i64,
    /// Hex-encoded SHA-256 over api_key and timestamp
    pub signature: String,
    /// Sensor key
    pub key: String,
    /// Raw instrument value
    #[serde(default)]
    pub value: Option<f64>,
    /// Optional structured payload
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    /// Logged-at time; server time when absent
    #[serde(default)]
    pub logged_at: Option<OffsetDateTime>,
}

/// Hard threshold breach attached to an ingestion response.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmInfo {
    /// Sensor key that breached
    pub key: String,
    /// Which threshold was crossed
    #[serde(rename = "type")]
    pub alarm_type: AlarmType,
    /// Converted value at breach time
    pub value: f64,
    /// Human-readable description
    pub message: String,
    /// Classified status of the reading
    pub status: ReadingStatus,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchLogResponse {
    pub success: bool,
    /// How many of the submitted readings were actually saved
    pub count: usize,
    pub log_ids: Vec<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alarms: Option<Vec<AlarmInfo>>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingleLogResponse {
    pub success: bool,
    pub log_id: Id,
    pub status: ReadingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alarm: Option<AlarmInfo>,
}
