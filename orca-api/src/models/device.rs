use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{Id, ReadingStatus};

/// Point-in-time liveness of one physical device.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceStatus {
    /// Device identifier
    pub id: Id,
    /// Seen within the online window
    pub is_online: bool,
    /// Most recent heartbeat
    pub last_seen_at: Option<OffsetDateTime>,
    /// Age of the heartbeat in seconds, None when never seen
    pub seconds_ago: Option<i64>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevicesStatusResponse {
    pub success: bool,
    pub devices: Vec<DeviceStatus>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastUpdateResponse {
    pub success: bool,
    /// Device identifier
    pub device_id: Id,
    /// Sensor key filter that was applied, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_key: Option<String>,
    /// Time of the most recent matching reading
    pub logged_at: Option<OffsetDateTime>,
    /// Age of that reading in seconds
    pub seconds_ago: Option<i64>,
}

/// One stored reading as returned by log queries.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceLogRow {
    /// Log identifier
    pub id: Id,
    /// Sensor key
    pub log_key: String,
    /// Converted value
    pub log_value: Option<f64>,
    /// Classification at ingestion time
    pub status: ReadingStatus,
    /// Device-supplied or server time of the reading
    pub logged_at: OffsetDateTime,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceLogsResponse {
    pub success: bool,
    pub logs: Vec<DeviceLogRow>,
    /// Total matching rows before pagination
    pub total: i64,
}

/// Calibration and alarm settings for one (device, key) channel.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfigPayload {
    /// "4-20" or "real"
    pub data_type: String,
    /// Engineering value at 4 mA
    #[serde(default)]
    pub zero_value: Option<f64>,
    /// Engineering span across the 4-20 mA range
    #[serde(default)]
    pub span_value: Option<f64>,
    /// Display unit
    #[serde(default)]
    pub unit: Option<String>,
    /// Display rounding
    #[serde(default)]
    pub decimals: Option<i32>,
    /// Low alarm threshold
    #[serde(default)]
    pub min_alarm: Option<f64>,
    /// High alarm threshold
    #[serde(default)]
    pub max_alarm: Option<f64>,
    #[serde(default)]
    pub alarm_enabled: bool,
    /// Display label overriding the raw key
    #[serde(default)]
    pub label: Option<String>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfigView {
    /// Owning device
    pub device_id: Id,
    /// Sensor key
    pub log_key: String,
    #[serde(flatten)]
    pub config: SensorConfigPayload,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorConfigsResponse {
    pub success: bool,
    pub configs: Vec<SensorConfigView>,
}
