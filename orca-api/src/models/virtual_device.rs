use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{Id, ReadingStatus, SensorLiveness};

/// Aggregated liveness across a virtual device's mapped sensors.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualDeviceStatus {
    /// At least one mapped sensor is live
    pub is_online: bool,
    /// Every mapped sensor is live
    pub all_online: bool,
    /// Mapped sensors inside the online window
    pub live_count: i64,
    /// Total mapped sensors
    pub total_count: i64,
    /// Newest reading across all mappings
    pub last_seen_at: Option<OffsetDateTime>,
    /// Age of that reading in seconds
    pub seconds_ago: Option<i64>,
}

/// One mapped sensor with its latest converted value.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualSensorReading {
    /// Mapping identifier
    pub id: Id,
    /// Physical device the channel belongs to
    pub source_device_id: Id,
    /// Sensor key on the source device
    pub source_log_key: String,
    /// Resolved display label (custom, then config, then raw key)
    pub label: String,
    /// Display unit from the sensor config
    pub unit: Option<String>,
    /// Latest value, converted and rounded per config
    pub value: Option<f64>,
    /// Time of the latest reading
    pub logged_at: Option<OffsetDateTime>,
    /// Age of the latest reading in seconds
    pub seconds_ago: Option<i64>,
    /// Inside the online window
    pub is_online: bool,
    /// Freshness tier
    pub liveness: SensorLiveness,
}

/// Full portal payload for one virtual device.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualDeviceData {
    /// Virtual device identifier
    pub id: Id,
    /// Owning company
    pub company_id: Id,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    #[serde(flatten)]
    pub status: VirtualDeviceStatus,
    pub sensors: Vec<VirtualSensorReading>,
}

/// One underlying reading inside a virtual device's log view.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualDeviceLogRow {
    /// Log identifier
    pub id: Id,
    /// Physical device that produced the row
    pub source_device_id: Id,
    /// Sensor key on the source device
    pub log_key: String,
    /// Converted value as stored
    pub log_value: Option<f64>,
    /// Classification at ingestion time
    pub status: ReadingStatus,
    /// Reading time
    pub logged_at: OffsetDateTime,
    /// Display label of the mapping the row belongs to
    pub label: String,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualDeviceLogsResponse {
    pub success: bool,
    pub logs: Vec<VirtualDeviceLogRow>,
    /// Total matching rows before pagination
    pub total: i64,
    /// Window start applied to the query
    pub from: OffsetDateTime,
    /// Window end applied to the query
    pub to: OffsetDateTime,
}
