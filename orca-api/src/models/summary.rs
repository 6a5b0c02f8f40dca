use serde::{Deserialize, Serialize};

use super::{Id, ReadingStatus};

/// How many readings of each status fell inside the rollup window.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StatusCounts {
    pub normal: i64,
    pub warning: i64,
    pub critical: i64,
}

/// Rollup of one device's recent readings.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceWarningSummary {
    /// Device identifier
    pub device_id: Id,
    pub device_name: String,
    /// Status of the most recent reading in the window
    pub latest_status: ReadingStatus,
    pub counts: StatusCounts,
}

/// Rollup across the accessible devices of one company.
#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyWarningSummary {
    /// Company identifier
    pub company_id: Id,
    pub company_name: String,
    /// Worst latest-status across the company's devices
    pub status: ReadingStatus,
    pub counts: StatusCounts,
    pub devices: Vec<DeviceWarningSummary>,
}

#[cfg_attr(feature = "docs", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarningSummaryResponse {
    pub success: bool,
    /// Trailing window in hours the rollup covers
    pub hours: i64,
    pub companies: Vec<CompanyWarningSummary>,
}
