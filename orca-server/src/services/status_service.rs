use std::sync::Arc;

use orca_api::{CompanyWarningSummary, DeviceWarningSummary, ReadingStatus, StatusCounts};
use time::{Duration, OffsetDateTime};

use crate::configs::Storage;
use crate::errors::{AccessError, ApiError, DeviceError};
use crate::models::Device;
use crate::repositories::{CompanyRepository, DeviceLogRepository, DeviceRepository};
use crate::services::AccessService;

/// Default trailing window for "recent" status rollups.
pub const DEFAULT_SUMMARY_HOURS: i64 = 24;

/// Worst-status rollups over recent readings, at device and company
/// level. Always scoped to what the requesting user can access.
pub struct StatusService {
    companies: CompanyRepository,
    devices: DeviceRepository,
    logs: DeviceLogRepository,
    access: Arc<AccessService>,
}

impl StatusService {
    pub fn new(storage: Arc<Storage>, access: Arc<AccessService>) -> Self {
        Self {
            companies: CompanyRepository::new(storage.clone()),
            devices: DeviceRepository::new(storage.clone()),
            logs: DeviceLogRepository::new(storage),
            access,
        }
    }

    fn fold_counts(rows: Vec<(String, i64)>) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for (status, count) in rows {
            match status.parse::<ReadingStatus>() {
                Ok(ReadingStatus::Normal) => counts.normal = count,
                Ok(ReadingStatus::Warning) => counts.warning = count,
                Ok(ReadingStatus::Critical) => counts.critical = count,
                Err(_) => {}
            }
        }
        counts
    }

    async fn summarize_device(
        &self,
        device: &Device,
        since: OffsetDateTime,
    ) -> Result<DeviceWarningSummary, ApiError> {
        let latest_status = self
            .logs
            .latest_status_since(device.id, None, since)
            .await?
            .and_then(|status| status.parse().ok())
            .unwrap_or(ReadingStatus::Normal);
        let counts =
            Self::fold_counts(self.logs.status_counts_since(device.id, None, since).await?);

        Ok(DeviceWarningSummary {
            device_id: device.id,
            device_name: device.name.clone(),
            latest_status,
            counts,
        })
    }

    /// Rollup for one device the user is granted.
    pub async fn device_summary(
        &self,
        user_id: i32,
        device_id: i32,
        hours: i64,
    ) -> Result<DeviceWarningSummary, ApiError> {
        if !self.access.has_access_to_device(user_id, device_id).await? {
            return Err(AccessError::AccessDenied.into());
        }

        let device = self
            .devices
            .find_by_id(device_id)
            .await?
            .ok_or(DeviceError::DeviceNotFound)?;
        let since = OffsetDateTime::now_utc() - Duration::hours(hours);

        self.summarize_device(&device, since).await
    }

    /// Rollup for one company, restricted to the devices the user holds a
    /// grant for. Company status is the worst latest-status among them.
    pub async fn company_summary(
        &self,
        user_id: i32,
        company_id: i32,
        hours: i64,
    ) -> Result<CompanyWarningSummary, ApiError> {
        let company = self
            .companies
            .find_by_id(company_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("company {company_id} vanished during summary"))?;
        let since = OffsetDateTime::now_utc() - Duration::hours(hours);

        let mut devices = Vec::new();
        for device in self.devices.find_by_company_id(company_id).await? {
            if self.access.has_access_to_device(user_id, device.id).await? {
                devices.push(self.summarize_device(&device, since).await?);
            }
        }

        let status = ReadingStatus::worst(devices.iter().map(|d| d.latest_status));
        let mut counts = StatusCounts::default();
        for device in &devices {
            counts.normal += device.counts.normal;
            counts.warning += device.counts.warning;
            counts.critical += device.counts.critical;
        }

        Ok(CompanyWarningSummary {
            company_id,
            company_name: company.name,
            status,
            counts,
            devices,
        })
    }

    /// Installation-wide rollup: every company the user is granted.
    pub async fn installation_summary(
        &self,
        user_id: i32,
        hours: i64,
    ) -> Result<Vec<CompanyWarningSummary>, ApiError> {
        let mut summaries = Vec::new();
        for company_id in self.access.accessible_company_ids(user_id).await? {
            summaries.push(self.company_summary(user_id, company_id, hours).await?);
        }

        Ok(summaries)
    }
}
