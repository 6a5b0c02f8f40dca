use std::sync::Arc;

use sqlx::Error;

use crate::configs::Storage;
use crate::models::DeviceLog;
use crate::repositories::GrantRepository;

/// Read-side authorization gate. Consulted before any device, virtual
/// device or sensor data leaves a query path; ingestion never goes
/// through it because devices authenticate with credentials, not grants.
pub struct AccessService {
    grants: GrantRepository,
}

impl AccessService {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            grants: GrantRepository::new(storage),
        }
    }

    pub async fn has_access_to_company(&self, user_id: i32, company_id: i32) -> Result<bool, Error> {
        self.grants.has_company(user_id, company_id).await
    }

    pub async fn has_access_to_device(&self, user_id: i32, device_id: i32) -> Result<bool, Error> {
        self.grants.has_device(user_id, device_id).await
    }

    pub async fn has_access_to_virtual_device(
        &self,
        user_id: i32,
        virtual_device_id: i32,
    ) -> Result<bool, Error> {
        self.grants.has_virtual_device(user_id, virtual_device_id).await
    }

    /// Allowed sensor keys on a device; an empty list means unrestricted.
    pub async fn allowed_sensors(
        &self,
        user_id: i32,
        device_id: i32,
    ) -> Result<Vec<String>, Error> {
        self.grants.allowed_sensors(user_id, device_id).await
    }

    pub async fn has_access_to_sensor(
        &self,
        user_id: i32,
        device_id: i32,
        log_key: &str,
    ) -> Result<bool, Error> {
        if !self.has_access_to_device(user_id, device_id).await? {
            return Ok(false);
        }

        let allowed = self.allowed_sensors(user_id, device_id).await?;
        Ok(allowed.is_empty() || allowed.iter().any(|key| key == log_key))
    }

    /// Drop log rows the user's allow-list hides. No restrictions = all
    /// rows pass.
    pub async fn filter_logs_by_access(
        &self,
        user_id: i32,
        device_id: i32,
        logs: Vec<DeviceLog>,
    ) -> Result<Vec<DeviceLog>, Error> {
        let allowed = self.allowed_sensors(user_id, device_id).await?;
        if allowed.is_empty() {
            return Ok(logs);
        }

        Ok(logs
            .into_iter()
            .filter(|log| allowed.iter().any(|key| *key == log.log_key))
            .collect())
    }

    pub async fn accessible_company_ids(&self, user_id: i32) -> Result<Vec<i32>, Error> {
        self.grants.company_ids(user_id).await
    }
}
