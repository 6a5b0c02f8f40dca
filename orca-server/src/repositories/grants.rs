use std::sync::Arc;

use sqlx::Error;

use crate::configs::Storage;
use crate::models::{UserCompany, UserDevice, UserDeviceSensor, UserVirtualDevice};

/// Storage for the user→company, user→device, user→virtual-device and
/// user→sensor allow-list relations. Kept as one repository because the
/// four tables exist solely to back the access gate.
pub struct GrantRepository {
    storage: Arc<Storage>,
}

impl GrantRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }
}

impl GrantRepository {
    pub async fn assign_company(&self, user_id: i32, company_id: i32) -> Result<(), Error> {
        sqlx::query("INSERT OR IGNORE INTO user_companies (user_id, company_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(company_id)
            .execute(self.storage.get_pool())
            .await?;

        Ok(())
    }

    pub async fn assign_device(&self, user_id: i32, device_id: i32) -> Result<(), Error> {
        sqlx::query("INSERT OR IGNORE INTO user_devices (user_id, device_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(device_id)
            .execute(self.storage.get_pool())
            .await?;

        Ok(())
    }

    pub async fn assign_virtual_device(
        &self,
        user_id: i32,
        virtual_device_id: i32,
    ) -> Result<(), Error> {
        sqlx::query(
            "INSERT OR IGNORE INTO user_virtual_devices (user_id, virtual_device_id) VALUES ($1, $2)",
        )
        .bind(user_id)
        .bind(virtual_device_id)
        .execute(self.storage.get_pool())
        .await?;

        Ok(())
    }

    pub async fn assign_sensor(
        &self,
        user_id: i32,
        device_id: i32,
        log_key: &str,
    ) -> Result<(), Error> {
        sqlx::query(
            "INSERT OR IGNORE INTO user_device_sensors (user_id, device_id, log_key) VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(device_id)
        .bind(log_key)
        .execute(self.storage.get_pool())
        .await?;

        Ok(())
    }

    /// Replace a user's allow-list for one device. An empty key set removes
    /// every restriction, granting access to all sensors.
    pub async fn set_sensor_access(
        &self,
        user_id: i32,
        device_id: i32,
        log_keys: &[String],
    ) -> Result<(), Error> {
        let mut tx = self.storage.get_pool().begin().await?;

        sqlx::query("DELETE FROM user_device_sensors WHERE user_id = $1 AND device_id = $2")
            .bind(user_id)
            .bind(device_id)
            .execute(&mut *tx)
            .await?;

        for log_key in log_keys {
            sqlx::query(
                "INSERT OR IGNORE INTO user_device_sensors (user_id, device_id, log_key) VALUES ($1, $2, $3)",
            )
            .bind(user_id)
            .bind(device_id)
            .bind(log_key)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    pub async fn has_company(&self, user_id: i32, company_id: i32) -> Result<bool, Error> {
        let grant: Option<UserCompany> = sqlx::query_as(
            "SELECT * FROM user_companies WHERE user_id = $1 AND company_id = $2",
        )
        .bind(user_id)
        .bind(company_id)
        .fetch_optional(self.storage.get_pool())
        .await?;

        Ok(grant.is_some())
    }

    pub async fn has_device(&self, user_id: i32, device_id: i32) -> Result<bool, Error> {
        let grant: Option<UserDevice> = sqlx::query_as(
            "SELECT * FROM user_devices WHERE user_id = $1 AND device_id = $2",
        )
        .bind(user_id)
        .bind(device_id)
        .fetch_optional(self.storage.get_pool())
        .await?;

        Ok(grant.is_some())
    }

    pub async fn has_virtual_device(
        &self,
        user_id: i32,
        virtual_device_id: i32,
    ) -> Result<bool, Error> {
        let grant: Option<UserVirtualDevice> = sqlx::query_as(
            "SELECT * FROM user_virtual_devices WHERE user_id = $1 AND virtual_device_id = $2",
        )
        .bind(user_id)
        .bind(virtual_device_id)
        .fetch_optional(self.storage.get_pool())
        .await?;

        Ok(grant.is_some())
    }

    pub async fn company_ids(&self, user_id: i32) -> Result<Vec<i32>, Error> {
        let grants: Vec<UserCompany> =
            sqlx::query_as("SELECT * FROM user_companies WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(self.storage.get_pool())
                .await?;

        Ok(grants.into_iter().map(|grant| grant.company_id).collect())
    }

    /// Allowed sensor keys for a user on a device; empty means unrestricted.
    pub async fn allowed_sensors(
        &self,
        user_id: i32,
        device_id: i32,
    ) -> Result<Vec<String>, Error> {
        let grants: Vec<UserDeviceSensor> = sqlx::query_as(
            "SELECT * FROM user_device_sensors WHERE user_id = $1 AND device_id = $2",
        )
        .bind(user_id)
        .bind(device_id)
        .fetch_all(self.storage.get_pool())
        .await?;

        Ok(grants.into_iter().map(|grant| grant.log_key).collect())
    }
}
