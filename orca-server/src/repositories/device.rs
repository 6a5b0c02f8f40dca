use std::sync::Arc;

use sqlx::{Error, Sqlite, Transaction};
use time::OffsetDateTime;

use crate::configs::Storage;
use crate::models::{Device, DeviceWithCompany};

pub struct DeviceRepository {
    storage: Arc<Storage>,
}

impl DeviceRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }
}

impl DeviceRepository {
    pub async fn create(
        &self,
        item: &Device,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i32, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO devices
                (company_id, name, serial_number, description, notify_email,
                 is_active, api_key, device_secret, last_seen_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(item.company_id)
        .bind(&item.name)
        .bind(&item.serial_number)
        .bind(&item.description)
        .bind(&item.notify_email)
        .bind(item.is_active)
        .bind(&item.api_key)
        .bind(&item.device_secret)
        .bind(item.last_seen_at)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        Ok(id as i32)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Device>, Error> {
        let device: Option<Device> = sqlx::query_as("SELECT * FROM devices WHERE id = $1")
            .bind(id)
            .fetch_optional(self.storage.get_pool())
            .await?;

        Ok(device)
    }

    /// Serial-number lookup joined with the owning company, the single
    /// query both authentication protocols start from.
    pub async fn find_by_serial_with_company(
        &self,
        serial_number: &str,
    ) -> Result<Option<DeviceWithCompany>, Error> {
        let device: Option<DeviceWithCompany> = sqlx::query_as(
            r#"
            SELECT d.*, c.is_active AS company_active, c.notify_email AS company_notify_email
            FROM devices d
            INNER JOIN companies c ON d.company_id = c.id
            WHERE d.serial_number = $1
            "#,
        )
        .bind(serial_number)
        .fetch_optional(self.storage.get_pool())
        .await?;

        Ok(device)
    }

    pub async fn find_by_company_id(&self, company_id: i32) -> Result<Vec<Device>, Error> {
        let devices: Vec<Device> = sqlx::query_as(
            "SELECT * FROM devices WHERE company_id = $1 AND is_active = TRUE ORDER BY name",
        )
        .bind(company_id)
        .fetch_all(self.storage.get_pool())
        .await?;

        Ok(devices)
    }

    pub async fn find_by_ids(&self, ids: &[i32]) -> Result<Vec<Device>, Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = (1..=ids.len())
            .map(|i| format!("${i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT * FROM devices WHERE id IN ({placeholders})");

        let mut query = sqlx::query_as::<_, Device>(&sql);
        for id in ids {
            query = query.bind(id);
        }

        Ok(query.fetch_all(self.storage.get_pool()).await?)
    }

    pub async fn update_api_key(&self, id: i32, api_key: &str) -> Result<(), Error> {
        sqlx::query("UPDATE devices SET api_key = $1 WHERE id = $2")
            .bind(api_key)
            .bind(id)
            .execute(self.storage.get_pool())
            .await?;

        Ok(())
    }

    /// Heartbeat update. The guard keeps `last_seen_at` monotonic under
    /// concurrent ingestion; last-writer-wins is fine because every writer
    /// passes server-now.
    pub async fn touch_last_seen(&self, id: i32, at: OffsetDateTime) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE devices SET last_seen_at = $1
            WHERE id = $2 AND (last_seen_at IS NULL OR last_seen_at < $1)
            "#,
        )
        .bind(at)
        .bind(id)
        .execute(self.storage.get_pool())
        .await?;

        Ok(())
    }
}
