use std::sync::Arc;

use sqlx::{Error, Sqlite, Transaction};

use crate::configs::Storage;
use crate::models::{VirtualDevice, VirtualDeviceSensor};

pub struct VirtualDeviceRepository {
    storage: Arc<Storage>,
}

impl VirtualDeviceRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }
}

impl VirtualDeviceRepository {
    pub async fn create(
        &self,
        item: &VirtualDevice,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<i32, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO virtual_devices (company_id, name, description, is_active)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(item.company_id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.is_active)
        .execute(&mut **transaction)
        .await?
        .last_insert_rowid();

        Ok(id as i32)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<VirtualDevice>, Error> {
        let device: Option<VirtualDevice> =
            sqlx::query_as("SELECT * FROM virtual_devices WHERE id = $1")
                .bind(id)
                .fetch_optional(self.storage.get_pool())
                .await?;

        Ok(device)
    }

    /// Mappings in display order, the order every aggregated view follows.
    pub async fn sensor_mappings(
        &self,
        virtual_device_id: i32,
    ) -> Result<Vec<VirtualDeviceSensor>, Error> {
        let mappings: Vec<VirtualDeviceSensor> = sqlx::query_as(
            r#"
            SELECT * FROM virtual_device_sensors
            WHERE virtual_device_id = $1
            ORDER BY display_order ASC, id ASC
            "#,
        )
        .bind(virtual_device_id)
        .fetch_all(self.storage.get_pool())
        .await?;

        Ok(mappings)
    }

    pub async fn add_sensor(&self, mapping: &VirtualDeviceSensor) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO virtual_device_sensors
                (virtual_device_id, source_device_id, source_log_key, display_label, display_order)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (virtual_device_id, source_device_id, source_log_key) DO UPDATE SET
                display_label = excluded.display_label,
                display_order = excluded.display_order
            "#,
        )
        .bind(mapping.virtual_device_id)
        .bind(mapping.source_device_id)
        .bind(&mapping.source_log_key)
        .bind(&mapping.display_label)
        .bind(mapping.display_order)
        .execute(self.storage.get_pool())
        .await?;

        Ok(())
    }

    pub async fn remove_sensor(
        &self,
        virtual_device_id: i32,
        source_device_id: i32,
        source_log_key: &str,
    ) -> Result<(), Error> {
        sqlx::query(
            r#"
            DELETE FROM virtual_device_sensors
            WHERE virtual_device_id = $1 AND source_device_id = $2 AND source_log_key = $3
            "#,
        )
        .bind(virtual_device_id)
        .bind(source_device_id)
        .bind(source_log_key)
        .execute(self.storage.get_pool())
        .await?;

        Ok(())
    }

    /// Replace the full mapping list atomically.
    pub async fn set_sensors(
        &self,
        virtual_device_id: i32,
        sensors: &[VirtualDeviceSensor],
    ) -> Result<(), Error> {
        let mut tx = self.storage.get_pool().begin().await?;

        sqlx::query("DELETE FROM virtual_device_sensors WHERE virtual_device_id = $1")
            .bind(virtual_device_id)
            .execute(&mut *tx)
            .await?;

        for (index, sensor) in sensors.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO virtual_device_sensors
                    (virtual_device_id, source_device_id, source_log_key, display_label, display_order)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(virtual_device_id)
            .bind(sensor.source_device_id)
            .bind(&sensor.source_log_key)
            .bind(&sensor.display_label)
            .bind(index as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }
}
