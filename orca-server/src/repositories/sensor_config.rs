use std::sync::Arc;

use sqlx::Error;

use crate::configs::Storage;
use crate::models::SensorConfig;

pub struct SensorConfigRepository {
    storage: Arc<Storage>,
}

impl SensorConfigRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    pub async fn find(&self, device_id: i32, log_key: &str) -> Result<Option<SensorConfig>, Error> {
        let config: Option<SensorConfig> = sqlx::query_as(
            "SELECT * FROM sensor_configs WHERE device_id = $1 AND log_key = $2",
        )
        .bind(device_id)
        .bind(log_key)
        .fetch_optional(self.storage.get_pool())
        .await?;

        Ok(config)
    }

    pub async fn find_by_device_id(&self, device_id: i32) -> Result<Vec<SensorConfig>, Error> {
        let configs: Vec<SensorConfig> = sqlx::query_as(
            "SELECT * FROM sensor_configs WHERE device_id = $1 ORDER BY log_key",
        )
        .bind(device_id)
        .fetch_all(self.storage.get_pool())
        .await?;

        Ok(configs)
    }

    /// Bulk lookup used by virtual-device aggregation: configs for an
    /// explicit set of (device, key) pairs in one query.
    pub async fn find_for_pairs(
        &self,
        pairs: &[(i32, String)],
    ) -> Result<Vec<SensorConfig>, Error> {
        if pairs.is_empty() {
            return Ok(Vec::new());
        }

        let mut clauses = Vec::with_capacity(pairs.len());
        let mut index = 1;
        for _ in pairs {
            clauses.push(format!("(device_id = ${} AND log_key = ${})", index, index + 1));
            index += 2;
        }
        let sql = format!(
            "SELECT * FROM sensor_configs WHERE {}",
            clauses.join(" OR ")
        );

        let mut query = sqlx::query_as::<_, SensorConfig>(&sql);
        for (device_id, log_key) in pairs {
            query = query.bind(device_id).bind(log_key);
        }

        Ok(query.fetch_all(self.storage.get_pool()).await?)
    }

    pub async fn upsert(&self, item: &SensorConfig) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO sensor_configs
                (device_id, log_key, data_type, zero_value, span_value, unit,
                 decimals, min_alarm, max_alarm, alarm_enabled, label)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (device_id, log_key) DO UPDATE SET
                data_type = excluded.data_type,
                zero_value = excluded.zero_value,
                span_value = excluded.span_value,
                unit = excluded.unit,
                decimals = excluded.decimals,
                min_alarm = excluded.min_alarm,
                max_alarm = excluded.max_alarm,
                alarm_enabled = excluded.alarm_enabled,
                label = excluded.label
            "#,
        )
        .bind(item.device_id)
        .bind(&item.log_key)
        .bind(&item.data_type)
        .bind(item.zero_value)
        .bind(item.span_value)
        .bind(&item.unit)
        .bind(item.decimals)
        .bind(item.min_alarm)
        .bind(item.max_alarm)
        .bind(item.alarm_enabled)
        .bind(&item.label)
        .execute(self.storage.get_pool())
        .await?;

        Ok(())
    }

    pub async fn delete(&self, device_id: i32, log_key: &str) -> Result<bool, Error> {
        let result = sqlx::query(
            "DELETE FROM sensor_configs WHERE device_id = $1 AND log_key = $2",
        )
        .bind(device_id)
        .bind(log_key)
        .execute(self.storage.get_pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::tests::*;

    use super::*;

    #[tokio::test]
    async fn test_upsert_replaces_existing_config() {
        let storage = setup_test_db().await;
        let company = create_test_company(storage.clone(), "Acme", true).await;
        let device = create_test_device(storage.clone(), company.id, "UA-001", true).await;

        let repo = SensorConfigRepository::new(storage.clone());
        let mut config = SensorConfig {
            id: 0,
            device_id: device.id,
            log_key: "pressure".to_string(),
            data_type: "4-20".to_string(),
            zero_value: 0.0,
            span_value: 10.0,
            unit: Some("bar".to_string()),
            decimals: 2,
            min_alarm: None,
            max_alarm: Some(9.0),
            alarm_enabled: true,
            label: None,
        };

        repo.upsert(&config).await.unwrap();
        config.span_value = 16.0;
        repo.upsert(&config).await.unwrap();

        let stored = repo.find(device.id, "pressure").await.unwrap().unwrap();
        assert_eq!(stored.span_value, 16.0);

        let all = repo.find_by_device_id(device.id).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_config() {
        let storage = setup_test_db().await;
        let company = create_test_company(storage.clone(), "Acme", true).await;
        let device = create_test_device(storage.clone(), company.id, "UA-001", true).await;

        let repo = SensorConfigRepository::new(storage.clone());
        create_test_sensor_config(storage.clone(), device.id, "temp", "real").await;

        assert!(repo.delete(device.id, "temp").await.unwrap());
        assert!(!repo.delete(device.id, "temp").await.unwrap());
        assert!(repo.find(device.id, "temp").await.unwrap().is_none());
    }
}
