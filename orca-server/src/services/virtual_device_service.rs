use std::collections::HashMap;
use std::sync::Arc;

use orca_api::{
    VirtualDeviceData, VirtualDeviceLogRow, VirtualDeviceStatus, VirtualSensorReading,
};
use time::OffsetDateTime;

use crate::configs::Storage;
use crate::errors::{ApiError, VirtualDeviceError};
use crate::models::{DeviceLog, SensorConfig, VirtualDeviceSensor};
use crate::repositories::{DeviceLogRepository, SensorConfigRepository, VirtualDeviceRepository};
use crate::services::{liveness, signal_service};

/// Read-side composition of a virtual device: the live union of its
/// mapped sensors' latest readings, plus windowed log queries across the
/// composed set. All lookups are bulk queries over the full mapping list.
pub struct VirtualDeviceService {
    virtual_devices: VirtualDeviceRepository,
    configs: SensorConfigRepository,
    logs: DeviceLogRepository,
}

impl VirtualDeviceService {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self {
            virtual_devices: VirtualDeviceRepository::new(storage.clone()),
            configs: SensorConfigRepository::new(storage.clone()),
            logs: DeviceLogRepository::new(storage),
        }
    }

    fn pairs(mappings: &[VirtualDeviceSensor]) -> Vec<(i32, String)> {
        mappings
            .iter()
            .map(|m| (m.source_device_id, m.source_log_key.clone()))
            .collect()
    }

    fn latest_by_pair(latest: Vec<DeviceLog>) -> HashMap<(i32, String), DeviceLog> {
        latest
            .into_iter()
            .map(|log| ((log.device_id, log.log_key.clone()), log))
            .collect()
    }

    /// Display label priority: per-mapping custom label, then the sensor
    /// config's label, then the raw key.
    fn resolve_label(mapping: &VirtualDeviceSensor, config: Option<&SensorConfig>) -> String {
        mapping
            .display_label
            .clone()
            .filter(|label| !label.is_empty())
            .or_else(|| config.and_then(|c| c.label.clone()).filter(|l| !l.is_empty()))
            .unwrap_or_else(|| mapping.source_log_key.clone())
    }

    pub async fn status_summary(
        &self,
        virtual_device_id: i32,
        now: OffsetDateTime,
    ) -> Result<VirtualDeviceStatus, ApiError> {
        let mappings = self.virtual_devices.sensor_mappings(virtual_device_id).await?;
        let latest = self.logs.latest_for_pairs(&Self::pairs(&mappings)).await?;

        let total_count = mappings.len() as i64;
        let live_count = latest
            .iter()
            .filter(|log| liveness::is_online(Some(log.logged_at), now))
            .count() as i64;
        let last_seen_at = latest.iter().map(|log| log.logged_at).max();

        Ok(VirtualDeviceStatus {
            is_online: live_count > 0,
            all_online: total_count > 0 && live_count == total_count,
            live_count,
            total_count,
            last_seen_at,
            seconds_ago: liveness::seconds_ago(last_seen_at, now),
        })
    }

    pub async fn sensors_with_data(
        &self,
        virtual_device_id: i32,
        now: OffsetDateTime,
    ) -> Result<Vec<VirtualSensorReading>, ApiError> {
        let mappings = self.virtual_devices.sensor_mappings(virtual_device_id).await?;
        let pairs = Self::pairs(&mappings);

        let configs: HashMap<(i32, String), SensorConfig> = self
            .configs
            .find_for_pairs(&pairs)
            .await?
            .into_iter()
            .map(|c| ((c.device_id, c.log_key.clone()), c))
            .collect();
        let latest = Self::latest_by_pair(self.logs.latest_for_pairs(&pairs).await?);

        let sensors = mappings
            .iter()
            .map(|mapping| {
                let pair = (mapping.source_device_id, mapping.source_log_key.clone());
                let config = configs.get(&pair);
                let log = latest.get(&pair);

                // Stored values are already converted at ingestion time;
                // only display rounding applies here.
                let value = log.and_then(|log| log.log_value).map(|value| match config {
                    Some(config) => signal_service::round_to_decimals(value, config.decimals),
                    None => value,
                });
                let logged_at = log.map(|log| log.logged_at);

                VirtualSensorReading {
                    id: mapping.id,
                    source_device_id: mapping.source_device_id,
                    source_log_key: mapping.source_log_key.clone(),
                    label: Self::resolve_label(mapping, config),
                    unit: config.and_then(|c| c.unit.clone()),
                    value,
                    logged_at,
                    seconds_ago: liveness::seconds_ago(logged_at, now),
                    is_online: liveness::is_online(logged_at, now),
                    liveness: liveness::sensor_liveness(logged_at, now),
                }
            })
            .collect();

        Ok(sensors)
    }

    /// The full portal payload: device record, aggregated status, and
    /// per-sensor detail in display order.
    pub async fn full_data(
        &self,
        virtual_device_id: i32,
        now: OffsetDateTime,
    ) -> Result<VirtualDeviceData, ApiError> {
        let device = self
            .virtual_devices
            .find_by_id(virtual_device_id)
            .await?
            .ok_or(VirtualDeviceError::VirtualDeviceNotFound)?;

        let status = self.status_summary(virtual_device_id, now).await?;
        let sensors = self.sensors_with_data(virtual_device_id, now).await?;

        Ok(VirtualDeviceData {
            id: device.id,
            company_id: device.company_id,
            name: device.name,
            description: device.description,
            is_active: device.is_active,
            status,
            sensors,
        })
    }

    /// Windowed log union across every mapped (device, key) pair, each row
    /// tagged with the mapping's display label. Returns the page and the
    /// total match count.
    pub async fn logs_in_range(
        &self,
        virtual_device_id: i32,
        from: OffsetDateTime,
        to: OffsetDateTime,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<(Vec<VirtualDeviceLogRow>, i64), ApiError> {
        let device = self.virtual_devices.find_by_id(virtual_device_id).await?;
        if device.is_none() {
            return Err(VirtualDeviceError::VirtualDeviceNotFound.into());
        }

        let mappings = self.virtual_devices.sensor_mappings(virtual_device_id).await?;
        if mappings.is_empty() {
            return Ok((Vec::new(), 0));
        }
        let pairs = Self::pairs(&mappings);

        let configs: HashMap<(i32, String), SensorConfig> = self
            .configs
            .find_for_pairs(&pairs)
            .await?
            .into_iter()
            .map(|c| ((c.device_id, c.log_key.clone()), c))
            .collect();
        let labels: HashMap<(i32, String), String> = mappings
            .iter()
            .map(|mapping| {
                let pair = (mapping.source_device_id, mapping.source_log_key.clone());
                let label = Self::resolve_label(mapping, configs.get(&pair));
                (pair, label)
            })
            .collect();

        let total = self.logs.count_in_range_for_pairs(&pairs, from, to).await?;
        let rows = self
            .logs
            .find_in_range_for_pairs(&pairs, from, to, limit, offset)
            .await?;

        let logs = rows
            .into_iter()
            .map(|log| {
                let pair = (log.device_id, log.log_key.clone());
                VirtualDeviceLogRow {
                    id: log.id,
                    source_device_id: log.device_id,
                    label: labels
                        .get(&pair)
                        .cloned()
                        .unwrap_or_else(|| log.log_key.clone()),
                    log_key: log.log_key,
                    log_value: log.log_value,
                    status: log.status.parse().unwrap_or(orca_api::ReadingStatus::Normal),
                    logged_at: log.logged_at,
                }
            })
            .collect();

        Ok((logs, total))
    }
}
