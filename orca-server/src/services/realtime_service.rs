use std::time::Duration;

use serde_json::json;

use crate::configs::Realtime;
use crate::models::DeviceLog;

/// Best-effort push of fresh readings to the downstream broadcaster.
/// A realtime convenience, not a durability guarantee: the short timeout
/// keeps a dead broadcaster from holding ingestion tasks alive.
pub struct RealtimeService {
    client: reqwest::Client,
    config: Realtime,
}

impl RealtimeService {
    pub fn new(config: Realtime) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
            .expect("failed to build realtime client");

        Self { client, config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled && !self.config.endpoint.is_empty()
    }

    pub async fn notify_device_log(&self, log: &DeviceLog) -> anyhow::Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let payload = json!({
            "type": "device_log",
            "deviceId": log.device_id,
            "data": {
                "id": log.id,
                "log_key": log.log_key,
                "log_value": log.log_value,
                "status": log.status,
                "logged_at": log.logged_at,
            },
        });

        self.client
            .post(&self.config.endpoint)
            .json(&payload)
            .send()
            .await?;

        Ok(())
    }
}
