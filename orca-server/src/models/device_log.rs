use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::Table;

/// One stored reading. Append-only; `log_value` holds the converted
/// engineering value, `log_data` the raw JSON payload as submitted.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DeviceLog {
    pub id: i32,
    pub device_id: i32,
    pub serial_number: String,
    pub log_key: String,
    pub log_value: Option<f64>,
    pub status: String,
    pub log_data: Option<String>,
    pub ip_address: Option<String>,
    pub logged_at: OffsetDateTime,
    pub received_at: OffsetDateTime,
}

/// Insert payload for a reading, built by the ingestion pipeline.
#[derive(Debug, Clone)]
pub struct NewDeviceLog {
    pub device_id: i32,
    pub serial_number: String,
    pub log_key: String,
    pub log_value: Option<f64>,
    pub status: String,
    pub log_data: Option<String>,
    pub ip_address: Option<String>,
    pub logged_at: OffsetDateTime,
    pub received_at: OffsetDateTime,
}

#[derive(Clone)]
pub struct DeviceLogTable;

impl Table for DeviceLogTable {
    fn name(&self) -> &'static str {
        "device_logs"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS device_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                device_id INTEGER NOT NULL,
                serial_number VARCHAR(128) NOT NULL,
                log_key VARCHAR(128) NOT NULL,
                log_value DOUBLE,
                status VARCHAR(16) NOT NULL DEFAULT 'normal',
                log_data TEXT,
                ip_address VARCHAR(64),
                logged_at TIMESTAMP NOT NULL,
                received_at TIMESTAMP NOT NULL,
                FOREIGN KEY (device_id) REFERENCES devices (id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_device_logs_device_key_time
                ON device_logs (device_id, log_key, logged_at);
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS device_logs;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["devices"]
    }
}
