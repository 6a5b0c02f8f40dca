use serde::{Deserialize, Serialize};

use super::Table;

/// One (source device, sensor key) mapping inside a virtual device.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct VirtualDeviceSensor {
    pub id: i32,
    pub virtual_device_id: i32,
    pub source_device_id: i32,
    pub source_log_key: String,
    pub display_label: Option<String>,
    pub display_order: i32,
}

#[derive(Clone)]
pub struct VirtualDeviceSensorTable;

impl Table for VirtualDeviceSensorTable {
    fn name(&self) -> &'static str {
        "virtual_device_sensors"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS virtual_device_sensors (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                virtual_device_id INTEGER NOT NULL,
                source_device_id INTEGER NOT NULL,
                source_log_key VARCHAR(128) NOT NULL,
                display_label VARCHAR(255),
                display_order INTEGER NOT NULL DEFAULT 0,
                UNIQUE (virtual_device_id, source_device_id, source_log_key),
                FOREIGN KEY (virtual_device_id) REFERENCES virtual_devices (id) ON DELETE CASCADE,
                FOREIGN KEY (source_device_id) REFERENCES devices (id) ON DELETE CASCADE
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS virtual_device_sensors;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["virtual_devices", "devices"]
    }
}
