use serde::{Deserialize, Serialize};

use super::Table;

/// Sensor allow-list row. A user with no rows for a device sees all of
/// that device's sensors; one or more rows means strict allow-listing.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserDeviceSensor {
    pub id: i32,
    pub user_id: i32,
    pub device_id: i32,
    pub log_key: String,
}

#[derive(Clone)]
pub struct UserDeviceSensorTable;

impl Table for UserDeviceSensorTable {
    fn name(&self) -> &'static str {
        "user_device_sensors"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS user_device_sensors (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                device_id INTEGER NOT NULL,
                log_key VARCHAR(128) NOT NULL,
                UNIQUE (user_id, device_id, log_key),
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE,
                FOREIGN KEY (device_id) REFERENCES devices (id) ON DELETE CASCADE
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS user_device_sensors;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["users", "devices"]
    }
}
