use serde::{Deserialize, Serialize};

use super::Table;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserVirtualDevice {
    pub id: i32,
    pub user_id: i32,
    pub virtual_device_id: i32,
}

#[derive(Clone)]
pub struct UserVirtualDeviceTable;

impl Table for UserVirtualDeviceTable {
    fn name(&self) -> &'static str {
        "user_virtual_devices"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS user_virtual_devices (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                virtual_device_id INTEGER NOT NULL,
                UNIQUE (user_id, virtual_device_id),
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE,
                FOREIGN KEY (virtual_device_id) REFERENCES virtual_devices (id) ON DELETE CASCADE
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS user_virtual_devices;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["users", "virtual_devices"]
    }
}
