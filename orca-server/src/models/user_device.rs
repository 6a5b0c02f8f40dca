use serde::{Deserialize, Serialize};

use super::Table;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserDevice {
    pub id: i32,
    pub user_id: i32,
    pub device_id: i32,
}

#[derive(Clone)]
pub struct UserDeviceTable;

impl Table for UserDeviceTable {
    fn name(&self) -> &'static str {
        "user_devices"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS user_devices (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                device_id INTEGER NOT NULL,
                UNIQUE (user_id, device_id),
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE,
                FOREIGN KEY (device_id) REFERENCES devices (id) ON DELETE CASCADE
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS user_devices;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["users", "devices"]
    }
}
