use serde::{Deserialize, Serialize};

use super::Table;

/// Company-scoped logical device composed of borrowed sensor channels.
/// Has no readings of its own.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct VirtualDevice {
    pub id: i32,
    pub company_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
}

#[derive(Clone)]
pub struct VirtualDeviceTable;

impl Table for VirtualDeviceTable {
    fn name(&self) -> &'static str {
        "virtual_devices"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS virtual_devices (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                company_id INTEGER NOT NULL,
                name VARCHAR(255) NOT NULL,
                description TEXT,
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                FOREIGN KEY (company_id) REFERENCES companies (id) ON DELETE CASCADE
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS virtual_devices;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["companies"]
    }
}
