use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::Table;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Device {
    pub id: i32,
    pub company_id: i32,
    pub name: String,
    pub serial_number: String,
    pub description: Option<String>,
    pub notify_email: Option<String>,
    pub is_active: bool,
    pub api_key: Option<String>,
    pub device_secret: Option<String>,
    pub last_seen_at: Option<OffsetDateTime>,
}

/// Device joined with its owning company, as loaded by serial-number lookup.
/// Carries the company's active flag and notification fallback so the
/// credential and ingestion paths need a single query.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DeviceWithCompany {
    pub id: i32,
    pub company_id: i32,
    pub name: String,
    pub serial_number: String,
    pub description: Option<String>,
    pub notify_email: Option<String>,
    pub is_active: bool,
    pub api_key: Option<String>,
    pub device_secret: Option<String>,
    pub last_seen_at: Option<OffsetDateTime>,
    pub company_active: bool,
    pub company_notify_email: Option<String>,
}

impl DeviceWithCompany {
    /// Where alarm mail for this device should go: the device override
    /// first, then the company address.
    pub fn notify_recipient(&self) -> Option<&str> {
        self.notify_email
            .as_deref()
            .or(self.company_notify_email.as_deref())
    }
}

#[derive(Clone)]
pub struct DeviceTable;

impl Table for DeviceTable {
    fn name(&self) -> &'static str {
        "devices"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS devices (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                company_id INTEGER NOT NULL,
                name VARCHAR(255) NOT NULL,
                serial_number VARCHAR(128) NOT NULL UNIQUE,
                description TEXT,
                notify_email VARCHAR(255),
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                api_key VARCHAR(64),
                device_secret VARCHAR(255),
                last_seen_at TIMESTAMP,
                FOREIGN KEY (company_id) REFERENCES companies (id) ON DELETE CASCADE
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS devices;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["companies"]
    }
}
