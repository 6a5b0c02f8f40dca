use serde::{Deserialize, Serialize};

use super::Table;

/// Per-channel calibration and alarm record. `data_type` is exactly
/// `"4-20"` or `"real"`; absence of a row implies passthrough with
/// alarms disabled.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SensorConfig {
    pub id: i32,
    pub device_id: i32,
    pub log_key: String,
    pub data_type: String,
    pub zero_value: f64,
    pub span_value: f64,
    pub unit: Option<String>,
    pub decimals: i32,
    pub min_alarm: Option<f64>,
    pub max_alarm: Option<f64>,
    pub alarm_enabled: bool,
    pub label: Option<String>,
}

pub const DATA_TYPE_LOOP: &str = "4-20";
pub const DATA_TYPE_REAL: &str = "real";

#[derive(Clone)]
pub struct SensorConfigTable;

impl Table for SensorConfigTable {
    fn name(&self) -> &'static str {
        "sensor_configs"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS sensor_configs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                device_id INTEGER NOT NULL,
                log_key VARCHAR(128) NOT NULL,
                data_type VARCHAR(8) NOT NULL DEFAULT 'real' CHECK (data_type IN ('4-20', 'real')),
                zero_value DOUBLE NOT NULL DEFAULT 0,
                span_value DOUBLE NOT NULL DEFAULT 100,
                unit VARCHAR(32),
                decimals INTEGER NOT NULL DEFAULT 2,
                min_alarm DOUBLE,
                max_alarm DOUBLE,
                alarm_enabled BOOLEAN NOT NULL DEFAULT FALSE,
                label VARCHAR(255),
                UNIQUE (device_id, log_key),
                FOREIGN KEY (device_id) REFERENCES devices (id) ON DELETE CASCADE
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS sensor_configs;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["devices"]
    }
}
