use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::Table;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Company {
    pub id: i32,
    pub name: String,
    pub code: String,
    pub notify_email: Option<String>,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
}

#[derive(Clone)]
pub struct CompanyTable;

impl Table for CompanyTable {
    fn name(&self) -> &'static str {
        "companies"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS companies (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name VARCHAR(255) NOT NULL,
                code VARCHAR(64) NOT NULL UNIQUE,
                notify_email VARCHAR(255),
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TIMESTAMP NOT NULL
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS companies;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec![]
    }
}
