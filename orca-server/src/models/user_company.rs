use serde::{Deserialize, Serialize};

use super::Table;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserCompany {
    pub id: i32,
    pub user_id: i32,
    pub company_id: i32,
}

#[derive(Clone)]
pub struct UserCompanyTable;

impl Table for UserCompanyTable {
    fn name(&self) -> &'static str {
        "user_companies"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS user_companies (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                company_id INTEGER NOT NULL,
                UNIQUE (user_id, company_id),
                FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE,
                FOREIGN KEY (company_id) REFERENCES companies (id) ON DELETE CASCADE
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS user_companies;")
    }

    fn dependencies(&self) -> Vec<&'static str> {
        vec!["users", "companies"]
    }
}
