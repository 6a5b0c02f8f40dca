use std::sync::Arc;

use sqlx::Error;
use time::OffsetDateTime;

use crate::configs::Storage;
use crate::models::{DeviceLog, NewDeviceLog};

pub struct DeviceLogRepository {
    storage: Arc<Storage>,
}

impl DeviceLogRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }

    fn pair_clause(pairs: &[(i32, String)], first_index: usize) -> String {
        let mut clauses = Vec::with_capacity(pairs.len());
        let mut index = first_index;
        for _ in pairs {
            clauses.push(format!("(device_id = ${} AND log_key = ${})", index, index + 1));
            index += 2;
        }
        format!("({})", clauses.join(" OR "))
    }
}

impl DeviceLogRepository {
    /// Single-row insert; a reading is immutable once stored. Inserts are
    /// deliberately not transactional across a batch so one failure cannot
    /// roll back its siblings.
    pub async fn insert(&self, item: &NewDeviceLog) -> Result<i32, Error> {
        let id = sqlx::query(
            r#"
            INSERT INTO device_logs
                (device_id, serial_number, log_key, log_value, status,
                 log_data, ip_address, logged_at, received_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(item.device_id)
        .bind(&item.serial_number)
        .bind(&item.log_key)
        .bind(item.log_value)
        .bind(&item.status)
        .bind(&item.log_data)
        .bind(&item.ip_address)
        .bind(item.logged_at)
        .bind(item.received_at)
        .execute(self.storage.get_pool())
        .await?
        .last_insert_rowid();

        Ok(id as i32)
    }

    /// Most recent reading across all keys of one device.
    pub async fn latest_for_device(
        &self,
        device_id: i32,
        log_key: Option<&str>,
    ) -> Result<Option<DeviceLog>, Error> {
        let log: Option<DeviceLog> = match log_key {
            Some(key) => {
                sqlx::query_as(
                    r#"
                    SELECT * FROM device_logs
                    WHERE device_id = $1 AND log_key = $2
                    ORDER BY logged_at DESC
                    LIMIT 1
                    "#,
                )
                .bind(device_id)
                .bind(key)
                .fetch_optional(self.storage.get_pool())
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    SELECT * FROM device_logs
                    WHERE device_id = $1
                    ORDER BY logged_at DESC
                    LIMIT 1
                    "#,
                )
                .bind(device_id)
                .fetch_optional(self.storage.get_pool())
                .await?
            }
        };

        Ok(log)
    }

    /// Latest reading per (device, key) pair, one bulk query for the whole
    /// set rather than a lookup per mapping.
    pub async fn latest_for_pairs(
        &self,
        pairs: &[(i32, String)],
    ) -> Result<Vec<DeviceLog>, Error> {
        if pairs.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            r#"
            SELECT dl.* FROM device_logs dl
            INNER JOIN (
                SELECT device_id, log_key, MAX(logged_at) AS max_logged_at
                FROM device_logs
                WHERE {}
                GROUP BY device_id, log_key
            ) latest ON dl.device_id = latest.device_id
                AND dl.log_key = latest.log_key
                AND dl.logged_at = latest.max_logged_at
            "#,
            Self::pair_clause(pairs, 1)
        );

        let mut query = sqlx::query_as::<_, DeviceLog>(&sql);
        for (device_id, log_key) in pairs {
            query = query.bind(device_id).bind(log_key);
        }

        Ok(query.fetch_all(self.storage.get_pool()).await?)
    }

    /// Time-windowed union across a set of (device, key) pairs, ascending,
    /// with optional pagination.
    pub async fn find_in_range_for_pairs(
        &self,
        pairs: &[(i32, String)],
        from: OffsetDateTime,
        to: OffsetDateTime,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<DeviceLog>, Error> {
        if pairs.is_empty() {
            return Ok(Vec::new());
        }

        let mut sql = format!(
            r#"
            SELECT * FROM device_logs
            WHERE {} AND logged_at >= ${} AND logged_at <= ${}
            ORDER BY logged_at ASC
            "#,
            Self::pair_clause(pairs, 1),
            pairs.len() * 2 + 1,
            pairs.len() * 2 + 2,
        );
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}"));
        }

        let mut query = sqlx::query_as::<_, DeviceLog>(&sql);
        for (device_id, log_key) in pairs {
            query = query.bind(device_id).bind(log_key);
        }
        query = query.bind(from).bind(to);

        Ok(query.fetch_all(self.storage.get_pool()).await?)
    }

    pub async fn count_in_range_for_pairs(
        &self,
        pairs: &[(i32, String)],
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<i64, Error> {
        if pairs.is_empty() {
            return Ok(0);
        }

        let sql = format!(
            r#"
            SELECT COUNT(*) FROM device_logs
            WHERE {} AND logged_at >= ${} AND logged_at <= ${}
            "#,
            Self::pair_clause(pairs, 1),
            pairs.len() * 2 + 1,
            pairs.len() * 2 + 2,
        );

        let mut query = sqlx::query_scalar::<_, i64>(&sql);
        for (device_id, log_key) in pairs {
            query = query.bind(device_id).bind(log_key);
        }
        query = query.bind(from).bind(to);

        Ok(query.fetch_one(self.storage.get_pool()).await?)
    }

    pub async fn find_in_range_for_device(
        &self,
        device_id: i32,
        log_key: Option<&str>,
        from: OffsetDateTime,
        to: OffsetDateTime,
        limit: Option<i64>,
        offset: i64,
    ) -> Result<Vec<DeviceLog>, Error> {
        let mut conditions = vec!["device_id = $1", "logged_at >= $2", "logged_at <= $3"];
        if log_key.is_some() {
            conditions.push("log_key = $4");
        }

        let mut sql = format!(
            "SELECT * FROM device_logs WHERE {} ORDER BY logged_at DESC",
            conditions.join(" AND ")
        );
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}"));
        }

        let mut query = sqlx::query_as::<_, DeviceLog>(&sql)
            .bind(device_id)
            .bind(from)
            .bind(to);
        if let Some(key) = log_key {
            query = query.bind(key);
        }

        Ok(query.fetch_all(self.storage.get_pool()).await?)
    }

    pub async fn count_in_range_for_device(
        &self,
        device_id: i32,
        log_key: Option<&str>,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<i64, Error> {
        let mut conditions = vec!["device_id = $1", "logged_at >= $2", "logged_at <= $3"];
        if log_key.is_some() {
            conditions.push("log_key = $4");
        }

        let sql = format!(
            "SELECT COUNT(*) FROM device_logs WHERE {}",
            conditions.join(" AND ")
        );

        let mut query = sqlx::query_scalar::<_, i64>(&sql)
            .bind(device_id)
            .bind(from)
            .bind(to);
        if let Some(key) = log_key {
            query = query.bind(key);
        }

        Ok(query.fetch_one(self.storage.get_pool()).await?)
    }

    /// Status of the most recent reading newer than `since`, if any.
    pub async fn latest_status_since(
        &self,
        device_id: i32,
        log_key: Option<&str>,
        since: OffsetDateTime,
    ) -> Result<Option<String>, Error> {
        let mut conditions = vec!["device_id = $1", "logged_at >= $2"];
        if log_key.is_some() {
            conditions.push("log_key = $3");
        }

        let sql = format!(
            "SELECT status FROM device_logs WHERE {} ORDER BY logged_at DESC LIMIT 1",
            conditions.join(" AND ")
        );

        let mut query = sqlx::query_scalar::<_, String>(&sql)
            .bind(device_id)
            .bind(since);
        if let Some(key) = log_key {
            query = query.bind(key);
        }

        Ok(query.fetch_optional(self.storage.get_pool()).await?)
    }

    /// Per-status reading counts newer than `since`, as (status, count) rows.
    pub async fn status_counts_since(
        &self,
        device_id: i32,
        log_key: Option<&str>,
        since: OffsetDateTime,
    ) -> Result<Vec<(String, i64)>, Error> {
        let mut conditions = vec!["device_id = $1", "logged_at >= $2"];
        if log_key.is_some() {
            conditions.push("log_key = $3");
        }

        let sql = format!(
            "SELECT status, COUNT(*) FROM device_logs WHERE {} GROUP BY status",
            conditions.join(" AND ")
        );

        let mut query = sqlx::query_as::<_, (String, i64)>(&sql)
            .bind(device_id)
            .bind(since);
        if let Some(key) = log_key {
            query = query.bind(key);
        }

        Ok(query.fetch_all(self.storage.get_pool()).await?)
    }
}

#[cfg(test)]
mod tests {
    use time::Duration;

    use crate::tests::*;

    use super::*;

    #[tokio::test]
    async fn test_latest_for_pairs_picks_newest_per_channel() {
        let storage = setup_test_db().await;
        let company = create_test_company(storage.clone(), "Acme", true).await;
        let device = create_test_device(storage.clone(), company.id, "UA-001", true).await;

        let repo = DeviceLogRepository::new(storage.clone());
        let base = time::OffsetDateTime::now_utc() - Duration::hours(1);

        for (key, value, offset) in [
            ("temp", 20.0, 0),
            ("temp", 21.0, 10),
            ("humidity", 55.0, 5),
        ] {
            repo.insert(&test_log(
                device.id,
                "UA-001",
                key,
                Some(value),
                base + Duration::minutes(offset),
            ))
            .await
            .unwrap();
        }

        let pairs = vec![
            (device.id, "temp".to_string()),
            (device.id, "humidity".to_string()),
        ];
        let latest = repo.latest_for_pairs(&pairs).await.unwrap();

        assert_eq!(latest.len(), 2);
        let temp = latest.iter().find(|l| l.log_key == "temp").unwrap();
        assert_eq!(temp.log_value, Some(21.0));
    }

    #[tokio::test]
    async fn test_range_query_with_pagination() {
        let storage = setup_test_db().await;
        let company = create_test_company(storage.clone(), "Acme", true).await;
        let device = create_test_device(storage.clone(), company.id, "UA-001", true).await;

        let repo = DeviceLogRepository::new(storage.clone());
        let base = time::OffsetDateTime::now_utc() - Duration::hours(2);

        for i in 0..5 {
            repo.insert(&test_log(
                device.id,
                "UA-001",
                "temp",
                Some(i as f64),
                base + Duration::minutes(i * 10),
            ))
            .await
            .unwrap();
        }

        let pairs = vec![(device.id, "temp".to_string())];
        let from = base - Duration::minutes(1);
        let to = base + Duration::hours(1);

        let total = repo.count_in_range_for_pairs(&pairs, from, to).await.unwrap();
        assert_eq!(total, 5);

        let page = repo
            .find_in_range_for_pairs(&pairs, from, to, Some(2), 2)
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].log_value, Some(2.0));
        assert_eq!(page[1].log_value, Some(3.0));
    }
}
