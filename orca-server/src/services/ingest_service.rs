use std::sync::Arc;

use orca_api::{AlarmInfo, BatchLogRequest, ReadingStatus, SingleLogRequest};
use time::OffsetDateTime;

use crate::configs::Storage;
use crate::errors::{ApiError, IngestError};
use crate::models::{DeviceLog, DeviceWithCompany, NewDeviceLog, SensorConfig};
use crate::repositories::{DeviceLogRepository, DeviceRepository, SensorConfigRepository};
use crate::services::credential_service::CredentialService;
use crate::services::mailer_service::MailerService;
use crate::services::realtime_service::RealtimeService;
use crate::services::signal_service;

/// What a batch submission achieved: saved readings and the critical
/// alarms collected along the way.
#[derive(Debug)]
pub struct BatchOutcome {
    pub count: usize,
    pub log_ids: Vec<i32>,
    pub alarms: Vec<AlarmInfo>,
}

/// Outcome of a single-reading submission.
#[derive(Debug)]
pub struct SingleOutcome {
    pub log_id: i32,
    pub status: ReadingStatus,
    pub alarm: Option<AlarmInfo>,
}

/// The path from a raw submission to stored, classified readings:
/// authenticate, resolve per-channel config, convert, classify, persist,
/// move the heartbeat, then fan out side effects.
pub struct IngestService {
    devices: DeviceRepository,
    configs: SensorConfigRepository,
    logs: DeviceLogRepository,
    credentials: Arc<CredentialService>,
    mailer: Arc<MailerService>,
    realtime: Arc<RealtimeService>,
}

impl IngestService {
    pub fn new(
        storage: Arc<Storage>,
        credentials: Arc<CredentialService>,
        mailer: Arc<MailerService>,
        realtime: Arc<RealtimeService>,
    ) -> Self {
        Self {
            devices: DeviceRepository::new(storage.clone()),
            configs: SensorConfigRepository::new(storage.clone()),
            logs: DeviceLogRepository::new(storage),
            credentials,
            mailer,
            realtime,
        }
    }

    /// Batch ingestion. An authentication failure aborts before any write;
    /// after that, each reading stands alone — a failed insert is logged
    /// and skipped while its siblings continue, because partial success
    /// beats dropping a whole batch over one bad entry.
    pub async fn ingest_batch(
        &self,
        request: &BatchLogRequest,
        ip_address: Option<String>,
    ) -> Result<BatchOutcome, ApiError> {
        let now = OffsetDateTime::now_utc();
        let device = self
            .credentials
            .verify_signature(
                &request.serial_number,
                request.timestamp,
                &request.signature,
                now,
            )
            .await?;

        if request.logs.is_empty() {
            return Err(IngestError::InvalidPayload("Logs array is required").into());
        }

        let shared_logged_at = request.logged_at.unwrap_or(now);
        let mut log_ids = Vec::new();
        let mut alarms = Vec::new();

        for entry in &request.logs {
            let Some(key) = entry.key.as_deref().filter(|key| !key.is_empty()) else {
                continue;
            };

            let config = self.configs.find(device.id, key).await?;
            let logged_at = entry.timestamp.unwrap_or(shared_logged_at);
            let (record, status, alarm) = build_record(
                &device,
                key,
                entry.value,
                entry.data.as_ref(),
                config.as_ref(),
                ip_address.clone(),
                logged_at,
                now,
            );

            match self.logs.insert(&record).await {
                Ok(id) => {
                    log_ids.push(id);
                    if status == ReadingStatus::Critical {
                        if let Some(alarm) = alarm {
                            alarms.push(alarm);
                        }
                    }
                    self.push_realtime(record, id);
                }
                Err(err) => {
                    tracing::error!(
                        device_id = device.id,
                        log_key = key,
                        "failed to save reading: {err}"
                    );
                }
            }
        }

        if log_ids.is_empty() {
            return Err(IngestError::NothingSaved.into());
        }

        // Heartbeat reflects server-observed arrival, never the device's
        // possibly-drifted clock.
        self.devices.touch_last_seen(device.id, now).await?;

        self.dispatch_alarms(&device, &alarms);

        Ok(BatchOutcome {
            count: log_ids.len(),
            log_ids,
            alarms,
        })
    }

    /// Single-reading submission: same convert/classify/persist sequence
    /// without the batching concern.
    pub async fn ingest_single(
        &self,
        request: &SingleLogRequest,
        ip_address: Option<String>,
    ) -> Result<SingleOutcome, ApiError> {
        let now = OffsetDateTime::now_utc();
        let device = self
            .credentials
            .verify_signature(
                &request.serial_number,
                request.timestamp,
                &request.signature,
                now,
            )
            .await?;

        if request.key.is_empty() {
            return Err(IngestError::InvalidPayload("Log key is required").into());
        }

        let config = self.configs.find(device.id, &request.key).await?;
        let logged_at = request.logged_at.unwrap_or(now);
        let (record, status, alarm) = build_record(
            &device,
            &request.key,
            request.value,
            request.data.as_ref(),
            config.as_ref(),
            ip_address,
            logged_at,
            now,
        );

        let log_id = self.logs.insert(&record).await?;
        self.devices.touch_last_seen(device.id, now).await?;
        self.push_realtime(record, log_id);

        let alarm = alarm.filter(|_| status == ReadingStatus::Critical);
        if let Some(alarm) = &alarm {
            self.dispatch_alarms(&device, std::slice::from_ref(alarm));
        }

        Ok(SingleOutcome {
            log_id,
            status,
            alarm,
        })
    }

    /// Fire-and-forget push to the realtime broadcaster; a dead or slow
    /// broadcaster never touches the device's response.
    fn push_realtime(&self, record: NewDeviceLog, id: i32) {
        if !self.realtime.is_enabled() {
            return;
        }

        let realtime = self.realtime.clone();
        let log = DeviceLog {
            id,
            device_id: record.device_id,
            serial_number: record.serial_number,
            log_key: record.log_key,
            log_value: record.log_value,
            status: record.status,
            log_data: record.log_data,
            ip_address: record.ip_address,
            logged_at: record.logged_at,
            received_at: record.received_at,
        };

        tokio::spawn(async move {
            if let Err(err) = realtime.notify_device_log(&log).await {
                tracing::warn!(device_id = log.device_id, "realtime push failed: {err}");
            }
        });
    }

    /// Best-effort alarm mail, one message per collected breach. Failures
    /// are swallowed; the device already has its acknowledgment.
    fn dispatch_alarms(&self, device: &DeviceWithCompany, alarms: &[AlarmInfo]) {
        if alarms.is_empty() || !self.mailer.is_enabled() {
            return;
        }

        let Some(recipient) = device.notify_recipient() else {
            return;
        };

        for alarm in alarms {
            let mailer = self.mailer.clone();
            let device_name = device.name.clone();
            let serial_number = device.serial_number.clone();
            let recipient = recipient.to_string();
            let alarm = alarm.clone();

            tokio::spawn(async move {
                if let Err(err) = mailer
                    .send_alarm_notification(&device_name, &serial_number, &alarm, &recipient)
                    .await
                {
                    tracing::warn!(
                        serial_number = %serial_number,
                        log_key = %alarm.key,
                        "alarm notification failed: {err}"
                    );
                }
            });
        }
    }
}

/// Convert, classify and assemble the row for one reading.
#[allow(clippy::too_many_arguments)]
fn build_record(
    device: &DeviceWithCompany,
    log_key: &str,
    raw_value: Option<f64>,
    data: Option<&serde_json::Value>,
    config: Option<&SensorConfig>,
    ip_address: Option<String>,
    logged_at: OffsetDateTime,
    received_at: OffsetDateTime,
) -> (NewDeviceLog, ReadingStatus, Option<AlarmInfo>) {
    // Timestamps are stored uniformly in UTC regardless of the offset the
    // device reported in.
    let logged_at = logged_at.to_offset(time::UtcOffset::UTC);

    let converted = raw_value.map(|raw| signal_service::convert(raw, config));

    let status = match converted {
        Some(value) => signal_service::classify(value, config, true),
        None => ReadingStatus::Normal,
    };

    let alarm = converted.and_then(|value| {
        signal_service::check_alarm(value, config).map(|breach| AlarmInfo {
            key: log_key.to_string(),
            alarm_type: breach.alarm_type,
            value,
            message: breach.message,
            status,
        })
    });

    let record = NewDeviceLog {
        device_id: device.id,
        serial_number: device.serial_number.clone(),
        log_key: log_key.to_string(),
        log_value: converted,
        status: status.as_str().to_string(),
        log_data: data.map(|value| value.to_string()),
        ip_address,
        logged_at,
        received_at,
    };

    (record, status, alarm)
}

#[cfg(test)]
mod tests {
    use orca_api::LogEntry;

    use crate::configs::{Mailer, Realtime};
    use crate::errors::AuthError;
    use crate::services::AuthService;
    use crate::services::credential_service::expected_signature;
    use crate::tests::*;

    use super::*;

    fn disabled_mailer() -> Mailer {
        Mailer {
            enabled: false,
            endpoint: String::new(),
            from_address: "noreply@orca.local".to_string(),
            from_name: "Orca".to_string(),
        }
    }

    fn disabled_realtime() -> Realtime {
        Realtime {
            enabled: false,
            endpoint: String::new(),
        }
    }

    fn ingest_service(storage: Arc<Storage>) -> IngestService {
        let credentials = Arc::new(CredentialService::new(
            storage.clone(),
            Arc::new(AuthService::new()),
        ));
        IngestService::new(
            storage,
            credentials,
            Arc::new(MailerService::new(disabled_mailer())),
            Arc::new(RealtimeService::new(disabled_realtime())),
        )
    }

    async fn provision_device(storage: Arc<Storage>, serial: &str) -> (i32, String) {
        let company = create_test_company(storage.clone(), "Acme", true).await;
        let device = create_test_device(storage.clone(), company.id, serial, true).await;

        let api_key = "f".repeat(64);
        sqlx::query("UPDATE devices SET api_key = $1 WHERE id = $2")
            .bind(&api_key)
            .bind(device.id)
            .execute(storage.get_pool())
            .await
            .unwrap();

        (device.id, api_key)
    }

    fn signed_batch(serial: &str, api_key: &str, logs: Vec<LogEntry>) -> BatchLogRequest {
        let timestamp = OffsetDateTime::now_utc().unix_timestamp();
        BatchLogRequest {
            serial_number: serial.to_string(),
            timestamp,
            signature: expected_signature(api_key, timestamp),
            logged_at: None,
            logs,
        }
    }

    fn entry(key: Option<&str>, value: f64) -> LogEntry {
        LogEntry {
            key: key.map(str::to_string),
            value: Some(value),
            data: None,
            timestamp: None,
        }
    }

    #[tokio::test]
    async fn test_partial_batch_saves_valid_entries() {
        let storage = setup_test_db().await;
        let (_, api_key) = provision_device(storage.clone(), "UA-001").await;
        let service = ingest_service(storage.clone());

        let request = signed_batch(
            "UA-001",
            &api_key,
            vec![
                entry(Some("temp"), 21.0),
                entry(Some("humidity"), 60.0),
                entry(None, 99.0),
                entry(Some("pressure"), 1013.0),
                entry(Some("co2"), 450.0),
            ],
        );

        let outcome = service.ingest_batch(&request, None).await.unwrap();
        assert_eq!(outcome.count, 4);
        assert_eq!(outcome.log_ids.len(), 4);
        assert!(outcome.alarms.is_empty());
    }

    #[tokio::test]
    async fn test_all_malformed_batch_fails() {
        let storage = setup_test_db().await;
        let (_, api_key) = provision_device(storage.clone(), "UA-001").await;
        let service = ingest_service(storage.clone());

        let request = signed_batch(
            "UA-001",
            &api_key,
            vec![entry(None, 1.0), entry(None, 2.0), entry(Some(""), 3.0)],
        );

        let err = service.ingest_batch(&request, None).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::IngestError(IngestError::NothingSaved)
        ));
    }

    #[tokio::test]
    async fn test_auth_failure_aborts_whole_batch() {
        let storage = setup_test_db().await;
        let (device_id, _) = provision_device(storage.clone(), "UA-001").await;
        let service = ingest_service(storage.clone());

        let timestamp = OffsetDateTime::now_utc().unix_timestamp();
        let request = BatchLogRequest {
            serial_number: "UA-001".to_string(),
            timestamp,
            signature: "0".repeat(64),
            logged_at: None,
            logs: vec![entry(Some("temp"), 21.0)],
        };

        let err = service.ingest_batch(&request, None).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::AuthError(AuthError::InvalidSignature)
        ));

        // No partial writes
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM device_logs WHERE device_id = $1")
                .bind(device_id)
                .fetch_one(storage.get_pool())
                .await
                .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_heartbeat_is_server_time_not_device_time() {
        let storage = setup_test_db().await;
        let (device_id, api_key) = provision_device(storage.clone(), "UA-001").await;
        let service = ingest_service(storage.clone());

        // Device claims its readings are a day old
        let mut request = signed_batch("UA-001", &api_key, vec![entry(Some("temp"), 21.0)]);
        let device_time = OffsetDateTime::now_utc() - time::Duration::days(1);
        request.logged_at = Some(device_time);

        let before = OffsetDateTime::now_utc();
        service.ingest_batch(&request, None).await.unwrap();

        let device = DeviceRepository::new(storage.clone())
            .find_by_id(device_id)
            .await
            .unwrap()
            .unwrap();
        let last_seen = device.last_seen_at.unwrap();
        assert!(last_seen >= before);

        // The reading itself keeps the device-supplied time
        let log = DeviceLogRepository::new(storage.clone())
            .latest_for_device(device_id, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(log.logged_at, device_time);
    }

    #[tokio::test]
    async fn test_conversion_and_alarm_collection() {
        let storage = setup_test_db().await;
        let (device_id, api_key) = provision_device(storage.clone(), "UA-001").await;

        // 4-20 mA channel spanning 0..100 with a high alarm at 90
        let mut config =
            create_test_sensor_config(storage.clone(), device_id, "pressure", "4-20").await;
        config.max_alarm = Some(90.0);
        config.alarm_enabled = true;
        crate::repositories::SensorConfigRepository::new(storage.clone())
            .upsert(&config)
            .await
            .unwrap();

        let service = ingest_service(storage.clone());
        let request = signed_batch("UA-001", &api_key, vec![entry(Some("pressure"), 20.0)]);

        let outcome = service.ingest_batch(&request, None).await.unwrap();
        assert_eq!(outcome.count, 1);
        assert_eq!(outcome.alarms.len(), 1);
        assert_eq!(outcome.alarms[0].value, 100.0);
        assert_eq!(outcome.alarms[0].status, ReadingStatus::Critical);

        let log = DeviceLogRepository::new(storage.clone())
            .latest_for_device(device_id, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(log.log_value, Some(100.0));
        assert_eq!(log.status, "critical");
    }

    #[tokio::test]
    async fn test_single_reading_submission() {
        let storage = setup_test_db().await;
        let (_, api_key) = provision_device(storage.clone(), "UA-001").await;
        let service = ingest_service(storage.clone());

        let timestamp = OffsetDateTime::now_utc().unix_timestamp();
        let request = SingleLogRequest {
            serial_number: "UA-001".to_string(),
            timestamp,
            signature: expected_signature(&api_key, timestamp),
            key: "temp".to_string(),
            value: Some(21.5),
            data: None,
            logged_at: None,
        };

        let outcome = service.ingest_single(&request, None).await.unwrap();
        assert!(outcome.log_id > 0);
        assert_eq!(outcome.status, ReadingStatus::Normal);
        assert!(outcome.alarm.is_none());
    }
}
