use std::time::Duration;

use orca_api::AlarmInfo;
use serde_json::json;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::configs::Mailer;

/// Alarm notifications via an HTTP mail relay. The relay is a best-effort
/// collaborator: it must never be able to delay or fail an ingestion
/// response, so callers spawn sends and drop the result.
pub struct MailerService {
    client: reqwest::Client,
    config: Mailer,
}

impl MailerService {
    pub fn new(config: Mailer) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("failed to build mail relay client");

        Self { client, config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled && !self.config.endpoint.is_empty()
    }

    pub async fn send_alarm_notification(
        &self,
        device_name: &str,
        serial_number: &str,
        alarm: &AlarmInfo,
        recipient: &str,
    ) -> anyhow::Result<()> {
        if !self.is_enabled() {
            anyhow::bail!("mail relay is not configured or disabled");
        }

        let timestamp = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();
        let payload = json!({
            "to": recipient,
            "from": {
                "address": self.config.from_address,
                "name": self.config.from_name,
            },
            "subject": format!(
                "[Orca Alert] {} alarm on {}",
                alarm.alarm_type, device_name
            ),
            "alarm": {
                "device": device_name,
                "serial_number": serial_number,
                "key": alarm.key,
                "value": alarm.value,
                "type": alarm.alarm_type,
                "status": alarm.status,
                "message": alarm.message,
                "timestamp": timestamp,
            },
        });

        self.client
            .post(&self.config.endpoint)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}
