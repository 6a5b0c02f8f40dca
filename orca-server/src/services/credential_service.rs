use std::sync::Arc;

use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

use crate::configs::Storage;
use crate::errors::{ApiError, AuthError, DeviceError};
use crate::models::DeviceWithCompany;
use crate::repositories::DeviceRepository;
use crate::services::AuthService;

/// Accepted clock skew between a device's signing timestamp and server
/// time. The sole replay defense; there is no nonce store.
pub const REPLAY_WINDOW_SECS: i64 = 300;

const API_KEY_BYTES: usize = 32;

/// Device identity checks for both authentication protocols: the
/// password-based bootstrap exchange and the per-request signature scheme.
pub struct CredentialService {
    devices: DeviceRepository,
    auth_service: Arc<AuthService>,
}

impl CredentialService {
    pub fn new(storage: Arc<Storage>, auth_service: Arc<AuthService>) -> Self {
        Self {
            devices: DeviceRepository::new(storage),
            auth_service,
        }
    }

    async fn load_active_device(&self, serial_number: &str) -> Result<DeviceWithCompany, ApiError> {
        let device = self
            .devices
            .find_by_serial_with_company(serial_number)
            .await?
            .ok_or(DeviceError::DeviceNotFound)?;

        if !device.is_active {
            return Err(DeviceError::DeviceInactive.into());
        }
        if !device.company_active {
            return Err(DeviceError::CompanyInactive.into());
        }

        Ok(device)
    }

    /// Bootstrap exchange: trade the provisioned secret for a fresh API
    /// key. The key is regenerated on every successful call, so a leaked
    /// key ages out the next time the device re-authenticates.
    pub async fn authenticate(
        &self,
        serial_number: &str,
        device_secret: &str,
    ) -> Result<(DeviceWithCompany, String), ApiError> {
        let device = self.load_active_device(serial_number).await?;

        let stored_hash = device
            .device_secret
            .as_deref()
            .ok_or(AuthError::SecretNotConfigured)?;

        let valid = self
            .auth_service
            .verify(stored_hash, device_secret)
            .map_err(|_| AuthError::InvalidSecret)?;
        if !valid {
            return Err(AuthError::InvalidSecret.into());
        }

        let api_key = generate_api_key();
        self.devices.update_api_key(device.id, &api_key).await?;
        self.devices
            .touch_last_seen(device.id, OffsetDateTime::now_utc())
            .await?;

        Ok((device, api_key))
    }

    /// Signed-request scheme used on every telemetry submission.
    pub async fn verify_signature(
        &self,
        serial_number: &str,
        timestamp: i64,
        signature: &str,
        now: OffsetDateTime,
    ) -> Result<DeviceWithCompany, ApiError> {
        let device = self.load_active_device(serial_number).await?;

        if (now.unix_timestamp() - timestamp).abs() > REPLAY_WINDOW_SECS {
            return Err(AuthError::TimestampExpired.into());
        }

        // A device that never completed the bootstrap exchange has no key;
        // indistinguishable from a bad signature on purpose.
        let api_key = device
            .api_key
            .as_deref()
            .ok_or(AuthError::InvalidSignature)?;

        let expected = expected_signature(api_key, timestamp);
        let supplied = signature.trim().to_ascii_lowercase();
        if !constant_time_eq(expected.as_bytes(), supplied.as_bytes()) {
            return Err(AuthError::InvalidSignature.into());
        }

        Ok(device)
    }
}

/// Signature a correctly-configured device produces:
/// `hex(SHA256(api_key || decimal timestamp))`.
pub fn expected_signature(api_key: &str, timestamp: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(api_key.as_bytes());
    hasher.update(timestamp.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

fn generate_api_key() -> String {
    let mut bytes = [0u8; API_KEY_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use crate::tests::*;

    use super::*;

    async fn service(storage: Arc<Storage>) -> (CredentialService, Arc<AuthService>) {
        let auth_service = Arc::new(AuthService::new());
        (
            CredentialService::new(storage, auth_service.clone()),
            auth_service,
        )
    }

    #[tokio::test]
    async fn test_bootstrap_issues_fresh_api_key() {
        let storage = setup_test_db().await;
        let company = create_test_company(storage.clone(), "Acme", true).await;
        let device = create_test_device(storage.clone(), company.id, "UA-001", true).await;

        let (service, auth_service) = service(storage.clone()).await;
        let hash = auth_service.hash("hunter2").unwrap();
        sqlx::query("UPDATE devices SET device_secret = $1 WHERE id = $2")
            .bind(&hash)
            .bind(device.id)
            .execute(storage.get_pool())
            .await
            .unwrap();

        let (_, first_key) = service.authenticate("UA-001", "hunter2").await.unwrap();
        assert_eq!(first_key.len(), API_KEY_BYTES * 2);

        let (_, second_key) = service.authenticate("UA-001", "hunter2").await.unwrap();
        assert_ne!(first_key, second_key);

        // Heartbeat touched on successful bootstrap
        let repo = DeviceRepository::new(storage.clone());
        let stored = repo.find_by_id(device.id).await.unwrap().unwrap();
        assert!(stored.last_seen_at.is_some());
        assert_eq!(stored.api_key, Some(second_key));
    }

    #[tokio::test]
    async fn test_bootstrap_failure_paths() {
        let storage = setup_test_db().await;
        let active = create_test_company(storage.clone(), "Acme", true).await;
        let dormant = create_test_company(storage.clone(), "Dormant", false).await;
        let device = create_test_device(storage.clone(), active.id, "UA-001", true).await;
        create_test_device(storage.clone(), active.id, "UA-002", false).await;
        create_test_device(storage.clone(), dormant.id, "UA-003", true).await;

        let (service, auth_service) = service(storage.clone()).await;

        let err = service.authenticate("NOPE", "x").await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::DeviceError(DeviceError::DeviceNotFound)
        ));

        let err = service.authenticate("UA-002", "x").await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::DeviceError(DeviceError::DeviceInactive)
        ));

        let err = service.authenticate("UA-003", "x").await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::DeviceError(DeviceError::CompanyInactive)
        ));

        // No secret provisioned yet
        let err = service.authenticate("UA-001", "x").await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::AuthError(AuthError::SecretNotConfigured)
        ));

        let hash = auth_service.hash("hunter2").unwrap();
        sqlx::query("UPDATE devices SET device_secret = $1 WHERE id = $2")
            .bind(&hash)
            .bind(device.id)
            .execute(storage.get_pool())
            .await
            .unwrap();

        let err = service.authenticate("UA-001", "wrong").await.unwrap_err();
        assert!(matches!(err, ApiError::AuthError(AuthError::InvalidSecret)));
    }

    #[tokio::test]
    async fn test_signature_replay_window_boundary() {
        let storage = setup_test_db().await;
        let company = create_test_company(storage.clone(), "Acme", true).await;
        let device = create_test_device(storage.clone(), company.id, "UA-001", true).await;

        let api_key = "a".repeat(64);
        sqlx::query("UPDATE devices SET api_key = $1 WHERE id = $2")
            .bind(&api_key)
            .bind(device.id)
            .execute(storage.get_pool())
            .await
            .unwrap();

        let (service, _) = service(storage.clone()).await;
        let signed_at = OffsetDateTime::now_utc();
        let timestamp = signed_at.unix_timestamp();
        let signature = expected_signature(&api_key, timestamp);

        // Verified 299s after signing: inside the window
        let ok = service
            .verify_signature(
                "UA-001",
                timestamp,
                &signature,
                signed_at + time::Duration::seconds(299),
            )
            .await;
        assert!(ok.is_ok());

        // 301s after signing: replay-window exceeded
        let err = service
            .verify_signature(
                "UA-001",
                timestamp,
                &signature,
                signed_at + time::Duration::seconds(301),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::AuthError(AuthError::TimestampExpired)
        ));
    }

    #[tokio::test]
    async fn test_signature_mismatch_rejected() {
        let storage = setup_test_db().await;
        let company = create_test_company(storage.clone(), "Acme", true).await;
        let device = create_test_device(storage.clone(), company.id, "UA-001", true).await;

        let api_key = "b".repeat(64);
        sqlx::query("UPDATE devices SET api_key = $1 WHERE id = $2")
            .bind(&api_key)
            .bind(device.id)
            .execute(storage.get_pool())
            .await
            .unwrap();

        let (service, _) = service(storage.clone()).await;
        let now = OffsetDateTime::now_utc();
        let timestamp = now.unix_timestamp();

        let err = service
            .verify_signature("UA-001", timestamp, &"0".repeat(64), now)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::AuthError(AuthError::InvalidSignature)
        ));

        // Signature computed against a different key
        let foreign = expected_signature(&"c".repeat(64), timestamp);
        let err = service
            .verify_signature("UA-001", timestamp, &foreign, now)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::AuthError(AuthError::InvalidSignature)
        ));
    }
}
