use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use time::OffsetDateTime;
use tower::ServiceExt;

use orca_server::models::SensorConfig;
use orca_server::repositories::SensorConfigRepository;
use orca_server::services::expected_signature;
use orca_server::tests::{create_test_company, create_test_device};

mod common;
use common::mock_app::MockApp;

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

async fn provision(app: &MockApp, serial: &str) -> (i32, String) {
    let company = create_test_company(app.storage.clone(), "Acme", true).await;
    let device = create_test_device(app.storage.clone(), company.id, serial, true).await;

    let api_key = "d".repeat(64);
    sqlx::query("UPDATE devices SET api_key = $1 WHERE id = $2")
        .bind(&api_key)
        .bind(device.id)
        .execute(app.storage.get_pool())
        .await
        .unwrap();

    (device.id, api_key)
}

fn batch_request(serial: &str, api_key: &str, logs: Value) -> Request<Body> {
    let timestamp = OffsetDateTime::now_utc().unix_timestamp();
    Request::builder()
        .uri("/api/device/logs")
        .method(Method::POST)
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "serial_number": serial,
                "timestamp": timestamp,
                "signature": expected_signature(api_key, timestamp),
                "logs": logs,
            })
            .to_string(),
        ))
        .unwrap()
}

#[tokio::test]
async fn test_batch_submission_with_partial_loss() {
    let app = MockApp::new().await;
    let (_, api_key) = provision(&app, "UA-001").await;

    let logs = json!([
        { "key": "temperature", "value": 25.5 },
        { "key": "humidity", "value": 60.0 },
        { "value": 1013.0 },
        { "key": "pressure", "value": 1013.0 },
        { "key": "co2", "value": 450.0 },
    ]);

    let response = app
        .router
        .clone()
        .oneshot(batch_request("UA-001", &api_key, logs))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["count"], json!(4));
    assert_eq!(body["log_ids"].as_array().unwrap().len(), 4);
    assert!(body.get("alarms").is_none());
}

#[tokio::test]
async fn test_batch_of_only_malformed_entries_fails() {
    let app = MockApp::new().await;
    let (_, api_key) = provision(&app, "UA-001").await;

    let logs = json!([{ "value": 1.0 }, { "value": 2.0 }]);

    let response = app
        .router
        .clone()
        .oneshot(batch_request("UA-001", &api_key, logs))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_forged_signature_rejected_without_writes() {
    let app = MockApp::new().await;
    let (device_id, _) = provision(&app, "UA-001").await;

    let timestamp = OffsetDateTime::now_utc().unix_timestamp();
    let request = Request::builder()
        .uri("/api/device/logs")
        .method(Method::POST)
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "serial_number": "UA-001",
                "timestamp": timestamp,
                "signature": "0".repeat(64),
                "logs": [{ "key": "temperature", "value": 25.5 }],
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM device_logs WHERE device_id = $1")
        .bind(device_id)
        .fetch_one(app.storage.get_pool())
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_expired_timestamp_rejected() {
    let app = MockApp::new().await;
    let (_, api_key) = provision(&app, "UA-001").await;

    // Correctly signed, but ten minutes old
    let timestamp = OffsetDateTime::now_utc().unix_timestamp() - 600;
    let request = Request::builder()
        .uri("/api/device/logs")
        .method(Method::POST)
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "serial_number": "UA-001",
                "timestamp": timestamp,
                "signature": expected_signature(&api_key, timestamp),
                "logs": [{ "key": "temperature", "value": 25.5 }],
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_loop_channel_breach_reports_alarm() {
    let app = MockApp::new().await;
    let (device_id, api_key) = provision(&app, "UA-001").await;

    SensorConfigRepository::new(app.storage.clone())
        .upsert(&SensorConfig {
            id: 0,
            device_id,
            log_key: "pressure".to_string(),
            data_type: "4-20".to_string(),
            zero_value: 0.0,
            span_value: 10.0,
            unit: Some("bar".to_string()),
            decimals: 2,
            min_alarm: None,
            max_alarm: Some(9.0),
            alarm_enabled: true,
            label: None,
        })
        .await
        .unwrap();

    // 20 mA converts to 10.0 bar, above the 9.0 alarm
    let logs = json!([{ "key": "pressure", "value": 20.0 }]);
    let response = app
        .router
        .clone()
        .oneshot(batch_request("UA-001", &api_key, logs))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    let alarms = body["alarms"].as_array().unwrap();
    assert_eq!(alarms.len(), 1);
    assert_eq!(alarms[0]["key"], json!("pressure"));
    assert_eq!(alarms[0]["type"], json!("high"));
    assert_eq!(alarms[0]["value"], json!(10.0));
    assert_eq!(alarms[0]["status"], json!("critical"));

    let status: String =
        sqlx::query_scalar("SELECT status FROM device_logs WHERE device_id = $1")
            .bind(device_id)
            .fetch_one(app.storage.get_pool())
            .await
            .unwrap();
    assert_eq!(status, "critical");
}

#[tokio::test]
async fn test_single_reading_endpoint() {
    let app = MockApp::new().await;
    let (_, api_key) = provision(&app, "UA-001").await;

    let timestamp = OffsetDateTime::now_utc().unix_timestamp();
    let request = Request::builder()
        .uri("/api/device/log")
        .method(Method::POST)
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "serial_number": "UA-001",
                "timestamp": timestamp,
                "signature": expected_signature(&api_key, timestamp),
                "key": "temperature",
                "value": 25.5,
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["status"], json!("normal"));
    assert!(body["log_id"].as_i64().unwrap() > 0);
}
