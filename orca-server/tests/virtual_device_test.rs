use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use time::{Duration, OffsetDateTime};
use tower::ServiceExt;

use orca_server::models::VirtualDeviceSensor;
use orca_server::repositories::{DeviceLogRepository, GrantRepository, VirtualDeviceRepository};
use orca_server::tests::{
    create_test_company, create_test_device, create_test_virtual_device, test_log,
};

mod common;
use common::mock_app::MockApp;

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(Method::GET)
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn seeded_virtual_device(app: &MockApp) -> (i32, i32) {
    let company = create_test_company(app.storage.clone(), "Acme", true).await;
    let device = create_test_device(app.storage.clone(), company.id, "UA-001", true).await;
    let vd = create_test_virtual_device(app.storage.clone(), company.id, "Overview").await;

    let repo = VirtualDeviceRepository::new(app.storage.clone());
    for (index, key) in ["temp", "humidity", "co2"].iter().enumerate() {
        repo.add_sensor(&VirtualDeviceSensor {
            id: 0,
            virtual_device_id: vd.id,
            source_device_id: device.id,
            source_log_key: key.to_string(),
            display_label: None,
            display_order: index as i32,
        })
        .await
        .unwrap();
    }

    GrantRepository::new(app.storage.clone())
        .assign_virtual_device(app.user.id, vd.id)
        .await
        .unwrap();

    (vd.id, device.id)
}

#[tokio::test]
async fn test_virtual_device_aggregated_status() {
    let app = MockApp::new().await;
    let (vd_id, device_id) = seeded_virtual_device(&app).await;

    let logs = DeviceLogRepository::new(app.storage.clone());
    let now = OffsetDateTime::now_utc();
    logs.insert(&test_log(device_id, "UA-001", "temp", Some(21.0), now - Duration::minutes(5)))
        .await
        .unwrap();
    logs.insert(&test_log(
        device_id,
        "UA-001",
        "humidity",
        Some(55.0),
        now - Duration::minutes(10),
    ))
    .await
    .unwrap();

    let uri = format!("/api/virtual-devices/{vd_id}/status");
    let response = app
        .router
        .clone()
        .oneshot(get(&uri, &app.token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let status = &body["status"];
    assert_eq!(status["total_count"], json!(3));
    assert_eq!(status["live_count"], json!(2));
    assert_eq!(status["is_online"], json!(true));
    assert_eq!(status["all_online"], json!(false));
}

#[tokio::test]
async fn test_virtual_device_full_payload() {
    let app = MockApp::new().await;
    let (vd_id, device_id) = seeded_virtual_device(&app).await;

    let logs = DeviceLogRepository::new(app.storage.clone());
    let now = OffsetDateTime::now_utc();
    logs.insert(&test_log(device_id, "UA-001", "temp", Some(21.5), now))
        .await
        .unwrap();

    let uri = format!("/api/virtual-devices/{vd_id}");
    let response = app
        .router
        .clone()
        .oneshot(get(&uri, &app.token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let vd = &body["virtual_device"];
    assert_eq!(vd["name"], json!("Overview"));
    let sensors = vd["sensors"].as_array().unwrap();
    assert_eq!(sensors.len(), 3);
    assert_eq!(sensors[0]["label"], json!("temp"));
    assert_eq!(sensors[0]["value"], json!(21.5));
    assert_eq!(sensors[0]["liveness"], json!("live"));
    assert_eq!(sensors[2]["liveness"], json!("unknown"));
}

#[tokio::test]
async fn test_virtual_device_logs_window() {
    let app = MockApp::new().await;
    let (vd_id, device_id) = seeded_virtual_device(&app).await;

    let logs = DeviceLogRepository::new(app.storage.clone());
    let now = OffsetDateTime::now_utc();
    for i in 0..4 {
        logs.insert(&test_log(
            device_id,
            "UA-001",
            "temp",
            Some(20.0 + i as f64),
            now - Duration::minutes(10 * i),
        ))
        .await
        .unwrap();
    }

    let uri = format!("/api/virtual-devices/{vd_id}/logs?limit=2&offset=0");
    let response = app
        .router
        .clone()
        .oneshot(get(&uri, &app.token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["total"], json!(4));
    assert_eq!(body["logs"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_virtual_device_requires_grant() {
    let app = MockApp::new().await;
    let company = create_test_company(app.storage.clone(), "Acme", true).await;
    let vd = create_test_virtual_device(app.storage.clone(), company.id, "Private").await;

    let uri = format!("/api/virtual-devices/{}", vd.id);
    let response = app
        .router
        .clone()
        .oneshot(get(&uri, &app.token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
