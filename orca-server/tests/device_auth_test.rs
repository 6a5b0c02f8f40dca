use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use orca_server::services::AuthService;
use orca_server::tests::{create_test_company, create_test_device};

mod common;
use common::mock_app::MockApp;

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn auth_request(serial_number: &str, device_secret: &str) -> Request<Body> {
    Request::builder()
        .uri("/api/device/auth")
        .method(Method::POST)
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "serial_number": serial_number,
                "device_secret": device_secret,
            })
            .to_string(),
        ))
        .unwrap()
}

#[tokio::test]
async fn test_bootstrap_exchange_issues_api_key() {
    let app = MockApp::new().await;
    let company = create_test_company(app.storage.clone(), "Acme", true).await;
    let device = create_test_device(app.storage.clone(), company.id, "UA-001", true).await;

    let hash = AuthService::new().hash("hunter2").unwrap();
    sqlx::query("UPDATE devices SET device_secret = $1 WHERE id = $2")
        .bind(&hash)
        .bind(device.id)
        .execute(app.storage.get_pool())
        .await
        .unwrap();

    let response = app
        .router
        .clone()
        .oneshot(auth_request("UA-001", "hunter2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    let first_key = body["api_key"].as_str().unwrap().to_string();
    assert_eq!(first_key.len(), 64);

    // Every successful exchange rotates the key
    let response = app
        .router
        .clone()
        .oneshot(auth_request("UA-001", "hunter2"))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_ne!(body["api_key"].as_str().unwrap(), first_key);
}

#[tokio::test]
async fn test_bootstrap_exchange_failures() {
    let app = MockApp::new().await;
    let company = create_test_company(app.storage.clone(), "Acme", true).await;
    let device = create_test_device(app.storage.clone(), company.id, "UA-001", true).await;
    create_test_device(app.storage.clone(), company.id, "UA-002", false).await;

    // Unknown serial
    let response = app
        .router
        .clone()
        .oneshot(auth_request("UA-404", "whatever"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Inactive device
    let response = app
        .router
        .clone()
        .oneshot(auth_request("UA-002", "whatever"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Secret not provisioned
    let response = app
        .router
        .clone()
        .oneshot(auth_request("UA-001", "whatever"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Wrong secret
    let hash = AuthService::new().hash("hunter2").unwrap();
    sqlx::query("UPDATE devices SET device_secret = $1 WHERE id = $2")
        .bind(&hash)
        .bind(device.id)
        .execute(app.storage.get_pool())
        .await
        .unwrap();

    let response = app
        .router
        .clone()
        .oneshot(auth_request("UA-001", "wrong"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["success"], json!(false));
}
