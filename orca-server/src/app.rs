use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::configs::{SchemaManager, Settings, Storage};
use crate::handles::*;
use crate::middlewares::{TokenState, auth};
use crate::services::{
    AccessService, AuthService, CredentialService, IngestService, MailerService, RealtimeService,
    StatusService, TokenService, VirtualDeviceService,
};

pub async fn create_app(settings: &Arc<Settings>) -> Router {
    let storage = Arc::new(
        Storage::new(settings.database.clone(), SchemaManager::default())
            .await
            .unwrap(),
    );

    build_router(storage, settings)
}

/// Wire every service against one injected storage handle and assemble
/// the routers. Split from `create_app` so tests can bring their own
/// (in-memory) storage.
pub fn build_router(storage: Arc<Storage>, settings: &Settings) -> Router {
    let auth_service = Arc::new(AuthService::new());
    let token_service = Arc::new(TokenService::new(settings.auth.clone()));
    let credential_service = Arc::new(CredentialService::new(
        storage.clone(),
        auth_service.clone(),
    ));
    let mailer_service = Arc::new(MailerService::new(settings.mailer.clone()));
    let realtime_service = Arc::new(RealtimeService::new(settings.realtime.clone()));
    let ingest_service = Arc::new(IngestService::new(
        storage.clone(),
        credential_service.clone(),
        mailer_service,
        realtime_service,
    ));
    let access_service = Arc::new(AccessService::new(storage.clone()));
    let virtual_device_service = Arc::new(VirtualDeviceService::new(storage.clone()));
    let status_service = Arc::new(StatusService::new(storage.clone(), access_service.clone()));

    let token_state = TokenState {
        token_service: token_service.clone(),
        storage: storage.clone(),
    };

    // Device-facing endpoints authenticate with credentials, not tokens
    let device = Router::new()
        .route("/auth", post(authenticate_device))
        .with_state(DeviceAuthState {
            credential_service: credential_service.clone(),
        })
        .merge(
            Router::new()
                .route("/logs", post(submit_logs))
                .route("/log", post(submit_log))
                .with_state(IngestState {
                    ingest_service: ingest_service.clone(),
                }),
        );

    let devices = Router::new()
        .route("/status", get(get_devices_status))
        .route("/:device_id/last_update", get(get_device_last_update))
        .route("/:device_id/logs", get(get_device_logs))
        .with_state(DeviceState {
            storage: storage.clone(),
            access_service: access_service.clone(),
        })
        .merge(
            Router::new()
                .route("/:device_id/configs", get(get_sensor_configs))
                .route(
                    "/:device_id/configs/:log_key",
                    put(upsert_sensor_config).delete(delete_sensor_config),
                )
                .with_state(SensorConfigState {
                    storage: storage.clone(),
                    access_service: access_service.clone(),
                }),
        )
        .route_layer(middleware::from_fn_with_state(token_state.clone(), auth));

    let virtual_devices = Router::new()
        .route("/:virtual_device_id", get(get_virtual_device))
        .route("/:virtual_device_id/status", get(get_virtual_device_status))
        .route("/:virtual_device_id/logs", get(get_virtual_device_logs))
        .route_layer(middleware::from_fn_with_state(token_state.clone(), auth))
        .with_state(VirtualDeviceState {
            virtual_device_service: virtual_device_service.clone(),
            access_service: access_service.clone(),
        });

    let summary = Router::new()
        .route("/warnings", get(get_warning_summary))
        .route_layer(middleware::from_fn_with_state(token_state.clone(), auth))
        .with_state(SummaryState {
            status_service: status_service.clone(),
            access_service: access_service.clone(),
        });

    Router::new()
        .nest(
            "/api",
            Router::new()
                .nest("/device", device)
                .nest("/devices", devices)
                .nest("/virtual-devices", virtual_devices)
                .nest("/summary", summary),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
