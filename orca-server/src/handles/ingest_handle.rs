use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use orca_api::{BatchLogRequest, BatchLogResponse, SingleLogRequest, SingleLogResponse};

use crate::errors::ApiError;
use crate::services::IngestService;

#[derive(Clone)]
pub struct IngestState {
    pub ingest_service: Arc<IngestService>,
}

fn peer_ip(connect_info: Option<ConnectInfo<SocketAddr>>) -> Option<String> {
    connect_info.map(|info| info.0.ip().to_string())
}

pub async fn submit_logs(
    State(state): State<IngestState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Json(request): Json<BatchLogRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .ingest_service
        .ingest_batch(&request, peer_ip(connect_info))
        .await?;

    let alarms = (!outcome.alarms.is_empty()).then_some(outcome.alarms);

    Ok((
        StatusCode::CREATED,
        Json(BatchLogResponse {
            success: true,
            count: outcome.count,
            log_ids: outcome.log_ids,
            alarms,
        }),
    ))
}

pub async fn submit_log(
    State(state): State<IngestState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Json(request): Json<SingleLogRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .ingest_service
        .ingest_single(&request, peer_ip(connect_info))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SingleLogResponse {
            success: true,
            log_id: outcome.log_id,
            status: outcome.status,
            alarm: outcome.alarm,
        }),
    ))
}
