//! REST status and control server
//!
//! Small axum router exposing daemon health and per-sensor start/stop.
//! Runs on its own current-thread tokio runtime so the rest of the daemon
//! stays plain threads.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use log::info;
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::sensors::SensorManager;
use crate::transport::{Publisher, StopSignal};

#[derive(Clone)]
pub struct ApiState {
    pub manager: Arc<Mutex<SensorManager>>,
    pub publisher: Arc<Mutex<Publisher>>,
    pub started: Instant,
}

type ApiError = (StatusCode, Json<Value>);

fn not_found(id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": format!("unknown sensor: {id}") })),
    )
}

fn internal(err: Error) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": err.to_string() })),
    )
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/status", get(get_status))
        .route("/sensors", get(get_sensors))
        .route("/sensors/:id/start", post(start_sensor))
        .route("/sensors/:id/stop", post(stop_sensor))
        .with_state(state)
}

async fn get_status(State(state): State<ApiState>) -> Json<Value> {
    let messages_sent = state
        .publisher
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .messages_sent();
    let statuses = state
        .manager
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .statuses();
    let active = statuses.iter().filter(|s| s.active).count();
    Json(json!({
        "uptime_seconds": state.started.elapsed().as_secs(),
        "messages_sent": messages_sent,
        "sensors_total": statuses.len(),
        "sensors_active": active,
    }))
}

async fn get_sensors(State(state): State<ApiState>) -> Json<Value> {
    let statuses = state
        .manager
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .statuses();
    Json(json!({ "sensors": statuses }))
}

async fn start_sensor(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> std::result::Result<Json<Value>, ApiError> {
    let mut manager = state.manager.lock().unwrap_or_else(|e| e.into_inner());
    let sensor = manager.get_mut(&id).ok_or_else(|| not_found(&id))?;
    sensor.start().map_err(internal)?;
    info!("sensor '{id}' started via api");
    Ok(Json(json!({ "id": id, "active": true })))
}

async fn stop_sensor(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> std::result::Result<Json<Value>, ApiError> {
    let mut manager = state.manager.lock().unwrap_or_else(|e| e.into_inner());
    let sensor = manager.get_mut(&id).ok_or_else(|| not_found(&id))?;
    sensor.stop();
    info!("sensor '{id}' stopped via api");
    Ok(Json(json!({ "id": id, "active": false })))
}

/// Serve the API until `stop` is requested. Blocks the calling thread on a
/// dedicated current-thread runtime.
pub fn serve(listen: SocketAddr, state: ApiState, stop: StopSignal) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(listen).await?;
        info!("api listening on {listen}");
        let shutdown = async move {
            while !stop.is_requested() {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        };
        axum::serve(listener, router(state))
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok::<(), Error>(())
    })?;
    info!("api stopped");
    Ok(())
}
