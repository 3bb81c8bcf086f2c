//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{Stream, StreamExt};
use tokio_stream::wrappers::BroadcastStream;
use tracing::{error, info, warn};

use super::responses::{ApiResponse, HealthResponse, StatusResponse, WakeLockResponse};
use crate::{
    engine::{Settings, Stage, StageDraft, StageId, StagePatch},
    state::{AppState, StateError},
};

fn error_status(e: &StateError) -> StatusCode {
    match e {
        StateError::StageNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Handle POST /start - Start a fresh boil
pub async fn start_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.start() {
        Ok(timer) => {
            info!("Start endpoint called - boil started");
            Ok(Json(ApiResponse::applied("Boil started", timer)))
        }
        Err(e) => {
            error!("Failed to start boil: {}", e);
            Err(error_status(&e))
        }
    }
}

/// Handle POST /pause - Pause a running boil
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.pause() {
        Ok((true, timer)) => Ok(Json(ApiResponse::applied("Boil paused", timer))),
        Ok((false, timer)) => Ok(Json(ApiResponse::unchanged("Boil is not running", timer))),
        Err(e) => {
            error!("Failed to pause boil: {}", e);
            Err(error_status(&e))
        }
    }
}

/// Handle POST /resume - Resume a paused boil
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.resume() {
        Ok((true, timer)) => Ok(Json(ApiResponse::applied("Boil resumed", timer))),
        Ok((false, timer)) => Ok(Json(ApiResponse::unchanged("Boil is not paused", timer))),
        Err(e) => {
            error!("Failed to resume boil: {}", e);
            Err(error_status(&e))
        }
    }
}

/// Handle POST /reset - Clear the run and silence alerts
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.reset() {
        Ok(timer) => {
            info!("Reset endpoint called - boil reset");
            Ok(Json(ApiResponse::applied("Boil reset", timer)))
        }
        Err(e) => {
            error!("Failed to reset boil: {}", e);
            Err(error_status(&e))
        }
    }
}

/// Handle POST /acknowledge - Dismiss the active alert
pub async fn acknowledge_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.acknowledge() {
        Ok((true, timer)) => Ok(Json(ApiResponse::applied("Alert acknowledged", timer))),
        Ok((false, timer)) => Ok(Json(ApiResponse::unchanged("No active alert", timer))),
        Err(e) => {
            error!("Failed to acknowledge alert: {}", e);
            Err(error_status(&e))
        }
    }
}

/// Handle GET /status - Return current timer status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = state.status().map_err(|e| {
        error!("Failed to get timer status: {}", e);
        error_status(&e)
    })?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        wake_lock: state.wake_lock_held(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /settings
pub async fn get_settings_handler(State(state): State<Arc<AppState>>) -> Result<Json<Settings>, StatusCode> {
    state.settings().map(Json).map_err(|e| {
        error!("Failed to read settings: {}", e);
        error_status(&e)
    })
}

/// Handle PUT /settings - Replace and persist settings
pub async fn put_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<Settings>,
) -> Result<Json<Settings>, StatusCode> {
    match state.configure(settings) {
        Ok(settings) => {
            info!("Settings updated: {} stages over {} minutes", settings.stages.len(), settings.total_minutes);
            Ok(Json(settings))
        }
        Err(e) => {
            error!("Failed to update settings: {}", e);
            Err(error_status(&e))
        }
    }
}

/// Handle POST /stages - Add a stage
pub async fn add_stage_handler(
    State(state): State<Arc<AppState>>,
    Json(draft): Json<StageDraft>,
) -> Result<(StatusCode, Json<Stage>), StatusCode> {
    match state.add_stage(draft) {
        Ok(stage) => Ok((StatusCode::CREATED, Json(stage))),
        Err(e) => {
            error!("Failed to add stage: {}", e);
            Err(error_status(&e))
        }
    }
}

/// Handle PATCH /stages/:id - Edit a stage
pub async fn update_stage_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<StagePatch>,
) -> Result<Json<Stage>, StatusCode> {
    match state.update_stage(&StageId::from(id), patch) {
        Ok(stage) => Ok(Json(stage)),
        Err(e) => {
            warn!("Failed to update stage: {}", e);
            Err(error_status(&e))
        }
    }
}

/// Handle DELETE /stages/:id - Remove a stage
pub async fn remove_stage_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Stage>, StatusCode> {
    match state.remove_stage(&StageId::from(id)) {
        Ok(stage) => Ok(Json(stage)),
        Err(e) => {
            warn!("Failed to remove stage: {}", e);
            Err(error_status(&e))
        }
    }
}

/// Handle POST /wake-lock - Keep the machine awake
pub async fn acquire_wake_lock_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<WakeLockResponse>, StatusCode> {
    match state.acquire_wake_lock() {
        Ok(held) => Ok(Json(WakeLockResponse::new(held))),
        Err(e) => {
            error!("Failed to acquire wake lock: {}", e);
            Err(error_status(&e))
        }
    }
}

/// Handle DELETE /wake-lock - Allow the machine to sleep again
pub async fn release_wake_lock_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<WakeLockResponse>, StatusCode> {
    match state.release_wake_lock() {
        Ok(held) => Ok(Json(WakeLockResponse::new(held))),
        Err(e) => {
            error!("Failed to release wake lock: {}", e);
            Err(error_status(&e))
        }
    }
}

/// Handle GET /events - Stream alert events as server-sent events
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.subscribe_alerts()).filter_map(|notice| async move {
        match notice {
            Ok(notice) => match Event::default().event(notice.kind.as_str()).json_data(&notice) {
                Ok(event) => Some(Ok(event)),
                Err(e) => {
                    warn!("Failed to encode alert event: {}", e);
                    None
                }
            },
            Err(e) => {
                warn!("Alert stream subscriber fell behind: {}", e);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
