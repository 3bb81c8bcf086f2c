//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/start", post(start_handler))
        .route("/pause", post(pause_handler))
        .route("/resume", post(resume_handler))
        .route("/reset", post(reset_handler))
        .route("/acknowledge", post(acknowledge_handler))
        .route("/status", get(status_handler))
        .route("/settings", get(get_settings_handler).put(put_settings_handler))
        .route("/stages", post(add_stage_handler))
        .route("/stages/:id", patch(update_stage_handler).delete(remove_stage_handler))
        .route("/wake-lock", post(acquire_wake_lock_handler).delete(release_wake_lock_handler))
        .route("/events", get(events_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::app_state::tests::test_state;
    use axum::{
        body::{self, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt; // for `oneshot`

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn control_endpoints_drive_the_timer() {
        let (state, _dir) = test_state(false);
        let app = create_router(Arc::new(state));

        let (status, body) = call(&app, "POST", "/pause", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "unchanged");

        let (_, body) = call(&app, "POST", "/start", None).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["timer"]["running"], true);

        let (_, body) = call(&app, "POST", "/pause", None).await;
        assert_eq!(body["timer"]["paused"], true);

        let (_, body) = call(&app, "POST", "/resume", None).await;
        assert_eq!(body["timer"]["running"], true);

        let (_, body) = call(&app, "POST", "/acknowledge", None).await;
        assert_eq!(body["status"], "unchanged");

        let (_, body) = call(&app, "POST", "/reset", None).await;
        assert_eq!(body["timer"]["running"], false);
        assert_eq!(body["timer"]["paused"], false);
    }

    #[tokio::test]
    async fn status_reports_timer_and_metadata() {
        let (state, _dir) = test_state(false);
        let app = create_router(Arc::new(state));

        let (status, body) = call(&app, "GET", "/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["timer"]["totalSeconds"], 3600);
        assert_eq!(body["timer"]["nextStage"]["id"], "hop");
        assert_eq!(body["wakeLock"], false);
    }

    #[tokio::test]
    async fn stages_can_be_added_edited_and_removed() {
        let (state, _dir) = test_state(false);
        let app = create_router(Arc::new(state));

        let (status, created) = call(
            &app,
            "POST",
            "/stages",
            Some(json!({"label": "Whirlpool", "thresholdMinutes": "58", "sound": "chirp"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["thresholdMinutes"], 58.0);
        let id = created["id"].as_str().unwrap().to_string();

        let (status, updated) = call(
            &app,
            "PATCH",
            &format!("/stages/{}", id),
            Some(json!({"label": "Hop stand"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["label"], "Hop stand");
        assert_eq!(updated["id"], id.as_str());

        let (status, _) = call(&app, "DELETE", &format!("/stages/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(&app, "DELETE", &format!("/stages/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn settings_round_trip_through_the_api() {
        let (state, _dir) = test_state(false);
        let app = create_router(Arc::new(state));

        let (_, mut settings) = call(&app, "GET", "/settings", None).await;
        settings["totalMinutes"] = json!(90);
        settings["volume"] = json!(2.0);

        let (status, saved) = call(&app, "PUT", "/settings", Some(settings)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["totalMinutes"], 90);
        assert_eq!(saved["volume"], 1.0);

        let (_, body) = call(&app, "GET", "/status", None).await;
        assert_eq!(body["timer"]["totalSeconds"], 5400);
    }

    #[tokio::test]
    async fn loose_settings_values_are_recovered() {
        let (state, _dir) = test_state(false);
        let app = create_router(Arc::new(state));

        let (_, mut settings) = call(&app, "GET", "/settings", None).await;
        settings["totalMinutes"] = json!("90");
        settings["preAlertSeconds"] = json!(-10);
        settings["volume"] = json!("loud");

        let (status, saved) = call(&app, "PUT", "/settings", Some(settings)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["totalMinutes"], 90);
        assert_eq!(saved["preAlertSeconds"], 0);
        assert_eq!(saved["stages"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn wake_lock_endpoints() {
        let (state, _dir) = test_state(false);
        let app = create_router(Arc::new(state));

        let (_, body) = call(&app, "POST", "/wake-lock", None).await;
        assert_eq!(body["held"], true);
        let (_, body) = call(&app, "GET", "/status", None).await;
        assert_eq!(body["wakeLock"], true);
        let (_, body) = call(&app, "DELETE", "/wake-lock", None).await;
        assert_eq!(body["held"], false);
    }

    #[tokio::test]
    async fn health_check() {
        let (state, _dir) = test_state(false);
        let app = create_router(Arc::new(state));

        let (status, body) = call(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
