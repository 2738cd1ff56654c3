//! The axum router and HTTP handlers: the external interface described in
//! SPEC_FULL.md §6. This module owns no domain logic — it decodes JSON,
//! calls into the [`coordinator`](crate::coordinator) and
//! [`query`](crate::query) modules, and re-encodes the result.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::time::Duration;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::coordinator::IngestionCoordinator;
use crate::error::ApiError;
use crate::query;
use crate::types::RawEnvelope;

/// A single envelope is a few hundred bytes; 64 KiB is generous headroom
/// without leaving the ingestion endpoint open to unbounded bodies.
const MAX_ENVELOPE_BYTES: usize = 64 * 1024;

/// The core never yields mid-drain (SPEC_FULL.md §5), so this bounds only
/// queueing/lock-wait time under pathological contention, not an
/// in-progress reconstruction.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<IngestionCoordinator>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            coordinator: Arc::new(IngestionCoordinator::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the application router.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/messages", post(post_message))
        .route("/rockets", get(get_rockets))
        .route("/rockets/:id", get(get_rocket_by_id))
        .route("/missions", get(get_missions))
        .route("/missions/:name", get(get_rockets_by_mission))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(RequestBodyLimitLayer::new(MAX_ENVELOPE_BYTES))
        .with_state(state)
}

/// `POST /messages` — ingest one envelope. Malformed envelopes and
/// data-path drops (stale, duplicate, unknown channel) never surface as an
/// HTTP error; the body just echoes what was received. A non-JSON body is
/// rejected by the `Json` extractor before this handler runs (400).
async fn post_message(State(state): State<AppState>, Json(raw): Json<RawEnvelope>) -> Response {
    let received = json!({
        "metadata": raw.metadata,
        "message": raw.message,
    });
    state.coordinator.ingest(raw);
    (
        StatusCode::OK,
        Json(json!({ "status": "success", "message_received": received })),
    )
        .into_response()
}

/// `GET /rockets` — the full fleet, ascending by `launch_time`.
async fn get_rockets(State(state): State<AppState>) -> Response {
    let rockets = query::list_fleet(state.coordinator.registry());
    Json(rockets).into_response()
}

/// `GET /rockets/<id>` — a single rocket, or 404 if unknown.
async fn get_rocket_by_id(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    query::rocket_by_id(state.coordinator.registry(), &id)
        .map(|snapshot| Json(snapshot).into_response())
        .ok_or_else(|| ApiError::RocketNotFound(id))
}

/// `GET /missions` — sorted unique mission strings.
async fn get_missions(State(state): State<AppState>) -> Response {
    let missions = query::list_missions(state.coordinator.registry());
    Json(json!({ "missions": missions })).into_response()
}

/// `GET /missions/<name>` — case-insensitive match; 404 on an empty result.
async fn get_rockets_by_mission(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    let rockets = query::rockets_by_mission(state.coordinator.registry(), &name);
    if rockets.is_empty() {
        return Err(ApiError::MissionNotFound(name));
    }
    Ok(Json(json!({ "mission": name, "rockets": rockets })).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        create_app(AppState::new())
    }

    async fn post_json(app: Router, path: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(path)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn get_json(app: Router, path: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    fn launch_envelope(channel: &str) -> Value {
        json!({
            "metadata": {
                "channel": channel,
                "messageNumber": 1,
                "messageType": "RocketLaunched",
                "messageTime": "2025-05-14T10:00:00",
            },
            "message": {"type": "Falcon", "launchSpeed": 1000, "mission": "MoonLanding"},
        })
    }

    #[tokio::test]
    async fn post_messages_echoes_success() {
        let (status, body) = post_json(app(), "/messages", launch_envelope("r1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
    }

    #[tokio::test]
    async fn full_happy_path_s1() {
        let app = app();
        post_json(app.clone(), "/messages", launch_envelope("r1")).await;
        post_json(
            app.clone(),
            "/messages",
            json!({
                "metadata": {
                    "channel": "r1",
                    "messageNumber": 2,
                    "messageType": "RocketSpeedIncreased",
                    "messageTime": "2025-05-14T10:01:00",
                },
                "message": {"by": 500},
            }),
        )
        .await;

        let (status, body) = get_json(app, "/rockets/r1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["speed"], 1500);
        assert_eq!(body["last_message_number"], 2);
        assert_eq!(body["mission"], "MoonLanding");
    }

    #[tokio::test]
    async fn unknown_rocket_is_404() {
        let (status, _) = get_json(app(), "/rockets/ghost").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn empty_mission_filter_is_404() {
        let (status, _) = get_json(app(), "/missions/nonexistent").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn mission_filter_is_case_insensitive_s6() {
        let app = app();
        post_json(app.clone(), "/messages", launch_envelope("r1")).await;
        post_json(
            app.clone(),
            "/messages",
            json!({
                "metadata": {
                    "channel": "r2",
                    "messageNumber": 1,
                    "messageType": "RocketLaunched",
                    "messageTime": "2025-05-14T10:00:01",
                },
                "message": {"type": "Falcon", "launchSpeed": 1000, "mission": "moonlanding"},
            }),
        )
        .await;

        let (status, body) = get_json(app, "/missions/MOONLANDING").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rockets"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn event_for_unknown_channel_is_dropped_s5() {
        let app = app();
        post_json(
            app.clone(),
            "/messages",
            json!({
                "metadata": {
                    "channel": "ghost",
                    "messageNumber": 1,
                    "messageType": "RocketSpeedIncreased",
                    "messageTime": "2025-05-14T10:00:00",
                },
                "message": {"by": 100},
            }),
        )
        .await;
        let (status, _) = get_json(app, "/rockets/ghost").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn non_json_body_is_400() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/messages")
                    .header("content-type", "application/json")
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn list_missions_returns_sorted_unique_strings() {
        let app = app();
        post_json(app.clone(), "/messages", launch_envelope("r1")).await;
        let (status, body) = get_json(app, "/missions").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["missions"], json!(["MoonLanding"]));
    }
}
