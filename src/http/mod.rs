//! # HTTP trigger/kill surface.
//!
//! A thin collaborator over the supervisor entry points:
//!
//! - `GET  /`                  — banner
//! - `GET  /healthz`           — liveness probe
//! - `POST /trigger/:task`     — start a configured task by name
//! - `POST /kill/:kind/:name`  — kill every instance of a job
//!
//! Name resolution is this layer's concern: an unknown task name is a 404
//! here, and an unrecognized kind segment is a 400. The engine itself never
//! reports "not found" — killing an untracked job is a silent no-op, so
//! `/kill` acknowledges regardless of whether anything was running.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tracing::{error, info};

use crate::core::SupervisorHandle;
use crate::jobs::{JobKind, JobSpec};

/// Shared state for the HTTP handlers.
pub struct ApiState {
    /// Entry points into the supervision engine.
    pub handle: SupervisorHandle,
    /// Configured tasks, addressable by trigger name.
    pub tasks: BTreeMap<String, JobSpec>,
}

/// Builds the router over the given state.
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route("/trigger/:task", post(trigger))
        .route("/kill/:kind/:name", post(kill))
        .with_state(state)
}

async fn root() -> &'static str {
    "jobvisor is running.\n"
}

async fn healthz() -> &'static str {
    "OK"
}

async fn trigger(
    State(state): State<Arc<ApiState>>,
    Path(task): Path<String>,
) -> impl IntoResponse {
    let Some(spec) = state.tasks.get(&task) else {
        error!(task = %task, "task not found (from HTTP trigger)");
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("Task '{task}' not found.") })),
        );
    };

    info!(task = %task, "manually triggering task");
    state.handle.start_task(&task, spec.clone());
    (
        StatusCode::OK,
        Json(json!({ "message": format!("Task '{task}' triggered.") })),
    )
}

async fn kill(
    State(state): State<Arc<ApiState>>,
    Path((kind, name)): Path<(String, String)>,
) -> impl IntoResponse {
    let kind: JobKind = match kind.parse() {
        Ok(kind) => kind,
        Err(err) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": err.to_string() })),
            );
        }
    };

    info!(job = %format!("{kind}/{name}"), "kill requested");
    state.handle.kill(kind, &name, None);
    (
        StatusCode::OK,
        Json(json!({ "message": format!("Killed all instances of {kind} '{name}'.") })),
    )
}
