//! HTTP endpoint handlers
//!
//! Command endpoints always answer 200: a failed command is reported through
//! `status: "error"` and the embedded state, which still shows the last good
//! snapshot.

use axum::{body::Bytes, extract::State, http::StatusCode, response::Json};
use tracing::{debug, warn};

use crate::{
    error::CommandError,
    presentation::Presentation,
    state::{AppState, Timer},
};

use super::responses::{ApiResponse, ConfigureRequest, HealthResponse, ResetRequest, StatusResponse};

/// Shape a command outcome into the common response
fn command_response(state: &AppState, action: &str, result: Result<Timer, CommandError>) -> Json<ApiResponse> {
    let presentation = state.view().presentation();
    match result {
        Ok(timer) => Json(ApiResponse::ok(
            format!("Timer {} {}: {}", timer.id, action, timer.status),
            presentation,
        )),
        Err(e) => Json(ApiResponse::error(e.to_string(), presentation)),
    }
}

/// Handle POST /timer - Configure a new timer duration
pub async fn configure_handler(
    State(state): State<AppState>,
    Json(request): Json<ConfigureRequest>,
) -> Json<ApiResponse> {
    let result = state.commands.configure(request.duration).await;
    command_response(&state, "configured", result)
}

/// Handle POST /timer/start
pub async fn start_handler(State(state): State<AppState>) -> Json<ApiResponse> {
    let result = state.commands.start().await;
    command_response(&state, "started", result)
}

/// Handle POST /timer/pause
pub async fn pause_handler(State(state): State<AppState>) -> Json<ApiResponse> {
    let result = state.commands.pause().await;
    command_response(&state, "paused", result)
}

/// Handle POST /timer/resume
pub async fn resume_handler(State(state): State<AppState>) -> Json<ApiResponse> {
    let result = state.commands.resume().await;
    command_response(&state, "resumed", result)
}

/// Handle POST /timer/toggle - Start/pause key
pub async fn toggle_handler(State(state): State<AppState>) -> Json<ApiResponse> {
    let result = state.commands.toggle().await;
    command_response(&state, "toggled", result)
}

/// Handle POST /timer/reset - Body is optional: `{"restart": true}`
pub async fn reset_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ApiResponse>, StatusCode> {
    let request = if body.is_empty() {
        ResetRequest::default()
    } else {
        serde_json::from_slice::<ResetRequest>(&body).map_err(|e| {
            warn!("Rejecting malformed reset body: {}", e);
            StatusCode::BAD_REQUEST
        })?
    };

    let result = state.commands.reset(request.restart).await;
    Ok(command_response(&state, "reset", result))
}

/// Handle GET /state - Current presentation projection
pub async fn state_handler(State(state): State<AppState>) -> Json<Presentation> {
    debug!("Serving presentation state");
    Json(state.view().presentation())
}

/// Handle GET /status - Presentation plus server metadata
pub async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    let presentation = state.view().presentation();
    let polling = presentation
        .timer_id
        .as_ref()
        .is_some_and(|id| state.commands.poller().is_attached(id));
    let (last_action, last_action_time) = state.view().get_last_action();

    Json(StatusResponse {
        state: presentation,
        polling,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
