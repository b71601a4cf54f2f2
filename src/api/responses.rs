//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::presentation::Presentation;

/// API response structure for command endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub state: Presentation,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, state: Presentation) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            state,
        }
    }

    /// Create a success response
    pub fn ok(message: String, state: Presentation) -> Self {
        Self::new("ok".to_string(), message, state)
    }

    /// Create an error response
    pub fn error(message: String, state: Presentation) -> Self {
        Self::new("error".to_string(), message, state)
    }
}

/// Status response with server metadata
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub state: Presentation,
    pub polling: bool,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Body of `POST /timer`
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigureRequest {
    pub duration: i64,
}

/// Optional body of `POST /timer/reset`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub restart: bool,
}
