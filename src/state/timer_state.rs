//! Timer snapshot structure as owned by the remote authority

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier assigned by the remote store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerId(String);

impl TimerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TimerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Lifecycle state of a timer. One tagged value replaces the
/// `is_running` / `is_paused` / `is_expired` flag soup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    #[serde(alias = "stopped")]
    Idle,
    Running,
    Paused,
    Expired,
}

impl TimerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerStatus::Idle => "idle",
            TimerStatus::Running => "running",
            TimerStatus::Paused => "paused",
            TimerStatus::Expired => "expired",
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, TimerStatus::Running)
    }
}

impl fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable snapshot of a remote timer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
    pub id: TimerId,
    #[serde(rename = "initialDuration", alias = "initial_duration_seconds", alias = "duration_seconds")]
    pub initial_duration_seconds: u32,
    #[serde(rename = "remainingTime", alias = "remaining_seconds")]
    pub remaining_seconds: u32,
    pub status: TimerStatus,
    #[serde(alias = "created_at")]
    pub created_at: DateTime<Utc>,
    #[serde(default, alias = "last_reset_at")]
    pub last_reset_at: Option<DateTime<Utc>>,
}

impl Timer {
    /// A freshly configured timer: full duration, idle
    pub fn idle(id: TimerId, duration_seconds: u32) -> Self {
        Self {
            id,
            initial_duration_seconds: duration_seconds,
            remaining_seconds: duration_seconds,
            status: TimerStatus::Idle,
            created_at: Utc::now(),
            last_reset_at: None,
        }
    }
}
