//! Remaining-time ratio to urgency band

use std::fmt;

use serde::{Deserialize, Serialize};

/// Discrete summary of how close a timer is to expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl UrgencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyLevel::Low => "low",
            UrgencyLevel::Medium => "medium",
            UrgencyLevel::High => "high",
            UrgencyLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for UrgencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Band edges in percent remaining. Each edge belongs to the more urgent band.
pub const MEDIUM_AT_OR_BELOW: f64 = 50.0;
pub const HIGH_AT_OR_BELOW: f64 = 25.0;
pub const CRITICAL_AT_OR_BELOW: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Urgency {
    pub level: UrgencyLevel,
    /// 0.0 when just started, 1.0 when expired; drives the colour
    pub ratio: f64,
    pub percent_remaining: f64,
}

/// Percentage of the initial duration still remaining, clamped to [0, 100].
///
/// A zero initial duration has nothing left by definition.
pub fn percent_remaining(remaining_seconds: u32, initial_duration_seconds: u32) -> f64 {
    if initial_duration_seconds == 0 {
        return 0.0;
    }
    let percent = 100.0 * f64::from(remaining_seconds) / f64::from(initial_duration_seconds);
    percent.clamp(0.0, 100.0)
}

pub fn classify(percent_remaining: f64) -> UrgencyLevel {
    if percent_remaining > MEDIUM_AT_OR_BELOW {
        UrgencyLevel::Low
    } else if percent_remaining > HIGH_AT_OR_BELOW {
        UrgencyLevel::Medium
    } else if percent_remaining > CRITICAL_AT_OR_BELOW {
        UrgencyLevel::High
    } else {
        UrgencyLevel::Critical
    }
}

pub fn urgency(remaining_seconds: u32, initial_duration_seconds: u32) -> Urgency {
    let percent = percent_remaining(remaining_seconds, initial_duration_seconds);
    Urgency {
        level: classify(percent),
        ratio: 1.0 - percent / 100.0,
        percent_remaining: percent,
    }
}
