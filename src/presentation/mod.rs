//! Presentation derivation
//!
//! Urgency, colour and facial expression are derived here and nowhere else.
//! Views read a `Presentation`; they never recompute these values.

pub mod colour;
pub mod expression;
pub mod urgency;

use serde::Serialize;

use crate::state::{Timer, TimerId, TimerStatus};

pub use colour::{interpolate, intensity_to_hex, Rgb};
pub use expression::{select as select_expression, Expression, FacialExpression};
pub use urgency::{urgency, Urgency, UrgencyLevel};

/// Read-only projection handed to the rendering layer on every update
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Presentation {
    pub timer_id: Option<TimerId>,
    pub remaining_seconds: u32,
    pub initial_duration_seconds: u32,
    pub status: TimerStatus,
    pub urgency_level: UrgencyLevel,
    pub urgency_ratio: f64,
    pub percent_remaining: f64,
    pub colour: Rgb,
    pub colour_hex: String,
    pub facial_expression: FacialExpression,
    pub pulsing: bool,
    pub is_polling_error: bool,
    pub error: Option<String>,
}

impl Presentation {
    pub fn derive(timer: &Timer, error: Option<String>, is_polling_error: bool) -> Self {
        Self::from_parts(
            Some(timer.id.clone()),
            timer.remaining_seconds,
            timer.initial_duration_seconds,
            timer.status,
            error,
            is_polling_error,
        )
    }

    /// What to show before any timer has been configured or fetched
    pub fn placeholder(default_duration_seconds: u32, error: Option<String>, is_polling_error: bool) -> Self {
        Self::from_parts(
            None,
            default_duration_seconds,
            default_duration_seconds,
            TimerStatus::Idle,
            error,
            is_polling_error,
        )
    }

    fn from_parts(
        timer_id: Option<TimerId>,
        remaining_seconds: u32,
        initial_duration_seconds: u32,
        status: TimerStatus,
        error: Option<String>,
        is_polling_error: bool,
    ) -> Self {
        let urgency = urgency(remaining_seconds, initial_duration_seconds);
        let colour = interpolate(urgency.ratio);
        let expression = select_expression(urgency.level, status);

        Self {
            timer_id,
            remaining_seconds,
            initial_duration_seconds,
            status,
            urgency_level: urgency.level,
            urgency_ratio: urgency.ratio,
            percent_remaining: urgency.percent_remaining,
            colour,
            colour_hex: colour.to_hex(),
            facial_expression: expression.face,
            pulsing: expression.pulsing,
            is_polling_error,
            error,
        }
    }
}
