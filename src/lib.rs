//! Urgency Timer - a countdown view synchronized against a remote timer
//!
//! This library polls an authoritative timer resource, models its lifecycle
//! as a state machine and derives the urgency band, background colour and
//! facial expression shown for the remaining time.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod presentation;
pub mod state;
pub mod sync;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use client::{HttpTimerClient, InMemoryTimerClient, TimerClient};
pub use config::Config;
pub use error::{ClientError, CommandError, TransitionError};
pub use presentation::Presentation;
pub use state::{AppState, Timer, TimerId, TimerStatus, ViewState};
pub use sync::{CommandDispatcher, PollingSynchronizer};
pub use utils::signals::shutdown_signal;
