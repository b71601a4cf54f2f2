//! State management module
//!
//! Timer snapshots, the lifecycle state machine, the per-view cache and the
//! shared application state handed to HTTP handlers.

pub mod app_state;
pub mod machine;
pub mod timer_state;
pub mod view_state;

// Re-export main types
pub use app_state::AppState;
pub use machine::{check_snapshot, transition, TimerEvent};
pub use timer_state::{Timer, TimerId, TimerStatus};
pub use view_state::ViewState;
