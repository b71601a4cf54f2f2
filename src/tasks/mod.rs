//! Background tasks module
//!
//! This module contains the loops spawned alongside the command layer.

pub mod poll_task;

// Re-export main functions
pub(crate) use poll_task::poll_task;
