//! Main application state shared with the HTTP handlers

use std::{sync::Arc, time::Instant};

use crate::sync::CommandDispatcher;

use super::ViewState;

/// Everything a handler needs: the command entry point and server metadata
#[derive(Clone)]
pub struct AppState {
    /// Commands for the single mounted view
    pub commands: CommandDispatcher,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
}

impl AppState {
    /// Create a new AppState around a dispatcher
    pub fn new(commands: CommandDispatcher, port: u16, host: String) -> Self {
        Self {
            commands,
            start_time: Instant::now(),
            port,
            host,
        }
    }

    /// Read-only view state
    pub fn view(&self) -> &Arc<ViewState> {
        self.commands.state()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        format_uptime(self.start_time.elapsed().as_secs())
    }
}

fn format_uptime(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
