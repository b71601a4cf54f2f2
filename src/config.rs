//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "urgency-timer")]
#[command(about = "Countdown timer view that polls a remote timer and derives urgency, colour and face")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Base URL of the remote timer API
    #[arg(long, default_value = "http://localhost:8000")]
    pub api_url: String,

    /// Port to bind the presentation server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Poll cadence while a timer is running, in milliseconds
    #[arg(long, default_value = "500", value_parser = clap::value_parser!(u64).range(100..=5000))]
    pub poll_interval_ms: u64,

    /// Upper bound for every remote request, in milliseconds
    #[arg(long, default_value = "2000", value_parser = clap::value_parser!(u64).range(100..))]
    pub request_timeout_ms: u64,

    /// Default timer duration in seconds
    #[arg(short, long, default_value = "60", value_parser = clap::value_parser!(u32).range(1..))]
    pub duration: u32,

    /// Adopt an existing remote timer on startup
    #[arg(long)]
    pub timer_id: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
