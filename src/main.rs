//! Urgency Timer - countdown view synchronized against a remote timer
//!
//! This is the main entry point for the urgency-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use urgency_timer::{
    api::create_router,
    client::{HttpTimerClient, TimerClient},
    config::Config,
    state::{AppState, TimerId, ViewState},
    sync::CommandDispatcher,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("urgency_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting urgency-timer v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: api={}, host={}, port={}, poll={}ms, timeout={}ms, duration={}s",
        config.api_url,
        config.host,
        config.port,
        config.poll_interval_ms,
        config.request_timeout_ms,
        config.duration
    );

    let client: Arc<dyn TimerClient> =
        Arc::new(HttpTimerClient::new(&config.api_url, config.request_timeout())?);
    let view = Arc::new(ViewState::new(config.duration));
    let commands = CommandDispatcher::new(client, view, config.poll_interval());

    // Adopt an existing remote timer; a failure is shown in the view, not fatal
    if let Some(timer_id) = &config.timer_id {
        if let Err(e) = commands.mount(TimerId::new(timer_id.as_str())).await {
            warn!("Could not adopt timer {}: {}", timer_id, e);
        }
    }

    // Create HTTP router with all endpoints
    let state = AppState::new(commands.clone(), config.port, config.host.clone());
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer         - Configure a timer ({{\"duration\": seconds}})");
    info!("  POST /timer/start   - Start the countdown");
    info!("  POST /timer/pause   - Pause the countdown");
    info!("  POST /timer/resume  - Resume the countdown");
    info!("  POST /timer/toggle  - Start/pause/resume as appropriate");
    info!("  POST /timer/reset   - Reset ({{\"restart\": true}} to restart)");
    info!("  GET  /state         - Presentation state");
    info!("  GET  /status        - Presentation state and server info");
    info!("  GET  /health        - Health check");

    // Setup graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown signal received, tearing down view");
    commands.teardown().await;

    info!("Server shutdown complete");
    Ok(())
}
