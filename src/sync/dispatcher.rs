//! Mutating timer commands
//!
//! Each command is checked against the state machine before any remote call,
//! runs single-flight per kind, applies the authoritative result and then
//! attaches or detaches polling. A failed command only touches the error field.

use std::{future::Future, sync::Arc, time::Duration};

use futures::FutureExt;
use tracing::{error, info, warn};

use crate::{
    client::TimerClient,
    error::{CommandError, TransitionError},
    state::{transition, Timer, TimerEvent, TimerId, TimerStatus, ViewState},
};

use super::{
    poller::PollingSynchronizer,
    single_flight::{CommandKind, SingleFlight},
};

struct DispatcherInner {
    client: Arc<dyn TimerClient>,
    state: Arc<ViewState>,
    poller: PollingSynchronizer,
    flights: SingleFlight,
}

/// Command entry point for one mounted view. Cheap to clone.
#[derive(Clone)]
pub struct CommandDispatcher {
    inner: Arc<DispatcherInner>,
}

impl CommandDispatcher {
    pub fn new(client: Arc<dyn TimerClient>, state: Arc<ViewState>, poll_interval: Duration) -> Self {
        let poller = PollingSynchronizer::new(Arc::clone(&client), Arc::clone(&state), poll_interval);
        Self {
            inner: Arc::new(DispatcherInner {
                client,
                state,
                poller,
                flights: SingleFlight::new(),
            }),
        }
    }

    pub fn state(&self) -> &Arc<ViewState> {
        &self.inner.state
    }

    pub fn poller(&self) -> &PollingSynchronizer {
        &self.inner.poller
    }

    /// Create a fresh idle timer of `duration_seconds`, replacing the current one.
    /// A configure issued while another is outstanding receives that one's timer.
    pub async fn configure(&self, duration_seconds: i64) -> Result<Timer, CommandError> {
        let duration = match u32::try_from(duration_seconds) {
            Ok(d) if d > 0 => d,
            _ => {
                let err = CommandError::from(TransitionError::InvalidDuration(duration_seconds));
                self.record_failure("configure", &err);
                return Err(err);
            }
        };
        self.dispatch(CommandKind::Configure, move |inner| inner.configure(duration))
            .await
    }

    pub async fn start(&self) -> Result<Timer, CommandError> {
        self.dispatch(CommandKind::Start, |inner| inner.start()).await
    }

    pub async fn pause(&self) -> Result<Timer, CommandError> {
        self.dispatch(CommandKind::Pause, |inner| inner.pause()).await
    }

    pub async fn resume(&self) -> Result<Timer, CommandError> {
        self.dispatch(CommandKind::Resume, |inner| inner.resume()).await
    }

    /// Restore the full duration; `restart` starts the countdown again right away
    pub async fn reset(&self, restart: bool) -> Result<Timer, CommandError> {
        self.dispatch(CommandKind::Reset { restart }, move |inner| inner.reset(restart))
            .await
    }

    /// Start/pause key: start, pause, resume or restart depending on the state
    pub async fn toggle(&self) -> Result<Timer, CommandError> {
        self.dispatch(CommandKind::Toggle, |inner| inner.toggle()).await
    }

    /// Adopt an existing remote timer and poll it if it is running
    pub async fn mount(&self, timer_id: TimerId) -> Result<Timer, CommandError> {
        self.dispatch(CommandKind::Mount(timer_id.clone()), move |inner| inner.mount(timer_id))
            .await
    }

    /// Unmount: stop every poll session and release outstanding command slots.
    /// Commands issued afterwards are rejected, and commands still in flight
    /// can no longer start polling.
    pub async fn teardown(&self) {
        let released = self.inner.flights.release();
        self.inner.poller.shutdown().await;
        info!("View torn down ({} outstanding commands released)", released);
    }

    async fn dispatch<F, Fut>(&self, kind: CommandKind, op: F) -> Result<Timer, CommandError>
    where
        F: FnOnce(Arc<DispatcherInner>) -> Fut,
        Fut: Future<Output = Result<Timer, CommandError>> + Send + 'static,
    {
        let action = kind.name();
        if self.inner.poller.is_shut_down() {
            let err = CommandError::TornDown;
            warn!("{} rejected: {}", action, err);
            return Err(err);
        }

        let inner = Arc::clone(&self.inner);
        let result = self.inner.flights.run(kind, move || op(inner).boxed()).await;

        match &result {
            Ok(timer) => {
                info!(
                    "{} succeeded: timer {} is {} with {}s remaining",
                    action, timer.id, timer.status, timer.remaining_seconds
                );
                self.inner.state.record_action(action);
            }
            Err(e) => self.record_failure(action, e),
        }
        result
    }

    fn record_failure(&self, action: &str, err: &CommandError) {
        if err.is_rejected() {
            warn!("{} rejected: {}", action, err);
        } else {
            error!("{} failed: {}", action, err);
        }
        self.inner.state.record_error(err.to_string());
    }
}

impl DispatcherInner {
    fn require_timer(&self) -> Result<Timer, CommandError> {
        self.state.current_timer().ok_or(CommandError::NoTimer)
    }

    fn apply_running(&self, timer: Timer) -> Timer {
        let id = timer.id.clone();
        let running = timer.status.is_running();
        self.state.apply_snapshot(timer.clone());
        if running {
            self.poller.attach(&id);
        }
        timer
    }

    fn apply_stopped(&self, timer: Timer) -> Timer {
        self.poller.detach(&timer.id);
        self.state.apply_snapshot(timer.clone());
        timer
    }

    async fn configure(self: Arc<Self>, duration_seconds: u32) -> Result<Timer, CommandError> {
        let previous = self.state.current_timer();
        let timer = self.client.create(duration_seconds).await?;

        if let Some(previous) = previous.filter(|p| p.id != timer.id) {
            if self.poller.detach(&previous.id) {
                info!("Stopped polling timer {} replaced by {}", previous.id, timer.id);
            }
            if let Err(e) = self.client.delete(&previous.id).await {
                warn!("Failed to delete replaced timer {}: {}", previous.id, e);
            }
        }
        Ok(self.apply_stopped(timer))
    }

    async fn start(self: Arc<Self>) -> Result<Timer, CommandError> {
        let current = self.require_timer()?;
        transition(
            current.status,
            TimerEvent::Start { duration_seconds: current.initial_duration_seconds },
        )?;

        if current.status == TimerStatus::Expired {
            self.client.reset(&current.id).await?;
        }
        let timer = self.client.start(&current.id).await?;
        Ok(self.apply_running(timer))
    }

    async fn pause(self: Arc<Self>) -> Result<Timer, CommandError> {
        let current = self.require_timer()?;
        transition(current.status, TimerEvent::Pause)?;

        let timer = self.client.pause(&current.id).await?;
        Ok(self.apply_stopped(timer))
    }

    async fn resume(self: Arc<Self>) -> Result<Timer, CommandError> {
        let current = self.require_timer()?;
        transition(current.status, TimerEvent::Resume)?;

        let timer = self.client.resume(&current.id).await?;
        Ok(self.apply_running(timer))
    }

    async fn reset(self: Arc<Self>, restart: bool) -> Result<Timer, CommandError> {
        let current = self.require_timer()?;
        transition(current.status, TimerEvent::Reset { restart })?;

        let mut timer = self.client.reset(&current.id).await?;
        if restart {
            timer = self.client.start(&current.id).await?;
        }

        if timer.status.is_running() {
            Ok(self.apply_running(timer))
        } else {
            Ok(self.apply_stopped(timer))
        }
    }

    async fn toggle(self: Arc<Self>) -> Result<Timer, CommandError> {
        let current = self.require_timer()?;
        match current.status {
            TimerStatus::Idle => self.start().await,
            TimerStatus::Running => self.pause().await,
            TimerStatus::Paused => self.resume().await,
            TimerStatus::Expired => self.reset(true).await,
        }
    }

    async fn mount(self: Arc<Self>, timer_id: TimerId) -> Result<Timer, CommandError> {
        let timer = self.client.get(&timer_id).await?;

        if let Some(previous) = self.state.current_timer().filter(|p| p.id != timer_id) {
            self.poller.detach(&previous.id);
        }
        if timer.status.is_running() {
            Ok(self.apply_running(timer))
        } else {
            Ok(self.apply_stopped(timer))
        }
    }
}
