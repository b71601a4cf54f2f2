//! Local cache of the remote timer, as seen by one mounted view

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::presentation::Presentation;

use super::{machine::check_snapshot, Timer};

#[derive(Debug, Default)]
struct ViewInner {
    snapshot: Option<Timer>,
    last_error: Option<String>,
    polling_error: bool,
    last_action: Option<String>,
    last_action_time: Option<DateTime<Utc>>,
}

impl ViewInner {
    fn presentation(&self, default_duration_seconds: u32) -> Presentation {
        match &self.snapshot {
            Some(timer) => Presentation::derive(timer, self.last_error.clone(), self.polling_error),
            None => Presentation::placeholder(
                default_duration_seconds,
                self.last_error.clone(),
                self.polling_error,
            ),
        }
    }
}

/// The public state object: last applied snapshot plus the latest error.
///
/// Every change publishes a fresh `Presentation` on a watch channel. Nothing
/// outside the synchronizer and the dispatcher writes to it.
#[derive(Debug)]
pub struct ViewState {
    inner: Mutex<ViewInner>,
    default_duration_seconds: u32,
    update_tx: watch::Sender<Presentation>,
    /// Keep the receiver alive to prevent channel closure
    _update_rx: watch::Receiver<Presentation>,
}

impl ViewState {
    pub fn new(default_duration_seconds: u32) -> Self {
        let (update_tx, update_rx) =
            watch::channel(Presentation::placeholder(default_duration_seconds, None, false));
        Self {
            inner: Mutex::new(ViewInner::default()),
            default_duration_seconds,
            update_tx,
            _update_rx: update_rx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ViewInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &ViewInner) {
        let presentation = inner.presentation(self.default_duration_seconds);
        if let Err(e) = self.update_tx.send(presentation) {
            warn!("Failed to publish presentation update: {}", e);
        }
    }

    /// Replace local state with an authoritative snapshot and clear errors
    pub fn apply_snapshot(&self, timer: Timer) {
        let mut inner = self.lock();
        if let Err(e) = check_snapshot(inner.snapshot.as_ref(), &timer) {
            warn!("Applying snapshot despite unexpected transition: {}", e);
        }
        debug!(
            "Applying snapshot for {}: {} with {}s remaining",
            timer.id, timer.status, timer.remaining_seconds
        );
        inner.snapshot = Some(timer);
        inner.last_error = None;
        inner.polling_error = false;
        self.publish(&inner);
    }

    /// Record a failed command; the snapshot is left untouched
    pub fn record_error(&self, message: impl Into<String>) {
        let mut inner = self.lock();
        inner.last_error = Some(message.into());
        self.publish(&inner);
    }

    /// Record a failed poll; the last good snapshot stays on screen
    pub fn record_poll_failure(&self, message: impl Into<String>) {
        let mut inner = self.lock();
        inner.last_error = Some(message.into());
        inner.polling_error = true;
        self.publish(&inner);
    }

    pub fn record_action(&self, action: &str) {
        let mut inner = self.lock();
        inner.last_action = Some(action.to_string());
        inner.last_action_time = Some(Utc::now());
    }

    pub fn current_timer(&self) -> Option<Timer> {
        self.lock().snapshot.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    pub fn presentation(&self) -> Presentation {
        self.lock().presentation(self.default_duration_seconds)
    }

    pub fn subscribe(&self) -> watch::Receiver<Presentation> {
        self.update_tx.subscribe()
    }

    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let inner = self.lock();
        (inner.last_action.clone(), inner.last_action_time)
    }
}
