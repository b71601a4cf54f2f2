//! Poll sessions: one periodic fetch loop per running timer

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    time::Duration,
};

use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    client::TimerClient,
    error::ClientError,
    state::{Timer, TimerId, ViewState},
    tasks::poll_task,
};

/// Handle for one timer's fetch loop
#[derive(Debug)]
struct PollSession {
    token: u64,
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl PollSession {
    fn stop(self) -> JoinHandle<()> {
        // The loop may already have exited on its own
        let _ = self.stop_tx.send(true);
        self.handle
    }
}

/// What the fetch loop should do after a fetch settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Settled {
    Continue,
    Stop,
}

pub(crate) struct PollShared {
    pub(crate) client: Arc<dyn TimerClient>,
    pub(crate) state: Arc<ViewState>,
    pub(crate) interval: Duration,
    sessions: Mutex<HashMap<TimerId, PollSession>>,
    next_token: AtomicU64,
    /// Set by `shutdown` under the sessions lock; no session is created after it
    closed: AtomicBool,
}

impl PollShared {
    fn sessions(&self) -> MutexGuard<'_, HashMap<TimerId, PollSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a settled fetch if its session is still the live one.
    ///
    /// The session map stays locked while the snapshot is applied, so a
    /// concurrent `detach` either happens before (result discarded) or after
    /// (result applied, then polling stops).
    pub(crate) fn settle(
        &self,
        timer_id: &TimerId,
        token: u64,
        result: Result<Timer, ClientError>,
    ) -> Settled {
        let mut sessions = self.sessions();
        let live = sessions.get(timer_id).is_some_and(|s| s.token == token);
        if !live {
            debug!("Discarding fetch for {} from detached session #{}", timer_id, token);
            return Settled::Stop;
        }

        match result {
            Ok(timer) => {
                let still_running = timer.status.is_running();
                let status = timer.status;
                self.state.apply_snapshot(timer);
                if still_running {
                    return Settled::Continue;
                }
                info!("Timer {} is {}, stopping poll session #{}", timer_id, status, token);
                if let Some(session) = sessions.remove(timer_id) {
                    drop(session.stop());
                }
                Settled::Stop
            }
            Err(e) => {
                warn!("Poll of timer {} failed, keeping last snapshot: {}", timer_id, e);
                self.state.record_poll_failure(e.to_string());
                Settled::Continue
            }
        }
    }
}

/// Owns the attach/detach lifecycle of poll sessions.
///
/// At most one session exists per timer id. Cloning shares the same sessions.
#[derive(Clone)]
pub struct PollingSynchronizer {
    shared: Arc<PollShared>,
}

impl PollingSynchronizer {
    pub fn new(client: Arc<dyn TimerClient>, state: Arc<ViewState>, interval: Duration) -> Self {
        Self {
            shared: Arc::new(PollShared {
                client,
                state,
                interval,
                sessions: Mutex::new(HashMap::new()),
                next_token: AtomicU64::new(0),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Start polling `timer_id` unless a session already exists.
    ///
    /// Returns whether a new session was created. Refused once the
    /// synchronizer has been shut down. Must be called from within a tokio
    /// runtime.
    pub fn attach(&self, timer_id: &TimerId) -> bool {
        let mut sessions = self.shared.sessions();
        if self.shared.closed.load(Ordering::SeqCst) {
            debug!("Not attaching timer {}: synchronizer is shut down", timer_id);
            return false;
        }
        if let Some(existing) = sessions.get(timer_id) {
            debug!("Timer {} already polled by session #{}", timer_id, existing.token);
            return false;
        }

        let token = self.shared.next_token.fetch_add(1, Ordering::SeqCst) + 1;
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = tokio::spawn(poll_task(
            Arc::clone(&self.shared),
            timer_id.clone(),
            token,
            stop_rx,
        ));
        sessions.insert(timer_id.clone(), PollSession { token, stop_tx, handle });

        info!(
            "Attached poll session #{} to timer {} every {}ms",
            token,
            timer_id,
            self.shared.interval.as_millis()
        );
        true
    }

    /// Stop polling `timer_id`. Safe to call when nothing is attached.
    ///
    /// Future ticks stop immediately; a fetch already in flight completes and
    /// its result is dropped.
    pub fn detach(&self, timer_id: &TimerId) -> bool {
        let removed = self.shared.sessions().remove(timer_id);
        match removed {
            Some(session) => {
                info!("Detached poll session #{} from timer {}", session.token, timer_id);
                drop(session.stop());
                true
            }
            None => false,
        }
    }

    pub fn is_attached(&self, timer_id: &TimerId) -> bool {
        self.shared.sessions().contains_key(timer_id)
    }

    pub fn active_sessions(&self) -> usize {
        self.shared.sessions().len()
    }

    pub fn interval(&self) -> Duration {
        self.shared.interval
    }

    pub fn is_shut_down(&self) -> bool {
        self.shared.closed.load(Ordering::SeqCst)
    }

    /// Detach every session, refuse further attaches and wait for the loops to exit
    pub async fn shutdown(&self) {
        let handles: Vec<_> = {
            let mut sessions = self.shared.sessions();
            self.shared.closed.store(true, Ordering::SeqCst);
            sessions
                .drain()
                .map(|(timer_id, session)| {
                    debug!("Stopping poll session #{} for timer {}", session.token, timer_id);
                    session.stop()
                })
                .collect()
        };

        let count = handles.len();
        for handle in handles {
            if let Err(e) = handle.await {
                warn!("Poll session ended abnormally: {}", e);
            }
        }
        info!("Poll synchronizer shut down ({} sessions stopped)", count);
    }
}
