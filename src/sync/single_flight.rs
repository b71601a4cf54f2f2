//! Per-command single-flight: a duplicate command joins the outstanding one

use std::{
    collections::HashMap,
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex, MutexGuard, PoisonError,
    },
};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::debug;

use crate::{
    error::CommandError,
    state::{Timer, TimerId},
};

pub type CommandFuture = BoxFuture<'static, Result<Timer, CommandError>>;

/// Identity of a command for de-duplication.
///
/// `Configure` carries no duration: a second configure issued while one is
/// outstanding joins it, so two creates can never race over the same
/// replaced timer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Configure,
    Start,
    Pause,
    Resume,
    Reset { restart: bool },
    Toggle,
    Mount(TimerId),
}

impl CommandKind {
    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::Configure => "configure",
            CommandKind::Start => "start",
            CommandKind::Pause => "pause",
            CommandKind::Resume => "resume",
            CommandKind::Reset { restart: false } => "reset",
            CommandKind::Reset { restart: true } => "restart",
            CommandKind::Toggle => "toggle",
            CommandKind::Mount(_) => "mount",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

struct Flight {
    id: u64,
    outcome: Shared<CommandFuture>,
}

#[derive(Default)]
pub struct SingleFlight {
    inflight: Mutex<HashMap<CommandKind, Flight>>,
    next_id: AtomicU64,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CommandKind, Flight>> {
        self.inflight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run the command built by `start`, or await the outstanding one of the same kind
    pub async fn run<F>(&self, kind: CommandKind, start: F) -> Result<Timer, CommandError>
    where
        F: FnOnce() -> CommandFuture,
    {
        let (id, outcome) = {
            let mut inflight = self.lock();
            match inflight.get(&kind) {
                Some(flight) => {
                    debug!("Joining outstanding {} command", kind);
                    (flight.id, flight.outcome.clone())
                }
                None => {
                    let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                    let outcome = start().shared();
                    inflight.insert(kind.clone(), Flight { id, outcome: outcome.clone() });
                    (id, outcome)
                }
            }
        };

        let result = outcome.await;

        let mut inflight = self.lock();
        if inflight.get(&kind).is_some_and(|flight| flight.id == id) {
            inflight.remove(&kind);
        }
        result
    }

    #[cfg(test)]
    fn outstanding(&self) -> usize {
        self.lock().len()
    }

    /// Forget every outstanding command. Awaiters already joined still get
    /// their result; new calls start fresh.
    pub fn release(&self) -> usize {
        let mut inflight = self.lock();
        let released = inflight.len();
        inflight.clear();
        released
    }
}
