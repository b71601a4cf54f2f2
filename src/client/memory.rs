//! In-process timer authority
//!
//! Behaves like the REST store but its clock only moves when `advance` is
//! called. Failure injection and fetch accounting make it the test double for
//! the synchronizer and the command dispatcher.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
        Mutex, MutexGuard, PoisonError,
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::time::sleep;

use crate::{
    error::ClientError,
    state::{Timer, TimerId, TimerStatus},
};

use super::TimerClient;

#[derive(Debug, Default)]
pub struct InMemoryTimerClient {
    timers: Mutex<HashMap<TimerId, Timer>>,
    next_id: AtomicU64,
    unreachable: AtomicBool,
    fetch_latency_ms: AtomicU64,
    create_latency_ms: AtomicU64,
    mutation_latency_ms: AtomicU64,
    fetches: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    mutations: AtomicUsize,
}

/// Decrements the in-flight counter even when the fetch future is dropped
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn as_millis(latency: Duration) -> u64 {
    u64::try_from(latency.as_millis()).unwrap_or(u64::MAX)
}

fn not_found(id: &TimerId) -> ClientError {
    ClientError::Status { status: 404, message: format!("Timer {} not found", id) }
}

fn conflict(timer: &Timer, action: &str) -> ClientError {
    ClientError::Status {
        status: 409,
        message: format!("Cannot {} timer {} while {}", action, timer.id, timer.status),
    }
}

impl InMemoryTimerClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn timers(&self) -> MutexGuard<'_, HashMap<TimerId, Timer>> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_reachable(&self) -> Result<(), ClientError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(ClientError::Transport("connection refused".to_string()));
        }
        Ok(())
    }

    /// Apply `update` to a stored timer and return the new snapshot
    async fn mutate<F>(&self, id: &TimerId, update: F) -> Result<Timer, ClientError>
    where
        F: FnOnce(&mut Timer) -> Result<(), ClientError>,
    {
        let latency = self.mutation_latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            sleep(Duration::from_millis(latency)).await;
        }
        self.check_reachable()?;
        self.mutations.fetch_add(1, Ordering::SeqCst);
        let mut timers = self.timers();
        let timer = timers.get_mut(id).ok_or_else(|| not_found(id))?;
        update(timer)?;
        Ok(timer.clone())
    }

    /// Move the authoritative clock of a running timer forward
    pub fn advance(&self, id: &TimerId, seconds: u32) -> Option<Timer> {
        let mut timers = self.timers();
        let timer = timers.get_mut(id)?;
        if timer.status == TimerStatus::Running {
            timer.remaining_seconds = timer.remaining_seconds.saturating_sub(seconds);
            if timer.remaining_seconds == 0 {
                timer.status = TimerStatus::Expired;
            }
        }
        Some(timer.clone())
    }

    /// Current stored state, bypassing failure injection and accounting
    pub fn peek(&self, id: &TimerId) -> Option<Timer> {
        self.timers().get(id).cloned()
    }

    pub fn insert(&self, timer: Timer) {
        self.timers().insert(timer.id.clone(), timer);
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Delay applied to every `get` before the store is read
    pub fn set_fetch_latency(&self, latency: Duration) {
        self.fetch_latency_ms.store(as_millis(latency), Ordering::SeqCst);
    }

    /// Delay applied to `create` before the timer is stored
    pub fn set_create_latency(&self, latency: Duration) {
        self.create_latency_ms.store(as_millis(latency), Ordering::SeqCst);
    }

    /// Delay applied to start/pause/resume/reset before the store changes
    pub fn set_mutation_latency(&self, latency: Duration) {
        self.mutation_latency_ms.store(as_millis(latency), Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Highest number of `get` calls observed running at the same time
    pub fn peak_concurrent_fetches(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Mutating calls that reached the store (create excluded)
    pub fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TimerClient for InMemoryTimerClient {
    async fn create(&self, duration_seconds: u32) -> Result<Timer, ClientError> {
        let latency = self.create_latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            sleep(Duration::from_millis(latency)).await;
        }
        self.check_reachable()?;
        if duration_seconds == 0 {
            return Err(ClientError::Status {
                status: 422,
                message: "duration must be positive".to_string(),
            });
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let timer = Timer::idle(TimerId::new(format!("timer-{}", n)), duration_seconds);
        self.insert(timer.clone());
        Ok(timer)
    }

    async fn get(&self, id: &TimerId) -> Result<Timer, ClientError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let latency = self.fetch_latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            sleep(Duration::from_millis(latency)).await;
        }

        self.check_reachable()?;
        self.peek(id).ok_or_else(|| not_found(id))
    }

    async fn start(&self, id: &TimerId) -> Result<Timer, ClientError> {
        self.mutate(id, |timer| match timer.status {
            TimerStatus::Idle => {
                timer.status = TimerStatus::Running;
                Ok(())
            }
            TimerStatus::Running => Ok(()),
            _ => Err(conflict(timer, "start")),
        })
        .await
    }

    async fn pause(&self, id: &TimerId) -> Result<Timer, ClientError> {
        self.mutate(id, |timer| match timer.status {
            TimerStatus::Running => {
                timer.status = TimerStatus::Paused;
                Ok(())
            }
            TimerStatus::Paused => Ok(()),
            _ => Err(conflict(timer, "pause")),
        })
        .await
    }

    async fn resume(&self, id: &TimerId) -> Result<Timer, ClientError> {
        self.mutate(id, |timer| match timer.status {
            TimerStatus::Paused => {
                timer.status = TimerStatus::Running;
                Ok(())
            }
            TimerStatus::Running => Ok(()),
            _ => Err(conflict(timer, "resume")),
        })
        .await
    }

    async fn reset(&self, id: &TimerId) -> Result<Timer, ClientError> {
        self.mutate(id, |timer| {
            timer.status = TimerStatus::Idle;
            timer.remaining_seconds = timer.initial_duration_seconds;
            timer.last_reset_at = Some(Utc::now());
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: &TimerId) -> Result<(), ClientError> {
        self.check_reachable()?;
        self.timers().remove(id).map(|_| ()).ok_or_else(|| not_found(id))
    }
}
