//! Timer lifecycle state machine
//!
//! ```text
//! Idle -> Running -> (Paused <-> Running) -> Expired
//! any  -> reset   -> Idle | Running
//! ```
//!
//! The machine is total over its input alphabet: every (state, event) pair
//! yields either the next state or a `TransitionError`, never a panic.

use std::fmt;

use crate::error::TransitionError;

use super::{Timer, TimerStatus};

/// Inputs accepted by the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Start { duration_seconds: u32 },
    Pause,
    Resume,
    /// Remote clock advanced; carries the new remaining time
    Tick { remaining_seconds: u32 },
    /// Restore the full duration, optionally restarting right away
    Reset { restart: bool },
}

impl TimerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TimerEvent::Start { .. } => "start",
            TimerEvent::Pause => "pause",
            TimerEvent::Resume => "resume",
            TimerEvent::Tick { .. } => "tick",
            TimerEvent::Reset { .. } => "reset",
        }
    }
}

impl fmt::Display for TimerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Compute the state reached from `from` on `event`.
pub fn transition(from: TimerStatus, event: TimerEvent) -> Result<TimerStatus, TransitionError> {
    use TimerEvent::*;
    use TimerStatus::*;

    match (from, event) {
        (Idle | Expired, Start { duration_seconds: 0 }) => Err(TransitionError::InvalidDuration(0)),
        (Idle | Expired, Start { .. }) => Ok(Running),
        (Running, Pause) => Ok(Paused),
        (Paused, Resume) => Ok(Running),
        (Running, Tick { remaining_seconds: 0 }) => Ok(Expired),
        (Running, Tick { .. }) => Ok(Running),
        (_, Reset { restart: true }) => Ok(Running),
        (_, Reset { restart: false }) => Ok(Idle),
        (from, event) => Err(TransitionError::Illegal { from, event: event.name() }),
    }
}

/// Check the transition implied by a freshly fetched snapshot.
///
/// The remote store stays authoritative; callers log the error and still
/// apply `next`.
pub fn check_snapshot(previous: Option<&Timer>, next: &Timer) -> Result<(), TransitionError> {
    if (next.status == TimerStatus::Expired) != (next.remaining_seconds == 0)
        && next.status != TimerStatus::Running
    {
        return Err(TransitionError::Inconsistent(format!(
            "timer {} is {} with {}s remaining",
            next.id, next.status, next.remaining_seconds
        )));
    }
    if next.remaining_seconds > next.initial_duration_seconds {
        return Err(TransitionError::Inconsistent(format!(
            "timer {} has {}s remaining out of {}s",
            next.id, next.remaining_seconds, next.initial_duration_seconds
        )));
    }

    let Some(previous) = previous.filter(|p| p.id == next.id) else {
        return Ok(());
    };

    let event = match (previous.status, next.status) {
        (TimerStatus::Running, TimerStatus::Running) => {
            if next.remaining_seconds > previous.remaining_seconds {
                TimerEvent::Reset { restart: true }
            } else {
                TimerEvent::Tick { remaining_seconds: next.remaining_seconds }
            }
        }
        (from, to) if from == to => {
            if from == TimerStatus::Paused && previous.remaining_seconds != next.remaining_seconds {
                return Err(TransitionError::Inconsistent(format!(
                    "paused timer {} drifted from {}s to {}s",
                    next.id, previous.remaining_seconds, next.remaining_seconds
                )));
            }
            return Ok(());
        }
        (TimerStatus::Idle, TimerStatus::Running) => TimerEvent::Start {
            duration_seconds: next.initial_duration_seconds,
        },
        (TimerStatus::Running, TimerStatus::Paused) => TimerEvent::Pause,
        (TimerStatus::Paused, TimerStatus::Running) => TimerEvent::Resume,
        (TimerStatus::Running, TimerStatus::Expired) => TimerEvent::Tick { remaining_seconds: 0 },
        (_, TimerStatus::Idle) => TimerEvent::Reset { restart: false },
        (_, TimerStatus::Running) => TimerEvent::Reset { restart: true },
        (from, _) => {
            return Err(TransitionError::Illegal { from, event: "sync" });
        }
    };

    let reached = transition(previous.status, event)?;
    if reached != next.status {
        return Err(TransitionError::Illegal { from: previous.status, event: event.name() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::TimerId;

    fn snapshot(status: TimerStatus, remaining: u32) -> Timer {
        let mut timer = Timer::idle(TimerId::new("t"), 60);
        timer.status = status;
        timer.remaining_seconds = remaining;
        timer
    }

    #[test]
    fn legal_transitions_follow_the_table() {
        use TimerStatus::*;
        assert_eq!(transition(Idle, TimerEvent::Start { duration_seconds: 30 }), Ok(Running));
        assert_eq!(transition(Running, TimerEvent::Pause), Ok(Paused));
        assert_eq!(transition(Paused, TimerEvent::Resume), Ok(Running));
        assert_eq!(transition(Running, TimerEvent::Tick { remaining_seconds: 5 }), Ok(Running));
        assert_eq!(transition(Running, TimerEvent::Tick { remaining_seconds: 0 }), Ok(Expired));
        assert_eq!(transition(Expired, TimerEvent::Start { duration_seconds: 30 }), Ok(Running));
    }

    #[test]
    fn reset_is_accepted_from_every_state() {
        for from in [TimerStatus::Idle, TimerStatus::Running, TimerStatus::Paused, TimerStatus::Expired] {
            assert_eq!(transition(from, TimerEvent::Reset { restart: false }), Ok(TimerStatus::Idle));
            assert_eq!(transition(from, TimerEvent::Reset { restart: true }), Ok(TimerStatus::Running));
        }
    }

    #[test]
    fn illegal_transitions_are_rejected_not_panicking() {
        use TimerStatus::*;
        let cases = [
            (Idle, TimerEvent::Pause),
            (Idle, TimerEvent::Resume),
            (Running, TimerEvent::Resume),
            (Running, TimerEvent::Start { duration_seconds: 10 }),
            (Paused, TimerEvent::Pause),
            (Paused, TimerEvent::Tick { remaining_seconds: 3 }),
            (Expired, TimerEvent::Pause),
            (Expired, TimerEvent::Resume),
        ];
        for (from, event) in cases {
            assert_eq!(
                transition(from, event),
                Err(TransitionError::Illegal { from, event: event.name() }),
                "{from} + {event}"
            );
        }
    }

    #[test]
    fn start_requires_positive_duration() {
        assert_eq!(
            transition(TimerStatus::Idle, TimerEvent::Start { duration_seconds: 0 }),
            Err(TransitionError::InvalidDuration(0))
        );
    }

    #[test]
    fn snapshot_check_accepts_normal_progress() {
        let running = snapshot(TimerStatus::Running, 40);
        assert!(check_snapshot(None, &running).is_ok());
        assert!(check_snapshot(Some(&snapshot(TimerStatus::Idle, 60)), &running).is_ok());
        assert!(check_snapshot(Some(&running), &snapshot(TimerStatus::Running, 39)).is_ok());
        assert!(check_snapshot(Some(&running), &snapshot(TimerStatus::Expired, 0)).is_ok());
        assert!(check_snapshot(Some(&snapshot(TimerStatus::Expired, 0)), &snapshot(TimerStatus::Idle, 60)).is_ok());
    }

    #[test]
    fn snapshot_check_flags_broken_invariants() {
        assert!(check_snapshot(None, &snapshot(TimerStatus::Expired, 12)).is_err());
        assert!(check_snapshot(None, &snapshot(TimerStatus::Running, 90)).is_err());
        assert!(check_snapshot(
            Some(&snapshot(TimerStatus::Paused, 15)),
            &snapshot(TimerStatus::Paused, 14)
        )
        .is_err());
        assert!(check_snapshot(
            Some(&snapshot(TimerStatus::Idle, 60)),
            &snapshot(TimerStatus::Paused, 60)
        )
        .is_err());
    }
}
