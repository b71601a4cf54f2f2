//! Urgency band and lifecycle state to facial expression

use serde::{Deserialize, Serialize};

use crate::state::TimerStatus;

use super::UrgencyLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacialExpression {
    Calm,
    Concerned,
    Stressed,
    Critical,
    /// Terminal face shown once the timer has expired
    Defeated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Expression {
    pub face: FacialExpression,
    /// Animation cue; only a running timer in the critical band pulses
    pub pulsing: bool,
}

pub fn select(level: UrgencyLevel, status: TimerStatus) -> Expression {
    let face = match (status, level) {
        (TimerStatus::Expired, _) => FacialExpression::Defeated,
        (TimerStatus::Idle, _) => FacialExpression::Calm,
        (_, UrgencyLevel::Low) => FacialExpression::Calm,
        (_, UrgencyLevel::Medium) => FacialExpression::Concerned,
        (_, UrgencyLevel::High) => FacialExpression::Stressed,
        (_, UrgencyLevel::Critical) => FacialExpression::Critical,
    };
    Expression {
        face,
        pulsing: status == TimerStatus::Running && level == UrgencyLevel::Critical,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVELS: [UrgencyLevel; 4] = [
        UrgencyLevel::Low,
        UrgencyLevel::Medium,
        UrgencyLevel::High,
        UrgencyLevel::Critical,
    ];

    #[test]
    fn running_faces_follow_urgency() {
        let faces: Vec<_> = LEVELS.iter().map(|l| select(*l, TimerStatus::Running).face).collect();
        assert_eq!(
            faces,
            vec![
                FacialExpression::Calm,
                FacialExpression::Concerned,
                FacialExpression::Stressed,
                FacialExpression::Critical,
            ]
        );
    }

    #[test]
    fn idle_is_calm_and_expired_is_defeated() {
        for level in LEVELS {
            assert_eq!(select(level, TimerStatus::Idle).face, FacialExpression::Calm);
            assert_eq!(select(level, TimerStatus::Expired).face, FacialExpression::Defeated);
            assert!(!select(level, TimerStatus::Expired).pulsing);
        }
    }

    #[test]
    fn paused_keeps_the_face_but_stops_pulsing() {
        let paused = select(UrgencyLevel::Critical, TimerStatus::Paused);
        assert_eq!(paused.face, FacialExpression::Critical);
        assert!(!paused.pulsing);
        assert!(select(UrgencyLevel::Critical, TimerStatus::Running).pulsing);
        assert!(!select(UrgencyLevel::High, TimerStatus::Running).pulsing);
    }
}
