/// Turn animation state machine
use std::f32::consts::PI;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::moves::Move;

/// Cosine from 0 to PI: slow start, slow finish.
pub fn ease(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    (1.0 - (t * PI).cos()) / 2.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationState {
    Idle,
    Turning {
        turn: Move,
        /// Time spent on this turn so far, never more than the turn duration
        elapsed: Duration,
    },
}

/// Snapshot of the active turn for one rendered frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TurnFrame {
    pub turn: Move,
    /// Linear time fraction in [0, 1]
    pub t: f32,
    /// `ease(t)`
    pub eased: f32,
}

impl TurnFrame {
    /// Rotation angle about the positive layer axis reached at this frame
    pub fn angle(&self) -> f32 {
        self.turn.angle() * self.eased
    }
}

/// A turn that reached t = 1 during `advance`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinishedTurn {
    pub turn: Move,
    /// Part of the advanced time left over after the turn ended
    pub overshoot: Duration,
}

/// Drives at most one turn at a time.
///
/// Progress depends only on elapsed time, never on frame count. A started
/// turn cannot be cancelled; it always runs to completion.
#[derive(Debug, Clone)]
pub struct AnimationController {
    turn_duration: Duration,
    state: AnimationState,
}

impl AnimationController {
    pub fn new(turn_duration: Duration) -> Result<Self> {
        if turn_duration.is_zero() {
            return Err(Error::InvalidConfiguration(
                "turn duration must be strictly positive".to_string(),
            ));
        }
        Ok(Self {
            turn_duration,
            state: AnimationState::Idle,
        })
    }

    pub fn turn_duration(&self) -> Duration {
        self.turn_duration
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    pub fn is_turning(&self) -> bool {
        matches!(self.state, AnimationState::Turning { .. })
    }

    /// Begin a turn at t = 0. Fails without touching the active turn if one is running.
    pub fn start(&mut self, turn: Move) -> Result<()> {
        if self.is_turning() {
            return Err(Error::Busy);
        }
        self.begin(turn);
        Ok(())
    }

    /// Start `turn` at t = 0 once `advance` has reported the previous one finished
    pub(crate) fn begin(&mut self, turn: Move) {
        self.state = AnimationState::Turning {
            turn,
            elapsed: Duration::ZERO,
        };
    }

    /// Advance by `dt` of wall-clock time. Returns the turn that just finished, if any,
    /// with the time that was not needed to finish it.
    pub fn advance(&mut self, dt: Duration) -> Option<FinishedTurn> {
        let AnimationState::Turning { turn, elapsed } = &mut self.state else {
            return None;
        };
        let total = elapsed.saturating_add(dt);
        if total < self.turn_duration {
            *elapsed = total;
            return None;
        }
        let finished = FinishedTurn {
            turn: *turn,
            overshoot: total - self.turn_duration,
        };
        self.state = AnimationState::Idle;
        Some(finished)
    }

    /// Linear progress of the active turn, if any
    pub fn progress(&self) -> Option<f32> {
        match self.state {
            AnimationState::Idle => None,
            AnimationState::Turning { elapsed, .. } => {
                Some((elapsed.as_secs_f64() / self.turn_duration.as_secs_f64()) as f32)
            }
        }
    }

    pub fn current(&self) -> Option<TurnFrame> {
        let AnimationState::Turning { turn, .. } = self.state else {
            return None;
        };
        let t = self.progress().unwrap_or(0.0);
        Some(TurnFrame {
            turn,
            t,
            eased: ease(t),
        })
    }
}
