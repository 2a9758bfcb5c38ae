/// Move queueing and commitment of finished turns to the cube state
use std::collections::VecDeque;
use std::time::Duration;

use log::{debug, warn};

use crate::animation::AnimationController;
use crate::cube::CubeState;
use crate::error::{Error, Result};
use crate::moves::Move;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The turn started animating immediately
    Accepted,
    /// The turn waits behind the active one
    Queued,
}

/// Owns the cube state and is its only writer.
///
/// A move mutates the state exactly once, at the instant its animation
/// completes; the renderer therefore never sees a half-applied turn.
#[derive(Debug, Clone)]
pub struct MoveEngine {
    state: CubeState,
    animation: AnimationController,
    pending: VecDeque<Move>,
    capacity: usize,
}

impl MoveEngine {
    pub fn new(state: CubeState, animation: AnimationController, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidConfiguration(
                "queue capacity must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            state,
            animation,
            pending: VecDeque::with_capacity(capacity),
            capacity,
        })
    }

    pub fn state(&self) -> &CubeState {
        &self.state
    }

    pub fn animation(&self) -> &AnimationController {
        &self.animation
    }

    /// Moves waiting behind the active turn, oldest first
    pub fn pending(&self) -> impl ExactSizeIterator<Item = &Move> + '_ {
        self.pending.iter()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_idle(&self) -> bool {
        !self.animation.is_turning() && self.pending.is_empty()
    }

    pub fn request_move(&mut self, mv: Move) -> Result<RequestOutcome> {
        if self.animation.start(mv).is_ok() {
            debug!("turn {mv} started");
            return Ok(RequestOutcome::Accepted);
        }
        if self.pending.len() >= self.capacity {
            warn!("turn {mv} dropped, {} already pending", self.pending.len());
            return Err(Error::Overflow {
                capacity: self.capacity,
            });
        }
        self.pending.push_back(mv);
        debug!("turn {mv} queued ({} pending)", self.pending.len());
        Ok(RequestOutcome::Queued)
    }

    /// Advance the active turn. When it completes, commit it to the cube
    /// state, start the next queued move from t = 0 and advance that one by
    /// whatever time the finished turn did not use. A long enough `dt` can
    /// commit several turns.
    pub fn tick(&mut self, dt: Duration) -> Vec<Move> {
        let mut committed = Vec::new();
        let mut remaining = dt;
        while let Some(finished) = self.animation.advance(remaining) {
            let turn = finished.turn;
            self.state.apply_rotation(turn.layer, turn.direction);
            debug!("turn {turn} committed");
            committed.push(turn);

            let Some(next) = self.pending.pop_front() else {
                break;
            };
            self.animation.begin(next);
            debug!("turn {next} started from queue");
            remaining = finished.overshoot;
        }
        committed
    }

    /// Drop every queued move that has not started yet. The active turn keeps running.
    pub fn cancel_pending(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        if dropped > 0 {
            debug!("cancelled {dropped} queued turns");
        }
        dropped
    }

    /// Replace the cube state outright. Only allowed between turns.
    pub fn reset(&mut self, state: CubeState) -> Result<()> {
        if !self.is_idle() {
            return Err(Error::Busy);
        }
        self.state = state;
        Ok(())
    }

    /// Apply a sequence instantly, without animation. Only allowed between turns.
    pub fn scramble(&mut self, moves: &[Move]) -> Result<()> {
        if !self.is_idle() {
            return Err(Error::Busy);
        }
        self.state.apply_moves(moves.iter().copied());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::{Direction, Layer};

    const TURN: Duration = Duration::from_millis(200);

    fn engine() -> MoveEngine {
        let animation = AnimationController::new(TURN).unwrap();
        MoveEngine::new(CubeState::solved(), animation, 8).unwrap()
    }

    fn u() -> Move {
        Move::new(Layer::U, Direction::Clockwise)
    }

    #[test]
    fn test_two_turns_in_order() {
        let mut engine = engine();
        assert_eq!(engine.request_move(u()), Ok(RequestOutcome::Accepted));
        engine.tick(TURN / 4);
        assert_eq!(engine.request_move(u()), Ok(RequestOutcome::Queued));
        assert_eq!(engine.pending_len(), 1);

        let mut committed = Vec::new();
        let mut elapsed = TURN / 4;
        while elapsed < TURN * 2 {
            let dt = Duration::from_millis(10);
            elapsed += dt;
            committed.extend(engine.tick(dt));
        }
        assert_eq!(committed, vec![u(), u()]);
        assert_eq!(engine.pending_len(), 0);
        assert!(engine.is_idle());
        assert_eq!(*engine.state(), CubeState::from_moves([u(), u()]));
    }

    #[test]
    fn test_state_unchanged_mid_turn() {
        let mut engine = engine();
        engine.request_move(u()).unwrap();
        engine.tick(TURN / 2);
        assert!(engine.state().is_solved());
        engine.tick(TURN / 2);
        assert!(!engine.state().is_solved());
    }

    #[test]
    fn test_overflow_keeps_queue() {
        let mut engine = engine();
        engine.request_move(u()).unwrap();
        for _ in 0..8 {
            assert_eq!(engine.request_move(u()), Ok(RequestOutcome::Queued));
        }
        assert_eq!(engine.request_move(u()), Err(Error::Overflow { capacity: 8 }));
        assert_eq!(engine.pending_len(), 8);
    }

    #[test]
    fn test_leftover_time_carries_into_next_turn() {
        let mut engine = engine();
        let r = Move::new(Layer::R, Direction::Clockwise);
        engine.request_move(u()).unwrap();
        engine.request_move(r).unwrap();
        assert_eq!(engine.tick(TURN * 3 / 2), vec![u()]);
        let frame = engine.animation().current().unwrap();
        assert_eq!(frame.turn, r);
        assert!((frame.t - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_turn_duration_independent_of_frame_length() {
        // 150ms frames do not divide the 200ms turn
        let mut engine = engine();
        engine.request_move(u()).unwrap();
        engine.request_move(u()).unwrap();

        let dt = Duration::from_millis(150);
        let mut committed = Vec::new();
        let mut elapsed = Duration::ZERO;
        while elapsed < TURN * 2 {
            elapsed += dt;
            committed.extend(engine.tick(dt));
        }
        assert_eq!(elapsed, Duration::from_millis(450));
        assert_eq!(committed, vec![u(), u()]);
        assert!(engine.is_idle());
    }

    #[test]
    fn test_long_frame_commits_several_turns() {
        let mut engine = engine();
        let r = Move::new(Layer::R, Direction::Clockwise);
        engine.request_move(u()).unwrap();
        engine.request_move(r).unwrap();
        engine.request_move(u()).unwrap();
        assert_eq!(engine.tick(TURN * 5 / 2), vec![u(), r]);
        assert_eq!(engine.pending_len(), 0);
        let frame = engine.animation().current().unwrap();
        assert_eq!(frame.turn, u());
        assert!((frame.t - 0.5).abs() < 1e-6);
        assert_eq!(*engine.state(), CubeState::from_moves([u(), r]));
    }

    #[test]
    fn test_idle_tick_commits_nothing() {
        let mut engine = engine();
        assert!(engine.tick(TURN).is_empty());
        assert!(engine.state().is_solved());
    }

    #[test]
    fn test_cancel_pending_keeps_active_turn() {
        let mut engine = engine();
        engine.request_move(u()).unwrap();
        engine.request_move(u()).unwrap();
        engine.request_move(u()).unwrap();
        assert_eq!(engine.cancel_pending(), 2);
        assert!(engine.animation().is_turning());
        engine.tick(TURN);
        assert_eq!(*engine.state(), CubeState::from_moves([u()]));
    }

    #[test]
    fn test_instant_changes_need_idle() {
        let mut engine = engine();
        engine.request_move(u()).unwrap();
        assert_eq!(engine.scramble(&[u()]), Err(Error::Busy));
        assert_eq!(engine.reset(CubeState::solved()), Err(Error::Busy));
        engine.tick(TURN);
        engine.scramble(&[u().inverse()]).unwrap();
        assert!(engine.state().is_solved());
    }
}
