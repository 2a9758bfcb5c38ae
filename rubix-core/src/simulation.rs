/// Frame-driven simulation: input, animation, commit, render
use std::time::Duration;

use log::{debug, info};

use crate::animation::AnimationController;
use crate::config::{SimConfig, ValidConfig};
use crate::cube::CubeState;
use crate::engine::{MoveEngine, RequestOutcome};
use crate::error::{Error, Result};
use crate::input::{HitContext, InputController, KeyAction, KeyInput, PointerKind, PointerOutcome};
use crate::moves::{format_sequence, Direction, Move};
use crate::render::{RenderSurface, Renderer};
use crate::scramble::Scrambler;

/// Input delivered by the host, already translated out of host-native form
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    Key(KeyInput),
    /// Surface coordinates, origin top-left
    Pointer { x: f32, y: f32, kind: PointerKind },
    /// `physical_height` accounts for non-square cells (terminal) and equals
    /// `height` on pixel surfaces
    Resize {
        width: u32,
        height: u32,
        physical_height: u32,
    },
}

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Moves committed to the cube state this tick
    pub committed: Vec<Move>,
    /// Requests dropped because the queue was full
    pub overflowed: usize,
    /// Pointer events reported as ignored
    pub ignored: usize,
    pub direction_changed: Option<Direction>,
    pub quit: bool,
}

pub struct Simulation {
    config: ValidConfig,
    engine: MoveEngine,
    input: InputController,
    renderer: Renderer,
    scrambler: Scrambler,
}

impl Simulation {
    /// Starts solved. `seed` drives scramble generation.
    pub fn new(config: &SimConfig, seed: u64, width: u32, height: u32) -> Result<Self> {
        let config = config.validate()?;
        let animation = AnimationController::new(config.turn_duration)?;
        let engine = MoveEngine::new(CubeState::solved(), animation, config.queue_capacity)?;
        info!(
            "simulation ready: {:?} per turn, queue of {}",
            config.turn_duration, config.queue_capacity
        );
        Ok(Self {
            engine,
            input: InputController::new(
                config.slice_turns,
                config.drag_threshold,
                config.view_step,
            ),
            renderer: Renderer::new(width, height),
            scrambler: Scrambler::new(seed, config.slice_turns),
            config,
        })
    }

    pub fn engine(&self) -> &MoveEngine {
        &self.engine
    }

    pub fn state(&self) -> &CubeState {
        self.engine.state()
    }

    pub fn input(&self) -> &InputController {
        &self.input
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn request_move(&mut self, mv: Move) -> Result<RequestOutcome> {
        self.engine.request_move(mv)
    }

    /// Generate a scramble and apply it instantly. Only between turns.
    pub fn scramble(&mut self) -> Result<Vec<Move>> {
        if !self.engine.is_idle() {
            return Err(Error::Busy);
        }
        let moves = self.scrambler.generate(self.config.scramble_length);
        self.engine.scramble(&moves)?;
        info!("scrambled: {}", format_sequence(&moves));
        Ok(moves)
    }

    /// Back to the solved state. Only between turns.
    pub fn reset(&mut self) -> Result<()> {
        self.engine.reset(CubeState::solved())
    }

    pub fn handle_event(&mut self, event: HostEvent, report: &mut TickReport) {
        match event {
            HostEvent::Key(key) => {
                if let Some(action) = self.input.on_key(key) {
                    self.handle_key_action(action, report);
                }
            }
            HostEvent::Pointer { x, y, kind } => {
                let model = self.renderer.model_matrix();
                let hit = HitContext {
                    camera: &self.renderer.camera,
                    model: &model,
                    width: self.renderer.width,
                    height: self.renderer.height,
                    turning: self.engine.animation().is_turning(),
                };
                match self.input.on_pointer_event(x, y, kind, &hit) {
                    PointerOutcome::Turn(mv) => self.submit(mv, report),
                    PointerOutcome::Pending => {}
                    PointerOutcome::Ignored => report.ignored += 1,
                }
            }
            HostEvent::Resize {
                width,
                height,
                physical_height,
            } => self.resize(width, height, physical_height),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32, physical_height: u32) {
        self.renderer.resize(width, height, physical_height);
    }

    fn handle_key_action(&mut self, action: KeyAction, report: &mut TickReport) {
        match action {
            KeyAction::Turn(mv) => self.submit(mv, report),
            KeyAction::RotateView { dx, dy } => self.renderer.view.rotate(dx, dy),
            KeyAction::DirectionChanged(direction) => {
                debug!("default direction is now {}", direction.name());
                report.direction_changed = Some(direction);
            }
            KeyAction::Scramble => {
                if let Err(err) = self.scramble() {
                    debug!("scramble skipped: {err}");
                }
            }
            KeyAction::CancelQueued => {
                self.engine.cancel_pending();
            }
            KeyAction::Quit => report.quit = true,
        }
    }

    fn submit(&mut self, mv: Move, report: &mut TickReport) {
        if let Err(Error::Overflow { .. }) = self.engine.request_move(mv) {
            report.overflowed += 1;
        }
    }

    /// One frame: drain input, advance the active turn, commit, render.
    pub fn tick<S, I>(
        &mut self,
        dt: Duration,
        events: I,
        surface: &mut S,
    ) -> Result<TickReport, S::Error>
    where
        S: RenderSurface,
        I: IntoIterator<Item = HostEvent>,
    {
        let mut report = TickReport::default();
        for event in events {
            self.handle_event(event, &mut report);
        }
        report.committed.extend(self.engine.tick(dt));
        self.renderer
            .render(self.engine.state(), self.engine.animation(), surface)?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;
    use crate::moves::Layer;
    use crate::render::PieceInstance;
    use nalgebra::Matrix4;

    #[derive(Default)]
    struct NullSurface {
        frames: usize,
    }

    impl RenderSurface for NullSurface {
        type Error = std::convert::Infallible;

        fn begin_frame(&mut self, _: &Matrix4<f32>) -> Result<(), Self::Error> {
            self.frames += 1;
            Ok(())
        }

        fn draw_piece(&mut self, _: &PieceInstance, _: &Matrix4<f32>) -> Result<(), Self::Error> {
            Ok(())
        }

        fn end_frame(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    fn sim() -> Simulation {
        Simulation::new(&SimConfig::default(), 1, 800, 800).unwrap()
    }

    fn key(c: char) -> HostEvent {
        HostEvent::Key(KeyInput::new(Key::Char(c), false))
    }

    const FRAME: Duration = Duration::from_millis(25);

    #[test]
    fn test_invalid_config_is_fatal() {
        let config = SimConfig {
            turn_duration_ms: -1.0,
            ..SimConfig::default()
        };
        assert!(matches!(
            Simulation::new(&config, 0, 800, 600),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_two_key_turns_commit_in_order() {
        let mut sim = sim();
        let mut surface = NullSurface::default();
        let u = Move::new(Layer::U, Direction::Clockwise);
        let r = Move::new(Layer::R, Direction::Clockwise);

        let report = sim.tick(FRAME, [key('u'), key('r')], &mut surface).unwrap();
        assert!(report.committed.is_empty());
        assert_eq!(sim.engine().pending_len(), 1);

        let mut committed = report.committed;
        for _ in 0..19 {
            committed.extend(sim.tick(FRAME, [], &mut surface).unwrap().committed);
        }
        // 20 frames of 25ms = 2 × 250ms
        assert_eq!(committed, vec![u, r]);
        assert_eq!(*sim.state(), CubeState::from_moves([u, r]));
        assert_eq!(sim.engine().pending_len(), 0);
        assert_eq!(surface.frames, 20);
    }

    #[test]
    fn test_pointer_during_turn_is_ignored() {
        let mut sim = sim();
        let mut surface = NullSurface::default();
        sim.tick(FRAME, [key('f')], &mut surface).unwrap();
        let before = sim.state().clone();
        let report = sim
            .tick(
                Duration::ZERO,
                [
                    HostEvent::Pointer { x: 400.0, y: 400.0, kind: PointerKind::Press },
                    HostEvent::Pointer { x: 500.0, y: 400.0, kind: PointerKind::Release },
                ],
                &mut surface,
            )
            .unwrap();
        assert_eq!(report.ignored, 2);
        assert_eq!(*sim.state(), before);
        assert_eq!(sim.engine().pending_len(), 0);
    }

    #[test]
    fn test_overflow_is_reported() {
        let mut sim = sim();
        let mut surface = NullSurface::default();
        let keys: Vec<HostEvent> = std::iter::repeat(key('l')).take(10).collect();
        let report = sim.tick(Duration::ZERO, keys, &mut surface).unwrap();
        assert_eq!(report.overflowed, 1);
        assert_eq!(sim.engine().pending_len(), 8);
    }

    #[test]
    fn test_scramble_key_only_when_idle() {
        let mut sim = sim();
        let mut surface = NullSurface::default();
        sim.tick(FRAME, [key('u'), HostEvent::Key(KeyInput::new(Key::Space, false))], &mut surface)
            .unwrap();
        // Busy: the scramble was skipped, only U is animating
        assert_eq!(sim.engine().pending_len(), 0);
        assert!(sim.state().is_solved());

        for _ in 0..10 {
            sim.tick(FRAME, [], &mut surface).unwrap();
        }
        let moves = sim.scramble().unwrap();
        assert_eq!(moves.len(), 25);
        assert!(!sim.state().is_solved());
        sim.reset().unwrap();
        assert!(sim.state().is_solved());
    }

    #[test]
    fn test_escape_cancels_queue() {
        let mut sim = sim();
        let mut surface = NullSurface::default();
        let escape = HostEvent::Key(KeyInput::new(Key::Escape, false));
        sim.tick(Duration::ZERO, [key('u'), key('d'), key('b'), escape], &mut surface)
            .unwrap();
        assert_eq!(sim.engine().pending_len(), 0);
        assert!(sim.engine().animation().is_turning());
    }

    #[test]
    fn test_arrow_keys_rotate_view() {
        let mut sim = sim();
        let mut surface = NullSurface::default();
        let before = sim.renderer().view;
        sim.tick(Duration::ZERO, [HostEvent::Key(KeyInput::new(Key::Right, false))], &mut surface)
            .unwrap();
        assert!((sim.renderer().view.y - before.y - 0.15).abs() < 1e-6);
    }

    #[test]
    fn test_quit_key() {
        let mut sim = sim();
        let mut surface = NullSurface::default();
        let report = sim.tick(Duration::ZERO, [key('q')], &mut surface).unwrap();
        assert!(report.quit);
    }
}
