/// Per-frame projection of the cube state onto piece transforms
use nalgebra::Matrix4;

use crate::animation::{AnimationController, TurnFrame};
use crate::cube::{CubeState, CubieId, Face, GridPos, CUBIE_COUNT};
use crate::projection::Camera;
use crate::transform::{RotationState, Transform};

/// Number of drawn pieces: the 26 cubies plus the fixed internal core
pub const PIECE_COUNT: usize = CUBIE_COUNT + 1;

/// Slot of the internal core in `piece_instances`
pub const CORE_SLOT: usize = CUBIE_COUNT;

/// Edge length of a drawn piece; slightly under 1 so the grooves show
pub const PIECE_SIZE: f32 = 0.94;

/// Sticker colours, standard scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StickerColor {
    White,
    Yellow,
    Green,
    Blue,
    Red,
    Orange,
}

impl StickerColor {
    /// Colour of the stickers that start on this face
    pub fn for_face(face: Face) -> Self {
        match face {
            Face::U => StickerColor::White,
            Face::D => StickerColor::Yellow,
            Face::F => StickerColor::Green,
            Face::B => StickerColor::Blue,
            Face::R => StickerColor::Red,
            Face::L => StickerColor::Orange,
        }
    }

    pub fn rgb(self) -> [f32; 3] {
        match self {
            StickerColor::White => [0.95, 0.95, 0.95],
            StickerColor::Yellow => [1.0, 0.84, 0.0],
            StickerColor::Green => [0.0, 0.62, 0.33],
            StickerColor::Blue => [0.0, 0.27, 0.68],
            StickerColor::Red => [0.73, 0.07, 0.2],
            StickerColor::Orange => [1.0, 0.35, 0.0],
        }
    }
}

/// Colour of an inner (unstickered) face
pub const INNER_RGB: [f32; 3] = [0.08, 0.08, 0.08];

/// Sticker per face slot (indexed by `Face::index`) in a piece's home frame
pub type StickerSet = [Option<StickerColor>; 6];

/// Stickers of the piece whose home is `home`; fixed for the whole session
pub fn stickers_for_home(home: GridPos) -> StickerSet {
    let mut stickers = [None; 6];
    for face in Face::ALL {
        if home[face.axis().index()] == face.sign() {
            stickers[face.index()] = Some(StickerColor::for_face(face));
        }
    }
    stickers
}

/// One piece to draw this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieceInstance {
    /// Stable slot 0..27; `CORE_SLOT` is the internal core
    pub slot: usize,
    /// Piece frame to cube frame
    pub model: Matrix4<f32>,
    pub stickers: StickerSet,
}

/// Narrow capability interface implemented by each drawing back-end
pub trait RenderSurface {
    type Error;

    /// `view_projection` already includes the whole-cube view rotation's camera
    fn begin_frame(&mut self, view_projection: &Matrix4<f32>) -> Result<(), Self::Error>;

    /// `model` maps the unit piece mesh into world space
    fn draw_piece(
        &mut self,
        piece: &PieceInstance,
        model: &Matrix4<f32>,
    ) -> Result<(), Self::Error>;

    fn end_frame(&mut self) -> Result<(), Self::Error>;
}

/// Transforms for all 27 pieces. Stationary pieces sit at
/// `orientation · translate(home)`; pieces in the turning layer are further
/// rotated about the layer axis by the eased fraction of the turn angle.
pub fn piece_instances(
    state: &CubeState,
    frame: Option<TurnFrame>,
) -> [PieceInstance; PIECE_COUNT] {
    let turning = frame.map(|frame| {
        let layer = frame.turn.layer;
        (
            state.cubies_in_layer(layer),
            Transform::axis_rotation(layer.axis(), frame.angle()),
        )
    });

    std::array::from_fn(|slot| {
        if slot == CORE_SLOT {
            return PieceInstance {
                slot,
                model: Matrix4::identity(),
                stickers: [None; 6],
            };
        }
        let id = CubieId(slot as u8);
        let cubie = state.cubie(id);
        let home = id.home();
        let base = cubie.orientation.to_matrix()
            * Transform::translation_matrix(home[0] as f32, home[1] as f32, home[2] as f32);
        let model = match &turning {
            Some((members, spin)) if members.contains(id) => spin * base,
            _ => base,
        };
        PieceInstance {
            slot,
            model,
            stickers: stickers_for_home(home),
        }
    })
}

/// Read-only view of the simulation for drawing: camera plus whole-cube view rotation
#[derive(Debug, Clone)]
pub struct Renderer {
    pub camera: Camera,
    pub view: RotationState,
    pub width: u32,
    pub height: u32,
}

impl Renderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            camera: Camera::new(width, height),
            view: RotationState::default(),
            width,
            height,
        }
    }

    /// `physical_height` differs from `height` when surface cells are not square
    pub fn resize(&mut self, width: u32, height: u32, physical_height: u32) {
        self.width = width;
        self.height = height;
        self.camera.set_aspect(width, physical_height);
    }

    /// Whole-cube rotation (cube frame to world)
    pub fn model_matrix(&self) -> Matrix4<f32> {
        Transform::rotation_matrix(&self.view)
    }

    pub fn render<S: RenderSurface>(
        &self,
        state: &CubeState,
        animation: &AnimationController,
        surface: &mut S,
    ) -> Result<(), S::Error> {
        let model = self.model_matrix();
        surface.begin_frame(&self.camera.view_projection())?;
        for piece in piece_instances(state, animation.current()) {
            let world = model * piece.model * Transform::scale_matrix(PIECE_SIZE);
            surface.draw_piece(&piece, &world)?;
        }
        surface.end_frame()
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::{Direction, Layer, Move};
    use nalgebra::Point3;
    use std::time::Duration;

    fn center_of(piece: &PieceInstance) -> Point3<f32> {
        piece.model.transform_point(&Point3::origin())
    }

    #[test]
    fn test_solved_pieces_at_home() {
        let state = CubeState::solved();
        let pieces = piece_instances(&state, None);
        assert_eq!(pieces.len(), 27);
        for piece in &pieces[..CUBIE_COUNT] {
            let home = CubieId(piece.slot as u8).home();
            let expected = Point3::new(home[0] as f32, home[1] as f32, home[2] as f32);
            assert!((center_of(piece) - expected).norm() < 1e-6);
        }
        assert_eq!(pieces[CORE_SLOT].model, Matrix4::identity());
    }

    #[test]
    fn test_sticker_counts() {
        let total: usize = CubieId::all()
            .map(|id| stickers_for_home(id.home()).iter().flatten().count())
            .sum();
        assert_eq!(total, 54);
    }

    #[test]
    fn test_standard_colour_scheme() {
        let pairs = [
            (Face::U, StickerColor::White, Face::D, StickerColor::Yellow),
            (Face::F, StickerColor::Green, Face::B, StickerColor::Blue),
            (Face::R, StickerColor::Red, Face::L, StickerColor::Orange),
        ];
        for (face, color, opposite, opposite_color) in pairs {
            assert_eq!(StickerColor::for_face(face), color);
            assert_eq!(StickerColor::for_face(opposite), opposite_color);
        }
    }

    #[test]
    fn test_committed_move_matches_logical_position() {
        let state = CubeState::from_moves(["R".parse::<Move>().unwrap(), "U'".parse().unwrap()]);
        for piece in &piece_instances(&state, None)[..CUBIE_COUNT] {
            let pos = state.cubie(CubieId(piece.slot as u8)).position;
            let expected = Point3::new(pos[0] as f32, pos[1] as f32, pos[2] as f32);
            assert!((center_of(piece) - expected).norm() < 1e-5);
        }
    }

    #[test]
    fn test_turning_layer_is_rotated_partially() {
        let state = CubeState::solved();
        let mut animation = AnimationController::new(Duration::from_millis(100)).unwrap();
        let turn = Move::new(Layer::U, Direction::Clockwise);
        animation.start(turn).unwrap();
        animation.advance(Duration::from_millis(50));

        let pieces = piece_instances(&state, animation.current());
        let members = state.cubies_in_layer(Layer::U);
        for piece in &pieces[..CUBIE_COUNT] {
            let id = CubieId(piece.slot as u8);
            let home = id.home();
            let c = center_of(piece);
            if members.contains(id) {
                assert!((c.y - 1.0).abs() < 1e-6);
                if home[0] != 0 || home[2] != 0 {
                    // Halfway round the axis, off the grid
                    let radius = (home[0] as f32).hypot(home[2] as f32);
                    assert!((c.x.hypot(c.z) - radius).abs() < 1e-5);
                    assert!((c.x - home[0] as f32).hypot(c.z - home[2] as f32) > 0.5);
                }
            } else {
                let expected = Point3::new(home[0] as f32, home[1] as f32, home[2] as f32);
                assert!((c - expected).norm() < 1e-6);
            }
        }
    }

    #[test]
    fn test_full_turn_frame_equals_committed_state() {
        let state = CubeState::solved();
        let turn = Move::new(Layer::F, Direction::Double);
        let frame = TurnFrame { turn, t: 1.0, eased: 1.0 };
        let animated = piece_instances(&state, Some(frame));
        let committed = piece_instances(&CubeState::from_moves([turn]), None);
        for (a, b) in animated.iter().zip(committed.iter()) {
            assert!((a.model - b.model).norm() < 1e-5, "slot {}", a.slot);
        }
    }

    struct Recorder {
        frames: usize,
        pieces: usize,
    }

    impl RenderSurface for Recorder {
        type Error = ();

        fn begin_frame(&mut self, _view_projection: &Matrix4<f32>) -> Result<(), ()> {
            self.frames += 1;
            Ok(())
        }

        fn draw_piece(&mut self, _piece: &PieceInstance, _model: &Matrix4<f32>) -> Result<(), ()> {
            self.pieces += 1;
            Ok(())
        }

        fn end_frame(&mut self) -> Result<(), ()> {
            Ok(())
        }
    }

    #[test]
    fn test_render_draws_every_piece_once() {
        let renderer = Renderer::default();
        let animation = AnimationController::new(Duration::from_millis(100)).unwrap();
        let mut recorder = Recorder { frames: 0, pieces: 0 };
        renderer
            .render(&CubeState::solved(), &animation, &mut recorder)
            .unwrap();
        assert_eq!(recorder.frames, 1);
        assert_eq!(recorder.pieces, PIECE_COUNT);
    }
}
