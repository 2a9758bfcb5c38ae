/// Translation of keyboard and pointer input into turns and view actions
use log::trace;
use nalgebra::{Matrix4, Point3, Vector3};

use crate::cube::{Axis, Face};
use crate::moves::{Direction, Layer, Move};
use crate::projection::{Camera, Ray};

/// Half the edge length of the whole assembly, in cube units
pub const CUBE_HALF_EXTENT: f32 = 1.5;

/// Host-independent key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Up,
    Down,
    Left,
    Right,
    Space,
    Tab,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    pub key: Key,
    pub shift: bool,
}

impl KeyInput {
    pub fn new(key: Key, shift: bool) -> Self {
        Self { key, shift }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyAction {
    Turn(Move),
    /// Rotate the whole-cube view by (pitch, yaw) radians
    RotateView { dx: f32, dy: f32 },
    /// The default turn direction changed
    DirectionChanged(Direction),
    Scramble,
    CancelQueued,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Press,
    Drag,
    Release,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    /// The gesture completed and maps to this turn
    Turn(Move),
    /// A gesture on the cube is in progress
    Pending,
    /// Mid-animation, outside the cube, or too short to be a turn
    Ignored,
}

/// What the pointer is hit-tested against: the idle-state layout as the user sees it
#[derive(Debug, Clone, Copy)]
pub struct HitContext<'a> {
    pub camera: &'a Camera,
    /// Whole-cube model rotation (cube frame to world)
    pub model: &'a Matrix4<f32>,
    pub width: u32,
    pub height: u32,
    /// Whether a turn is being animated right now
    pub turning: bool,
}

impl HitContext<'_> {
    /// Pointer ray expressed in the cube's own frame
    fn cube_ray(&self, x: f32, y: f32) -> Option<Ray> {
        let ray = self.camera.screen_ray(x, y, self.width, self.height)?;
        let inverse = self.model.try_inverse()?;
        Some(ray.transformed(&inverse))
    }
}

#[derive(Debug, Clone, Copy)]
struct Gesture {
    face: Face,
    start: Point3<f32>,
}

#[derive(Debug, Clone)]
pub struct InputController {
    default_direction: Direction,
    slice_turns: bool,
    drag_threshold: f32,
    view_step: f32,
    gesture: Option<Gesture>,
}

impl InputController {
    pub fn new(slice_turns: bool, drag_threshold: f32, view_step: f32) -> Self {
        Self {
            default_direction: Direction::Clockwise,
            slice_turns,
            drag_threshold,
            view_step,
            gesture: None,
        }
    }

    pub fn default_direction(&self) -> Direction {
        self.default_direction
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    /// Flip the direction used by unshifted turn keys
    pub fn toggle_direction(&mut self) -> Direction {
        self.default_direction = self.default_direction.reverse();
        self.default_direction
    }

    /// Keyboard path: no hit-testing, one key per layer, shift reverses.
    pub fn on_key(&mut self, input: KeyInput) -> Option<KeyAction> {
        let step = self.view_step;
        match input.key {
            Key::Char(c) => {
                if c.eq_ignore_ascii_case(&'q') {
                    return Some(KeyAction::Quit);
                }
                let layer = Layer::from_symbol(c)?;
                if layer.is_slice() && !self.slice_turns {
                    return None;
                }
                let reverse = input.shift || c.is_ascii_uppercase();
                let direction = if reverse {
                    self.default_direction.reverse()
                } else {
                    self.default_direction
                };
                Some(KeyAction::Turn(Move::new(layer, direction)))
            }
            Key::Up => Some(KeyAction::RotateView { dx: -step, dy: 0.0 }),
            Key::Down => Some(KeyAction::RotateView { dx: step, dy: 0.0 }),
            Key::Left => Some(KeyAction::RotateView { dx: 0.0, dy: -step }),
            Key::Right => Some(KeyAction::RotateView { dx: 0.0, dy: step }),
            Key::Tab => Some(KeyAction::DirectionChanged(self.toggle_direction())),
            Key::Space => Some(KeyAction::Scramble),
            Key::Escape => Some(KeyAction::CancelQueued),
        }
    }

    /// Pointer path: press on a face, drag, release. The turn is decided on release.
    pub fn on_pointer_event(
        &mut self,
        x: f32,
        y: f32,
        kind: PointerKind,
        hit: &HitContext<'_>,
    ) -> PointerOutcome {
        if hit.turning {
            self.gesture = None;
            return PointerOutcome::Ignored;
        }
        match kind {
            PointerKind::Press => {
                self.gesture = hit
                    .cube_ray(x, y)
                    .and_then(|ray| pick_face(&ray))
                    .map(|(face, start)| Gesture { face, start });
                match self.gesture {
                    Some(gesture) => {
                        trace!("gesture started on {} face", gesture.face.name());
                        PointerOutcome::Pending
                    }
                    None => PointerOutcome::Ignored,
                }
            }
            PointerKind::Drag if self.gesture.is_some() => PointerOutcome::Pending,
            PointerKind::Drag | PointerKind::Cancel => {
                self.gesture = None;
                PointerOutcome::Ignored
            }
            PointerKind::Release => {
                let Some(gesture) = self.gesture.take() else {
                    return PointerOutcome::Ignored;
                };
                let end = hit
                    .cube_ray(x, y)
                    .and_then(|ray| intersect_face_plane(&ray, gesture.face));
                match end.and_then(|end| self.drag_to_move(gesture, end)) {
                    Some(mv) => PointerOutcome::Turn(mv),
                    None => PointerOutcome::Ignored,
                }
            }
        }
    }

    /// The dragged layer turns so that the touched point follows the drag.
    fn drag_to_move(&self, gesture: Gesture, end: Point3<f32>) -> Option<Move> {
        let normal = gesture.face.normal();
        let mut drag = end - gesture.start;
        drag -= normal * drag.dot(&normal);
        if drag.norm() < self.drag_threshold {
            return None;
        }

        let [a, b] = gesture.face.axis().perpendiculars();
        let along = if drag[a.index()].abs() >= drag[b.index()].abs() { a } else { b };
        let drag_dir = along.unit_vector() * drag[along.index()].signum();

        // Angular velocity that moves the touched point along the drag
        let spin: Vector3<f32> = normal.cross(&drag_dir);
        let axis = dominant_axis(&spin);
        let spin_sign = spin[axis.index()].signum() as i32;

        let depth = layer_depth(gesture.start[axis.index()]);
        let layer = Layer::from_axis_depth(axis, depth);
        if layer.is_slice() && !self.slice_turns {
            return None;
        }

        let clockwise_turns = -(layer.reference_face().sign() as i32);
        let direction = if spin_sign == clockwise_turns {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        };
        Some(Move::new(layer, direction))
    }
}

impl Default for InputController {
    fn default() -> Self {
        Self::new(true, 0.25, 0.15)
    }
}

fn dominant_axis(v: &Vector3<f32>) -> Axis {
    Axis::ALL
        .into_iter()
        .max_by(|p, q| v[p.index()].abs().total_cmp(&v[q.index()].abs()))
        .unwrap_or(Axis::X)
}

fn layer_depth(coord: f32) -> i8 {
    if coord > 0.5 {
        1
    } else if coord < -0.5 {
        -1
    } else {
        0
    }
}

/// Slab test against the assembly's bounding cube; returns the entry face and point.
pub fn pick_face(ray: &Ray) -> Option<(Face, Point3<f32>)> {
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut enter_face = None;

    for axis in Axis::ALL {
        let i = axis.index();
        let o = ray.origin[i];
        let d = ray.direction[i];
        if d.abs() < 1e-9 {
            if o.abs() > CUBE_HALF_EXTENT {
                return None;
            }
            continue;
        }
        let t0 = (-CUBE_HALF_EXTENT - o) / d;
        let t1 = (CUBE_HALF_EXTENT - o) / d;
        let (near, far) = if t0 < t1 { (t0, t1) } else { (t1, t0) };
        if near > t_enter {
            t_enter = near;
            // Entering through the side facing against the ray
            let sign = if d > 0.0 { -1 } else { 1 };
            enter_face = Some(Face::from_axis_sign(axis, sign));
        }
        t_exit = t_exit.min(far);
    }

    if t_enter > t_exit || t_exit < 0.0 || t_enter < 0.0 {
        return None;
    }
    enter_face.map(|face| (face, ray.at(t_enter)))
}

/// Where the ray crosses the (infinite) plane of a face
pub fn intersect_face_plane(ray: &Ray, face: Face) -> Option<Point3<f32>> {
    let i = face.axis().index();
    let d = ray.direction[i];
    if d.abs() < 1e-9 {
        return None;
    }
    let t = (face.sign() as f32 * CUBE_HALF_EXTENT - ray.origin[i]) / d;
    (t >= 0.0).then(|| ray.at(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(c: char) -> KeyInput {
        KeyInput::new(Key::Char(c), false)
    }

    fn hit<'a>(camera: &'a Camera, model: &'a Matrix4<f32>, turning: bool) -> HitContext<'a> {
        HitContext {
            camera,
            model,
            width: 800,
            height: 800,
            turning,
        }
    }

    fn screen_of(camera: &Camera, p: Point3<f32>) -> (f32, f32) {
        let (x, y, _) = camera
            .project_to_screen(&p, &Matrix4::identity(), 800, 800)
            .unwrap();
        (x, y)
    }

    fn drag(
        input: &mut InputController,
        hit: &HitContext<'_>,
        from: Point3<f32>,
        to: Point3<f32>,
    ) -> PointerOutcome {
        let (x0, y0) = screen_of(hit.camera, from);
        let (x1, y1) = screen_of(hit.camera, to);
        assert_eq!(
            input.on_pointer_event(x0, y0, PointerKind::Press, hit),
            PointerOutcome::Pending
        );
        assert_eq!(
            input.on_pointer_event((x0 + x1) / 2.0, (y0 + y1) / 2.0, PointerKind::Drag, hit),
            PointerOutcome::Pending
        );
        input.on_pointer_event(x1, y1, PointerKind::Release, hit)
    }

    #[test]
    fn test_keys_map_to_layers() {
        let mut input = InputController::default();
        assert_eq!(
            input.on_key(key('u')),
            Some(KeyAction::Turn(Move::new(Layer::U, Direction::Clockwise)))
        );
        assert_eq!(
            input.on_key(KeyInput::new(Key::Char('r'), true)),
            Some(KeyAction::Turn(Move::new(Layer::R, Direction::CounterClockwise)))
        );
        assert_eq!(
            input.on_key(key('F')),
            Some(KeyAction::Turn(Move::new(Layer::F, Direction::CounterClockwise)))
        );
        assert_eq!(input.on_key(key('x')), None);
        assert_eq!(input.on_key(key('q')), Some(KeyAction::Quit));
    }

    #[test]
    fn test_direction_toggle() {
        let mut input = InputController::default();
        assert_eq!(
            input.on_key(KeyInput::new(Key::Tab, false)),
            Some(KeyAction::DirectionChanged(Direction::CounterClockwise))
        );
        assert_eq!(
            input.on_key(key('d')),
            Some(KeyAction::Turn(Move::new(Layer::D, Direction::CounterClockwise)))
        );
        assert_eq!(
            input.on_key(KeyInput::new(Key::Char('d'), true)),
            Some(KeyAction::Turn(Move::new(Layer::D, Direction::Clockwise)))
        );
    }

    #[test]
    fn test_slice_keys_respect_config() {
        let mut with = InputController::new(true, 0.25, 0.1);
        let mut without = InputController::new(false, 0.25, 0.1);
        assert!(matches!(with.on_key(key('m')), Some(KeyAction::Turn(_))));
        assert_eq!(without.on_key(key('m')), None);
    }

    #[test]
    fn test_colour_letters_are_not_layer_keys() {
        let mut input = InputController::default();
        for c in ['o', 'g', 'w', 'y'] {
            assert_eq!(input.on_key(key(c)), None, "{c}");
        }
        // `b` and `r` are notation letters for the back and right layers
        assert_eq!(
            input.on_key(key('b')),
            Some(KeyAction::Turn(Move::new(Layer::B, Direction::Clockwise)))
        );
    }

    #[test]
    fn test_pick_front_face() {
        let ray = Ray {
            origin: Point3::new(0.2, 0.3, 10.0),
            direction: Vector3::new(0.0, 0.0, -1.0),
        };
        let (face, point) = pick_face(&ray).unwrap();
        assert_eq!(face, Face::F);
        assert!((point.z - CUBE_HALF_EXTENT).abs() < 1e-5);

        let miss = Ray {
            origin: Point3::new(3.0, 0.0, 10.0),
            direction: Vector3::new(0.0, 0.0, -1.0),
        };
        assert_eq!(pick_face(&miss), None);
    }

    #[test]
    fn test_drag_top_row_right_is_u_prime() {
        let camera = Camera::new(800, 800);
        let identity = Matrix4::identity();
        let hit = hit(&camera, &identity, false);
        let mut input = InputController::default();
        let outcome = drag(
            &mut input,
            &hit,
            Point3::new(-1.0, 1.0, CUBE_HALF_EXTENT),
            Point3::new(0.5, 1.0, CUBE_HALF_EXTENT),
        );
        assert_eq!(
            outcome,
            PointerOutcome::Turn(Move::new(Layer::U, Direction::CounterClockwise))
        );
    }

    #[test]
    fn test_drag_right_column_up_is_r() {
        let camera = Camera::new(800, 800);
        let identity = Matrix4::identity();
        let hit = hit(&camera, &identity, false);
        let mut input = InputController::default();
        let outcome = drag(
            &mut input,
            &hit,
            Point3::new(1.0, -1.0, CUBE_HALF_EXTENT),
            Point3::new(1.0, 0.5, CUBE_HALF_EXTENT),
        );
        assert_eq!(
            outcome,
            PointerOutcome::Turn(Move::new(Layer::R, Direction::Clockwise))
        );
    }

    #[test]
    fn test_drag_middle_column_is_slice() {
        let camera = Camera::new(800, 800);
        let identity = Matrix4::identity();
        let hit = hit(&camera, &identity, false);
        let from = Point3::new(0.0, 1.0, CUBE_HALF_EXTENT);
        let to = Point3::new(0.0, -0.5, CUBE_HALF_EXTENT);

        // Middle column moving down follows L, so it is M
        let mut input = InputController::default();
        assert_eq!(
            drag(&mut input, &hit, from, to),
            PointerOutcome::Turn(Move::new(Layer::M, Direction::Clockwise))
        );

        let mut no_slices = InputController::new(false, 0.25, 0.1);
        assert_eq!(drag(&mut no_slices, &hit, from, to), PointerOutcome::Ignored);
    }

    #[test]
    fn test_short_drag_is_ignored() {
        let camera = Camera::new(800, 800);
        let identity = Matrix4::identity();
        let hit = hit(&camera, &identity, false);
        let mut input = InputController::default();
        let outcome = drag(
            &mut input,
            &hit,
            Point3::new(0.4, 0.4, CUBE_HALF_EXTENT),
            Point3::new(0.45, 0.4, CUBE_HALF_EXTENT),
        );
        assert_eq!(outcome, PointerOutcome::Ignored);
    }

    #[test]
    fn test_press_outside_cube_is_ignored() {
        let camera = Camera::new(800, 800);
        let identity = Matrix4::identity();
        let hit = hit(&camera, &identity, false);
        let mut input = InputController::default();
        assert_eq!(
            input.on_pointer_event(2.0, 2.0, PointerKind::Press, &hit),
            PointerOutcome::Ignored
        );
        assert!(!input.is_dragging());
    }

    #[test]
    fn test_pointer_ignored_while_turning() {
        let camera = Camera::new(800, 800);
        let identity = Matrix4::identity();
        let idle = hit(&camera, &identity, false);
        let busy = hit(&camera, &identity, true);
        let mut input = InputController::default();
        assert_eq!(
            input.on_pointer_event(400.0, 400.0, PointerKind::Press, &idle),
            PointerOutcome::Pending
        );
        // A turn started mid-gesture: the gesture is dropped
        assert_eq!(
            input.on_pointer_event(500.0, 400.0, PointerKind::Release, &busy),
            PointerOutcome::Ignored
        );
        assert!(!input.is_dragging());
    }

    #[test]
    fn test_drag_on_rotated_view() {
        // Yaw by -90°: the R face now faces the camera
        let camera = Camera::new(800, 800);
        let model =
            crate::transform::Transform::axis_rotation(Axis::Y, -std::f32::consts::FRAC_PI_2);
        let hit = hit(&camera, &model, false);
        let mut input = InputController::default();
        let outcome = drag(
            &mut input,
            &hit,
            Point3::new(-1.0, 1.0, CUBE_HALF_EXTENT),
            Point3::new(0.5, 1.0, CUBE_HALF_EXTENT),
        );
        // Still the top layer being pushed to the right
        assert_eq!(
            outcome,
            PointerOutcome::Turn(Move::new(Layer::U, Direction::CounterClockwise))
        );
    }
}
