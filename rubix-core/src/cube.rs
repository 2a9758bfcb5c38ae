/// Logical cube state: cubie positions, orientations and the layer algebra
use std::fmt;

use nalgebra::{Matrix4, Vector3};

use crate::moves::{Direction, Layer, Move};

/// Number of movable pieces (8 corners, 12 edges, 6 centres)
pub const CUBIE_COUNT: usize = 26;

/// A grid coordinate in {-1, 0, 1}³
pub type GridPos = [i8; 3];

/// 3-dimensional axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    /// X axis (right)
    X = 0,
    /// Y axis (up)
    Y = 1,
    /// Z axis (towards the viewer)
    Z = 2,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn unit_vector(self) -> Vector3<f32> {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }

    /// The other two axes, in cyclic order after this one
    pub fn perpendiculars(self) -> [Axis; 2] {
        match self {
            Axis::X => [Axis::Y, Axis::Z],
            Axis::Y => [Axis::Z, Axis::X],
            Axis::Z => [Axis::X, Axis::Y],
        }
    }
}

/// One of the six outer faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    R,
    L,
    U,
    D,
    F,
    B,
}

impl Face {
    pub const ALL: [Face; 6] = [Face::R, Face::L, Face::U, Face::D, Face::F, Face::B];

    pub fn axis(self) -> Axis {
        match self {
            Face::R | Face::L => Axis::X,
            Face::U | Face::D => Axis::Y,
            Face::F | Face::B => Axis::Z,
        }
    }

    /// +1 for R, U, F; -1 for L, D, B
    pub fn sign(self) -> i8 {
        match self {
            Face::R | Face::U | Face::F => 1,
            Face::L | Face::D | Face::B => -1,
        }
    }

    pub fn from_axis_sign(axis: Axis, sign: i8) -> Self {
        match (axis, sign >= 0) {
            (Axis::X, true) => Face::R,
            (Axis::X, false) => Face::L,
            (Axis::Y, true) => Face::U,
            (Axis::Y, false) => Face::D,
            (Axis::Z, true) => Face::F,
            (Axis::Z, false) => Face::B,
        }
    }

    /// Slot index used for per-face data (0..6, same order as `ALL`)
    pub fn index(self) -> usize {
        self as usize
    }

    /// Outward unit normal
    pub fn normal(self) -> Vector3<f32> {
        self.axis().unit_vector() * self.sign() as f32
    }

    pub fn name(self) -> &'static str {
        match self {
            Face::R => "Right",
            Face::L => "Left",
            Face::U => "Up",
            Face::D => "Down",
            Face::F => "Front",
            Face::B => "Back",
        }
    }
}

/// An element of the 24-element rotation group of the cube, stored as an
/// exact signed permutation matrix with determinant +1.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rotation([[i8; 3]; 3]);

impl Rotation {
    pub const IDENTITY: Rotation = Rotation([[1, 0, 0], [0, 1, 0], [0, 0, 1]]);

    /// Rotation by `turns` quarter turns about the positive `axis`,
    /// counter-clockwise by the right-hand rule.
    pub fn quarter_turns(axis: Axis, turns: i32) -> Self {
        let [a, b] = axis.perpendiculars();
        let (cos, sin) = match turns.rem_euclid(4) {
            0 => (1, 0),
            1 => (0, 1),
            2 => (-1, 0),
            _ => (0, -1),
        };
        let mut m = [[0i8; 3]; 3];
        m[axis.index()][axis.index()] = 1;
        m[a.index()][a.index()] = cos;
        m[a.index()][b.index()] = -sin;
        m[b.index()][a.index()] = sin;
        m[b.index()][b.index()] = cos;
        Rotation(m)
    }

    /// `self` applied after `other`
    #[must_use]
    pub fn compose(&self, other: &Rotation) -> Rotation {
        let mut m = [[0i8; 3]; 3];
        for (i, row) in m.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.0[i][k] * other.0[k][j]).sum();
            }
        }
        Rotation(m)
    }

    /// Orthonormal, so the inverse is the transpose
    #[must_use]
    pub fn inverse(&self) -> Rotation {
        let mut m = [[0i8; 3]; 3];
        for (i, row) in m.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = self.0[j][i];
            }
        }
        Rotation(m)
    }

    pub fn apply(&self, p: GridPos) -> GridPos {
        let mut out = [0i8; 3];
        for (i, v) in out.iter_mut().enumerate() {
            *v = (0..3).map(|k| self.0[i][k] * p[k]).sum();
        }
        out
    }

    /// Face that the given home face now points towards
    pub fn apply_face(&self, face: Face) -> Face {
        let mut v = [0i8; 3];
        v[face.axis().index()] = face.sign();
        let r = self.apply(v);
        let axis = Axis::ALL
            .into_iter()
            .find(|a| r[a.index()] != 0)
            .unwrap_or(Axis::X);
        Face::from_axis_sign(axis, r[axis.index()])
    }

    #[rustfmt::skip]
    pub fn to_matrix(&self) -> Matrix4<f32> {
        let m = &self.0;
        Matrix4::new(
            m[0][0] as f32, m[0][1] as f32, m[0][2] as f32, 0.0,
            m[1][0] as f32, m[1][1] as f32, m[1][2] as f32, 0.0,
            m[2][0] as f32, m[2][1] as f32, m[2][2] as f32, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// All 24 proper rotations of the cube, identity first
    pub fn all() -> Vec<Rotation> {
        let generators = [
            Rotation::quarter_turns(Axis::X, 1),
            Rotation::quarter_turns(Axis::Y, 1),
            Rotation::quarter_turns(Axis::Z, 1),
        ];
        let mut group = vec![Rotation::IDENTITY];
        let mut i = 0;
        while i < group.len() {
            for g in &generators {
                let next = g.compose(&group[i]);
                if !group.contains(&next) {
                    group.push(next);
                }
            }
            i += 1;
        }
        group
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Debug for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rotation{:?}", self.0)
    }
}

/// Stable identity of a cubie: the index of its home position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CubieId(pub u8);

impl CubieId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Home positions in a fixed order: z-major, then y, then x, skipping the core
    pub fn home(self) -> GridPos {
        HOMES[self.index()]
    }

    pub fn all() -> impl Iterator<Item = CubieId> {
        (0..CUBIE_COUNT as u8).map(CubieId)
    }
}

const HOMES: [GridPos; CUBIE_COUNT] = {
    let mut homes = [[0i8; 3]; CUBIE_COUNT];
    let mut n = 0;
    let mut i = 0;
    while i < 27 {
        let pos = [(i % 3) as i8 - 1, ((i / 3) % 3) as i8 - 1, (i / 9) as i8 - 1];
        if !(pos[0] == 0 && pos[1] == 0 && pos[2] == 0) {
            homes[n] = pos;
            n += 1;
        }
        i += 1;
    }
    homes
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubieKind {
    Center,
    Edge,
    Corner,
}

/// One movable piece
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cubie {
    pub id: CubieId,
    pub position: GridPos,
    pub orientation: Rotation,
}

impl Cubie {
    fn at_home(id: CubieId) -> Self {
        Self {
            id,
            position: id.home(),
            orientation: Rotation::IDENTITY,
        }
    }

    pub fn kind(&self) -> CubieKind {
        match self.id.home().iter().filter(|c| **c != 0).count() {
            1 => CubieKind::Center,
            2 => CubieKind::Edge,
            _ => CubieKind::Corner,
        }
    }

    pub fn is_home(&self) -> bool {
        self.position == self.id.home() && self.orientation == Rotation::IDENTITY
    }
}

/// Small bitset of cubie identities
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CubieSet(u32);

impl CubieSet {
    pub fn insert(&mut self, id: CubieId) {
        self.0 |= 1 << id.0;
    }

    pub fn contains(&self, id: CubieId) -> bool {
        self.0 & (1 << id.0) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = CubieId> + '_ {
        CubieId::all().filter(move |id| self.contains(*id))
    }
}

/// The full puzzle state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CubeState {
    cubies: [Cubie; CUBIE_COUNT],
}

impl CubeState {
    pub fn solved() -> Self {
        Self {
            cubies: std::array::from_fn(|i| Cubie::at_home(CubieId(i as u8))),
        }
    }

    pub fn from_moves<I: IntoIterator<Item = Move>>(moves: I) -> Self {
        let mut state = Self::solved();
        state.apply_moves(moves);
        state
    }

    pub fn cubie(&self, id: CubieId) -> &Cubie {
        &self.cubies[id.index()]
    }

    pub fn cubies(&self) -> &[Cubie; CUBIE_COUNT] {
        &self.cubies
    }

    pub fn cubie_at(&self, position: GridPos) -> Option<&Cubie> {
        self.cubies.iter().find(|c| c.position == position)
    }

    /// All cubies whose current position lies in the given layer
    pub fn cubies_in_layer(&self, layer: Layer) -> CubieSet {
        let axis = layer.axis().index();
        let depth = layer.depth();
        let mut set = CubieSet::default();
        for cubie in &self.cubies {
            if cubie.position[axis] == depth {
                set.insert(cubie.id);
            }
        }
        set
    }

    /// Turn one layer. Exact: four quarter turns restore every affected cubie.
    pub fn apply_rotation(&mut self, layer: Layer, direction: Direction) {
        let rotation = Move::new(layer, direction).rotation();
        for id in self.cubies_in_layer(layer).iter() {
            let cubie = &mut self.cubies[id.index()];
            cubie.position = rotation.apply(cubie.position);
            cubie.orientation = rotation.compose(&cubie.orientation);
        }
    }

    pub fn apply_move(&mut self, mv: Move) {
        self.apply_rotation(mv.layer, mv.direction);
    }

    pub fn apply_moves<I: IntoIterator<Item = Move>>(&mut self, moves: I) {
        for mv in moves {
            self.apply_move(mv);
        }
    }

    pub fn is_solved(&self) -> bool {
        self.cubies.iter().all(Cubie::is_home)
    }
}

impl Default for CubeState {
    fn default() -> Self {
        Self::solved()
    }
}
