/// Layer selectors, turn directions and move notation
use std::fmt;
use std::str::FromStr;

use crate::cube::{Axis, Face, Rotation};
use crate::error::Error;

/// A turnable layer: one of the six outer faces or one of the three middle slices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    R,
    L,
    U,
    D,
    F,
    B,
    /// Middle slice between L and R, turning like L
    M,
    /// Equatorial slice between U and D, turning like D
    E,
    /// Standing slice between F and B, turning like F
    S,
}

impl Layer {
    pub const FACES: [Layer; 6] = [Layer::R, Layer::L, Layer::U, Layer::D, Layer::F, Layer::B];
    pub const SLICES: [Layer; 3] = [Layer::M, Layer::E, Layer::S];
    pub const ALL: [Layer; 9] = [
        Layer::R,
        Layer::L,
        Layer::U,
        Layer::D,
        Layer::F,
        Layer::B,
        Layer::M,
        Layer::E,
        Layer::S,
    ];

    pub fn axis(self) -> Axis {
        match self {
            Layer::R | Layer::L | Layer::M => Axis::X,
            Layer::U | Layer::D | Layer::E => Axis::Y,
            Layer::F | Layer::B | Layer::S => Axis::Z,
        }
    }

    /// Coordinate along the axis shared by every cubie of this layer
    pub fn depth(self) -> i8 {
        match self {
            Layer::R | Layer::U | Layer::F => 1,
            Layer::L | Layer::D | Layer::B => -1,
            Layer::M | Layer::E | Layer::S => 0,
        }
    }

    /// The face whose point of view defines "clockwise" for this layer
    pub fn reference_face(self) -> Face {
        match self {
            Layer::R => Face::R,
            Layer::L | Layer::M => Face::L,
            Layer::U => Face::U,
            Layer::D | Layer::E => Face::D,
            Layer::F | Layer::S => Face::F,
            Layer::B => Face::B,
        }
    }

    pub fn is_slice(self) -> bool {
        self.depth() == 0
    }

    /// Layer at the given depth along an axis
    pub fn from_axis_depth(axis: Axis, depth: i8) -> Self {
        match (axis, depth.signum()) {
            (Axis::X, 1) => Layer::R,
            (Axis::X, -1) => Layer::L,
            (Axis::X, _) => Layer::M,
            (Axis::Y, 1) => Layer::U,
            (Axis::Y, -1) => Layer::D,
            (Axis::Y, _) => Layer::E,
            (Axis::Z, 1) => Layer::F,
            (Axis::Z, -1) => Layer::B,
            (Axis::Z, _) => Layer::S,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Layer::R => 'R',
            Layer::L => 'L',
            Layer::U => 'U',
            Layer::D => 'D',
            Layer::F => 'F',
            Layer::B => 'B',
            Layer::M => 'M',
            Layer::E => 'E',
            Layer::S => 'S',
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        Layer::ALL
            .into_iter()
            .find(|layer| layer.symbol() == c.to_ascii_uppercase())
    }
}

impl From<Face> for Layer {
    fn from(face: Face) -> Self {
        Layer::from_axis_depth(face.axis(), face.sign())
    }
}

/// Turn direction, as seen looking at the layer's reference face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Clockwise,
    CounterClockwise,
    Double,
}

impl Direction {
    pub const ALL: [Direction; 3] = [
        Direction::Clockwise,
        Direction::CounterClockwise,
        Direction::Double,
    ];

    #[must_use]
    pub fn reverse(self) -> Self {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
            Direction::Double => Direction::Double,
        }
    }

    /// Signed number of clockwise quarter turns
    pub fn quarter_turns(self) -> i32 {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
            Direction::Double => 2,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Direction::Clockwise => "",
            Direction::CounterClockwise => "'",
            Direction::Double => "2",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Clockwise => "Clockwise",
            Direction::CounterClockwise => "Counter-Clockwise",
            Direction::Double => "Double",
        }
    }
}

/// A single layer turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub layer: Layer,
    pub direction: Direction,
}

impl Move {
    pub fn new(layer: Layer, direction: Direction) -> Self {
        Self { layer, direction }
    }

    #[must_use]
    pub fn inverse(self) -> Self {
        Self::new(self.layer, self.direction.reverse())
    }

    /// Quarter turns about the positive layer axis (right-hand rule)
    pub fn axis_quarter_turns(self) -> i32 {
        -(self.layer.reference_face().sign() as i32) * self.direction.quarter_turns()
    }

    /// Signed rotation angle in radians about the positive layer axis
    pub fn angle(self) -> f32 {
        self.axis_quarter_turns() as f32 * std::f32::consts::FRAC_PI_2
    }

    pub fn rotation(self) -> Rotation {
        Rotation::quarter_turns(self.layer.axis(), self.axis_quarter_turns())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.layer.symbol(), self.direction.suffix())
    }
}

impl FromStr for Move {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        let layer = chars
            .next()
            .filter(char::is_ascii_uppercase)
            .and_then(Layer::from_symbol)
            .ok_or_else(|| Error::InvalidMove(s.to_string()))?;
        let direction = match chars.as_str() {
            "" => Direction::Clockwise,
            "'" => Direction::CounterClockwise,
            "2" | "2'" => Direction::Double,
            _ => return Err(Error::InvalidMove(s.to_string())),
        };
        Ok(Move::new(layer, direction))
    }
}

/// Parse a whitespace separated move sequence such as `"R U R' U'"`
pub fn parse_sequence(s: &str) -> Result<Vec<Move>, Error> {
    s.split_whitespace().map(str::parse).collect()
}

/// Format a move sequence in standard notation
pub fn format_sequence(moves: &[Move]) -> String {
    moves
        .iter()
        .map(Move::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let moves = parse_sequence("R U' F2 M S' E2'").unwrap();
        assert_eq!(moves[0], Move::new(Layer::R, Direction::Clockwise));
        assert_eq!(moves[1], Move::new(Layer::U, Direction::CounterClockwise));
        assert_eq!(moves[2], Move::new(Layer::F, Direction::Double));
        assert_eq!(moves[5], Move::new(Layer::E, Direction::Double));
        assert_eq!(format_sequence(&moves), "R U' F2 M S' E2");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!("X".parse::<Move>(), Err(Error::InvalidMove(_))));
        assert!(matches!("r".parse::<Move>(), Err(Error::InvalidMove(_))));
        assert!(matches!("U3".parse::<Move>(), Err(Error::InvalidMove(_))));
        assert!(matches!("".parse::<Move>(), Err(Error::InvalidMove(_))));
    }

    #[test]
    fn test_inverse() {
        for layer in Layer::ALL {
            for direction in Direction::ALL {
                let mv = Move::new(layer, direction);
                assert_eq!(mv.inverse().inverse(), mv);
                assert_eq!(mv.rotation().compose(&mv.inverse().rotation()), Rotation::IDENTITY);
            }
        }
    }

    #[test]
    fn test_opposite_faces_turn_opposite_ways() {
        let r = Move::new(Layer::R, Direction::Clockwise);
        let l = Move::new(Layer::L, Direction::Clockwise);
        assert_eq!(r.axis_quarter_turns(), -l.axis_quarter_turns());
        // M follows L
        let m = Move::new(Layer::M, Direction::Clockwise);
        assert_eq!(m.rotation(), l.rotation());
    }

    #[test]
    fn test_layer_from_axis_depth() {
        for layer in Layer::ALL {
            assert_eq!(Layer::from_axis_depth(layer.axis(), layer.depth()), layer);
        }
        for face in Face::ALL {
            assert_eq!(Layer::from(face).reference_face(), face);
        }
    }
}
