/// Random scramble generation
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::moves::{Direction, Layer, Move};

/// Produces random move sequences in which no layer is ever turned twice in a
/// row, so adjacent moves never trivially cancel or merge.
#[derive(Debug, Clone)]
pub struct Scrambler {
    rng: ChaCha8Rng,
    layers: Vec<Layer>,
}

impl Scrambler {
    /// Deterministic for a given seed
    pub fn new(seed: u64, slice_turns: bool) -> Self {
        let mut layers = Layer::FACES.to_vec();
        if slice_turns {
            layers.extend(Layer::SLICES);
        }
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            layers,
        }
    }

    pub fn next_move(&mut self, previous: Option<Layer>) -> Move {
        let candidates: Vec<Layer> = self
            .layers
            .iter()
            .copied()
            .filter(|layer| Some(*layer) != previous)
            .collect();
        let layer = *candidates
            .choose(&mut self.rng)
            .unwrap_or(&Layer::FACES[0]);
        let direction = Direction::ALL[self.rng.random_range(0..Direction::ALL.len())];
        Move::new(layer, direction)
    }

    pub fn generate(&mut self, length: usize) -> Vec<Move> {
        let mut moves: Vec<Move> = Vec::with_capacity(length);
        for _ in 0..length {
            let previous = moves.last().map(|mv| mv.layer);
            moves.push(self.next_move(previous));
        }
        moves
    }
}
