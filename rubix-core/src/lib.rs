/// Rubix Core Library - Cube model, turn sequencing and render preparation
///
/// This library holds everything that does not depend on a host: the logical
/// cube state, the move notation, the animated move engine, input mapping and
/// the per-frame piece transforms handed to a drawing surface.

pub mod animation;
pub mod config;
pub mod cube;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod input;
pub mod moves;
pub mod projection;
pub mod render;
pub mod scramble;
pub mod simulation;
pub mod transform;

// Re-export commonly used types
pub use animation::{AnimationController, AnimationState, FinishedTurn, TurnFrame};
pub use config::{SimConfig, ValidConfig};
pub use cube::{Axis, CubeState, Cubie, CubieId, Face};
pub use engine::{MoveEngine, RequestOutcome};
pub use error::{Error, Result};
pub use geometry::{Mesh, Triangle, Vertex};
pub use input::{InputController, Key, KeyAction, KeyInput, PointerKind, PointerOutcome};
pub use moves::{Direction, Layer, Move};
pub use projection::{Camera, Ray};
pub use render::{PieceInstance, RenderSurface, Renderer, StickerColor};
pub use scramble::Scrambler;
pub use simulation::{HostEvent, Simulation, TickReport};
pub use transform::{RotationState, Transform};
