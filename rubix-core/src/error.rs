/// Error taxonomy for the simulation core
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The pending move queue is full; the request was dropped
    #[error("move queue is full ({capacity} pending), request dropped")]
    Overflow { capacity: usize },

    /// A construction-time parameter is out of range
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Malformed move notation
    #[error("invalid move: {0:?}")]
    InvalidMove(String),

    /// An instant state change was attempted while a turn is running or queued
    #[error("a turn is in progress")]
    Busy,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
