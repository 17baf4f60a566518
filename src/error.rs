//! Error types for the decision engine

use thiserror::Error;

use crate::types::{Direction, Position};

/// Errors raised while validating snapshots or simulating actions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("wall already placed at {position} facing {direction}")]
    WallAlreadyPlaced {
        position: Position,
        direction: Direction,
    },

    #[error("position {position} is outside a {size}x{size} board")]
    OutOfBounds { position: Position, size: usize },

    #[error("invalid board: {message}")]
    InvalidBoard { message: String },
}

impl EngineError {
    pub(crate) fn invalid_board(message: impl Into<String>) -> Self {
        EngineError::InvalidBoard {
            message: message.into(),
        }
    }
}
