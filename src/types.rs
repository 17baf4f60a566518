// Wire and value types shared between the host adapter and the engine
//
// Directions are indexed up=0, right=1, down=2, left=3, matching the order
// of the four wall flags stored on every cell.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::board::Board;
use crate::error::EngineError;

/// A (row, column) cell coordinate; row 0 is the top edge
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    /// Calculates Manhattan distance between two positions
    pub fn manhattan_distance(&self, other: &Position) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// One of the four cell edges, also used as a unit-move direction
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    #[serde(rename = "u")]
    Up,
    #[serde(rename = "r")]
    Right,
    #[serde(rename = "d")]
    Down,
    #[serde(rename = "l")]
    Left,
}

impl Direction {
    /// Returns all directions in wall-flag index order
    pub fn all() -> [Direction; 4] {
        [Direction::Up, Direction::Right, Direction::Down, Direction::Left]
    }

    /// Index of this direction's flag within a cell
    pub fn index(&self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Left => 3,
        }
    }

    pub fn from_index(idx: usize) -> Option<Direction> {
        Direction::all().get(idx).copied()
    }

    /// The same edge seen from the neighbouring cell
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Right => Direction::Left,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
        }
    }

    /// Short wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "u",
            Direction::Right => "r",
            Direction::Down => "d",
            Direction::Left => "l",
        }
    }

    /// Calculates the neighbouring position, or `None` when it would leave
    /// a board of the given size
    pub fn apply(&self, pos: &Position, size: usize) -> Option<Position> {
        let next = match self {
            Direction::Up => Position::new(pos.row.checked_sub(1)?, pos.col),
            Direction::Right => Position::new(pos.row, pos.col + 1),
            Direction::Down => Position::new(pos.row + 1, pos.col),
            Direction::Left => Position::new(pos.row, pos.col.checked_sub(1)?),
        };

        if next.row < size && next.col < size {
            Some(next)
        } else {
            None
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A destination together with the wall committed at that destination
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action {
    pub destination: Position,
    pub wall: Direction,
}

/// The engine's answer for one turn. `wall` is `None` only for the
/// pass/stuck fallback, in which case `destination` is the start position.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    #[serde(rename = "move")]
    pub destination: Position,
    pub wall: Option<Direction>,
}

impl Decision {
    /// Stay in place without placing a wall
    pub fn stay(start: Position) -> Self {
        Decision {
            destination: start,
            wall: None,
        }
    }

    pub fn is_pass(&self) -> bool {
        self.wall.is_none()
    }
}

impl From<Action> for Decision {
    fn from(action: Action) -> Self {
        Decision {
            destination: action.destination,
            wall: Some(action.wall),
        }
    }
}

/// Board snapshot sent by the host runtime at the start of a turn
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TurnRequest {
    #[serde(default)]
    pub turn: u32,
    pub board: Board,
    pub my_pos: Position,
    pub adv_pos: Position,
    pub max_step: usize,
}

impl TurnRequest {
    /// Checks that both pawns are on the board and on distinct cells
    pub fn validate(&self) -> Result<(), EngineError> {
        self.board.check_bounds(self.my_pos)?;
        self.board.check_bounds(self.adv_pos)?;
        if self.my_pos == self.adv_pos {
            return Err(EngineError::invalid_board(format!(
                "both pawns occupy {}",
                self.my_pos
            )));
        }
        Ok(())
    }
}
