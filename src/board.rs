// Board model and state simulator
//
// A board is an N x N grid of cells, each carrying four wall flags in
// `Direction` index order. Boards are values: simulating a wall placement
// always produces a fresh copy and never touches the original.

use log::error;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::simple_profiler::ProfileGuard;
use crate::types::{Direction, Position};

/// Raw wire layout: rows of cells, each cell `[up, right, down, left]`
pub type WallGrid = Vec<Vec<[bool; 4]>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WallGrid", into = "WallGrid")]
pub struct Board {
    size: usize,
    cells: Vec<[bool; 4]>,
}

impl Board {
    /// Creates a board of the given size with no walls at all
    pub fn empty(size: usize) -> Self {
        Board {
            size,
            cells: vec![[false; 4]; size * size],
        }
    }

    /// Creates a board whose outer border is walled, the layout the host
    /// runtime uses at game start
    pub fn bordered(size: usize) -> Self {
        let mut board = Board::empty(size);
        for i in 0..size {
            board.cell_mut(Position::new(0, i))[Direction::Up.index()] = true;
            board.cell_mut(Position::new(size - 1, i))[Direction::Down.index()] = true;
            board.cell_mut(Position::new(i, 0))[Direction::Left.index()] = true;
            board.cell_mut(Position::new(i, size - 1))[Direction::Right.index()] = true;
        }
        board
    }

    /// Builds a board from a host snapshot, rejecting ragged grids and
    /// walls that are only visible from one side of an edge
    pub fn from_walls(walls: WallGrid) -> Result<Self, EngineError> {
        let size = walls.len();
        if size == 0 {
            return Err(EngineError::invalid_board("board has no rows"));
        }
        if let Some((row, cells)) = walls.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(EngineError::invalid_board(format!(
                "row {} has {} cells, expected {}",
                row,
                cells.len(),
                size
            )));
        }

        let board = Board {
            size,
            cells: walls.into_iter().flatten().collect(),
        };

        for row in 0..size {
            for col in 0..size {
                let pos = Position::new(row, col);
                for dir in [Direction::Right, Direction::Down] {
                    let Some(next) = dir.apply(&pos, size) else {
                        continue;
                    };
                    if board.has_wall(pos, dir) != board.has_wall(next, dir.opposite()) {
                        return Err(EngineError::invalid_board(format!(
                            "asymmetric wall between {} and {}",
                            pos, next
                        )));
                    }
                }
            }
        }

        Ok(board)
    }

    /// Side length of the grid
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < self.size && pos.col < self.size
    }

    pub fn check_bounds(&self, pos: Position) -> Result<(), EngineError> {
        if self.contains(pos) {
            Ok(())
        } else {
            Err(EngineError::OutOfBounds {
                position: pos,
                size: self.size,
            })
        }
    }

    fn offset(&self, pos: Position) -> usize {
        pos.row * self.size + pos.col
    }

    fn cell_mut(&mut self, pos: Position) -> &mut [bool; 4] {
        let idx = self.offset(pos);
        &mut self.cells[idx]
    }

    /// Whether the edge of `pos` facing `dir` is blocked
    pub fn has_wall(&self, pos: Position, dir: Direction) -> bool {
        self.cells[self.offset(pos)][dir.index()]
    }

    /// Number of walls around a cell (0..=4)
    pub fn wall_count(&self, pos: Position) -> usize {
        self.cells[self.offset(pos)].iter().filter(|&&w| w).count()
    }

    /// Directions at `pos` where a wall may still be placed, in index order
    pub fn free_walls(&self, pos: Position) -> Vec<Direction> {
        Direction::all()
            .into_iter()
            .filter(|&dir| !self.has_wall(pos, dir))
            .collect()
    }

    /// Returns the neighbour reached by a unit move from `pos` towards
    /// `dir`, if the move stays on the board and crosses no wall from
    /// either side
    pub fn step(&self, pos: Position, dir: Direction) -> Option<Position> {
        if self.has_wall(pos, dir) {
            return None;
        }
        let next = dir.apply(&pos, self.size)?;
        if self.has_wall(next, dir.opposite()) {
            return None;
        }
        Some(next)
    }

    /// Simulates placing a wall at `pos` facing `dir`. The mirrored flag on
    /// the neighbouring cell is set too; `self` is left untouched.
    pub fn with_wall(&self, pos: Position, dir: Direction) -> Result<Board, EngineError> {
        let _guard = ProfileGuard::new("simulate");

        self.check_bounds(pos)?;
        if self.has_wall(pos, dir) {
            error!("Refusing to place wall at {} facing {}: already set", pos, dir);
            return Err(EngineError::WallAlreadyPlaced {
                position: pos,
                direction: dir,
            });
        }

        let mut next = self.clone();
        next.cell_mut(pos)[dir.index()] = true;
        if let Some(neighbour) = dir.apply(&pos, self.size) {
            next.cell_mut(neighbour)[dir.opposite().index()] = true;
        }
        Ok(next)
    }

    /// Converts back to the host's nested layout
    pub fn to_walls(&self) -> WallGrid {
        self.cells
            .chunks(self.size.max(1))
            .map(|row| row.to_vec())
            .collect()
    }
}

impl TryFrom<WallGrid> for Board {
    type Error = EngineError;

    fn try_from(walls: WallGrid) -> Result<Self, Self::Error> {
        Board::from_walls(walls)
    }
}

impl From<Board> for WallGrid {
    fn from(board: Board) -> Self {
        board.to_walls()
    }
}
