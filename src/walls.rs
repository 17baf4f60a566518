// Wall selector
//
// One-ply heuristic: having moved to `destination`, try each free wall
// direction there and keep the one that maximises
//   reachable(mover) - reachable(opponent)
// on the resulting board. Ties keep the lowest direction index.

use crate::board::Board;
use crate::error::EngineError;
use crate::reachability::reachable_count;
use crate::types::{Direction, Position};

/// Picks the wall direction at `destination` that best favours the mover.
/// Returns `None` when all four edges of `destination` are already walled.
pub fn select_wall(
    board: &Board,
    destination: Position,
    opponent: Position,
    max_steps: usize,
) -> Result<Option<Direction>, EngineError> {
    Ok(simulate_with_best_wall(board, destination, opponent, max_steps)?.map(|(_, dir)| dir))
}

/// Builds the successor board for a move to `destination` with the best
/// wall placed, returning it with the chosen direction
pub fn simulate_with_best_wall(
    board: &Board,
    destination: Position,
    opponent: Position,
    max_steps: usize,
) -> Result<Option<(Board, Direction)>, EngineError> {
    let mut best: Option<(Board, Direction, i64)> = None;

    for dir in board.free_walls(destination) {
        let candidate = board.with_wall(destination, dir)?;
        let ours = reachable_count(&candidate, destination, max_steps, opponent) as i64;
        let theirs = reachable_count(&candidate, opponent, max_steps, destination) as i64;
        let ranking = ours - theirs;

        let improves = best.as_ref().map_or(true, |(_, _, top)| ranking > *top);
        if improves {
            best = Some((candidate, dir, ranking));
        }
    }

    Ok(best.map(|(board, dir, _)| (board, dir)))
}
