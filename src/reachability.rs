// Reachability explorer
//
// Breadth-first traversal from a pawn's cell, bounded by the step budget.
// Each unit move must stay on the board, must not cross a wall (checked
// from both cells), and must not land on the obstacle pawn.

use std::collections::VecDeque;

use crate::board::Board;
use crate::simple_profiler::ProfileGuard;
use crate::types::{Direction, Position};

/// Returns every cell reachable from `start` in at most `max_steps` unit
/// moves, in breadth-first discovery order. `start` is always first.
pub fn reachable_cells(
    board: &Board,
    start: Position,
    max_steps: usize,
    obstacle: Position,
) -> Vec<Position> {
    let _guard = ProfileGuard::new("reachability");

    let size = board.size();
    let mut visited = vec![false; size * size];
    visited[start.row * size + start.col] = true;

    let mut cells = vec![start];
    let mut queue = VecDeque::from([(start, 0usize)]);

    while let Some((current, steps)) = queue.pop_front() {
        // Levels are dequeued in order, so nothing further is in budget
        if steps >= max_steps {
            break;
        }

        for dir in Direction::all() {
            let Some(next) = board.step(current, dir) else {
                continue;
            };
            if next == obstacle {
                continue;
            }

            let idx = next.row * size + next.col;
            if !visited[idx] {
                visited[idx] = true;
                cells.push(next);
                queue.push_back((next, steps + 1));
            }
        }
    }

    cells
}

/// Number of cells reachable from `start`, including `start` itself
pub fn reachable_count(
    board: &Board,
    start: Position,
    max_steps: usize,
    obstacle: Position,
) -> usize {
    reachable_cells(board, start, max_steps, obstacle).len()
}

/// True when the pawn at `pos` cannot make a single unit move
pub fn is_boxed_in(board: &Board, pos: Position, obstacle: Position) -> bool {
    Direction::all()
        .into_iter()
        .filter_map(|dir| board.step(pos, dir))
        .all(|next| next == obstacle)
}

/// Reachable cells that still have at least one free wall slot, i.e. the
/// destinations a full move+wall action can commit to
pub fn legal_destinations(
    board: &Board,
    start: Position,
    max_steps: usize,
    obstacle: Position,
) -> Vec<Position> {
    reachable_cells(board, start, max_steps, obstacle)
        .into_iter()
        .filter(|&pos| board.wall_count(pos) < Direction::all().len())
        .collect()
}
