// Positional evaluator
//
// Scores a position from the maximizing player's point of view. Three
// sub-scores, each on a 0-100 scale, are combined as a weighted average:
//   openness    - fewer walls around our own cell is better
//   mobility    - more cells reachable for us is better
//   containment - fewer cells reachable for the opponent is better
// Mobility and containment are normalised by (2 * step budget)^2 rather
// than the real board area, so scores are comparable across board sizes.

use crate::board::Board;
use crate::config::EvaluationConfig;
use crate::reachability::reachable_count;
use crate::simple_profiler::ProfileGuard;
use crate::types::{Direction, Position};

/// Individual sub-scores before weighting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub openness: f64,
    pub mobility: f64,
    pub containment: f64,
}

impl Evaluation {
    /// Weighted average of the sub-scores; equal weights give the plain mean
    pub fn score(&self, weights: &EvaluationConfig) -> f64 {
        let total = weights.weight_openness + weights.weight_mobility + weights.weight_containment;
        if total <= 0.0 {
            return (self.openness + self.mobility + self.containment) / 3.0;
        }

        (self.openness * weights.weight_openness
            + self.mobility * weights.weight_mobility
            + self.containment * weights.weight_containment)
            / total
    }
}

/// Normalisation constant for reachable-cell counts. Clamped to 1 so a
/// zero step budget does not divide by zero. Computed in floating point
/// so very large step budgets cannot overflow.
pub fn area_proxy(max_steps: usize) -> f64 {
    let span = 2.0 * max_steps as f64;
    (span * span).max(1.0)
}

/// Computes the three sub-scores for `me` against `opponent`
pub fn evaluate_components(
    board: &Board,
    me: Position,
    opponent: Position,
    max_steps: usize,
) -> Evaluation {
    let _guard = ProfileGuard::new("eval");

    let sides = Direction::all().len() as f64;
    let walls = board.wall_count(me) as f64;
    let proxy = area_proxy(max_steps);

    let ours = reachable_count(board, me, max_steps, opponent) as f64;
    let theirs = reachable_count(board, opponent, max_steps, me) as f64;

    Evaluation {
        openness: (sides - walls) / sides * 100.0,
        mobility: ours / proxy * 100.0,
        containment: (proxy - theirs) / proxy * 100.0,
    }
}

/// Static evaluation of a position; higher is better for `me`
pub fn evaluate(
    board: &Board,
    me: Position,
    opponent: Position,
    max_steps: usize,
    weights: &EvaluationConfig,
) -> f64 {
    evaluate_components(board, me, opponent, max_steps).score(weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn weights() -> EvaluationConfig {
        Config::default_hardcoded().evaluation
    }

    #[test]
    fn test_open_center_scores() {
        let board = Board::empty(5);
        let eval = evaluate_components(&board, Position::new(2, 2), Position::new(0, 0), 2);

        assert_eq!(eval.openness, 100.0);
        // 13 cells of 16
        assert!((eval.mobility - 81.25).abs() < 1e-9);
        // Opponent reaches 6 cells from the corner
        assert!((eval.containment - 62.5).abs() < 1e-9);
        assert!((eval.score(&weights()) - 81.25).abs() < 1e-9);
    }

    #[test]
    fn test_openness_counts_every_adjacent_wall() {
        let me = Position::new(1, 1);
        let board = Board::empty(3)
            .with_wall(me, Direction::Up)
            .unwrap()
            .with_wall(me, Direction::Left)
            .unwrap()
            .with_wall(me, Direction::Down)
            .unwrap();

        let eval = evaluate_components(&board, me, Position::new(2, 2), 1);
        assert_eq!(eval.openness, 25.0);
    }

    #[test]
    fn test_zero_step_budget_does_not_divide_by_zero() {
        let board = Board::empty(3);
        let score = evaluate(&board, Position::new(0, 0), Position::new(2, 2), 0, &weights());
        assert!(score.is_finite());
        assert_eq!(area_proxy(0), 1.0);
    }

    #[test]
    fn test_huge_step_budget_stays_finite() {
        let steps = 1usize << 33;
        let proxy = area_proxy(steps);
        assert_eq!(proxy, (2.0 * steps as f64).powi(2));

        let board = Board::empty(3);
        let score = evaluate(&board, Position::new(0, 0), Position::new(2, 2), steps, &weights());
        assert!(score.is_finite());
        assert!(score > 0.0);
    }

    #[test]
    fn test_containment_prefers_trapped_opponent() {
        let opp = Position::new(0, 0);
        let open = Board::empty(5);
        let trapped = open
            .with_wall(opp, Direction::Right)
            .unwrap()
            .with_wall(opp, Direction::Down)
            .unwrap();

        let me = Position::new(4, 4);
        let open_score = evaluate(&open, me, opp, 2, &weights());
        let trapped_score = evaluate(&trapped, me, opp, 2, &weights());
        assert!(trapped_score > open_score);
    }

    #[test]
    fn test_weighting_shifts_score() {
        let eval = Evaluation {
            openness: 100.0,
            mobility: 0.0,
            containment: 0.0,
        };
        let mut w = weights();
        assert!((eval.score(&w) - 100.0 / 3.0).abs() < 1e-9);

        w.weight_openness = 2.0;
        assert!((eval.score(&w) - 50.0).abs() < 1e-9);
    }
}
