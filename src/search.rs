// Search engine: iterative deepening minimax under a wall-clock deadline
//
// MAX is the acting player, MIN the opponent; roles alternate every ply.
// Each ply the mover picks a reachable destination, the wall selector
// chooses the wall placed there, and the resulting board is searched one
// ply deeper. Leaves are scored by the positional evaluator, always from
// MAX's point of view.
//
// The deadline is polled, never preempted: it is checked before every
// depth iteration and before every child expansion. A node cut off before
// any child was scored reports nothing to its parent.

use log::{debug, error, info};
use std::time::{Duration, Instant};

use crate::board::Board;
use crate::config::{Config, EvaluationConfig, SearchConfig};
use crate::error::EngineError;
use crate::evaluation::evaluate;
use crate::reachability::{is_boxed_in, legal_destinations};
use crate::simple_profiler::ProfileGuard;
use crate::types::{Action, Decision, Position, TurnRequest};
use crate::walls::simulate_with_best_wall;

/// Cooperative time limit shared by one decision
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    pub fn new(budget: Duration) -> Self {
        Self::starting_at(Instant::now(), budget)
    }

    /// Deadline measured from an earlier instant, e.g. request arrival
    pub fn starting_at(start: Instant, budget: Duration) -> Self {
        Deadline {
            start,
            budget: Some(budget),
        }
    }

    /// Never expires; used for deterministic analysis runs
    pub fn unlimited() -> Self {
        Deadline {
            start: Instant::now(),
            budget: None,
        }
    }

    pub fn expired(&self) -> bool {
        self.budget
            .map_or(false, |budget| self.start.elapsed() >= budget)
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Which side moves at a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Max,
    Min,
}

impl Role {
    fn flip(self) -> Role {
        match self {
            Role::Max => Role::Min,
            Role::Min => Role::Max,
        }
    }

    /// Whether `candidate` should replace `incumbent` for this role.
    /// Strict comparison keeps the first-seen action on ties.
    fn prefers(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Role::Max => candidate > incumbent,
            Role::Min => candidate < incumbent,
        }
    }
}

/// Position threaded through the recursion; each node owns its board
#[derive(Debug, Clone)]
pub struct SearchState {
    pub board: Board,
    pub max_pos: Position,
    pub min_pos: Position,
    pub max_steps: usize,
}

impl SearchState {
    fn mover(&self, role: Role) -> (Position, Position) {
        match role {
            Role::Max => (self.max_pos, self.min_pos),
            Role::Min => (self.min_pos, self.max_pos),
        }
    }

    fn after(&self, board: Board, role: Role, destination: Position) -> SearchState {
        let (max_pos, min_pos) = match role {
            Role::Max => (destination, self.min_pos),
            Role::Min => (self.max_pos, destination),
        };
        SearchState {
            board,
            max_pos,
            min_pos,
            max_steps: self.max_steps,
        }
    }
}

/// Value of a searched node. `complete` is false when the deadline stopped
/// the expansion of this node or of any node below it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOutcome {
    pub score: f64,
    pub action: Option<Action>,
    pub complete: bool,
}

impl SearchOutcome {
    fn leaf(score: f64) -> Self {
        SearchOutcome {
            score,
            action: None,
            complete: true,
        }
    }
}

/// Summary of one decision
#[derive(Debug, Clone, PartialEq)]
pub struct SearchReport {
    pub decision: Decision,
    /// Score of the returned action; `None` for the fallback pass
    pub score: Option<f64>,
    /// Deepest iteration that finished before the deadline
    pub depth: u8,
    pub nodes: usize,
    pub elapsed_ms: u128,
}

impl SearchReport {
    /// Stay in place without a wall
    pub fn fallback(start: Position, elapsed_ms: u128) -> Self {
        SearchReport {
            decision: Decision::stay(start),
            score: None,
            depth: 0,
            nodes: 0,
            elapsed_ms,
        }
    }
}

pub struct SearchEngine<'a> {
    search: &'a SearchConfig,
    weights: &'a EvaluationConfig,
    deadline: Deadline,
    nodes: usize,
    polls: usize,
    poll_limit: Option<usize>,
}

impl<'a> SearchEngine<'a> {
    pub fn new(config: &'a Config, deadline: Deadline) -> Self {
        SearchEngine {
            search: &config.search,
            weights: &config.evaluation,
            deadline,
            nodes: 0,
            polls: 0,
            poll_limit: None,
        }
    }

    /// Treats the deadline as expired once it has been polled more than
    /// `limit` times, giving tests a reproducible cut-off point
    #[cfg(test)]
    fn with_poll_limit(mut self, limit: usize) -> Self {
        self.poll_limit = Some(limit);
        self
    }

    fn out_of_time(&mut self) -> bool {
        self.polls += 1;
        self.deadline.expired() || self.poll_limit.map_or(false, |limit| self.polls > limit)
    }

    /// Nodes visited so far across all iterations
    pub fn nodes(&self) -> usize {
        self.nodes
    }

    /// Plain minimax to `depth` plies. Returns `Ok(None)` if the deadline
    /// passed before any child of this node could be scored.
    pub fn minimax(
        &mut self,
        state: &SearchState,
        depth: u8,
        role: Role,
    ) -> Result<Option<SearchOutcome>, EngineError> {
        let _guard = ProfileGuard::new("minimax");
        self.nodes += 1;

        if depth == 0
            || is_boxed_in(&state.board, state.max_pos, state.min_pos)
            || is_boxed_in(&state.board, state.min_pos, state.max_pos)
        {
            return Ok(Some(SearchOutcome::leaf(self.evaluate(state))));
        }

        self.expand(state, depth, role)
    }

    /// Expands every legal action of the side to move. Skips the terminal
    /// test, so the root always yields an action when one exists.
    fn expand(
        &mut self,
        state: &SearchState,
        depth: u8,
        role: Role,
    ) -> Result<Option<SearchOutcome>, EngineError> {
        let (mover, other) = state.mover(role);
        let destinations = legal_destinations(&state.board, mover, state.max_steps, other);

        if destinations.is_empty() {
            let score = match role {
                Role::Max => 0.0,
                Role::Min => self.evaluate(state),
            };
            return Ok(Some(SearchOutcome::leaf(score)));
        }

        let mut best: Option<SearchOutcome> = None;
        let mut complete = true;

        for destination in destinations {
            if self.out_of_time() {
                complete = false;
                break;
            }

            let Some((board, wall)) =
                simulate_with_best_wall(&state.board, destination, other, state.max_steps)?
            else {
                continue;
            };

            let child_state = state.after(board, role, destination);
            let Some(child) = self.minimax(&child_state, depth.saturating_sub(1), role.flip())? else {
                complete = false;
                break;
            };
            complete &= child.complete;

            if best.map_or(true, |b| role.prefers(child.score, b.score)) {
                best = Some(SearchOutcome {
                    score: child.score,
                    action: Some(Action { destination, wall }),
                    complete: true,
                });
            }
        }

        Ok(best.map(|b| SearchOutcome { complete, ..b }))
    }

    fn evaluate(&self, state: &SearchState) -> f64 {
        evaluate(
            &state.board,
            state.max_pos,
            state.min_pos,
            state.max_steps,
            self.weights,
        )
    }

    /// Runs minimax at increasing depth until the configured ceiling or
    /// the deadline. A later iteration replaces the best result only with
    /// a strictly greater score, so the returned score never regresses.
    pub fn iterative_deepening(&mut self, root: &SearchState) -> Result<SearchReport, EngineError> {
        let mut best: Option<SearchOutcome> = None;
        let mut depth_completed = 0;

        // A zero minimum would ask for an action from a leaf
        for depth in self.search.min_depth.max(1)..=self.search.max_depth {
            if self.out_of_time() {
                info!(
                    "Stopping search: deadline reached before depth {} ({}ms)",
                    depth,
                    self.deadline.elapsed().as_millis()
                );
                break;
            }

            debug!("Starting iteration at depth {}", depth);
            let Some(outcome) = self.expand(root, depth, Role::Max)? else {
                info!("Depth {} cut off before any action was scored", depth);
                break;
            };

            if outcome.complete {
                depth_completed = depth;
            }
            if improves(best.as_ref(), &outcome) {
                best = Some(outcome);
            }

            debug!(
                "Depth {} finished: score {:.3}, complete {}, nodes {}",
                depth, outcome.score, outcome.complete, self.nodes
            );

            if !outcome.complete {
                break;
            }
        }

        let elapsed_ms = self.deadline.elapsed().as_millis();
        let report = match best.and_then(|b| b.action.map(|action| (b.score, action))) {
            Some((score, action)) => SearchReport {
                decision: Decision::from(action),
                score: Some(score),
                depth: depth_completed,
                nodes: self.nodes,
                elapsed_ms,
            },
            None => SearchReport {
                nodes: self.nodes,
                depth: depth_completed,
                ..SearchReport::fallback(root.max_pos, elapsed_ms)
            },
        };

        Ok(report)
    }
}

/// Whether a deeper iteration's outcome replaces the current best. Only a
/// strictly greater score wins, whether or not the iteration completed.
fn improves(best: Option<&SearchOutcome>, outcome: &SearchOutcome) -> bool {
    best.map_or(true, |b| outcome.score > b.score)
}

/// Engine entry point: validates the snapshot and returns a decision.
/// Never fails; invalid input or an engine error yields the pass fallback.
pub fn decide(request: &TurnRequest, config: &Config, deadline: Deadline) -> SearchReport {
    if let Err(e) = request.validate() {
        error!("Rejecting turn {} snapshot: {}", request.turn, e);
        return SearchReport::fallback(request.my_pos, deadline.elapsed().as_millis());
    }

    let root = SearchState {
        board: request.board.clone(),
        max_pos: request.my_pos,
        min_pos: request.adv_pos,
        max_steps: request.max_step,
    };

    let mut engine = SearchEngine::new(config, deadline);
    match engine.iterative_deepening(&root) {
        Ok(report) => report,
        Err(e) => {
            error!("Search aborted on turn {}: {}", request.turn, e);
            SearchReport::fallback(request.my_pos, deadline.elapsed().as_millis())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;

    fn config_with_depth(max_depth: u8) -> Config {
        let mut config = Config::default_hardcoded();
        config.search.max_depth = max_depth;
        config
    }

    fn state(board: Board, me: Position, opp: Position, steps: usize) -> SearchState {
        SearchState {
            board,
            max_pos: me,
            min_pos: opp,
            max_steps: steps,
        }
    }

    #[test]
    fn test_depth_zero_is_static_evaluation() {
        let config = Config::default_hardcoded();
        let root = state(Board::empty(5), Position::new(2, 2), Position::new(0, 0), 2);
        let mut engine = SearchEngine::new(&config, Deadline::unlimited());

        let outcome = engine.minimax(&root, 0, Role::Max).unwrap().unwrap();
        assert!(outcome.action.is_none());
        assert!((outcome.score - 81.25).abs() < 1e-9);
    }

    #[test]
    fn test_max_with_no_wallable_destination_scores_zero() {
        // Our cell is fully walled: reachable set is {start} but no wall fits
        let me = Position::new(1, 1);
        let mut board = Board::empty(3);
        for dir in Direction::all() {
            board = board.with_wall(me, dir).unwrap();
        }
        let config = Config::default_hardcoded();
        let root = state(board, me, Position::new(0, 0), 2);
        let mut engine = SearchEngine::new(&config, Deadline::unlimited());

        let outcome = engine.expand(&root, 1, Role::Max).unwrap().unwrap();
        assert_eq!(outcome.score, 0.0);
        assert!(outcome.action.is_none());
    }

    #[test]
    fn test_min_node_moves_opponent() {
        let config = Config::default_hardcoded();
        let me = Position::new(2, 2);
        let opp = Position::new(0, 0);
        let root = state(Board::empty(5), me, opp, 1);
        let mut engine = SearchEngine::new(&config, Deadline::unlimited());

        let outcome = engine.minimax(&root, 1, Role::Min).unwrap().unwrap();
        let action = outcome.action.unwrap();
        assert!(action.destination.manhattan_distance(&opp) <= 1);
    }

    #[test]
    fn test_expired_deadline_cuts_off_node() {
        let config = Config::default_hardcoded();
        let root = state(Board::empty(5), Position::new(2, 2), Position::new(0, 0), 2);
        let mut engine = SearchEngine::new(&config, Deadline::new(Duration::ZERO));

        assert_eq!(engine.minimax(&root, 2, Role::Max).unwrap(), None);
    }

    #[test]
    fn test_minimax_is_deterministic_without_deadline() {
        let config = config_with_depth(2);
        let board = Board::bordered(5)
            .with_wall(Position::new(1, 1), Direction::Right)
            .unwrap();
        let root = state(board, Position::new(1, 1), Position::new(3, 3), 2);

        let first = SearchEngine::new(&config, Deadline::unlimited())
            .minimax(&root, 2, Role::Max)
            .unwrap();
        let second = SearchEngine::new(&config, Deadline::unlimited())
            .minimax(&root, 2, Role::Max)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_iterative_deepening_never_regresses() {
        let board = Board::bordered(5);
        let root = state(board, Position::new(2, 2), Position::new(0, 4), 2);

        let shallow = SearchEngine::new(&config_with_depth(1), Deadline::unlimited())
            .iterative_deepening(&root)
            .unwrap();
        let deep = SearchEngine::new(&config_with_depth(2), Deadline::unlimited())
            .iterative_deepening(&root)
            .unwrap();

        assert_eq!(shallow.depth, 1);
        assert_eq!(deep.depth, 2);
        assert!(deep.score.unwrap() >= shallow.score.unwrap());
    }

    #[test]
    fn test_zero_deadline_falls_back_to_pass() {
        let mut config = Config::default_hardcoded();
        config.search.time_budget_ms = 0;
        let request = TurnRequest {
            turn: 0,
            board: Board::empty(5),
            my_pos: Position::new(2, 2),
            adv_pos: Position::new(0, 0),
            max_step: 2,
        };

        let report = decide(&request, &config, Deadline::new(config.search.time_budget()));
        assert_eq!(report.decision, Decision::stay(Position::new(2, 2)));
        assert_eq!(report.score, None);
        assert_eq!(report.depth, 0);
    }

    fn outcome(score: f64, complete: bool) -> SearchOutcome {
        SearchOutcome {
            score,
            action: Some(Action {
                destination: Position::new(0, 0),
                wall: Direction::Up,
            }),
            complete,
        }
    }

    #[test]
    fn test_deeper_outcome_must_be_strictly_better() {
        let best = outcome(50.0, true);
        assert!(improves(None, &outcome(10.0, false)));
        assert!(improves(Some(&best), &outcome(50.5, false)));
        assert!(!improves(Some(&best), &outcome(50.0, false)));
        assert!(!improves(Some(&best), &outcome(49.0, true)));
    }

    #[test]
    fn test_partial_depth_keeps_shallower_action() {
        // Three walls around us: staying seals the cell, stepping right is open
        let me = Position::new(2, 2);
        let mut board = Board::empty(5);
        for dir in [Direction::Up, Direction::Left, Direction::Down] {
            board = board.with_wall(me, dir).unwrap();
        }
        let root = state(board, me, Position::new(0, 0), 1);

        let shallow_config = config_with_depth(1);
        let mut shallow_engine = SearchEngine::new(&shallow_config, Deadline::unlimited());
        let shallow = shallow_engine.iterative_deepening(&root).unwrap();
        let depth_one_polls = shallow_engine.polls;
        assert_eq!(shallow.decision.destination, Position::new(2, 3));

        // Depth 2 gets its own check plus both root children; the opponent's
        // first reply under the second child is cut off
        let config = config_with_depth(2);
        let mut partial_engine = SearchEngine::new(&config, Deadline::unlimited()).with_poll_limit(2);
        let partial = partial_engine.expand(&root, 2, Role::Max).unwrap().unwrap();
        assert!(!partial.complete);
        assert_eq!(partial.action.unwrap().destination, me);
        assert!(partial.score < shallow.score.unwrap());

        let report = SearchEngine::new(&config, Deadline::unlimited())
            .with_poll_limit(depth_one_polls + 3)
            .iterative_deepening(&root)
            .unwrap();
        assert_eq!(report.depth, 1);
        assert_eq!(report.decision, shallow.decision);
        assert_eq!(report.score, shallow.score);
    }

    #[test]
    fn test_zero_min_depth_still_searches() {
        let mut config = Config::default_hardcoded();
        config.search.min_depth = 0;
        config.search.max_depth = 1;
        let root = state(Board::empty(4), Position::new(1, 1), Position::new(3, 3), 1);

        let report = SearchEngine::new(&config, Deadline::unlimited())
            .iterative_deepening(&root)
            .unwrap();
        assert_eq!(report.depth, 1);
        assert!(report.decision.wall.is_some());
    }

    #[test]
    fn test_huge_step_budget_still_decides() {
        let request = TurnRequest {
            turn: 1,
            board: Board::empty(3),
            my_pos: Position::new(0, 0),
            adv_pos: Position::new(2, 2),
            max_step: 1usize << 33,
        };

        let report = decide(&request, &config_with_depth(1), Deadline::unlimited());
        assert!(report.score.unwrap().is_finite());
        let wall = report.decision.wall.unwrap();
        assert!(!request.board.has_wall(report.decision.destination, wall));
    }

    #[test]
    fn test_invalid_snapshot_falls_back_to_pass() {
        let config = Config::default_hardcoded();
        let request = TurnRequest {
            turn: 3,
            board: Board::empty(4),
            my_pos: Position::new(1, 1),
            adv_pos: Position::new(9, 9),
            max_step: 2,
        };

        let report = decide(&request, &config, Deadline::unlimited());
        assert!(report.decision.is_pass());
        assert_eq!(report.decision.destination, Position::new(1, 1));
    }
}
