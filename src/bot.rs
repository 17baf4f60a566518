// Host-facing bot
//
// Wraps the configured agent behind the four calls the game host makes:
// info, start, move and end. The bot itself holds no per-game state; every
// move request carries the full board snapshot.

use log::{error, info, warn};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::debug_logger::DebugLogger;
use crate::registry::{Agent, AgentRegistry, MinimaxAgent};
use crate::search::{Deadline, SearchReport};
use crate::simple_profiler;
use crate::types::TurnRequest;

/// Bot with OOP-style API
/// Takes static configuration dependencies and exposes methods corresponding to API endpoints
pub struct Bot {
    config: Config,
    agent: Arc<dyn Agent>,
    logger: DebugLogger,
}

impl Bot {
    /// Creates a new Bot instance with the given configuration and no decision log
    pub fn new(config: Config) -> Self {
        Self::with_logger(config, DebugLogger::disabled())
    }

    /// Creates a Bot that records each decision through `logger`
    ///
    /// The agent is looked up by `config.agent.name`; an unknown name falls
    /// back to the minimax agent.
    pub fn with_logger(config: Config, logger: DebugLogger) -> Self {
        let registry = AgentRegistry::with_builtin_agents();
        let agent = registry
            .create(&config.agent.name, &config)
            .unwrap_or_else(|e| {
                warn!("{}; falling back to minimax", e);
                Arc::new(MinimaxAgent::new(config.clone()))
            });

        Bot {
            config,
            agent,
            logger,
        }
    }

    /// Registry name of the agent making decisions
    pub fn agent_name(&self) -> &str {
        self.agent.name()
    }

    /// Returns bot metadata
    /// Corresponds to GET / endpoint
    pub fn info(&self) -> Value {
        info!("INFO");

        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "name": self.config.agent.display_name,
            "author": self.config.agent.author,
            "agent": self.agent.name(),
            "max_depth": self.config.search.max_depth,
            "time_budget_ms": self.config.search.time_budget_ms,
        })
    }

    /// Called when a game starts
    /// Corresponds to POST /start endpoint
    pub fn start(&self, request: &TurnRequest) {
        info!(
            "GAME START ({}x{} board, max_step {})",
            request.board.size(),
            request.board.size(),
            request.max_step
        );
    }

    /// Called when a game ends
    /// Corresponds to POST /end endpoint
    pub fn end(&self, request: &TurnRequest) {
        info!("GAME OVER after turn {}", request.turn);
    }

    /// Computes the next move and wall for a snapshot
    /// Corresponds to POST /move endpoint
    ///
    /// The search is CPU-bound, so it runs on tokio's blocking pool while
    /// this future waits. The deadline starts when the request arrives.
    pub async fn get_move(&self, request: &TurnRequest) -> Value {
        let start_time = Instant::now();
        let deadline = Deadline::starting_at(start_time, self.config.search.time_budget());

        info!("Turn {}: Computing move", request.turn);

        let agent = self.agent.clone();
        let snapshot = request.clone();
        let report = match tokio::task::spawn_blocking(move || {
            let report = agent.step(&snapshot, deadline);
            // Counters are thread-local, so report from the search thread
            simple_profiler::report(report.elapsed_ms);
            report
        })
        .await
        {
            Ok(report) => report,
            Err(e) => {
                error!("Turn {}: search task failed: {}", request.turn, e);
                SearchReport::fallback(request.my_pos, start_time.elapsed().as_millis())
            }
        };

        info!(
            "Turn {}: Chose {} wall {} (score: {}, depth: {}, nodes: {}, time: {}ms)",
            request.turn,
            report.decision.destination,
            report.decision.wall.map_or("none", |w| w.as_str()),
            report
                .score
                .map_or_else(|| "n/a".to_string(), |s| format!("{:.3}", s)),
            report.depth,
            report.nodes,
            start_time.elapsed().as_millis()
        );

        self.logger.log_move(request.clone(), report.decision);

        Self::response(&report)
    }

    /// JSON body returned to the host
    pub fn response(report: &SearchReport) -> Value {
        json!({
            "move": report.decision.destination,
            "wall": report.decision.wall,
            "score": report.score,
            "depth": report.depth,
        })
    }
}
