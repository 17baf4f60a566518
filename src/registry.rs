// Agent registry
//
// The host selects a player implementation by name. Each registered name
// maps to a constructor producing an object that answers one turn at a
// time from a snapshot; agents keep no game state between turns.

use log::info;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::Config;
use crate::reachability::legal_destinations;
use crate::search::{decide, Deadline, SearchReport};
use crate::types::{Decision, TurnRequest};

/// Single entry point every selectable player implements
pub trait Agent: Send + Sync {
    /// Registry name of this agent
    fn name(&self) -> &str;

    /// Chooses a destination and wall for the snapshot in `request`
    fn step(&self, request: &TurnRequest, deadline: Deadline) -> SearchReport;
}

pub type AgentConstructor = fn(&Config) -> Arc<dyn Agent>;

/// Time-bounded minimax agent
pub struct MinimaxAgent {
    config: Config,
}

impl MinimaxAgent {
    pub fn new(config: Config) -> Self {
        MinimaxAgent { config }
    }
}

impl Agent for MinimaxAgent {
    fn name(&self) -> &str {
        "minimax"
    }

    fn step(&self, request: &TurnRequest, deadline: Deadline) -> SearchReport {
        decide(request, &self.config, deadline)
    }
}

/// Baseline agent: uniformly random destination and free wall
pub struct RandomAgent {
    rng: Mutex<StdRng>,
}

impl RandomAgent {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        RandomAgent {
            rng: Mutex::new(rng),
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str {
        "random"
    }

    fn step(&self, request: &TurnRequest, deadline: Deadline) -> SearchReport {
        if request.validate().is_err() {
            return SearchReport::fallback(request.my_pos, deadline.elapsed().as_millis());
        }

        let destinations = legal_destinations(
            &request.board,
            request.my_pos,
            request.max_step,
            request.adv_pos,
        );

        let mut rng = self.rng.lock();
        let chosen = destinations.choose(&mut *rng).and_then(|&destination| {
            let walls = request.board.free_walls(destination);
            walls.choose(&mut *rng).map(|&wall| Decision {
                destination,
                wall: Some(wall),
            })
        });

        match chosen {
            Some(decision) => SearchReport {
                decision,
                score: None,
                depth: 0,
                nodes: destinations.len(),
                elapsed_ms: deadline.elapsed().as_millis(),
            },
            None => SearchReport::fallback(request.my_pos, deadline.elapsed().as_millis()),
        }
    }
}

fn build_minimax(config: &Config) -> Arc<dyn Agent> {
    Arc::new(MinimaxAgent::new(config.clone()))
}

fn build_random(config: &Config) -> Arc<dyn Agent> {
    Arc::new(RandomAgent::new(config.agent.random_seed))
}

/// Name -> constructor map consulted by the host at startup
#[derive(Default)]
pub struct AgentRegistry {
    constructors: BTreeMap<&'static str, AgentConstructor>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the agents shipped in this crate
    pub fn with_builtin_agents() -> Self {
        let mut registry = Self::new();
        registry.register("minimax", build_minimax);
        registry.register("random", build_random);
        registry
    }

    /// Registers `constructor` under `name`, returning any constructor it replaced
    pub fn register(
        &mut self,
        name: &'static str,
        constructor: AgentConstructor,
    ) -> Option<AgentConstructor> {
        self.constructors.insert(name, constructor)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&'static str> {
        self.constructors.keys().copied().collect()
    }

    /// Builds the agent registered under `name`
    pub fn create(&self, name: &str, config: &Config) -> Result<Arc<dyn Agent>, String> {
        let constructor = self.constructors.get(name).ok_or_else(|| {
            format!(
                "Unknown agent '{}' (registered: {})",
                name,
                self.names().join(", ")
            )
        })?;

        info!("Creating agent '{}'", name);
        Ok(constructor(config))
    }
}
