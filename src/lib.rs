// Library exports for the barrier-bot decision engine
// The server binary, the replay tool and the integration tests all use these

pub mod board;
pub mod bot;
pub mod config;
pub mod debug_logger;
pub mod error;
pub mod evaluation;
pub mod handler;
pub mod reachability;
pub mod registry;
pub mod replay;
pub mod search;
pub mod simple_profiler;
pub mod types;
pub mod walls;
