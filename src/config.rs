// Configuration module for reading Agent.toml
// This module provides OOP-style configuration management for the engine

use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub search: SearchConfig,
    pub evaluation: EvaluationConfig,
    pub agent: AgentConfig,
    pub debug: DebugConfig,
}

/// Iterative deepening limits
#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    pub min_depth: u8,
    pub max_depth: u8,
    pub time_budget_ms: u64,
}

impl SearchConfig {
    /// Wall-clock ceiling for a single decision
    pub fn time_budget(&self) -> Duration {
        Duration::from_millis(self.time_budget_ms)
    }
}

/// Relative weights of the evaluator's sub-scores
#[derive(Debug, Deserialize, Clone)]
pub struct EvaluationConfig {
    pub weight_openness: f64,
    pub weight_mobility: f64,
    pub weight_containment: f64,
}

/// Which registered agent the host serves, and how it presents itself
#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    pub name: String,
    pub display_name: String,
    pub author: String,
    #[serde(default)]
    pub random_seed: Option<u64>,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Agent.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_toml_str(&contents)
    }

    /// Parses configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, String> {
        let config: Config =
            toml::from_str(contents).map_err(|e| format!("Failed to parse config file: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads default configuration from Agent.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Agent.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Agent.toml
    pub fn default_hardcoded() -> Self {
        Config {
            search: SearchConfig {
                min_depth: 1,
                max_depth: 3,
                time_budget_ms: 1790,
            },
            evaluation: EvaluationConfig {
                weight_openness: 1.0,
                weight_mobility: 1.0,
                weight_containment: 1.0,
            },
            agent: AgentConfig {
                name: "minimax".to_string(),
                display_name: "Patient Paul".to_string(),
                author: "barrier-bot".to_string(),
                random_seed: None,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "barrier_bot_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            eprintln!(
                "Warning: Could not load Agent.toml ({}), using hardcoded defaults",
                e
            );
            Self::default_hardcoded()
        })
    }

    /// Rejects depth ranges the search loop cannot run
    fn validate(&self) -> Result<(), String> {
        if self.search.min_depth == 0 {
            return Err("search.min_depth must be at least 1".to_string());
        }
        if self.search.min_depth > self.search.max_depth {
            return Err(format!(
                "search.min_depth ({}) exceeds search.max_depth ({})",
                self.search.min_depth, self.search.max_depth
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_budget_conversion() {
        let config = Config::default_hardcoded();
        assert_eq!(config.search.time_budget(), Duration::from_millis(1790));
    }

    #[test]
    fn test_config_can_be_created() {
        let config = Config::default_hardcoded();
        assert_eq!(config.search.max_depth, 3);
        assert_eq!(config.agent.name, "minimax");
    }

    #[test]
    fn test_agent_toml_can_be_parsed() {
        // This test ensures Agent.toml is valid and can be parsed
        let result = Config::from_file("Agent.toml");
        assert!(
            result.is_ok(),
            "Failed to parse Agent.toml: {:?}",
            result.err()
        );
    }

    #[test]
    fn test_all_config_values_match_hardcoded_defaults() {
        let file_config = Config::from_file("Agent.toml").expect("Agent.toml should be parseable");
        let hardcoded_config = Config::default_hardcoded();

        assert_eq!(file_config.search.min_depth, hardcoded_config.search.min_depth);
        assert_eq!(file_config.search.max_depth, hardcoded_config.search.max_depth);
        assert_eq!(
            file_config.search.time_budget_ms,
            hardcoded_config.search.time_budget_ms
        );
        assert_eq!(
            file_config.evaluation.weight_openness,
            hardcoded_config.evaluation.weight_openness
        );
        assert_eq!(
            file_config.evaluation.weight_mobility,
            hardcoded_config.evaluation.weight_mobility
        );
        assert_eq!(
            file_config.evaluation.weight_containment,
            hardcoded_config.evaluation.weight_containment
        );
        assert_eq!(file_config.agent.name, hardcoded_config.agent.name);
        assert_eq!(file_config.debug.enabled, hardcoded_config.debug.enabled);
    }

    #[test]
    fn test_inverted_depth_range_is_rejected() {
        let toml = r#"
            [search]
            min_depth = 4
            max_depth = 2
            time_budget_ms = 100

            [evaluation]
            weight_openness = 1.0
            weight_mobility = 1.0
            weight_containment = 1.0

            [agent]
            name = "minimax"
            display_name = "x"
            author = "y"

            [debug]
            enabled = false
            log_file_path = "x.jsonl"
        "#;
        let err = Config::from_toml_str(toml).unwrap_err();
        assert!(err.contains("min_depth"));
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        // Test with a non-existent file
        let result = Config::from_file("nonexistent.toml");
        assert!(result.is_err());
    }
}
