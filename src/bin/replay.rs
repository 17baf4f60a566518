// Standalone replay tool for analyzing decision logs
//
// Usage:
//   cargo run --bin replay -- <log_file> [options]
//
// Options:
//   --all                  Replay all turns
//   --turns <turn1,turn2>  Replay specific turns (comma-separated)
//   --verbose              Show detailed output for each turn
//   --config <path>        Path to Agent.toml (default: Agent.toml)

use std::env;
use std::process;

use barrier_bot::config::Config;
use barrier_bot::replay::ReplayEngine;

fn print_usage() {
    eprintln!("barrier-bot Replay Tool");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  replay <log_file> [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --all                   Replay all turns in the log");
    eprintln!("  --turns <T1,T2,...>     Replay specific turns (comma-separated)");
    eprintln!("  --verbose               Show detailed output for each turn");
    eprintln!("  --config <path>         Path to Agent.toml (default: Agent.toml)");
    eprintln!("  --help                  Show this help message");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("  replay barrier_bot_debug.jsonl --all");
    eprintln!("  replay barrier_bot_debug.jsonl --turns 5,10,15 --verbose");
}

fn parse_turns(s: &str) -> Result<Vec<u32>, String> {
    s.split(',')
        .map(|t| {
            t.trim()
                .parse::<u32>()
                .map_err(|e| format!("Invalid turn number '{}': {}", t, e))
        })
        .collect()
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.iter().any(|a| a == "--help") {
        print_usage();
        process::exit(if args.len() < 2 { 1 } else { 0 });
    }

    let log_file = &args[1];
    let mut replay_all = false;
    let mut turns: Option<Vec<u32>> = None;
    let mut verbose = false;
    let mut config_path = "Agent.toml".to_string();

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--all" => replay_all = true,
            "--verbose" => verbose = true,
            "--turns" => {
                i += 1;
                let value = args.get(i).unwrap_or_else(|| {
                    eprintln!("Error: --turns requires a value");
                    process::exit(1);
                });
                turns = Some(parse_turns(value).unwrap_or_else(|e| {
                    eprintln!("Error: {}", e);
                    process::exit(1);
                }));
            }
            "--config" => {
                i += 1;
                config_path = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("Error: --config requires a value");
                    process::exit(1);
                });
            }
            other => {
                eprintln!("Error: Unknown option '{}'", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let config = Config::from_file(&config_path).unwrap_or_else(|e| {
        eprintln!(
            "Warning: Could not load {} ({}), using hardcoded defaults",
            config_path, e
        );
        Config::default_hardcoded()
    });

    let engine = ReplayEngine::new(config, verbose);

    let entries = engine.load_log_file(log_file).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    let results = match turns {
        Some(turns) => engine.replay_turns(&entries, &turns).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            process::exit(1);
        }),
        None if replay_all => engine.replay_all(&entries),
        None => {
            eprintln!("Error: specify --all or --turns");
            print_usage();
            process::exit(1);
        }
    };

    engine.print_report(&results);
}
