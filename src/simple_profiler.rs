//! Simple profiling counters using thread-local storage
//!
//! This module provides lightweight profiling without changing function signatures.
//! Enable with environment variable: BARRIER_BOT_PROFILE=1

use log::info;
use std::cell::RefCell;
use std::sync::OnceLock;
use std::time::Instant;

const CATEGORIES: [&str; 4] = ["reachability", "eval", "simulate", "minimax"];

thread_local! {
    static TIMES_NS: RefCell<[u64; 4]> = const { RefCell::new([0; 4]) };
    static COUNTS: RefCell<[usize; 4]> = const { RefCell::new([0; 4]) };
}

#[inline]
pub fn is_profiling_enabled() -> bool {
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| std::env::var("BARRIER_BOT_PROFILE").is_ok())
}

fn category_index(category: &str) -> Option<usize> {
    CATEGORIES.iter().position(|&c| c == category)
}

pub struct ProfileGuard {
    start: Instant,
    slot: usize,
}

impl ProfileGuard {
    /// Starts timing `category`; returns `None` when profiling is off or
    /// the category is unknown
    pub fn new(category: &'static str) -> Option<Self> {
        if !is_profiling_enabled() {
            return None;
        }
        category_index(category).map(|slot| ProfileGuard {
            start: Instant::now(),
            slot,
        })
    }
}

impl Drop for ProfileGuard {
    fn drop(&mut self) {
        let elapsed_ns = self.start.elapsed().as_nanos() as u64;
        TIMES_NS.with(|t| t.borrow_mut()[self.slot] += elapsed_ns);
        COUNTS.with(|c| c.borrow_mut()[self.slot] += 1);
    }
}

/// Per-category totals captured on the current thread
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProfileSnapshot {
    pub entries: Vec<(&'static str, usize, u64)>,
}

impl ProfileSnapshot {
    pub fn calls(&self, category: &str) -> usize {
        self.entries
            .iter()
            .find(|(name, _, _)| *name == category)
            .map_or(0, |(_, calls, _)| *calls)
    }
}

/// Takes the current thread's counters and clears them
pub fn take() -> ProfileSnapshot {
    let times = TIMES_NS.with(|t| std::mem::take(&mut *t.borrow_mut()));
    let counts = COUNTS.with(|c| std::mem::take(&mut *c.borrow_mut()));

    ProfileSnapshot {
        entries: CATEGORIES
            .iter()
            .enumerate()
            .map(|(i, &name)| (name, counts[i], times[i]))
            .collect(),
    }
}

/// Logs and clears this thread's counters
pub fn report(total_time_ms: u128) {
    if !is_profiling_enabled() {
        return;
    }

    let snapshot = take();
    let total_ns = total_time_ms.max(1) as f64 * 1_000_000.0;

    for (name, calls, time_ns) in snapshot.entries {
        let avg_us = if calls > 0 {
            time_ns as f64 / (calls as f64 * 1000.0)
        } else {
            0.0
        };
        info!(
            "profile {:<12} {:>8} calls {:>9.2}ms ({:>5.1}%) {:>8.2}µs avg",
            name,
            calls,
            time_ns as f64 / 1_000_000.0,
            100.0 * time_ns as f64 / total_ns,
            avg_us
        );
    }
}
