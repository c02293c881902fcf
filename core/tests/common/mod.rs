#![allow(dead_code)]

use trinode_core::*;

pub struct TestHarness {
    pub sim: Simulation,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(RunConfig::default().with_trace())
    }

    pub fn new_with_seed(seed: u32) -> Self {
        Self::with_config(RunConfig::default().with_seed(seed).with_trace())
    }

    pub fn with_horizon(horizon: f64) -> Self {
        Self::with_config(RunConfig::default().with_horizon(horizon).with_trace())
    }

    pub fn with_config(config: RunConfig) -> Self {
        Self {
            sim: Simulation::new(config).expect("test config must be valid"),
        }
    }

    pub fn run(&mut self) -> &mut Self {
        self.sim.run();
        self
    }

    pub fn stats(&self) -> RunStats {
        self.sim.collect_stats().expect("stats")
    }

    pub fn counters(&self) -> Counters {
        self.sim.counters()
    }

    pub fn terminal(&self) -> usize {
        self.sim.messages().iter().filter(|m| m.is_terminal()).count()
    }

    pub fn count(&self, category: Category) -> usize {
        self.sim
            .messages()
            .iter()
            .filter(|m| Category::of(m) == Some(category))
            .count()
    }

    pub fn busy_time(&self, id: ProcessorId) -> f64 {
        self.sim.processor(id).busy_time()
    }
}

/// Runs `config` for `runs` batch members and returns their statistics.
pub fn run_batch(config: &RunConfig, runs: u32) -> Vec<RunStats> {
    (0..runs)
        .map(|k| {
            let mut sim = Simulation::new(config.for_run(k)).expect("batch config");
            sim.run();
            sim.collect_stats().expect("stats")
        })
        .collect()
}
