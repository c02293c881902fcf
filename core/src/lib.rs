pub mod analytics;
pub mod components;
pub mod config;
pub mod distributions;
pub mod engine;
pub mod error;
pub mod random;
pub mod scheduler;
pub mod traits;

pub use analytics::{summarize, BatchSummary, Category, CategoryStats, ConfidenceInterval, Metric, RunStats};
pub use components::{Disposition, Message, MessageId, Origin, Processor, ProcessorId};
pub use config::{ModelParams, RunConfig, SentCounting};
pub use engine::{Counters, Event, EventType, RunState, Simulation, Snapshot, TraceEntry};
pub use error::{SimError, SimResult};
pub use random::Lcg;
pub use scheduler::EventQueue;
pub use traits::Observer;

/// Generator seed used when none is configured.
pub const DEFAULT_SEED: u32 = 123_456_789;
/// Simulated seconds per run when none is configured.
pub const DEFAULT_HORIZON: f64 = 100.0;
pub const DEFAULT_RUNS: u32 = 5;
