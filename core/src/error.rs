//! Error types for the simulation core.
//!
//! Configuration and distribution defects are reported before a run starts.
//! Once a run is constructed, no transition can fail.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// `pop_next` was called with no pending events. The engine treats this
    /// as the natural end of a run.
    #[error("event queue is empty")]
    SchedulerEmpty,

    #[error("invalid {name} distribution: {reason}")]
    InvalidDistribution { name: &'static str, reason: String },

    #[error("invalid run configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to create histogram: {0}")]
    Histogram(#[from] hdrhistogram::CreationError),

    #[error("failed to record sojourn: {0}")]
    HistogramRecord(#[from] hdrhistogram::RecordError),

    #[error("failed to parse configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SimError {
    pub(crate) fn distribution(name: &'static str, reason: impl Into<String>) -> Self {
        SimError::InvalidDistribution {
            name,
            reason: reason.into(),
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;
