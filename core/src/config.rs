use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::distributions::{AcceptReject, Bernoulli, Exponential, Gaussian, Uniform};
use crate::error::{SimError, SimResult};
use crate::random::Lcg;

/// How C1 completions feed the `sent_by_c1` counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SentCounting {
    /// Every C1 completion counts once.
    #[default]
    Once,
    /// A completion that leaves the system counts twice. Kept so results can
    /// be compared with reports produced under that convention.
    Legacy,
}

/// Stochastic parameters of the three-computer network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    /// Arrival rate of external messages at C2 (per second).
    pub c2_arrival_rate: f64,
    pub c2_service_min: f64,
    pub c2_service_max: f64,
    pub c1_service_mean: f64,
    pub c1_service_std_dev: f64,
    pub c3_reject_probability: f64,
    pub c2_return_probability: f64,
    pub c3_return_probability: f64,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            c2_arrival_rate: 1.0 / 15.0,
            c2_service_min: 5.0,
            c2_service_max: 10.0,
            c1_service_mean: 3.0,
            c1_service_std_dev: 1.0,
            c3_reject_probability: 0.75,
            c2_return_probability: 0.2,
            c3_return_probability: 0.5,
        }
    }
}

/// Validated samplers built from `ModelParams`.
#[derive(Debug, Clone, Copy)]
pub struct Samplers {
    pub c2_arrival: Exponential,
    pub c2_service: Uniform,
    pub c3_arrival: AcceptReject,
    pub c3_service: AcceptReject,
    pub c1_service: Gaussian,
    pub c3_reject: Bernoulli,
    pub c2_return: Bernoulli,
    pub c3_return: Bernoulli,
}

impl ModelParams {
    /// Builds every sampler, rejecting parameters that could yield a negative
    /// service time.
    pub fn samplers(&self) -> SimResult<Samplers> {
        if self.c2_service_min < 0.0 {
            return Err(SimError::distribution(
                "uniform",
                format!("C2 service time must be non-negative, got min {}", self.c2_service_min),
            ));
        }
        if self.c1_service_mean <= 0.0 {
            return Err(SimError::distribution(
                "gaussian",
                format!("C1 service mean must be positive, got {}", self.c1_service_mean),
            ));
        }
        Ok(Samplers {
            c2_arrival: Exponential::new(self.c2_arrival_rate)?,
            c2_service: Uniform::new(self.c2_service_min, self.c2_service_max)?,
            c3_arrival: AcceptReject::c3_inter_arrival(),
            c3_service: AcceptReject::c3_processing_time(),
            c1_service: Gaussian::new(self.c1_service_mean, self.c1_service_std_dev)?,
            c3_reject: Bernoulli::new(self.c3_reject_probability)?,
            c2_return: Bernoulli::new(self.c2_return_probability)?,
            c3_return: Bernoulli::new(self.c3_return_probability)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Simulated-time limit in seconds.
    pub horizon: f64,
    /// 1-based index used in reports.
    pub run_index: u32,
    pub seed: u32,
    /// Wall-clock pause between events, for watching a run step by step.
    pub pace_ms: Option<u64>,
    pub sent_counting: SentCounting,
    /// Keep a `(time, kind, processor)` log of every handled event.
    pub record_trace: bool,
    pub model: ModelParams,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            horizon: crate::DEFAULT_HORIZON,
            run_index: 1,
            seed: crate::DEFAULT_SEED,
            pace_ms: None,
            sent_counting: SentCounting::Once,
            record_trace: false,
            model: ModelParams::default(),
        }
    }
}

impl RunConfig {
    pub fn with_horizon(mut self, horizon: f64) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_run_index(mut self, run_index: u32) -> Self {
        self.run_index = run_index;
        self
    }

    pub fn with_trace(mut self) -> Self {
        self.record_trace = true;
        self
    }

    pub fn with_sent_counting(mut self, counting: SentCounting) -> Self {
        self.sent_counting = counting;
        self
    }

    /// Configuration of run `k` (0-based) of a batch: its own index and an
    /// independent generator stream derived from this config's seed.
    pub fn for_run(&self, k: u32) -> RunConfig {
        let mut cfg = self.clone();
        cfg.run_index = k + 1;
        cfg.seed = Lcg::stream_seed(self.seed, k);
        cfg
    }

    pub fn validate(&self) -> SimResult<()> {
        if !self.horizon.is_finite() || self.horizon < 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "horizon must be a finite non-negative number of seconds, got {}",
                self.horizon
            )));
        }
        self.model.samplers().map(|_| ())
    }

    pub fn from_json_str(s: &str) -> SimResult<Self> {
        let config: RunConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> SimResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}
