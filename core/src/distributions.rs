//! Random variates used by the network model.
//!
//! Every sampler draws from the generic `rand::Rng` via `gen::<f64>()`, which
//! for `Lcg` is exactly one step of the recurrence. Call order is part of the
//! contract: reproducing a run means consuming draws in the same sequence.

use rand::distributions::Distribution;
use rand::Rng;

use crate::error::{SimError, SimResult};

#[inline]
fn unit<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen::<f64>()
}

fn finite(name: &'static str, label: &str, value: f64) -> SimResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimError::distribution(name, format!("{} must be finite, got {}", label, value)))
    }
}

/// `a + (b - a) * u`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uniform {
    low: f64,
    high: f64,
}

impl Uniform {
    pub fn new(low: f64, high: f64) -> SimResult<Self> {
        finite("uniform", "low", low)?;
        finite("uniform", "high", high)?;
        if high < low {
            return Err(SimError::distribution(
                "uniform",
                format!("high ({}) is below low ({})", high, low),
            ));
        }
        Ok(Self { low, high })
    }
}

impl Distribution<f64> for Uniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.low + (self.high - self.low) * unit(rng)
    }
}

/// Inverse-transform exponential with rate `λ`: `-ln(1 - u) / λ`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exponential {
    rate: f64,
}

impl Exponential {
    pub fn new(rate: f64) -> SimResult<Self> {
        finite("exponential", "rate", rate)?;
        if rate <= 0.0 {
            return Err(SimError::distribution(
                "exponential",
                format!("rate must be positive, got {}", rate),
            ));
        }
        Ok(Self { rate })
    }

    pub fn mean(&self) -> f64 {
        1.0 / self.rate
    }
}

impl Distribution<f64> for Exponential {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        -(1.0 - unit(rng)).ln() / self.rate
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangular {
    low: f64,
    high: f64,
    /// Position of the mode in [0, 1].
    split: f64,
}

impl Triangular {
    pub fn new(low: f64, mode: f64, high: f64) -> SimResult<Self> {
        finite("triangular", "low", low)?;
        finite("triangular", "mode", mode)?;
        finite("triangular", "high", high)?;
        if high <= low {
            return Err(SimError::distribution(
                "triangular",
                format!("zero-width range [{}, {}]", low, high),
            ));
        }
        if mode < low || mode > high {
            return Err(SimError::distribution(
                "triangular",
                format!("mode {} outside [{}, {}]", mode, low, high),
            ));
        }
        Ok(Self {
            low,
            high,
            split: (mode - low) / (high - low),
        })
    }
}

impl Distribution<f64> for Triangular {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let u = unit(rng);
        let width = self.high - self.low;
        if u < self.split {
            self.low + width * (self.split * u).sqrt()
        } else {
            self.high - width * ((1.0 - u) * (1.0 - self.split)).sqrt()
        }
    }
}

/// Irwin–Hall approximation of a normal: twelve draws summed, minus six.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gaussian {
    mean: f64,
    std_dev: f64,
}

impl Gaussian {
    pub const DRAWS: usize = 12;

    pub fn new(mean: f64, std_dev: f64) -> SimResult<Self> {
        finite("gaussian", "mean", mean)?;
        finite("gaussian", "std_dev", std_dev)?;
        if std_dev < 0.0 {
            return Err(SimError::distribution(
                "gaussian",
                format!("std_dev must be non-negative, got {}", std_dev),
            ));
        }
        Ok(Self { mean, std_dev })
    }
}

impl Distribution<f64> for Gaussian {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let mut sum = 0.0;
        for _ in 0..Self::DRAWS {
            sum += unit(rng);
        }
        self.mean + self.std_dev * (sum - 6.0)
    }
}

/// Acceptance-rejection sampler over `[low, high]` with a flat envelope.
///
/// Each attempt consumes two draws, the candidate then the height, and the
/// candidate is accepted when the height falls on or under `density`.
#[derive(Debug, Clone, Copy)]
pub struct AcceptReject {
    candidate: Uniform,
    height: Uniform,
    density: fn(f64) -> f64,
}

impl AcceptReject {
    pub fn new(low: f64, high: f64, envelope: f64, density: fn(f64) -> f64) -> SimResult<Self> {
        if envelope <= 0.0 {
            return Err(SimError::distribution(
                "acceptance-rejection",
                format!("envelope must be positive, got {}", envelope),
            ));
        }
        Ok(Self {
            candidate: Uniform::new(low, high)?,
            height: Uniform::new(0.0, envelope)?,
            density,
        })
    }

    /// C3 service time: `f(x) = 3x²/98` on [3, 5].
    pub fn c3_processing_time() -> Self {
        Self {
            candidate: Uniform { low: 3.0, high: 5.0 },
            height: Uniform { low: 0.0, high: 1.0 },
            density: c3_processing_density,
        }
    }

    /// C3 inter-arrival time: rising ramp on [2, 4], falling ramp on (4, 10].
    pub fn c3_inter_arrival() -> Self {
        Self {
            candidate: Uniform { low: 2.0, high: 10.0 },
            height: Uniform { low: 0.0, high: 0.25 },
            density: c3_inter_arrival_density,
        }
    }

    pub fn density(&self, x: f64) -> f64 {
        (self.density)(x)
    }
}

impl Distribution<f64> for AcceptReject {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        loop {
            let x = self.candidate.sample(rng);
            let y = self.height.sample(rng);
            if y <= (self.density)(x) {
                return x;
            }
        }
    }
}

pub fn c3_processing_density(x: f64) -> f64 {
    if (3.0..=5.0).contains(&x) {
        3.0 * x * x / 98.0
    } else {
        0.0
    }
}

pub fn c3_inter_arrival_density(x: f64) -> f64 {
    if (2.0..=4.0).contains(&x) {
        x / 8.0 - 0.25
    } else if x > 4.0 && x <= 10.0 {
        5.0 / 12.0 - x / 24.0
    } else {
        0.0
    }
}

/// One draw compared against `p`; true with probability `p`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bernoulli {
    p: f64,
}

impl Bernoulli {
    pub fn new(p: f64) -> SimResult<Self> {
        if !(0.0..=1.0).contains(&p) {
            return Err(SimError::distribution(
                "bernoulli",
                format!("probability {} outside [0, 1]", p),
            ));
        }
        Ok(Self { p })
    }
}

impl Distribution<bool> for Bernoulli {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        unit(rng) < self.p
    }
}
