//! Linear congruential generator feeding every sampler in a run.
//!
//! Each `Lcg` is an owned value: a simulation run holds its own instance, so
//! separate runs never share a stream.

use rand::{Error, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

pub const LCG_MULTIPLIER: u64 = 1_664_525;
pub const LCG_INCREMENT: u64 = 1_013_904_223;
pub const LCG_MODULUS: u64 = 1 << 32;

/// Spreads per-run seeds of a batch across the 32-bit state space.
const STREAM_STRIDE: u32 = 0x9E37_79B9;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Seed for run `index` (0-based) of a batch. Run 0 keeps `seed` as is.
    pub fn stream_seed(seed: u32, index: u32) -> u32 {
        seed ^ index.wrapping_mul(STREAM_STRIDE)
    }

    pub fn for_stream(seed: u32, index: u32) -> Self {
        Self::new(Self::stream_seed(seed, index))
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    fn advance(&mut self) -> u32 {
        let next = (LCG_MULTIPLIER * self.state as u64 + LCG_INCREMENT) % LCG_MODULUS;
        self.state = next as u32;
        self.state
    }

    /// Next draw in [0, 1): the new state divided by the modulus.
    pub fn next_f64(&mut self) -> f64 {
        self.advance() as f64 / LCG_MODULUS as f64
    }
}

impl Default for Lcg {
    fn default() -> Self {
        Self::new(crate::DEFAULT_SEED)
    }
}

// The state sits in the high half of `next_u64`, so `Standard` sampling of
// an `f64` (top 53 bits scaled by 2^-53) yields exactly `state / 2^32`.
impl RngCore for Lcg {
    fn next_u32(&mut self) -> u32 {
        self.advance()
    }

    fn next_u64(&mut self) -> u64 {
        (self.advance() as u64) << 32
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.advance().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Lcg {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::new(state as u32)
    }
}
