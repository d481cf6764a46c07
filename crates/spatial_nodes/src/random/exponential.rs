//! Exponential distribution.
use rand::RngCore;

use crate::error::{Error, Result};
use crate::random::{rand01, ComponentSampling};

/// Exponential distribution with the given `scale` (rate `1 / scale`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exponential {
    scale: f64,
}

impl Exponential {
    pub fn new(scale: f64) -> Result<Self> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(Error::InvalidDistributionSpec(format!(
                "exponential requires finite scale > 0 (scale={scale})"
            )));
        }
        Ok(Self { scale })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn rate(&self) -> f64 {
        1.0 / self.scale
    }
}

impl Default for Exponential {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl ComponentSampling for Exponential {
    fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        // 1 - u lies in (0, 1], so the logarithm is never positive.
        self.scale * (1.0 - rand01(rng)).ln().abs()
    }
}
