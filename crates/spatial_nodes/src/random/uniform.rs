//! Uniform distribution over a half-open interval.
use rand::RngCore;

use crate::error::{Error, Result};
use crate::random::{rand01, ComponentSampling};

/// Uniform distribution on `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Uniform {
    min: f64,
    max: f64,
}

impl Uniform {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(Error::InvalidDistributionSpec(format!(
                "uniform bounds must be finite (min={min}, max={max})"
            )));
        }
        if min >= max {
            return Err(Error::InvalidDistributionSpec(format!(
                "uniform requires min < max (min={min}, max={max})"
            )));
        }
        if !(max - min).is_finite() {
            return Err(Error::InvalidDistributionSpec(format!(
                "uniform interval width overflows (min={min}, max={max})"
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

impl Default for Uniform {
    fn default() -> Self {
        Self { min: 0.0, max: 1.0 }
    }
}

impl ComponentSampling for Uniform {
    fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        let x = self.min + (self.max - self.min) * rand01(rng);
        // Rounding can land exactly on `max`; keep the interval half-open.
        if x < self.max {
            x
        } else {
            self.max.next_down()
        }
    }
}
