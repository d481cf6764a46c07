//! Log-normal distribution.
use rand::RngCore;

use crate::error::{Error, Result};
use crate::random::{standard_normal, ComponentSampling};

/// `exp(X)` where `X` is normal with the given `mean` and `sigma`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogNormal {
    mean: f64,
    sigma: f64,
}

impl LogNormal {
    pub fn new(mean: f64, sigma: f64) -> Result<Self> {
        if !mean.is_finite() || !sigma.is_finite() || sigma <= 0.0 {
            return Err(Error::InvalidDistributionSpec(format!(
                "lognormal requires finite mean and sigma > 0 (mean={mean}, sigma={sigma})"
            )));
        }
        Ok(Self { mean, sigma })
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl Default for LogNormal {
    fn default() -> Self {
        Self {
            mean: 0.0,
            sigma: 1.0,
        }
    }
}

impl ComponentSampling for LogNormal {
    fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        // exp() underflows to zero for very negative exponents; the result must stay positive.
        (self.mean + self.sigma * standard_normal(rng))
            .exp()
            .max(f64::MIN_POSITIVE)
    }
}
