//! Normal (Gaussian) distribution.
use rand::RngCore;

use crate::error::{Error, Result};
use crate::random::{standard_normal, ComponentSampling};

/// Normal distribution with location `loc` and standard deviation `scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normal {
    loc: f64,
    scale: f64,
}

impl Normal {
    pub fn new(loc: f64, scale: f64) -> Result<Self> {
        if !loc.is_finite() || !scale.is_finite() || scale <= 0.0 {
            return Err(Error::InvalidDistributionSpec(format!(
                "normal requires finite loc and scale > 0 (loc={loc}, scale={scale})"
            )));
        }
        Ok(Self { loc, scale })
    }

    pub fn loc(&self) -> f64 {
        self.loc
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl Default for Normal {
    fn default() -> Self {
        Self {
            loc: 0.0,
            scale: 1.0,
        }
    }
}

impl ComponentSampling for Normal {
    fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        self.loc + self.scale * standard_normal(rng)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn new_rejects_non_positive_scale() {
        assert!(Normal::new(0.0, 0.0).is_err());
        assert!(Normal::new(0.0, -1.0).is_err());
        assert!(Normal::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn sample_mean_tracks_loc() {
        let n = Normal::new(5.0, 0.5).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let count = 10_000;
        let mean = (0..count).map(|_| n.sample(&mut rng)).sum::<f64>() / count as f64;
        assert!((mean - 5.0).abs() < 0.05, "mean {mean}");
    }
}
