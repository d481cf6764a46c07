//! Distribution engine for drawing scalar and vector samples.
//!
//! Every sampler is a pure function of an explicit random engine passed in by the
//! caller. There is no global generator: the same seed and the same call order
//! reproduce the same values.
use rand::RngCore;

pub mod exponential;
pub mod lognormal;
pub mod normal;
pub mod spec;
pub mod uniform;

pub use exponential::Exponential;
pub use lognormal::LogNormal;
pub use normal::Normal;
pub use spec::{AxisParam, Distribution, DistributionFamily, DistributionKind, DistributionSpec};
pub use uniform::Uniform;

use crate::error::Result;
use crate::value::Value;

/// Draws one value per component from a single-axis distribution.
pub trait ComponentSampling: Send + Sync {
    fn sample(&self, rng: &mut dyn RngCore) -> f64;
}

/// Compiles `spec` and draws one sample from it.
///
/// Scalar distributions yield [`Value::Scalar`], distributions with `dimension > 1`
/// yield a [`Value::Vector`] whose components are drawn independently. Prefer
/// [`DistributionSpec::compile`] when sampling the same spec repeatedly.
pub fn sample<R: RngCore>(spec: &DistributionSpec, rng: &mut R) -> Result<Value> {
    Ok(spec.compile()?.sample(rng))
}

/// Generate a random float in the range [0, 1).
#[inline]
pub(crate) fn rand01(rng: &mut dyn RngCore) -> f64 {
    // 53 random mantissa bits.
    (rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

/// Standard normal draw via the Box-Muller transform.
#[inline]
pub(crate) fn standard_normal(rng: &mut dyn RngCore) -> f64 {
    let u1 = (1.0 - rand01(rng)).clamp(f64::MIN_POSITIVE, 1.0);
    let u2 = rand01(rng);

    let r = (-2.0 * u1.ln()).sqrt();
    let theta = 2.0 * core::f64::consts::PI * u2;

    r * theta.cos()
}

/// Derives a well-mixed seed for the layer at `layer_index` from `base_seed`.
///
/// Layers built concurrently should each get their own generator seeded this way so
/// that no two layers depend on the draw order of a shared engine.
pub fn seed_for_layer(base_seed: u64, layer_index: u64) -> u64 {
    let mixed = base_seed ^ layer_index.wrapping_mul(0x9E3779B97F4A7C15);
    mix_u64(mixed)
}

#[inline]
fn mix_u64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58476D1CE4E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D049BB133111EB);
    x ^ (x >> 31)
}

#[cfg(test)]
pub(crate) mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    pub(crate) struct FixedRng {
        pub(crate) value: u64,
    }

    impl RngCore for FixedRng {
        fn next_u32(&mut self) -> u32 {
            self.value as u32
        }

        fn next_u64(&mut self) -> u64 {
            self.value
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            let bytes = self.value.to_le_bytes();
            for (i, b) in dest.iter_mut().enumerate() {
                *b = bytes[i % 8];
            }
        }
    }

    #[test]
    fn rand01_returns_zero_for_zero_input() {
        let mut rng = FixedRng { value: 0 };
        assert_eq!(rand01(&mut rng), 0.0);
    }

    #[test]
    fn rand01_stays_below_one_for_max_input() {
        let mut rng = FixedRng { value: u64::MAX };
        let result = rand01(&mut rng);
        assert!(result < 1.0);
        assert!(result > 0.999_999);
    }

    #[test]
    fn rand01_distribution_midpoint() {
        let mut rng = FixedRng {
            value: u64::MAX / 2,
        };
        assert!((rand01(&mut rng) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn standard_normal_is_finite_at_extremes() {
        for value in [0, 1, u64::MAX / 2, u64::MAX] {
            let mut rng = FixedRng { value };
            assert!(standard_normal(&mut rng).is_finite());
        }
    }

    #[test]
    fn standard_normal_moments_are_plausible() {
        let mut rng = StdRng::seed_from_u64(11);
        let n = 20_000;
        let draws: Vec<f64> = (0..n).map(|_| standard_normal(&mut rng)).collect();
        let mean = draws.iter().sum::<f64>() / n as f64;
        let var = draws.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.05, "mean {mean}");
        assert!((var - 1.0).abs() < 0.05, "variance {var}");
    }

    #[test]
    fn seed_for_layer_separates_indices() {
        let a = seed_for_layer(42, 0);
        let b = seed_for_layer(42, 1);
        assert_ne!(a, b);
        assert_eq!(a, seed_for_layer(42, 0));
        assert_ne!(seed_for_layer(1, 0), seed_for_layer(2, 0));
    }

    #[test]
    fn sample_is_reproducible_for_same_seed() {
        let spec = DistributionSpec::normal(0.0, 1.0).with_dimension(3);
        let mut a = StdRng::seed_from_u64(5);
        let mut b = StdRng::seed_from_u64(5);
        assert_eq!(
            sample(&spec, &mut a).unwrap(),
            sample(&spec, &mut b).unwrap()
        );
    }
}
