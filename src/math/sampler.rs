//! Samplers for secret, ephemeral and error polynomials

use num_bigint::{BigInt, RandBigInt};
use num_traits::Zero;
use rand::Rng;

/// Gaussian sampler for error polynomials
#[derive(Clone, Copy, Debug)]
pub struct GaussianSampler {
    sigma: f64,
}

impl GaussianSampler {
    /// Create a new Gaussian sampler with given standard deviation
    pub fn new(sigma: f64) -> Self {
        Self { sigma }
    }

    /// Sample from a rounded Gaussian using the Box-Muller transform
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        // u1 in (0, 1] keeps the logarithm finite
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = rng.gen::<f64>();

        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        (z * self.sigma).round() as i64
    }

    /// Sample n independent values
    pub fn sample_vec<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<i64> {
        (0..n).map(|_| self.sample(rng)).collect()
    }

    /// Get the standard deviation
    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

/// Uniform coefficients in {−1, 0, 1}
pub fn sample_ternary<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<i64> {
    (0..n).map(|_| rng.gen_range(-1i64..=1)).collect()
}

/// Ternary vector with at least `min_weight` non-zero entries (resampled until it has)
pub fn sample_ternary_min_weight<R: Rng + ?Sized>(
    n: usize,
    min_weight: usize,
    rng: &mut R,
) -> Vec<i64> {
    loop {
        let coeffs = sample_ternary(n, rng);
        if coeffs.iter().filter(|&&c| c != 0).count() >= min_weight.min(n) {
            return coeffs;
        }
    }
}

/// Uniform coefficients in [0, q)
pub fn sample_uniform<R: Rng + ?Sized>(n: usize, q: &BigInt, rng: &mut R) -> Vec<BigInt> {
    let zero = BigInt::zero();
    (0..n).map(|_| rng.gen_bigint_range(&zero, q)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_gaussian_statistics() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let sampler = GaussianSampler::new(3.2);
        let samples = sampler.sample_vec(20_000, &mut rng);

        let mean = samples.iter().sum::<i64>() as f64 / samples.len() as f64;
        let var = samples
            .iter()
            .map(|&s| (s as f64 - mean).powi(2))
            .sum::<f64>()
            / samples.len() as f64;

        assert!(mean.abs() < 0.2, "mean {}", mean);
        assert!((var.sqrt() - 3.2).abs() < 0.3, "sigma {}", var.sqrt());
    }

    #[test]
    fn test_ternary_weight_floor() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        for _ in 0..50 {
            let s = sample_ternary_min_weight(16, 12, &mut rng);
            assert_eq!(s.len(), 16);
            assert!(s.iter().all(|c| (-1..=1).contains(c)));
            assert!(s.iter().filter(|&&c| c != 0).count() >= 12);
        }
    }

    #[test]
    fn test_uniform_range() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let q = BigInt::from(1u64 << 40) * BigInt::from(1u64 << 40);
        let values = sample_uniform(64, &q, &mut rng);
        assert!(values.iter().all(|v| v >= &BigInt::zero() && v < &q));
        assert!(values.iter().any(|v| v > &BigInt::from(u64::MAX)));
    }
}
