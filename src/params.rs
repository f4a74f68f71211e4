//! Parameter sets for the Boolean BGV engine
//!
//! `levels` counts the primes of the modulus chain, so a chain with
//! `levels = 5` has levels 0..=4 and a fresh ciphertext starts at level 4.
//! Every prime is chosen ≡ 1 (mod 2·n·t), which makes each rescale divisor
//! ≡ 1 (mod t) and every prime NTT-friendly for the ring degree.

use serde::{Deserialize, Serialize};

use crate::error::{params_err, FheError, Result};

/// Smallest ring degree accepted by the engine
pub const MIN_RING_DIM: usize = 4;

/// Core parameters of an engine instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FheParams {
    /// Ring dimension n (power of two)
    pub ring_dim: usize,

    /// Start of the plaintext-modulus search.
    /// The engine uses the first prime t >= this value with t ≡ 1 (mod n).
    pub plaintext_modulus: u64,

    /// Number of primes in the modulus chain (one multiplicative level each)
    pub levels: usize,

    /// Whether `bootstrapping` refreshes bottom-level ciphertexts
    pub bootstrapping: bool,

    /// Standard deviation for Gaussian error sampling
    pub sigma: f64,

    /// Each chain prime is drawn from (2^prime_bits, 2^62)
    pub prime_bits: u32,

    /// Gadget base B = 2^gadget_log_base for the blind-rotation keys
    pub gadget_log_base: u32,

    /// Extra primes stacked on top of the chain while bootstrapping.
    /// The blind-rotation noise is divided by their product at the end.
    pub extension_primes: usize,

    /// Secret keys with fewer non-zero coefficients are resampled
    pub min_hamming_weight: usize,

    /// Seed for key generation (entropy when absent)
    pub seed: Option<u64>,
}

impl FheParams {
    /// Parameters with the given ring degree, plaintext-modulus start,
    /// chain length and bootstrapping mode; everything else defaulted.
    pub fn new(ring_dim: usize, plaintext_modulus: u64, levels: usize, bootstrapping: bool) -> Self {
        Self {
            ring_dim,
            plaintext_modulus,
            levels,
            bootstrapping,
            sigma: 3.2,
            prime_bits: 30,
            gadget_log_base: 30,
            extension_primes: 2,
            min_hamming_weight: ring_dim / 2,
            seed: None,
        }
    }

    /// Small ring (n = 16, t = 17) with enough levels for a full adder
    /// between two bootstraps. Not secure; sized for tests and demos.
    pub fn toy() -> Self {
        Self::new(16, 17, 5, true)
    }

    /// Same parameters with a fixed key-generation seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Encoding of bit 1 for a plaintext modulus t: h = (t−1)/2 ≡ −1/2 (mod t)
    pub fn bit_scale(t: u64) -> u64 {
        (t - 1) / 2
    }

    /// log2(n)
    pub fn log_ring_dim(&self) -> usize {
        self.ring_dim.trailing_zeros() as usize
    }

    /// Validate parameters before any table is built
    pub fn validate(&self) -> Result<()> {
        if !self.ring_dim.is_power_of_two() || self.ring_dim < MIN_RING_DIM {
            return Err(FheError::InvalidRingDegree(self.ring_dim));
        }

        if self.levels == 0 {
            return Err(params_err!("levels must be at least 1"));
        }

        if !(16..=60).contains(&self.prime_bits) {
            return Err(params_err!(
                "prime_bits must lie in 16..=60, got {}",
                self.prime_bits
            ));
        }

        if self.gadget_log_base == 0 || self.gadget_log_base > self.prime_bits {
            return Err(params_err!(
                "gadget_log_base must lie in 1..={}, got {}",
                self.prime_bits,
                self.gadget_log_base
            ));
        }

        if self.bootstrapping && self.extension_primes == 0 {
            return Err(params_err!(
                "bootstrapping needs at least one extension prime"
            ));
        }

        if self.sigma.is_nan() || self.sigma <= 0.0 {
            return Err(params_err!("sigma must be positive"));
        }

        if self.min_hamming_weight > self.ring_dim {
            return Err(params_err!(
                "min_hamming_weight {} exceeds ring dimension {}",
                self.min_hamming_weight,
                self.ring_dim
            ));
        }

        Ok(())
    }
}

impl Default for FheParams {
    fn default() -> Self {
        Self::toy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_valid() {
        let params = FheParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.log_ring_dim(), 4);
    }

    #[test]
    fn test_ring_degree_rejected() {
        let params = FheParams::new(12, 17, 3, false);
        assert_eq!(params.validate(), Err(FheError::InvalidRingDegree(12)));

        let params = FheParams::new(2, 17, 3, false);
        assert_eq!(params.validate(), Err(FheError::InvalidRingDegree(2)));
    }

    #[test]
    fn test_bootstrapping_needs_extension() {
        let mut params = FheParams::toy();
        params.extension_primes = 0;
        assert!(matches!(params.validate(), Err(FheError::InvalidParams(_))));

        params.bootstrapping = false;
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_gadget_base_bounded_by_prime_bits() {
        let mut params = FheParams::toy();
        params.gadget_log_base = params.prime_bits + 1;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_bit_scale_is_minus_half() {
        let t = 17u64;
        let h = FheParams::bit_scale(t);
        assert_eq!((2 * h + 1) % t, 0);
    }

    #[test]
    fn test_params_json_roundtrip() {
        let params = FheParams::toy().with_seed(7);
        let json = serde_json::to_string(&params).unwrap();
        let back: FheParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }
}
