//! Secret and public keys

use std::fmt;

use num_bigint::BigInt;
use rand::Rng;
use tracing::debug;

use crate::chain::ModulusChain;
use crate::math::sampler::sample_ternary_min_weight;
use crate::math::{GaussianSampler, Poly};
use crate::rlwe::CipherPair;

/// t·e for a fresh Gaussian e, reduced modulo `q`
pub(crate) fn scaled_error_poly<R: Rng + ?Sized>(
    n: usize,
    q: &BigInt,
    t: u64,
    sampler: &GaussianSampler,
    rng: &mut R,
) -> Poly {
    let t = t as i64;
    let coeffs: Vec<i64> = sampler
        .sample_vec(n, rng)
        .into_iter()
        .map(|e| e * t)
        .collect();
    Poly::from_i64s(&coeffs, n, q)
}

/// Ternary secret key s ∈ {−1, 0, 1}^n.
///
/// Stored as small integers so it can be lifted to any modulus of the
/// chain. `Debug` does not print the coefficients.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey {
    coeffs: Vec<i64>,
}

impl SecretKey {
    /// Sample a ternary key with at least `min_weight` non-zero coefficients
    pub fn generate<R: Rng + ?Sized>(n: usize, min_weight: usize, rng: &mut R) -> Self {
        let coeffs = sample_ternary_min_weight(n, min_weight, rng);
        let key = Self { coeffs };
        debug!(ring_dim = n, weight = key.hamming_weight(), "sampled secret key");
        key
    }

    pub fn from_coeffs(coeffs: Vec<i64>) -> Self {
        debug_assert!(coeffs.iter().all(|c| (-1..=1).contains(c)));
        Self { coeffs }
    }

    pub fn ring_dim(&self) -> usize {
        self.coeffs.len()
    }

    pub fn coeffs(&self) -> &[i64] {
        &self.coeffs
    }

    pub fn hamming_weight(&self) -> usize {
        self.coeffs.iter().filter(|&&c| c != 0).count()
    }

    /// s as an element of R_q
    pub fn to_poly(&self, q: &BigInt) -> Poly {
        Poly::from_i64s(&self.coeffs, self.ring_dim(), q)
    }

    /// τ_g(s), again ternary
    pub fn automorphism(&self, g: usize) -> SecretKey {
        let n = self.ring_dim();
        let mut out = vec![0i64; n];
        for (i, &c) in self.coeffs.iter().enumerate() {
            let j = (i * g) % (2 * n);
            if j < n {
                out[j] = c;
            } else {
                out[j - n] = -c;
            }
        }
        Self { coeffs: out }
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKey")
            .field("ring_dim", &self.ring_dim())
            .finish_non_exhaustive()
    }
}

/// Public key (t·e + c·s, c) at the top level of the chain
#[derive(Clone, Debug)]
pub struct PublicKey {
    pair: CipherPair<Poly>,
}

impl PublicKey {
    pub fn generate<R: Rng + ?Sized>(
        sk: &SecretKey,
        chain: &ModulusChain,
        sampler: &GaussianSampler,
        rng: &mut R,
    ) -> Self {
        let n = chain.ring_dim();
        let q = chain.modulus(chain.top_level());
        let c = Poly::random(n, q, rng);
        let te = scaled_error_poly(n, q, chain.plaintext_modulus(), sampler, rng);
        let a = &te + &(&c * &sk.to_poly(q));
        Self {
            pair: CipherPair::new(a, c),
        }
    }

    pub fn a(&self) -> &Poly {
        &self.pair.a
    }

    pub fn b(&self) -> &Poly {
        &self.pair.b
    }

    pub fn pair(&self) -> &CipherPair<Poly> {
        &self.pair
    }
}
