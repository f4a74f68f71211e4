//! CtPrep and coefficient extraction.
//!
//! The input sits at level 0 with phase m + t·e (mod Q_0). Multiplying by
//! k = (Q_0 − 1)/t gives
//!
//! ```text
//! k·(m + t·e) = k·m − e   (mod Q_0),     k·h ≈ Q_0/2 − Q_0/(2t)
//! ```
//!
//! so bit 0 has phase ≈ 0 and bit 1 has phase ≈ Q_0/2. Scaling each
//! coefficient to Z_2n keeps that split: ≈ 0 versus ≈ n − n/t.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::ToPrimitive;

use crate::math::modular::div_round;
use crate::rlwe::RlweCipher;

/// Coarse Z_2n image of a level-0 ciphertext.
///
/// `a_coarse[i] = round(2n·x_i / Q_0) mod 2n` for x = k·A mod Q_0, likewise
/// for B. The rounding residuals are left out; [`residuals`] recomputes them.
#[derive(Clone, Debug)]
pub struct CtPrep {
    pub a_coarse: Vec<usize>,
    pub b_coarse: Vec<usize>,
}

impl CtPrep {
    pub fn ring_dim(&self) -> usize {
        self.a_coarse.len()
    }
}

/// LWE-style sample of one coefficient over Z_2n: phase β − Σ_j α_j·s_j
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedSample {
    pub beta: usize,
    pub alpha: Vec<usize>,
}

/// Scaling constants for a level-0 ciphertext: k = (Q_0 − 1)/t and 2n
fn scaling(ct: &RlweCipher) -> (BigInt, BigInt) {
    let t = BigInt::from(ct.plaintext_modulus());
    let k = (ct.modulus() - 1u32) / &t;
    (k, BigInt::from(2 * ct.ring_dim()))
}

/// 2n·(k·c mod Q_0) and its rounded quotient by Q_0
fn scale_coeff(c: &BigInt, k: &BigInt, q: &BigInt, two_n: &BigInt) -> (BigInt, BigInt) {
    let scaled = (c * k).mod_floor(q) * two_n;
    let rounded = div_round(&scaled, q);
    (scaled, rounded)
}

fn coarsen(coeffs: &[BigInt], k: &BigInt, q: &BigInt, two_n: &BigInt) -> Vec<usize> {
    coeffs
        .iter()
        .map(|c| {
            let (_, rounded) = scale_coeff(c, k, q, two_n);
            rounded.mod_floor(two_n).to_usize().unwrap_or_default()
        })
        .collect()
}

/// Coarse Z_2n image of a level-0 ciphertext
pub fn prepare(ct: &RlweCipher) -> CtPrep {
    let q = ct.modulus();
    let (k, two_n) = scaling(ct);
    CtPrep {
        a_coarse: coarsen(ct.a().coeffs(), &k, q, &two_n),
        b_coarse: coarsen(ct.b().coeffs(), &k, q, &two_n),
    }
}

/// Rounding residuals `2n·x_i − round(2n·x_i / Q_0)·Q_0` of A and B, each
/// in [−Q_0/2, Q_0/2]. Not needed by the bootstrap itself.
pub fn residuals(ct: &RlweCipher) -> (Vec<BigInt>, Vec<BigInt>) {
    let q = ct.modulus();
    let (k, two_n) = scaling(ct);
    let residual = |coeffs: &[BigInt]| -> Vec<BigInt> {
        coeffs
            .iter()
            .map(|c| {
                let (scaled, rounded) = scale_coeff(c, &k, q, &two_n);
                scaled - rounded * q
            })
            .collect()
    };
    (residual(ct.a().coeffs()), residual(ct.b().coeffs()))
}

/// Sample for coefficient i of Ã − s·B̃ in Z_2n[X]/(X^n + 1):
///
/// ```text
/// β = Ã_i
/// α_j = B̃_{i−j}         for j ≤ i
/// α_j = −B̃_{n+i−j}      for j > i   (wrap-around through X^n = −1)
/// ```
pub fn extract_coefficient(prep: &CtPrep, i: usize) -> ExtractedSample {
    let n = prep.ring_dim();
    let two_n = 2 * n;
    let alpha = (0..n)
        .map(|j| {
            if j <= i {
                prep.b_coarse[i - j]
            } else {
                (two_n - prep.b_coarse[n + i - j]) % two_n
            }
        })
        .collect();
    ExtractedSample {
        beta: prep.a_coarse[i],
        alpha,
    }
}

/// β − Σ α_j·s_j mod 2n, for tests with a known key
pub fn sample_phase(sample: &ExtractedSample, s: &[i64]) -> usize {
    let two_n = 2 * s.len() as i64;
    let dot: i64 = sample
        .alpha
        .iter()
        .zip(s)
        .map(|(&a, &sj)| a as i64 * sj)
        .sum();
    (sample.beta as i64 - dot).rem_euclid(two_n) as usize
}
