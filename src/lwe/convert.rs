//! Conversions between Regev samples and ring ciphertexts.
//!
//! Coefficient 0 of s·B in Z[X]/(X^n + 1) is s_0·B_0 − Σ_{j≥1} s_j·B_{n−j},
//! so the constant coefficient of A − s·B is the phase of
//!
//! ```text
//! b = A_0,   a_0 = B_0,   a_j = −B_{n−j}  (j ≥ 1)
//! ```
//!
//! under the secret whose entries are the ring secret's coefficients.

use std::sync::Arc;

use num_bigint::BigInt;

use crate::chain::ModulusChain;
use crate::error::{FheError, Result};
use crate::math::Poly;
use crate::rlwe::RlweCipher;

use super::types::RegevCipher;

/// Extract coefficient 0 of `ct` as a Regev sample modulo Q_level
pub fn to_regev(ct: &RlweCipher) -> RegevCipher {
    let n = ct.ring_dim();
    let b_poly = ct.b();
    let a = (0..n)
        .map(|j| {
            if j == 0 {
                b_poly.coeff(0).clone()
            } else {
                -b_poly.coeff(n - j)
            }
        })
        .collect();
    RegevCipher::new(a, ct.a().coeff(0).clone(), ct.modulus().clone())
}

/// Embed a Regev sample as a ring ciphertext whose constant coefficient
/// carries the sample's phase.
///
/// # Errors
///
/// `DimensionMismatch` when the sample length differs from n,
/// `ModulusMismatch` when no level of `chain` has the sample's modulus.
pub fn from_regev(sample: &RegevCipher, chain: &Arc<ModulusChain>) -> Result<RlweCipher> {
    let n = chain.ring_dim();
    if sample.dimension() != n {
        return Err(FheError::DimensionMismatch {
            left: sample.dimension(),
            right: n,
        });
    }
    let level = chain.level_of(&sample.modulus).ok_or_else(|| {
        FheError::ModulusMismatch(format!(
            "no chain level has modulus {}",
            sample.modulus
        ))
    })?;
    let q = chain.modulus(level);

    let mut b = vec![BigInt::from(0); n];
    b[0] = sample.a[0].clone();
    for j in 1..n {
        b[n - j] = -&sample.a[j];
    }
    let a = Poly::constant(&sample.b, n, q);
    RlweCipher::from_parts(a, Poly::from_coeffs(b, n, q), level, chain)
}
