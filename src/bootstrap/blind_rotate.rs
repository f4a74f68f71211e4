//! Blind rotation of the test polynomial by an encrypted Z_2n phase.

use std::sync::Arc;

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::error::Result;
use crate::math::modular::{center, ModQ};
use crate::math::{NttPoly, Poly, RnsContext};
use crate::rgsw::{cmux, RgswCipher};
use crate::rlwe::CipherPair;

use super::prep::ExtractedSample;

/// X^k − 1 for every k in [0, 2n), in NTT form over the bootstrap basis
#[derive(Clone, Debug)]
pub struct MonomialTable {
    entries: Vec<NttPoly>,
}

impl MonomialTable {
    pub fn new(rns: &Arc<RnsContext>) -> Self {
        let n = rns.dimension();
        let entries = (0..2 * n)
            .map(|k| {
                let mut coeffs = vec![0i64; n];
                coeffs[0] -= 1;
                if k < n {
                    coeffs[k] += 1;
                } else {
                    coeffs[k - n] -= 1;
                }
                rns.small_to_ntt(&coeffs)
            })
            .collect();
        Self { entries }
    }

    /// X^k − 1, k taken mod 2n
    pub fn get(&self, k: usize) -> &NttPoly {
        &self.entries[k % self.entries.len()]
    }
}

/// Test polynomial TV = μ − μ·(X + X² + ... + X^{n−1}) with μ = (4n)⁻¹ mod t.
///
/// Coefficient 0 of TV·X^k is μ for k ∈ [0, n) and −μ for k ∈ [n, 2n).
/// Returns the centered coefficients and μ.
pub fn test_polynomial(n: usize, t: u64) -> Result<(Vec<i64>, i64)> {
    let mu = ModQ::inverse((4 * n as u64) % t, t)?;
    let mu = center(&BigInt::from(mu), &BigInt::from(t))
        .to_i64()
        .unwrap_or_default();
    let mut tv = vec![-mu; n];
    tv[0] = mu;
    Ok((tv, mu))
}

/// Multiply small coefficients by X^k in Z[X]/(X^n + 1)
fn rotate_small(coeffs: &[i64], k: usize) -> Vec<i64> {
    let n = coeffs.len();
    let mut out = vec![0i64; n];
    for (i, &c) in coeffs.iter().enumerate() {
        let j = (i + k) % (2 * n);
        if j < n {
            out[j] = c;
        } else {
            out[j - n] = -c;
        }
    }
    out
}

/// Rotate TV by the encrypted phase β − Σ α_j·s_j of `sample`, shifted by n/2.
///
/// Starts from the trivial ciphertext (TV·X^{β+n/2}, 0) and applies one CMux
/// per secret coefficient; α_j = 0 is skipped since it rotates by nothing.
/// The result, at Q_boot in NTT form, has phase TV·X^{φ + n/2}.
pub fn blind_rotate(
    sample: &ExtractedSample,
    tv: &[i64],
    plus: &[RgswCipher],
    minus: &[RgswCipher],
    table: &MonomialTable,
    rns: &Arc<RnsContext>,
) -> CipherPair<NttPoly> {
    let n = tv.len();
    let two_n = 2 * n;
    let start = rotate_small(tv, (sample.beta + n / 2) % two_n);
    let mut acc = CipherPair::trivial(rns.small_to_ntt(&start));

    for (j, &alpha) in sample.alpha.iter().enumerate() {
        if alpha % two_n == 0 {
            continue;
        }
        let rot_neg = table.get(two_n - alpha % two_n);
        let rot_pos = table.get(alpha);
        acc = cmux(&acc, &plus[j], &minus[j], rot_neg, rot_pos, rns);
    }
    acc
}

/// Back to exact form with −μ added to coefficient 0, leaving 0 for bit 0
/// and −2μ for bit 1 in that coefficient.
pub fn finish_rotation(acc: &CipherPair<NttPoly>, mu: i64) -> CipherPair<Poly> {
    let exact = acc.to_poly();
    let n = exact.ring_dim();
    let shift = Poly::constant(&BigInt::from(-mu), n, exact.modulus());
    CipherPair::new(&exact.a + &shift, exact.b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bgv::keys::SecretKey;
    use crate::math::modular::primes_congruent_one;
    use crate::math::GaussianSampler;
    use crate::rgsw::GadgetVector;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_polynomial_sign_pattern() {
        let n = 16;
        let t = 17;
        let (tv, mu) = test_polynomial(n, t).unwrap();
        assert_eq!(mu, 4);
        assert_eq!(((4 * n as i64 * mu) % t as i64 + t as i64) % t as i64, 1);

        for k in 0..2 * n {
            let c0 = rotate_small(&tv, k)[0];
            let want = if k < n { mu } else { -mu };
            assert_eq!(c0, want, "k = {}", k);
        }
    }

    #[test]
    fn test_monomial_table() {
        let primes = primes_congruent_one(32, 30, 2).unwrap();
        let rns = Arc::new(RnsContext::new(16, &primes).unwrap());
        let table = MonomialTable::new(&rns);
        let q = rns.modulus();
        assert!(table.get(0).to_poly().is_zero());
        for k in [1usize, 5, 16, 31, 33] {
            let expected = &Poly::monomial(k, 16, q) - &Poly::constant(&BigInt::from(1), 16, q);
            assert_eq!(table.get(k).to_poly(), expected, "k = {}", k);
        }
    }

    #[test]
    fn test_blind_rotation_lands_on_phase() {
        let n = 16;
        let t = 17u64;
        let mut rng = ChaCha20Rng::seed_from_u64(91);
        let primes = primes_congruent_one(2 * n as u64 * t, 30, 4).unwrap();
        let rns = Arc::new(RnsContext::new(n, &primes).unwrap());
        let gadget = GadgetVector::new(30, rns.modulus());
        let sampler = GaussianSampler::new(3.2);
        let sk = SecretKey::generate(n, n / 2, &mut rng);

        let mut plus = Vec::new();
        let mut minus = Vec::new();
        for &sj in sk.coeffs() {
            plus.push(RgswCipher::encrypt(&sk, (sj == 1) as i64, &gadget, &rns, t, &sampler, &mut rng).unwrap());
            minus.push(RgswCipher::encrypt(&sk, (sj == -1) as i64, &gadget, &rns, t, &sampler, &mut rng).unwrap());
        }
        let table = MonomialTable::new(&rns);
        let (tv, mu) = test_polynomial(n, t).unwrap();

        let sample = ExtractedSample {
            beta: 7,
            alpha: (0..n).map(|j| (3 * j + 1) % (2 * n)).collect(),
        };
        let phi = crate::bootstrap::sample_phase(&sample, sk.coeffs());

        let acc = blind_rotate(&sample, &tv, &plus, &minus, &table, &rns);
        let exact = finish_rotation(&acc, mu);
        let q = exact.modulus().clone();
        let dec = (&exact.a - &(&sk.to_poly(&q) * &exact.b)).reduce_to(&BigInt::from(t));

        let rotated = (phi + n / 2) % (2 * n);
        let want = if rotated < n { 0 } else { -2 * mu };
        let got = center(dec.coeff(0), &BigInt::from(t)).to_i64().unwrap();
        assert_eq!(got, center(&BigInt::from(want), &BigInt::from(t)).to_i64().unwrap());
    }
}
