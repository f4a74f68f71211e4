//! RGSW ciphertext and gadget types.

use std::sync::Arc;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, ToPrimitive};
use rand::Rng;

use crate::bgv::keys::{scaled_error_poly, SecretKey};
use crate::error::Result;
use crate::math::{GaussianSampler, NttPoly, Poly, RingArithmetic, RnsContext};
use crate::rlwe::CipherPair;

/// Gadget vector g = [1, B, B², ..., B^(ℓ-1)]^T with B = 2^w.
///
/// Decomposition splits a coefficient c ∈ [0, q) into ℓ unsigned digits
/// in [0, B), so products with gadget rows grow noise by at most ℓ·n·B.
///
/// # Fields
///
/// * `log_base` - w
/// * `len` - ℓ = ⌈bits(q) / w⌉, so B^ℓ ≥ q
/// * `modulus` - q
///
/// # Example
///
/// ```
/// use num_bigint::BigInt;
/// use rlwe_bool::rgsw::GadgetVector;
///
/// let gadget = GadgetVector::new(10, &BigInt::from(1u64 << 40));
/// assert_eq!(gadget.len, 5);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GadgetVector {
    pub log_base: u32,
    pub len: usize,
    pub modulus: BigInt,
}

impl GadgetVector {
    pub fn new(log_base: u32, modulus: &BigInt) -> Self {
        debug_assert!(log_base > 0 && log_base < 63, "gadget base must fit a word");
        let bits = modulus.bits() as usize;
        let len = bits.div_ceil(log_base as usize).max(1);
        Self {
            log_base,
            len,
            modulus: modulus.clone(),
        }
    }

    /// B
    pub fn base(&self) -> u64 {
        1 << self.log_base
    }

    /// B^i
    pub fn power(&self, i: usize) -> BigInt {
        BigInt::one() << (self.log_base as usize * i)
    }

    /// Unsigned base-B digits of every coefficient: `digits[k][j]` is digit k
    /// of coefficient j, with Σ_k digits[k][j]·B^k ≡ c_j (mod q).
    pub fn decompose(&self, poly: &Poly) -> Vec<Vec<i64>> {
        let n = poly.dimension();
        let mask = BigInt::from(self.base() - 1);
        let mut digits = vec![vec![0i64; n]; self.len];

        for (j, c) in poly.coeffs().iter().enumerate() {
            let mut value = c.mod_floor(&self.modulus);
            for row in digits.iter_mut() {
                row[j] = (&value & &mask).to_i64().unwrap_or_default();
                value >>= self.log_base as usize;
            }
        }
        digits
    }

    /// Σ_k digits[k]·B^k as a polynomial modulo q
    pub fn reconstruct(&self, digits: &[Vec<i64>]) -> Poly {
        let n = digits.first().map_or(0, Vec::len);
        let mut acc = Poly::zero(n, &self.modulus);
        for (k, row) in digits.iter().enumerate() {
            let part = Poly::from_i64s(row, n, &self.modulus).scalar_mul(&self.power(k));
            acc += &part;
        }
        acc
    }
}

/// RGSW ciphertext: 2ℓ RLWE rows in NTT form.
///
/// The structure is:
/// ```text
/// [ Row 0..ℓ-1:   (c·s + t·e + m·B^k, c)     phase  m·B^k
///   Row ℓ..2ℓ-1:  (c·s + t·e, c + m·B^k)     phase −m·B^k·s ]
/// ```
///
/// so that Σ_k a_k·Row_k + b_k·Row_{ℓ+k} has phase m·(a − s·b) for the
/// digits a_k, b_k of an RLWE ciphertext (a, b).
#[derive(Clone, Debug)]
pub struct RgswCipher {
    pub rows: Vec<CipherPair<NttPoly>>,
    pub gadget: GadgetVector,
}

impl RgswCipher {
    /// Encrypt a small scalar message under `sk` over the basis `rns`
    pub fn encrypt<R: Rng + ?Sized>(
        sk: &SecretKey,
        message: i64,
        gadget: &GadgetVector,
        rns: &Arc<RnsContext>,
        t: u64,
        sampler: &GaussianSampler,
        rng: &mut R,
    ) -> Result<Self> {
        let n = rns.dimension();
        let q = rns.modulus();
        let s = rns.small_to_ntt(sk.coeffs());
        let ell = gadget.len;

        let mut rows = Vec::with_capacity(2 * ell);
        for slot in 0..2 {
            for k in 0..ell {
                let c = Poly::random(n, q, rng);
                let te = scaled_error_poly(n, q, t, sampler, rng);
                let scaled = Poly::constant(&(gadget.power(k) * message), n, q);

                let (a_extra, b_extra) = if slot == 0 {
                    (&te + &scaled, scaled.zero_like())
                } else {
                    (te, scaled)
                };

                let c_ntt = rns.to_ntt(&c)?;
                let a = c_ntt.mul_elem(&s).add_elem(&rns.to_ntt(&a_extra)?);
                let b = c_ntt.add_elem(&rns.to_ntt(&b_extra)?);
                rows.push(CipherPair::new(a, b));
            }
        }

        Ok(Self {
            rows,
            gadget: gadget.clone(),
        })
    }

    pub fn ring_dim(&self) -> usize {
        self.rows[0].ring_dim()
    }

    /// Get the gadget length ℓ
    pub fn gadget_len(&self) -> usize {
        self.gadget.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::modular::primes_congruent_one;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_decompose_reconstruct_roundtrip() {
        let mut rng = ChaCha20Rng::seed_from_u64(71);
        let q = BigInt::from(1_000_000_007u64) * BigInt::from(998_244_353u64);
        let gadget = GadgetVector::new(12, &q);
        assert_eq!(gadget.len, (q.bits() as usize).div_ceil(12));

        let p = Poly::random(16, &q, &mut rng);
        let digits = gadget.decompose(&p);
        assert_eq!(digits.len(), gadget.len);
        assert!(digits
            .iter()
            .flatten()
            .all(|&d| (0..(1i64 << 12)).contains(&d)));
        assert_eq!(gadget.reconstruct(&digits), p);
    }

    #[test]
    fn test_decompose_negative() {
        let q = BigInt::from(97 * 193);
        let gadget = GadgetVector::new(4, &q);
        let p = Poly::from_i64s(&[-1, 0, 17, -2], 4, &q);
        let digits = gadget.decompose(&p);
        // −1 ≡ q − 1 = 18720 = 0x4920
        assert_eq!(digits[0][0], 0x0);
        assert_eq!(digits[1][0], 0x2);
        assert_eq!(digits[2][0], 0x9);
        assert_eq!(digits[3][0], 0x4);
        assert_eq!(gadget.reconstruct(&digits), p);
    }

    #[test]
    fn test_rows_have_expected_phase() {
        let mut rng = ChaCha20Rng::seed_from_u64(72);
        let primes = primes_congruent_one(2 * 16 * 17, 30, 3).unwrap();
        let rns = Arc::new(RnsContext::new(16, &primes).unwrap());
        let gadget = GadgetVector::new(30, rns.modulus());
        let sk = SecretKey::generate(16, 8, &mut rng);
        let sampler = GaussianSampler::new(3.2);

        let rgsw = RgswCipher::encrypt(&sk, 1, &gadget, &rns, 17, &sampler, &mut rng).unwrap();
        assert_eq!(rgsw.rows.len(), 2 * gadget.len);

        let q = rns.modulus();
        let s = sk.to_poly(q);
        for (i, row) in rgsw.rows.iter().enumerate() {
            let row = row.to_poly();
            let phase = &row.a - &(&s * &row.b);
            let k = i % gadget.len;
            let target = Poly::constant(&gadget.power(k), 16, q);
            let expected = if i < gadget.len { target } else { -&(&s * &target) };
            let noise = &phase - &expected;
            assert!(noise.inf_norm() < BigInt::from(17 * 40), "row {}", i);
        }
    }
}
