//! Polynomials over R_q = Z_q[X]/(X^n + 1) with exact coefficients.
//!
//! Coefficients are arbitrary-precision integers kept in the signed range
//! (−q/2, q/2]. The modulus is a product of chain primes and can be far
//! wider than a machine word, which lets rescaling and key switching work on
//! exact values instead of per-prime residues.
//!
//! Every operation returns a new polynomial. Arithmetic between polynomials
//! of different degree or modulus is a programming error and panics; the
//! ciphertext layer checks compatibility first and reports it as an error.

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{Signed, ToPrimitive, Zero};
use rand::Rng;

use crate::error::{FheError, Result};

use super::arith::RingArithmetic;
use super::modular::{center, div_round};
use super::sampler::sample_uniform;

/// Polynomial in R_q = Z_q[X]/(X^n + 1).
///
/// # Example
///
/// ```
/// use num_bigint::BigInt;
/// use rlwe_bool::math::Poly;
///
/// let q = BigInt::from(97);
/// let x = Poly::monomial(1, 4, &q);
/// let x3 = Poly::monomial(3, 4, &q);
/// // x · x^3 = x^4 = −1
/// assert_eq!(&x * &x3, Poly::from_i64s(&[-1], 4, &q));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poly {
    coeffs: Vec<BigInt>,
    q: BigInt,
}

impl Poly {
    /// Zero polynomial of degree bound n
    pub fn zero(dim: usize, q: &BigInt) -> Self {
        Self {
            coeffs: vec![BigInt::zero(); dim],
            q: q.clone(),
        }
    }

    /// Polynomial from any number of coefficients; terms of degree >= n are
    /// folded back with X^n = −1.
    pub fn from_coeffs(coeffs: Vec<BigInt>, dim: usize, q: &BigInt) -> Self {
        let mut folded = vec![BigInt::zero(); dim];
        for (i, c) in coeffs.into_iter().enumerate() {
            let (wraps, idx) = (i / dim, i % dim);
            if wraps % 2 == 0 {
                folded[idx] += c;
            } else {
                folded[idx] -= c;
            }
        }
        Self {
            coeffs: folded.iter().map(|c| center(c, q)).collect(),
            q: q.clone(),
        }
    }

    /// Polynomial from small signed coefficients
    pub fn from_i64s(values: &[i64], dim: usize, q: &BigInt) -> Self {
        Self::from_coeffs(values.iter().map(|&v| BigInt::from(v)).collect(), dim, q)
    }

    /// Constant polynomial
    pub fn constant(value: &BigInt, dim: usize, q: &BigInt) -> Self {
        let mut p = Self::zero(dim, q);
        p.coeffs[0] = center(value, q);
        p
    }

    /// X^k, with k taken modulo 2n (X^n = −1)
    pub fn monomial(k: usize, dim: usize, q: &BigInt) -> Self {
        let k = k % (2 * dim);
        let mut p = Self::zero(dim, q);
        p.coeffs[k % dim] = if k < dim {
            BigInt::from(1)
        } else {
            center(&BigInt::from(-1), q)
        };
        p
    }

    /// Uniformly random polynomial
    pub fn random<R: Rng + ?Sized>(dim: usize, q: &BigInt, rng: &mut R) -> Self {
        Self::from_coeffs(sample_uniform(dim, q, rng), dim, q)
    }

    /// Ring dimension n
    pub fn dimension(&self) -> usize {
        self.coeffs.len()
    }

    /// Coefficient modulus q
    pub fn modulus(&self) -> &BigInt {
        &self.q
    }

    /// Coefficient i in (−q/2, q/2]
    pub fn coeff(&self, i: usize) -> &BigInt {
        &self.coeffs[i]
    }

    /// All coefficients
    pub fn coeffs(&self) -> &[BigInt] {
        &self.coeffs
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.iter().all(Zero::is_zero)
    }

    /// Fails unless `other` has the same degree and modulus
    pub fn check_compatible(&self, other: &Poly) -> Result<()> {
        if self.dimension() != other.dimension() {
            return Err(FheError::DimensionMismatch {
                left: self.dimension(),
                right: other.dimension(),
            });
        }
        if self.q != other.q {
            return Err(FheError::ModulusMismatch(format!(
                "{}-bit vs {}-bit modulus",
                self.q.bits(),
                other.q.bits()
            )));
        }
        Ok(())
    }

    /// Same coefficients, reinterpreted modulo `q`.
    ///
    /// For a divisor of the current modulus this is the canonical reduction;
    /// for a larger modulus it lifts the signed representatives unchanged.
    pub fn reduce_to(&self, q: &BigInt) -> Poly {
        Self {
            coeffs: self.coeffs.iter().map(|c| center(c, q)).collect(),
            q: q.clone(),
        }
    }

    /// Multiply every coefficient by a big scalar
    pub fn scalar_mul(&self, k: &BigInt) -> Poly {
        self.map(|c| c * k)
    }

    /// Multiply by X^k (k modulo 2n): a negacyclic rotation
    pub fn monomial_mul(&self, k: usize) -> Poly {
        let n = self.dimension();
        let k = k % (2 * n);
        let mut out = vec![BigInt::zero(); n];
        for (i, c) in self.coeffs.iter().enumerate() {
            let j = (i + k) % (2 * n);
            if j < n {
                out[j] = c.clone();
            } else {
                out[j - n] = -c;
            }
        }
        Self {
            coeffs: out.iter().map(|c| center(c, &self.q)).collect(),
            q: self.q.clone(),
        }
    }

    /// Galois automorphism τ_g: a(X) → a(X^g) for odd g.
    ///
    /// Coefficient i moves to position i·g mod 2n, negated when it lands in
    /// the upper half (X^n = −1).
    pub fn automorphism(&self, g: usize) -> Poly {
        let n = self.dimension();
        let two_n = 2 * n;
        let mut out = vec![BigInt::zero(); n];
        for (i, c) in self.coeffs.iter().enumerate() {
            let j = (i * g) % two_n;
            if j < n {
                out[j] = c.clone();
            } else {
                out[j - n] = center(&-c, &self.q);
            }
        }
        Self {
            coeffs: out,
            q: self.q.clone(),
        }
    }

    /// round(c · num / den) per coefficient, reduced modulo `q`
    pub fn scale_round(&self, num: &BigInt, den: &BigInt, q: &BigInt) -> Poly {
        Self {
            coeffs: self
                .coeffs
                .iter()
                .map(|c| center(&div_round(&(c * num), den), q))
                .collect(),
            q: q.clone(),
        }
    }

    /// Coefficients reduced into [0, t)
    pub fn mod_small(&self, t: u64) -> Vec<u64> {
        let t = BigInt::from(t);
        self.coeffs
            .iter()
            .map(|c| c.mod_floor(&t).to_u64().unwrap_or_default())
            .collect()
    }

    /// max |c_i|
    pub fn inf_norm(&self) -> BigInt {
        self.coeffs
            .iter()
            .map(|c| c.abs())
            .max()
            .unwrap_or_default()
    }

    fn map(&self, f: impl Fn(&BigInt) -> BigInt) -> Poly {
        Self {
            coeffs: self.coeffs.iter().map(|c| center(&f(c), &self.q)).collect(),
            q: self.q.clone(),
        }
    }

    fn zip(&self, other: &Poly, f: impl Fn(&BigInt, &BigInt) -> BigInt) -> Poly {
        assert_eq!(self.dimension(), other.dimension(), "Dimensions must match");
        assert_eq!(self.q, other.q, "Moduli must match");
        Self {
            coeffs: self
                .coeffs
                .iter()
                .zip(other.coeffs.iter())
                .map(|(a, b)| center(&f(a, b), &self.q))
                .collect(),
            q: self.q.clone(),
        }
    }

    /// Schoolbook negacyclic product
    fn negacyclic_mul(&self, other: &Poly) -> Poly {
        assert_eq!(self.dimension(), other.dimension(), "Dimensions must match");
        assert_eq!(self.q, other.q, "Moduli must match");
        let n = self.dimension();
        let mut acc = vec![BigInt::zero(); n];
        for (i, a) in self.coeffs.iter().enumerate() {
            if a.is_zero() {
                continue;
            }
            for (j, b) in other.coeffs.iter().enumerate() {
                let prod = a * b;
                if i + j < n {
                    acc[i + j] += prod;
                } else {
                    acc[i + j - n] -= prod;
                }
            }
        }
        Self {
            coeffs: acc.iter().map(|c| center(c, &self.q)).collect(),
            q: self.q.clone(),
        }
    }
}

impl RingArithmetic for Poly {
    fn ring_dim(&self) -> usize {
        self.dimension()
    }

    fn zero_like(&self) -> Self {
        Poly::zero(self.dimension(), &self.q)
    }

    fn add_elem(&self, rhs: &Self) -> Self {
        self.zip(rhs, |a, b| a + b)
    }

    fn sub_elem(&self, rhs: &Self) -> Self {
        self.zip(rhs, |a, b| a - b)
    }

    fn neg_elem(&self) -> Self {
        self.map(|c| -c)
    }

    fn mul_elem(&self, rhs: &Self) -> Self {
        self.negacyclic_mul(rhs)
    }

    fn mul_small(&self, k: i64) -> Self {
        let k = BigInt::from(k);
        self.map(|c| c * &k)
    }
}

impl Add for &Poly {
    type Output = Poly;

    fn add(self, rhs: &Poly) -> Poly {
        self.add_elem(rhs)
    }
}

impl Sub for &Poly {
    type Output = Poly;

    fn sub(self, rhs: &Poly) -> Poly {
        self.sub_elem(rhs)
    }
}

impl Mul for &Poly {
    type Output = Poly;

    fn mul(self, rhs: &Poly) -> Poly {
        self.mul_elem(rhs)
    }
}

impl Neg for &Poly {
    type Output = Poly;

    fn neg(self) -> Poly {
        self.neg_elem()
    }
}

impl AddAssign<&Poly> for Poly {
    fn add_assign(&mut self, rhs: &Poly) {
        *self = self.add_elem(rhs);
    }
}

impl SubAssign<&Poly> for Poly {
    fn sub_assign(&mut self, rhs: &Poly) {
        *self = self.sub_elem(rhs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn q() -> BigInt {
        BigInt::from(1_000_003u64) * BigInt::from(998_244_353u64)
    }

    /// Full convolution, then fold the upper n−1 terms with a sign flip.
    fn brute_force_product(a: &Poly, b: &Poly) -> Poly {
        let n = a.dimension();
        let mut full = vec![BigInt::zero(); 2 * n - 1];
        for i in 0..n {
            for j in 0..n {
                full[i + j] += a.coeff(i) * b.coeff(j);
            }
        }
        let mut folded = vec![BigInt::zero(); n];
        for (k, c) in full.into_iter().enumerate() {
            if k < n {
                folded[k] += c;
            } else {
                folded[k - n] -= c;
            }
        }
        let modulus = a.modulus().clone();
        Poly {
            coeffs: folded.iter().map(|c| center(c, &modulus)).collect(),
            q: modulus,
        }
    }

    #[test]
    fn test_multiplication_matches_brute_force() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let q = q();
        for n in [1usize, 2, 4, 8, 16] {
            for _ in 0..8 {
                let a = Poly::random(n, &q, &mut rng);
                let b = Poly::random(n, &q, &mut rng);
                assert_eq!(&a * &b, brute_force_product(&a, &b), "n = {}", n);
            }
        }
    }

    #[test]
    fn test_high_degree_terms_fold_with_sign() {
        let q = BigInt::from(97);
        // 1 + 2x^4 + 3x^9 in Z[x]/(x^4+1): x^4 = −1, x^9 = x
        let p = Poly::from_i64s(&[1, 0, 0, 0, 2, 0, 0, 0, 0, 3], 4, &q);
        assert_eq!(p, Poly::from_i64s(&[-1, 3], 4, &q));
    }

    #[test]
    fn test_signed_range() {
        let q = BigInt::from(17);
        let p = Poly::from_i64s(&[8, 9, -9, 17], 4, &q);
        let expected: Vec<BigInt> = [8, -8, 8, 0].iter().map(|&v| BigInt::from(v)).collect();
        assert_eq!(p.coeffs(), expected.as_slice());
    }

    #[test]
    fn test_monomial_mul_rotates_negacyclically() {
        let q = BigInt::from(97);
        let p = Poly::from_i64s(&[1, 2, 3, 4], 4, &q);
        assert_eq!(p.monomial_mul(1), Poly::from_i64s(&[-4, 1, 2, 3], 4, &q));
        assert_eq!(p.monomial_mul(4), -&p);
        assert_eq!(p.monomial_mul(8), p);
        assert_eq!(p.monomial_mul(3), &p * &Poly::monomial(3, 4, &q));
    }

    #[test]
    fn test_automorphism() {
        let q = BigInt::from(97);
        // X → X^3 in Z[X]/(X^4+1): X^2 → X^6 = −X^2, X^3 → X^9 = X
        let p = Poly::from_i64s(&[1, 2, 3, 4], 4, &q);
        assert_eq!(p.automorphism(3), Poly::from_i64s(&[1, 4, -3, 2], 4, &q));
        assert_eq!(p.automorphism(1), p);

        // τ_g is a ring homomorphism
        let a = Poly::from_i64s(&[3, -1, 0, 5], 4, &q);
        let b = Poly::from_i64s(&[0, 2, 7, -2], 4, &q);
        assert_eq!((&a * &b).automorphism(5), &a.automorphism(5) * &b.automorphism(5));
    }

    #[test]
    fn test_reduce_to_divisor_and_lift() {
        let big = BigInt::from(97 * 89);
        let small = BigInt::from(97);
        let p = Poly::from_i64s(&[100, -3, 48, -200], 4, &big);

        let reduced = p.reduce_to(&small);
        assert_eq!(reduced, Poly::from_i64s(&[3, -3, 48, -6], 4, &small));

        let lifted = reduced.reduce_to(&big);
        assert_eq!(lifted.coeffs(), reduced.coeffs());
    }

    #[test]
    fn test_scale_round() {
        let q = BigInt::from(1000);
        let p = Poly::from_i64s(&[250, -250, 499, 7], 4, &q);
        let scaled = p.scale_round(&BigInt::from(1), &BigInt::from(10), &BigInt::from(100));
        assert_eq!(scaled, Poly::from_i64s(&[25, -25, 50, 1], 4, &BigInt::from(100)));
    }

    #[test]
    fn test_compatibility_errors() {
        let a = Poly::zero(4, &BigInt::from(97));
        let b = Poly::zero(8, &BigInt::from(97));
        let c = Poly::zero(4, &BigInt::from(89));
        assert!(matches!(
            a.check_compatible(&b),
            Err(FheError::DimensionMismatch { left: 4, right: 8 })
        ));
        assert!(matches!(
            a.check_compatible(&c),
            Err(FheError::ModulusMismatch(_))
        ));
        assert!(a.check_compatible(&a.clone()).is_ok());
    }

    #[test]
    fn test_inf_norm_and_mod_small() {
        let q = BigInt::from(97);
        let p = Poly::from_i64s(&[5, -40, 3, 0], 4, &q);
        assert_eq!(p.inf_norm(), BigInt::from(40));
        assert_eq!(p.mod_small(17), vec![5, 11, 3, 0]);
    }
}
