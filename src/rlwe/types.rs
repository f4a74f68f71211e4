//! RLWE ciphertext types.
//!
//! A ciphertext (A, B) decrypts to (A − s·B) mod q, reduced mod t.

use std::sync::Arc;

use num_bigint::BigInt;

use crate::chain::ModulusChain;
use crate::error::{FheError, Result};
use crate::math::modular::{center, ModQ};
use crate::math::{NttPoly, Poly, RingArithmetic};
use crate::modulus_switch::rescale;

/// Pair (A, B) over either ring representation.
///
/// Bootstrapping keeps these at moduli outside the level chain (Q_boot,
/// P·Q); everything else wraps one in an [`RlweCipher`].
#[derive(Clone, Debug, PartialEq)]
pub struct CipherPair<E> {
    pub a: E,
    pub b: E,
}

impl<E: RingArithmetic> CipherPair<E> {
    pub fn new(a: E, b: E) -> Self {
        debug_assert_eq!(a.ring_dim(), b.ring_dim(), "Components must share a ring");
        Self { a, b }
    }

    /// Trivial encryption (m, 0): decrypts to m under any key
    pub fn trivial(m: E) -> Self {
        let b = m.zero_like();
        Self { a: m, b }
    }

    pub fn ring_dim(&self) -> usize {
        self.a.ring_dim()
    }

    pub fn add(&self, rhs: &Self) -> Self {
        Self::new(self.a.add_elem(&rhs.a), self.b.add_elem(&rhs.b))
    }

    pub fn sub(&self, rhs: &Self) -> Self {
        Self::new(self.a.sub_elem(&rhs.a), self.b.sub_elem(&rhs.b))
    }

    pub fn neg(&self) -> Self {
        Self::new(self.a.neg_elem(), self.b.neg_elem())
    }

    /// Multiply both components by a plaintext ring element
    pub fn mul_elem(&self, m: &E) -> Self {
        Self::new(self.a.mul_elem(m), self.b.mul_elem(m))
    }

    pub fn mul_small(&self, k: i64) -> Self {
        Self::new(self.a.mul_small(k), self.b.mul_small(k))
    }
}

impl CipherPair<Poly> {
    pub fn modulus(&self) -> &BigInt {
        self.a.modulus()
    }

    /// Reinterpret both components modulo `q`
    pub fn reduce_to(&self, q: &BigInt) -> Self {
        Self::new(self.a.reduce_to(q), self.b.reduce_to(q))
    }

    /// Multiply by X^k
    pub fn monomial_mul(&self, k: usize) -> Self {
        Self::new(self.a.monomial_mul(k), self.b.monomial_mul(k))
    }

    /// Apply τ_g to both components.
    ///
    /// The result decrypts under τ_g(s) and needs a key switch back to s.
    pub fn automorphism(&self, g: usize) -> Self {
        Self::new(self.a.automorphism(g), self.b.automorphism(g))
    }

    /// Divide the modulus by `from / to` keeping the phase mod t
    pub fn rescale(&self, to: &BigInt, t: u64) -> Self {
        Self::new(rescale(&self.a, to, t), rescale(&self.b, to, t))
    }
}

impl CipherPair<NttPoly> {
    pub fn to_poly(&self) -> CipherPair<Poly> {
        CipherPair::new(self.a.to_poly(), self.b.to_poly())
    }
}

/// RLWE ciphertext at one level of a modulus chain
///
/// # Example
///
/// ```
/// use rlwe_bool::FheEngine;
/// use rlwe_bool::params::FheParams;
///
/// let engine = FheEngine::new(FheParams::new(16, 17, 3, false)).unwrap();
/// let ct = engine.encrypt_bit(1).unwrap();
/// assert_eq!(ct.level(), 2);
/// let lower = ct.mod_switch_down().unwrap();
/// assert_eq!(engine.decrypt_bit(&lower).unwrap(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct RlweCipher {
    pair: CipherPair<Poly>,
    level: usize,
    chain: Arc<ModulusChain>,
}

impl RlweCipher {
    /// Wrap (A, B) at `level`; both components must be reduced modulo Q_level.
    pub fn from_parts(a: Poly, b: Poly, level: usize, chain: &Arc<ModulusChain>) -> Result<Self> {
        a.check_compatible(&b)?;
        if level > chain.top_level() {
            return Err(FheError::LevelMismatch {
                left: level,
                right: chain.top_level(),
            });
        }
        if a.dimension() != chain.ring_dim() {
            return Err(FheError::DimensionMismatch {
                left: a.dimension(),
                right: chain.ring_dim(),
            });
        }
        if a.modulus() != chain.modulus(level) {
            return Err(FheError::ModulusMismatch(format!(
                "components are not reduced modulo Q_{}",
                level
            )));
        }
        Ok(Self {
            pair: CipherPair::new(a, b),
            level,
            chain: Arc::clone(chain),
        })
    }

    pub(crate) fn from_pair(pair: CipherPair<Poly>, level: usize, chain: &Arc<ModulusChain>) -> Self {
        debug_assert_eq!(pair.modulus(), chain.modulus(level));
        Self {
            pair,
            level,
            chain: Arc::clone(chain),
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

    pub fn level(&self) -> usize {
        self.level
    }

    /// Active modulus Q_level
    pub fn modulus(&self) -> &BigInt {
        self.chain.modulus(self.level)
    }

    pub fn chain(&self) -> &Arc<ModulusChain> {
        &self.chain
    }

    pub fn ring_dim(&self) -> usize {
        self.pair.ring_dim()
    }

    pub fn plaintext_modulus(&self) -> u64 {
        self.chain.plaintext_modulus()
    }

    /// Same chain, same ring, same level
    pub fn check_compatible(&self, other: &RlweCipher) -> Result<()> {
        if self.ring_dim() != other.ring_dim() {
            return Err(FheError::DimensionMismatch {
                left: self.ring_dim(),
                right: other.ring_dim(),
            });
        }
        if !self.chain.same_as(&other.chain) {
            return Err(FheError::ModulusMismatch(
                "ciphertexts belong to different modulus chains".into(),
            ));
        }
        if self.level != other.level {
            return Err(FheError::LevelMismatch {
                left: self.level,
                right: other.level,
            });
        }
        Ok(())
    }

    fn with_pair(&self, pair: CipherPair<Poly>) -> Self {
        Self {
            pair,
            level: self.level,
            chain: Arc::clone(&self.chain),
        }
    }

    fn check_plain(&self, m: &Poly) -> Result<()> {
        if m.dimension() != self.ring_dim() {
            return Err(FheError::DimensionMismatch {
                left: self.ring_dim(),
                right: m.dimension(),
            });
        }
        Ok(())
    }

    pub fn add(&self, rhs: &RlweCipher) -> Result<Self> {
        self.check_compatible(rhs)?;
        Ok(self.with_pair(self.pair.add(&rhs.pair)))
    }

    pub fn sub(&self, rhs: &RlweCipher) -> Result<Self> {
        self.check_compatible(rhs)?;
        Ok(self.with_pair(self.pair.sub(&rhs.pair)))
    }

    pub fn neg(&self) -> Self {
        self.with_pair(self.pair.neg())
    }

    pub fn mul_small(&self, k: i64) -> Self {
        self.with_pair(self.pair.mul_small(k))
    }

    /// Multiply by an integer scalar; the noise grows by |k mod Q| so keep it small.
    pub fn scalar_mul(&self, k: &BigInt) -> Self {
        self.with_pair(CipherPair::new(
            self.pair.a.scalar_mul(k),
            self.pair.b.scalar_mul(k),
        ))
    }

    /// Multiply the plaintext by k⁻¹ mod t.
    ///
    /// Implemented as multiplication by the centered representative of
    /// k⁻¹, so the noise grows by at most t/2.
    pub fn scalar_div(&self, k: i64) -> Result<Self> {
        let t = self.plaintext_modulus();
        let inv = ModQ::inverse(ModQ::from_signed(k, t), t)?;
        let centered = center(&BigInt::from(inv), &BigInt::from(t));
        Ok(self.scalar_mul(&centered))
    }

    /// Multiply by a plaintext polynomial (coefficients read as integers)
    pub fn mul_plain(&self, m: &Poly) -> Result<Self> {
        self.check_plain(m)?;
        let m = m.reduce_to(self.modulus());
        Ok(self.with_pair(self.pair.mul_elem(&m)))
    }

    /// Add a plaintext polynomial; noise-free
    pub fn add_plain(&self, m: &Poly) -> Result<Self> {
        self.check_plain(m)?;
        let m = m.reduce_to(self.modulus());
        Ok(self.with_pair(CipherPair::new(&self.pair.a + &m, self.pair.b.clone())))
    }

    /// Rescale to the next level down.
    ///
    /// # Errors
    ///
    /// `LevelsExhausted` at level 0.
    pub fn mod_switch_down(&self) -> Result<Self> {
        if self.level == 0 {
            return Err(FheError::LevelsExhausted {
                needed: 1,
                available: 0,
            });
        }
        let target = self.level - 1;
        let pair = self
            .pair
            .rescale(self.chain.modulus(target), self.plaintext_modulus());
        Ok(Self {
            pair,
            level: target,
            chain: Arc::clone(&self.chain),
        })
    }

    /// Rescale one level at a time down to `level`
    pub fn mod_switch_to(&self, level: usize) -> Result<Self> {
        if level > self.level {
            return Err(FheError::LevelMismatch {
                left: self.level,
                right: level,
            });
        }
        let mut ct = self.clone();
        while ct.level > level {
            ct = ct.mod_switch_down()?;
        }
        Ok(ct)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::FheParams;

    fn chain() -> Arc<ModulusChain> {
        Arc::new(ModulusChain::new(&FheParams::new(8, 17, 3, false)).unwrap())
    }

    fn trivial(chain: &Arc<ModulusChain>, values: &[i64], level: usize) -> RlweCipher {
        let m = Poly::from_i64s(values, 8, chain.modulus(level));
        let zero = Poly::zero(8, chain.modulus(level));
        RlweCipher::from_parts(m, zero, level, chain).unwrap()
    }

    #[test]
    fn test_from_parts_checks_modulus() {
        let chain = chain();
        let a = Poly::zero(8, chain.modulus(1));
        let b = Poly::zero(8, chain.modulus(1));
        assert!(RlweCipher::from_parts(a.clone(), b.clone(), 1, &chain).is_ok());
        assert!(matches!(
            RlweCipher::from_parts(a, b, 2, &chain),
            Err(FheError::ModulusMismatch(_))
        ));
    }

    #[test]
    fn test_level_mismatch_rejected() {
        let chain = chain();
        let x = trivial(&chain, &[1], 2);
        let y = trivial(&chain, &[1], 1);
        assert_eq!(
            x.add(&y).unwrap_err(),
            FheError::LevelMismatch { left: 2, right: 1 }
        );
    }

    #[test]
    fn test_foreign_chain_rejected() {
        let x = trivial(&chain(), &[1], 0);
        let other = Arc::new(ModulusChain::new(&FheParams::new(8, 41, 3, false)).unwrap());
        let y = trivial(&other, &[1], 0);
        assert!(matches!(x.add(&y), Err(FheError::ModulusMismatch(_))));
    }

    #[test]
    fn test_trivial_algebra() {
        let chain = chain();
        let x = trivial(&chain, &[1, 2], 2);
        let y = trivial(&chain, &[3, 0, 5], 2);
        let sum = x.add(&y).unwrap();
        assert_eq!(sum.a(), &Poly::from_i64s(&[4, 2, 5], 8, chain.modulus(2)));

        let prod = x.mul_plain(&Poly::from_i64s(&[0, 1], 8, &BigInt::from(17))).unwrap();
        assert_eq!(prod.a(), &Poly::from_i64s(&[0, 1, 2], 8, chain.modulus(2)));
        assert!(prod.b().is_zero());
    }

    #[test]
    fn test_scalar_div() {
        let chain = chain();
        let x = trivial(&chain, &[8], 0);
        // 8 · (8⁻¹ mod 17) ≡ 1
        let y = x.scalar_div(8).unwrap();
        let c = y.a().coeff(0).clone();
        assert_eq!(crate::math::modular::center(&c, &BigInt::from(17)), BigInt::from(1));

        assert!(matches!(x.scalar_div(34), Err(FheError::NotInvertible(_))));
    }

    #[test]
    fn test_mod_switch_bounds() {
        let chain = chain();
        let x = trivial(&chain, &[5], 0);
        assert!(matches!(
            x.mod_switch_down(),
            Err(FheError::LevelsExhausted { .. })
        ));
        assert!(matches!(
            x.mod_switch_to(1),
            Err(FheError::LevelMismatch { .. })
        ));
        let top = trivial(&chain, &[5], 2);
        assert_eq!(top.mod_switch_to(0).unwrap().level(), 0);
    }
}
