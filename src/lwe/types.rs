//! Regev sample type

use num_bigint::BigInt;

use crate::math::modular::center;

/// Plain LWE sample (a, b) over Z_q with phase b − ⟨a, s⟩.
///
/// Components are kept centered in (−q/2, q/2].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegevCipher {
    /// Random vector in Z_q^n
    pub a: Vec<BigInt>,
    /// Scalar in Z_q
    pub b: BigInt,
    /// Ciphertext modulus
    pub modulus: BigInt,
}

impl RegevCipher {
    pub fn new(a: Vec<BigInt>, b: BigInt, modulus: BigInt) -> Self {
        let a = a.iter().map(|x| center(x, &modulus)).collect();
        let b = center(&b, &modulus);
        Self { a, b, modulus }
    }

    pub fn dimension(&self) -> usize {
        self.a.len()
    }

    /// b − ⟨a, s⟩ in (−q/2, q/2] for a small secret vector
    pub fn phase(&self, s: &[i64]) -> BigInt {
        let dot: BigInt = self
            .a
            .iter()
            .zip(s)
            .map(|(a, &sj)| a * sj)
            .sum();
        center(&(&self.b - dot), &self.modulus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_centers_components() {
        let q = BigInt::from(17);
        let ct = RegevCipher::new(vec![BigInt::from(16), BigInt::from(-20)], BigInt::from(9), q);
        assert_eq!(ct.a, vec![BigInt::from(-1), BigInt::from(-3)]);
        assert_eq!(ct.b, BigInt::from(-8));
        assert_eq!(ct.dimension(), 2);
    }

    #[test]
    fn test_phase() {
        let q = BigInt::from(97);
        let ct = RegevCipher::new(vec![BigInt::from(5), BigInt::from(7)], BigInt::from(30), q);
        // 30 − (5·1 + 7·(−1)) = 32
        assert_eq!(ct.phase(&[1, -1]), BigInt::from(32));
    }
}
