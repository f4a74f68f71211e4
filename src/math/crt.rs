//! CRT (Chinese Remainder Theorem) tables for an RNS basis.
//!
//! x = Σ r_i · (Q/p_i) · ((Q/p_i)^(−1) mod p_i)  (mod Q)

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{ToPrimitive, Zero};

use crate::error::{FheError, Result};

use super::modular::{product, ModQ};

/// Residue of an arbitrary integer modulo a word-sized prime, in [0, p)
#[inline]
pub fn residue(x: &BigInt, p: u64) -> u64 {
    x.mod_floor(&BigInt::from(p)).to_u64().unwrap_or_default()
}

/// Recomposition table for a fixed list of pairwise coprime moduli
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrtTable {
    moduli: Vec<u64>,
    modulus: BigInt,
    /// (Q/p_i) · ((Q/p_i)^(−1) mod p_i)
    lifts: Vec<BigInt>,
}

impl CrtTable {
    /// Build the table. Fails with `NotInvertible` if two moduli share a factor.
    pub fn new(moduli: &[u64]) -> Result<Self> {
        if moduli.is_empty() {
            return Err(FheError::InvalidModulusChain("empty CRT basis".into()));
        }
        let modulus = product(moduli);
        let lifts = moduli
            .iter()
            .map(|&p| {
                let cofactor = &modulus / BigInt::from(p);
                let inv = ModQ::inverse(residue(&cofactor, p), p)?;
                Ok(cofactor * BigInt::from(inv))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            moduli: moduli.to_vec(),
            modulus,
            lifts,
        })
    }

    /// Q = Π p_i
    pub fn modulus(&self) -> &BigInt {
        &self.modulus
    }

    /// The primes p_i
    pub fn moduli(&self) -> &[u64] {
        &self.moduli
    }

    /// Value in [0, Q) with the given residues (one per modulus, in order)
    pub fn compose(&self, residues: &[u64]) -> BigInt {
        debug_assert_eq!(residues.len(), self.moduli.len());
        let mut acc = BigInt::zero();
        for (r, lift) in residues.iter().zip(self.lifts.iter()) {
            acc += lift * BigInt::from(*r);
        }
        acc.mod_floor(&self.modulus)
    }

    /// Residues of `x` modulo every p_i
    pub fn decompose(&self, x: &BigInt) -> Vec<u64> {
        self.moduli.iter().map(|&p| residue(x, p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_decompose_roundtrip() {
        let table = CrtTable::new(&[97, 193, 257]).unwrap();
        assert_eq!(table.modulus(), &BigInt::from(97u64 * 193 * 257));

        for x in [0i64, 1, 12345, 97 * 193 * 257 - 1] {
            let x = BigInt::from(x);
            let residues = table.decompose(&x);
            assert_eq!(table.compose(&residues), x);
        }
    }

    #[test]
    fn test_negative_values_wrap() {
        let table = CrtTable::new(&[97, 193]).unwrap();
        let residues = table.decompose(&BigInt::from(-1));
        assert_eq!(residues, vec![96, 192]);
        assert_eq!(table.compose(&residues), BigInt::from(97 * 193 - 1));
    }

    #[test]
    fn test_shared_factor_rejected() {
        assert!(matches!(
            CrtTable::new(&[15, 21]),
            Err(FheError::NotInvertible(_))
        ));
    }
}
