//! Boolean gates over the {0, h} encoding.
//!
//! With h = (t−1)/2 ≡ −1/2 (mod t):
//!
//! ```text
//! NOT(c)    = h − c
//! AND(a, b) = h⁻¹ · (a·b)      h²·x·y · h⁻¹ = h·x·y, and h⁻¹ ≡ −2
//! ```
//!
//! followed by one switch down. The other gates come from NOT and AND, so
//! OR, NAND and NOR cost one level and XOR = AND(OR, NAND) costs two.
//!
//! Operands at different levels are switched down to the lower one. When
//! fewer levels remain than a gate needs, the operands are refreshed if
//! bootstrapping is on; otherwise the gate fails with `LevelsExhausted`.

use num_bigint::BigInt;
use rayon::prelude::*;
use tracing::debug;

use crate::engine::FheEngine;
use crate::error::{FheError, Result};
use crate::math::Poly;
use crate::rlwe::RlweCipher;

/// Levels consumed by AND, OR, NAND and NOR
const AND_DEPTH: usize = 1;
/// Levels consumed by XOR
const XOR_DEPTH: usize = 2;

impl FheEngine {
    /// Bring operands to a common level with at least `depth` levels left
    fn prepare(&self, operands: &[&RlweCipher], depth: usize) -> Result<Vec<RlweCipher>> {
        for ct in operands {
            self.check_owned(ct)?;
        }
        let level = operands.iter().map(|ct| ct.level()).min().unwrap_or(0);
        let aligned = operands
            .iter()
            .map(|ct| ct.mod_switch_to(level))
            .collect::<Result<Vec<_>>>()?;

        if level >= depth {
            return Ok(aligned);
        }
        if !self.bootstrapping_enabled() {
            return Err(FheError::LevelsExhausted {
                needed: depth,
                available: level,
            });
        }
        let top = self.top_level();
        if top < depth {
            return Err(FheError::LevelsExhausted {
                needed: depth,
                available: top,
            });
        }
        debug!(level, depth, "refreshing gate operands");
        aligned.iter().map(|ct| self.refresh(ct)).collect()
    }

    /// h − c; free of noise and levels
    pub fn not(&self, a: &RlweCipher) -> Result<RlweCipher> {
        self.check_owned(a)?;
        let t = BigInt::from(self.plaintext_modulus());
        let h = Poly::constant(&BigInt::from(self.bit_scale()), self.ring_dim(), &t);
        a.neg().add_plain(&h)
    }

    pub fn and(&self, a: &RlweCipher, b: &RlweCipher) -> Result<RlweCipher> {
        let ops = self.prepare(&[a, b], AND_DEPTH)?;
        let product = self.mul_relin(&ops[0], &ops[1])?;
        product
            .scalar_div(self.bit_scale() as i64)?
            .mod_switch_down()
    }

    pub fn nand(&self, a: &RlweCipher, b: &RlweCipher) -> Result<RlweCipher> {
        self.not(&self.and(a, b)?)
    }

    pub fn or(&self, a: &RlweCipher, b: &RlweCipher) -> Result<RlweCipher> {
        self.not(&self.nor(a, b)?)
    }

    pub fn nor(&self, a: &RlweCipher, b: &RlweCipher) -> Result<RlweCipher> {
        self.and(&self.not(a)?, &self.not(b)?)
    }

    /// AND(OR(a, b), NAND(a, b))
    pub fn xor(&self, a: &RlweCipher, b: &RlweCipher) -> Result<RlweCipher> {
        let ops = self.prepare(&[a, b], XOR_DEPTH)?;
        let either = self.or(&ops[0], &ops[1])?;
        let not_both = self.nand(&ops[0], &ops[1])?;
        self.and(&either, &not_both)
    }

    /// Pairwise reduction in a balanced tree, pairs evaluated in parallel
    fn reduce_many<F>(&self, inputs: &[RlweCipher], gate: F) -> Result<RlweCipher>
    where
        F: Fn(&Self, &RlweCipher, &RlweCipher) -> Result<RlweCipher> + Sync,
    {
        if inputs.is_empty() {
            return Err(FheError::InvalidPlaintext("gate needs at least one input".into()));
        }
        let mut layer = inputs.to_vec();
        while layer.len() > 1 {
            layer = layer
                .par_chunks(2)
                .map(|pair| match pair {
                    [x, y] => gate(self, x, y),
                    _ => Ok(pair[0].clone()),
                })
                .collect::<Result<Vec<_>>>()?;
        }
        layer
            .pop()
            .ok_or_else(|| FheError::InvalidPlaintext("gate needs at least one input".into()))
    }

    pub fn and_many(&self, inputs: &[RlweCipher]) -> Result<RlweCipher> {
        self.reduce_many(inputs, Self::and)
    }

    pub fn or_many(&self, inputs: &[RlweCipher]) -> Result<RlweCipher> {
        self.reduce_many(inputs, Self::or)
    }

    pub fn xor_many(&self, inputs: &[RlweCipher]) -> Result<RlweCipher> {
        self.reduce_many(inputs, Self::xor)
    }

    /// Ripple-carry addition of two little-endian bit vectors, modulo 2^width.
    ///
    /// Each position first bootstraps its operands and the incoming carry
    /// (a no-op above level 0), then
    ///
    /// ```text
    /// p = a ⊕ b,   sum = p ⊕ carry,   carry' = (a ∧ b) ∨ (carry ∧ p)
    /// ```
    pub fn add(&self, a: &[RlweCipher], b: &[RlweCipher]) -> Result<Vec<RlweCipher>> {
        if a.len() != b.len() {
            return Err(FheError::InvalidPlaintext(format!(
                "operand widths differ: {} vs {}",
                a.len(),
                b.len()
            )));
        }

        let mut carry = self.encrypt_bit(0)?;
        let mut sum = Vec::with_capacity(a.len());
        for (i, (ai, bi)) in a.iter().zip(b).enumerate() {
            let ai = self.bootstrap(ai)?;
            let bi = self.bootstrap(bi)?;
            carry = self.bootstrap(&carry)?;

            let p = self.xor(&ai, &bi)?;
            sum.push(self.xor(&p, &carry)?);
            carry = self.or(&self.and(&ai, &bi)?, &self.and(&carry, &p)?)?;
            debug!(bit = i, carry_level = carry.level(), "adder position done");
        }
        Ok(sum)
    }
}
