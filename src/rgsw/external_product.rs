//! External product operation: RLWE × RGSW → RLWE
//!
//! The blind rotation runs one CMux per secret coefficient, each made of two
//! external products that share a single gadget decomposition.

use std::sync::Arc;

use crate::math::{NttPoly, RingArithmetic, RnsContext};
use crate::rlwe::CipherPair;

use super::types::{GadgetVector, RgswCipher};

/// Gadget digits of both components of an NTT-form ciphertext, themselves
/// in NTT form: `[a_0 .. a_{ℓ-1}, b_0 .. b_{ℓ-1}]`.
pub fn gadget_decompose(
    ct: &CipherPair<NttPoly>,
    gadget: &GadgetVector,
    rns: &Arc<RnsContext>,
) -> Vec<NttPoly> {
    let exact = ct.to_poly();
    gadget
        .decompose(&exact.a)
        .into_iter()
        .chain(gadget.decompose(&exact.b))
        .map(|digits| rns.small_to_ntt(&digits))
        .collect()
}

/// Σ_k digit_k · Row_k over precomputed digits
pub fn external_product_decomposed(digits: &[NttPoly], rgsw: &RgswCipher) -> CipherPair<NttPoly> {
    assert_eq!(digits.len(), rgsw.rows.len(), "RGSW must have 2ℓ rows");

    let zero = rgsw.rows[0].a.zero_like();
    digits
        .iter()
        .zip(rgsw.rows.iter())
        .fold(CipherPair::new(zero.clone(), zero), |acc, (d, row)| {
            acc.add(&row.mul_elem(d))
        })
}

/// Compute the external product: RLWE(m₀) ⊡ RGSW(m₁) → RLWE(m₀·m₁)
///
/// # Algorithm
///
/// Given RLWE ciphertext (a, b) and RGSW ciphertext C:
/// 1. Decompose a and b using gadget inverse: g⁻¹(a), g⁻¹(b)
/// 2. Compute: (a', b') = Σᵢ [g⁻¹(a)ᵢ · C[i] + g⁻¹(b)ᵢ · C[ℓ+i]]
///
/// The phase is m₁·(a − s·b) = m₁·m₀ plus Σ digits·t·e, still a multiple
/// of t.
pub fn external_product(
    rlwe: &CipherPair<NttPoly>,
    rgsw: &RgswCipher,
    rns: &Arc<RnsContext>,
) -> CipherPair<NttPoly> {
    let digits = gadget_decompose(rlwe, &rgsw.gadget, rns);
    external_product_decomposed(&digits, rgsw)
}

/// Conditional rotation selected by an encrypted ternary value.
///
/// With `plus` encrypting [s_j = 1] and `minus` encrypting [s_j = −1]:
///
/// ```text
/// ACC + (X^{−α} − 1)·(ACC ⊡ plus) + (X^{α} − 1)·(ACC ⊡ minus)  =  ACC · X^{−α·s_j}
/// ```
///
/// `rot_neg` and `rot_pos` are X^{−α} − 1 and X^{α} − 1 in NTT form.
pub fn cmux(
    acc: &CipherPair<NttPoly>,
    plus: &RgswCipher,
    minus: &RgswCipher,
    rot_neg: &NttPoly,
    rot_pos: &NttPoly,
    rns: &Arc<RnsContext>,
) -> CipherPair<NttPoly> {
    let digits = gadget_decompose(acc, &plus.gadget, rns);
    let up = external_product_decomposed(&digits, plus).mul_elem(rot_neg);
    let down = external_product_decomposed(&digits, minus).mul_elem(rot_pos);
    acc.add(&up).add(&down)
}
