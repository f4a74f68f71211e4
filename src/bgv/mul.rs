//! Homomorphic multiplication with relinearization

use crate::error::Result;
use crate::ks::{relinearize, KeySwitchKey};
use crate::rlwe::RlweCipher;

/// Degree-2 product of two ciphertexts, relinearized back to degree 1.
///
/// ```text
/// d0 = A1·A2,  d1 = A1·B2 + B1·A2,  d2 = B1·B2
/// (A1 − sB1)(A2 − sB2) = d0 − s·d1 + s²·d2
/// ```
///
/// d2 is folded in with the relinearization key at P·Q (the next modulus
/// up) and the result is rescaled by P, so it stays at the input level.
/// Callers switch down afterwards to shed the product noise.
pub fn mul_relin(lhs: &RlweCipher, rhs: &RlweCipher, rlk: &KeySwitchKey) -> Result<RlweCipher> {
    lhs.check_compatible(rhs)?;

    let (a1, b1) = (lhs.a(), lhs.b());
    let (a2, b2) = (rhs.a(), rhs.b());
    let d0 = a1 * a2;
    let d1 = &(a1 * b2) + &(b1 * a2);
    let d2 = b1 * b2;

    let pair = relinearize(d0, d1, &d2, rlk, lhs.plaintext_modulus());
    Ok(RlweCipher::from_pair(pair, lhs.level(), lhs.chain()))
}
