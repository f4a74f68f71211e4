//! Modulus switching (rescale) that keeps the plaintext intact.
//!
//! # Theory
//!
//! To move a coefficient c from modulus q to a divisor q' = q/d, the naive
//! rescale is
//!
//! ```text
//! c̃ = round(c · q' / q)
//! ```
//!
//! which changes c mod t and corrupts the message. Instead the result is
//! corrected to the representative congruent to c:
//!
//! ```text
//! c' = c̃ + [c − c̃]_t          ([x]_t centered in (−t/2, t/2])
//! ```
//!
//! so that c' ≡ c (mod t) and c'·d − c is bounded by d·(t + 1)/2. When
//! d ≡ 1 (mod t), the phase A' − s·B' equals (A − s·B)/d up to a noise term
//! of (1 + ‖s‖₁)·(t + 1)/2 and is still ≡ m (mod t).
//!
//! The same routine serves level-to-level switching, the final division by
//! the extension primes after bootstrapping, and the division by P that
//! ends every key switch.

use num_bigint::BigInt;

use crate::math::modular::{center, div_round};
use crate::math::Poly;

/// Rescale a single coefficient from `from` to `to`, preserving it mod t
pub fn rescale_coeff(c: &BigInt, from: &BigInt, to: &BigInt, t: &BigInt) -> BigInt {
    let naive = div_round(&(c * to), from);
    let correction = center(&(c - &naive), t);
    center(&(naive + correction), to)
}

/// Rescale every coefficient of `poly` to modulus `to`.
///
/// `to` must divide the current modulus with a quotient ≡ 1 (mod t).
pub fn rescale(poly: &Poly, to: &BigInt, t: u64) -> Poly {
    let from = poly.modulus();
    debug_assert!((from % to) == BigInt::from(0), "target modulus must divide the source");
    let t = BigInt::from(t);
    let coeffs = poly
        .coeffs()
        .iter()
        .map(|c| rescale_coeff(c, from, to, &t))
        .collect();
    Poly::from_coeffs(coeffs, poly.dimension(), to)
}
