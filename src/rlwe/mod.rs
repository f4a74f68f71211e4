//! RLWE ciphertext algebra over R_q = Z_q[X]/(X^n + 1).
//!
//! # Overview
//!
//! - Secret key s is a ternary polynomial
//! - Ciphertext (A, B) encrypts m with phase A − s·B = m + t·e (mod q)
//! - The plaintext is the phase reduced mod t
//!
//! `RlweCipher` carries its level in the modulus chain and refuses to
//! combine with ciphertexts at another level or from another chain.
//! `CipherPair` is the bare pair used inside key switching and
//! bootstrapping, over either ring representation.
//!
//! # Galois Automorphisms
//!
//! τ_g(X) = X^g maps a ciphertext under s to one under τ_g(s); repacking
//! uses g = 2^ℓ + 1 followed by a key switch back to s.

mod galois;
mod types;

pub use galois::{automorphism_order, is_valid_galois_element, packing_galois_elements};
pub use types::{CipherPair, RlweCipher};
