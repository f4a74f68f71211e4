//! RGSW (Ring-GSW) encryption module
//!
//! RGSW ciphertexts of the secret-key coefficients drive the blind rotation.
//!
//! # Overview
//!
//! An RGSW ciphertext encrypting m is a 2ℓ × 2 matrix where:
//! - Each row is an RLWE ciphertext (kept in NTT form)
//! - The gadget vector g = [1, B, B², ..., B^(ℓ-1)]^T allows decomposition
//!
//! # External Product
//!
//! RLWE(m₀) ⊡ RGSW(m₁) → RLWE(m₀·m₁) with noise growth independent of the
//! noise in RLWE(m₀) beyond a factor m₁, which is what keeps a chain of n
//! conditional rotations within budget.

mod external_product;
mod types;

pub use external_product::{cmux, external_product, external_product_decomposed, gadget_decompose};
pub use types::{GadgetVector, RgswCipher};
