//! rlwe-bool: leveled BGV over Z[x]/(x^n+1) with Boolean gates and bootstrapping
//!
//! Bits are encoded as 0 and h = (t−1)/2 in the constant coefficient of a
//! BGV plaintext. Gates consume levels of a modulus chain; once a
//! ciphertext reaches the bottom, blind rotation and automorphism repacking
//! bring it back to the top so gate circuits of any depth can run.
//!
//! Key components:
//! - `math`: exact polynomials, NTT/RNS point-value form, sampling
//! - `rlwe`, `bgv`, `ks`: ciphertexts, keys, multiplication and key switching
//! - `rgsw`, `bootstrap`: gadget ciphertexts and the refresh pipeline
//! - `engine`, `gates`: the engine instance and the gate surface

pub mod bgv;
pub mod bootstrap;
pub mod chain;
pub mod engine;
pub mod error;
mod gates;
pub mod ks;
pub mod lwe;
pub mod math;
pub mod modulus_switch;
pub mod params;
pub mod rgsw;
pub mod rlwe;

pub use engine::FheEngine;
pub use error::{FheError, Result};
pub use params::FheParams;
pub use rlwe::RlweCipher;
