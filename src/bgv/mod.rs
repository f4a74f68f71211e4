//! BGV primitives over the modulus chain.
//!
//! Plaintexts live in R_t; a ciphertext (A, B) at level i satisfies
//!
//! ```text
//! A − s·B = m + t·e   (mod Q_i)
//! ```
//!
//! Noise is a multiple of t, so reducing the phase mod t recovers m as long
//! as |m + t·e| < Q_i/2. Multiplication squares the noise; switching down a
//! level divides it by the dropped prime.

pub mod enc;
pub mod keys;
pub mod mul;

pub use enc::{decrypt, encrypt, encrypt_noiseless, errors, phase};
pub use keys::{PublicKey, SecretKey};
pub use mul::mul_relin;
