//! Key-switching module
//!
//! Transforms a ciphertext whose phase involves some other secret s_from
//! (s² after multiplication, τ_g(s) after an automorphism) into a
//! ciphertext under s.
//!
//! # Special modulus
//!
//! Keys encrypt P·s_from at P·Q_boot. To switch a ciphertext at modulus M
//! the operands are lifted to P·M, combined with the key, and the result
//! is rescaled by P. The key noise is divided by P on the way down, so a
//! single undecomposed key row suffices as long as P exceeds Q_boot.
//!
//! ```text
//! switch(ct, d) = rescale_P( P·ct + d·K )     phase: ct + d·s_from
//! ```

mod setup;
mod switch;

pub use setup::{generate_galois_key, generate_relin_key, KeySwitchKey};
pub use switch::{automorphism_switch, relinearize, switch_key};
