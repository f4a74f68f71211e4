//! Boundary with the plain LWE ("Regev") scheme.
//!
//! Only the two conversions live here: extracting the constant coefficient
//! of a ring ciphertext as a Regev sample, and embedding a Regev sample back
//! into the ring. Both use the ring secret's coefficient vector as the
//! Regev secret.
//!
//! # Example
//!
//! ```
//! use rlwe_bool::lwe::{from_regev, to_regev};
//! use rlwe_bool::params::FheParams;
//! use rlwe_bool::FheEngine;
//!
//! let engine = FheEngine::new(FheParams::new(8, 17, 2, false)).unwrap();
//! let ct = engine.encrypt_bit(1).unwrap();
//! let sample = to_regev(&ct);
//! let back = from_regev(&sample, engine.chain()).unwrap();
//! assert_eq!(engine.decrypt_bit(&back).unwrap(), 1);
//! ```

mod convert;
mod types;

pub use convert::{from_regev, to_regev};
pub use types::RegevCipher;
