//! Mathematical primitives for the ring R_q = Z_q[X]/(X^n + 1).
//!
//! - **Modular arithmetic** over word-sized primes and prime search
//! - **Exact polynomials** with big-integer coefficients in (−q/2, q/2]
//! - **NTT / RNS** point-value form over a list of primes, with CRT recomposition
//! - **Sampling** of ternary, Gaussian and uniform coefficients
//!
//! `Poly` and `NttPoly` share the `RingArithmetic` trait, so ciphertext code
//! is written once for both.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use rlwe_bool::math::{modular::primes_congruent_one, Poly, RingArithmetic, RnsContext};
//!
//! let primes = primes_congruent_one(32, 30, 2).unwrap();
//! let ctx = Arc::new(RnsContext::new(16, &primes).unwrap());
//! let a = Poly::from_i64s(&[1, 2, 3], 16, ctx.modulus());
//! let b = Poly::from_i64s(&[0, -1], 16, ctx.modulus());
//!
//! let fast = ctx.to_ntt(&a).unwrap().mul_elem(&ctx.to_ntt(&b).unwrap());
//! assert_eq!(fast.to_poly(), &a * &b);
//! ```

pub mod arith;
pub mod crt;
pub mod modular;
pub mod ntt;
pub mod poly;
pub mod rns;
pub mod sampler;

pub use arith::RingArithmetic;
pub use crt::CrtTable;
pub use modular::ModQ;
pub use ntt::NttContext;
pub use poly::Poly;
pub use rns::{NttPoly, RnsContext};
pub use sampler::GaussianSampler;
