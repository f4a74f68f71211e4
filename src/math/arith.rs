//! Arithmetic shared by the two ring-element representations.
//!
//! `Poly` (exact coefficients modulo a big modulus) and `NttPoly` (point
//! values modulo each prime of an RNS basis) both implement this trait, so
//! ciphertext-level code such as `CipherPair` is written once.

/// Ring operations over R_q = Z_q[X]/(X^n + 1)
pub trait RingArithmetic: Clone {
    /// Ring degree n
    fn ring_dim(&self) -> usize;

    /// Additive identity with the same degree and modulus
    fn zero_like(&self) -> Self;

    fn add_elem(&self, rhs: &Self) -> Self;

    fn sub_elem(&self, rhs: &Self) -> Self;

    fn neg_elem(&self) -> Self;

    /// Negacyclic product
    fn mul_elem(&self, rhs: &Self) -> Self;

    /// Multiply by a small signed integer
    fn mul_small(&self, k: i64) -> Self;
}
