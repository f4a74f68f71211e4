//! Key-switching operation

use crate::math::Poly;
use crate::rlwe::CipherPair;

use super::setup::KeySwitchKey;

/// Add d·s_from to the phase of `ct`, using key K for s_from.
///
/// # Algorithm
///
/// With M the modulus of `ct` and P the special modulus:
///
/// 1. Lift to P·M: (P·a + d·K.a, P·b + d·K.b)
/// 2. Rescale by P back to M, keeping the phase mod t
///
/// The phase after step 1 is P·(a − s·b) + P·d·s_from + t·d·e; dividing by P
/// leaves (a − s·b) + d·s_from plus t·d·e/P and the rounding noise.
pub fn switch_key(ct: &CipherPair<Poly>, d: &Poly, key: &KeySwitchKey, t: u64) -> CipherPair<Poly> {
    let m = ct.modulus().clone();
    let k = key.at(&m);
    let pm = k.modulus().clone();
    let p = key.special_modulus();

    let d = d.reduce_to(&pm);
    let a = &ct.a.reduce_to(&pm).scalar_mul(p) + &(&d * &k.a);
    let b = &ct.b.reduce_to(&pm).scalar_mul(p) + &(&d * &k.b);

    CipherPair::new(a, b).rescale(&m, t)
}

/// Relinearize a degree-2 ciphertext (d0, d1, d2) with phase d0 − s·d1 + s²·d2
pub fn relinearize(d0: Poly, d1: Poly, d2: &Poly, rlk: &KeySwitchKey, t: u64) -> CipherPair<Poly> {
    switch_key(&CipherPair::new(d0, d1), d2, rlk, t)
}

/// τ_g(ct) followed by a switch from τ_g(s) back to s
pub fn automorphism_switch(ct: &CipherPair<Poly>, g: usize, key: &KeySwitchKey, t: u64) -> CipherPair<Poly> {
    let twisted = ct.automorphism(g);
    // phase τA − τ(s)·τB = (τA, 0) + (−τB)·τ(s)
    let head = CipherPair::new(twisted.a, Poly::zero(ct.ring_dim(), ct.modulus()));
    switch_key(&head, &-&twisted.b, key, t)
}
