//! Galois automorphisms for RLWE
//!
//! Galois automorphisms τ_g: R → R are ring automorphisms defined by
//! τ_g(X) = X^g for g ∈ Z_{2n}^*.
//!
//! Repacking only needs the chain of elements g_ℓ = 2^ℓ + 1, ℓ = 1..log n:
//! at tree level ℓ, τ_{g_ℓ} fixes X^{n/2^(ℓ−1)} and negates X^{n/2^ℓ}, which
//! is what lets two half-packed ciphertexts be merged.

/// Galois elements used by repacking, one per tree level: 3, 5, 9, ..., n + 1
pub fn packing_galois_elements(n: usize) -> Vec<usize> {
    debug_assert!(n.is_power_of_two(), "n must be a power of 2");
    let log_n = n.trailing_zeros() as usize;
    (1..=log_n).map(|l| (1 << l) + 1).collect()
}

/// Compute the order of g in (Z/2nZ)^*, or `None` if g is not a unit
pub fn automorphism_order(g: usize, n: usize) -> Option<usize> {
    if !is_valid_galois_element(g, n) {
        return None;
    }
    let two_n = 2 * n;
    let mut val = g % two_n;
    let mut order = 1;
    while val != 1 {
        val = (val * g) % two_n;
        order += 1;
    }
    Some(order)
}

/// Check if g is a valid Galois element (odd and coprime to 2n)
pub fn is_valid_galois_element(g: usize, n: usize) -> bool {
    g % 2 == 1 && g < 2 * n && gcd(g, 2 * n) == 1
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}
