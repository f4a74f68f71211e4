//! Automorphism tree packing of n constant-coefficient ciphertexts.
//!
//! Level ℓ (1..=log n) pairs ct[r] with ct[r + n/2^ℓ]:
//!
//! ```text
//! y = X^{n/2^ℓ}
//! ct'[r] = (ct[r] + y·ct[r+step]) + τ_{2^ℓ+1}(ct[r] − y·ct[r+step])
//! ```
//!
//! τ_{2^ℓ+1} fixes the coefficients that survive and negates the rest, so
//! each level doubles the wanted coefficients and drops the others. After
//! log n levels coefficient i holds n times the constant of input i.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::trace;

use crate::error::{FheError, Result};
use crate::ks::{automorphism_switch, KeySwitchKey};
use crate::math::Poly;
use crate::rlwe::CipherPair;

/// One tree-packing step
fn combine(
    even: &CipherPair<Poly>,
    odd: &CipherPair<Poly>,
    step: usize,
    g: usize,
    key: &KeySwitchKey,
    t: u64,
) -> CipherPair<Poly> {
    let shifted = odd.monomial_mul(step);
    let sum = even.add(&shifted);
    let diff = even.sub(&shifted);
    sum.add(&automorphism_switch(&diff, g, key, t))
}

/// Pack `cts` (length n, a power of two) into one ciphertext whose
/// coefficient i carries n·(constant coefficient of cts[i]).
///
/// # Errors
///
/// `MissingGaloisKey(g)` when a level's element 2^ℓ+1 has no key.
pub fn repack(
    cts: Vec<CipherPair<Poly>>,
    galois_keys: &BTreeMap<usize, KeySwitchKey>,
    t: u64,
) -> Result<CipherPair<Poly>> {
    let n = cts.len();
    debug_assert!(n.is_power_of_two(), "repack needs a power-of-two batch");

    let mut cts = cts;
    let log_n = n.trailing_zeros() as usize;
    for ell in 1..=log_n {
        let step = n >> ell;
        let g = (1 << ell) + 1;
        let key = galois_keys.get(&g).ok_or(FheError::MissingGaloisKey(g))?;

        cts = (0..step)
            .into_par_iter()
            .map(|r| combine(&cts[r], &cts[r + step], step, g, key, t))
            .collect();
        trace!(level = ell, remaining = cts.len(), g, "packing level done");
    }

    cts.into_iter()
        .next()
        .ok_or_else(|| FheError::InvalidPlaintext("nothing to repack".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bgv::keys::{scaled_error_poly, SecretKey};
    use crate::chain::ModulusChain;
    use crate::ks::generate_galois_key;
    use crate::math::GaussianSampler;
    use crate::params::FheParams;
    use crate::rlwe::packing_galois_elements;
    use num_bigint::BigInt;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_repack_places_constants_in_order() {
        let n = 8;
        let t = 17u64;
        let mut rng = ChaCha20Rng::seed_from_u64(101);
        let chain = ModulusChain::new(&FheParams::new(n, t, 2, true)).unwrap();
        let sampler = GaussianSampler::new(3.2);
        let sk = SecretKey::generate(n, n / 2, &mut rng);
        let keys: BTreeMap<usize, KeySwitchKey> = packing_galois_elements(n)
            .into_iter()
            .map(|g| (g, generate_galois_key(&sk, g, &chain, &sampler, &mut rng)))
            .collect();

        let q = chain.bootstrap_modulus().clone();
        let s = sk.to_poly(&q);
        let constants = [1i64, 0, 5, 3, 0, 16, 2, 9];
        let cts: Vec<CipherPair<Poly>> = constants
            .iter()
            .enumerate()
            .map(|(i, &m)| {
                // garbage in the other coefficients must cancel out
                let mut coeffs = vec![(i as i64) + 1; n];
                coeffs[0] = m;
                let c = Poly::random(n, &q, &mut rng);
                let te = scaled_error_poly(n, &q, t, &sampler, &mut rng);
                let a = &(&Poly::from_i64s(&coeffs, n, &q) + &(&c * &s)) + &te;
                CipherPair::new(a, c)
            })
            .collect();

        let packed = repack(cts, &keys, t).unwrap();
        let phase = &packed.a - &(&s * &packed.b);
        let expected: Vec<u64> = constants
            .iter()
            .map(|&m| ((m * n as i64).rem_euclid(t as i64)) as u64)
            .collect();
        assert_eq!(phase.mod_small(t), expected);
        assert!(phase.inf_norm() < (&q >> 40));
    }

    #[test]
    fn test_missing_key_reported() {
        let n = 4;
        let q = BigInt::from(97);
        let cts = vec![CipherPair::trivial(Poly::zero(n, &q)); n];
        let err = repack(cts, &BTreeMap::new(), 17).unwrap_err();
        assert_eq!(err, FheError::MissingGaloisKey(3));
    }
}
