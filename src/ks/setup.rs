//! Key-switching key generation

use num_bigint::BigInt;
use rand::Rng;

use crate::bgv::keys::{scaled_error_poly, SecretKey};
use crate::chain::ModulusChain;
use crate::math::{GaussianSampler, Poly};
use crate::rlwe::CipherPair;

/// Key-switching key from s_from to s, generated at the key modulus P·Q_boot:
///
/// ```text
/// K = (c·s + t·e + P·s_from, c)
/// ```
///
/// Its phase is P·s_from + t·e. Multiplying by a polynomial d over P·Q and
/// dividing the sum by P yields a ciphertext whose phase gains d·s_from.
/// One key serves every level: it is reduced to P·Q_i on use.
#[derive(Clone, Debug)]
pub struct KeySwitchKey {
    pair: CipherPair<Poly>,
    special_modulus: BigInt,
}

impl KeySwitchKey {
    /// Build a key for an arbitrary source secret `s_from` (any modulus; its
    /// signed coefficients are lifted to the key modulus).
    pub fn generate<R: Rng + ?Sized>(
        sk: &SecretKey,
        s_from: &Poly,
        chain: &ModulusChain,
        sampler: &GaussianSampler,
        rng: &mut R,
    ) -> Self {
        let n = chain.ring_dim();
        let key_q = chain.key_modulus();
        let p = chain.special_modulus();

        let c = Poly::random(n, &key_q, rng);
        let te = scaled_error_poly(n, &key_q, chain.plaintext_modulus(), sampler, rng);
        let target = s_from.reduce_to(&key_q).scalar_mul(p);
        let a = &(&(&c * &sk.to_poly(&key_q)) + &te) + &target;

        Self {
            pair: CipherPair::new(a, c),
            special_modulus: p.clone(),
        }
    }

    /// Modulus the key was generated at
    pub fn modulus(&self) -> &BigInt {
        self.pair.modulus()
    }

    pub fn special_modulus(&self) -> &BigInt {
        &self.special_modulus
    }

    /// The key reduced to P·q (q must divide Q_boot)
    pub fn at(&self, q: &BigInt) -> CipherPair<Poly> {
        self.pair.reduce_to(&(&self.special_modulus * q))
    }
}

/// Relinearization key: switches s² to s
pub fn generate_relin_key<R: Rng + ?Sized>(
    sk: &SecretKey,
    chain: &ModulusChain,
    sampler: &GaussianSampler,
    rng: &mut R,
) -> KeySwitchKey {
    let key_q = chain.key_modulus();
    let s = sk.to_poly(&key_q);
    KeySwitchKey::generate(sk, &(&s * &s), chain, sampler, rng)
}

/// Galois key for τ_g: switches τ_g(s) back to s
pub fn generate_galois_key<R: Rng + ?Sized>(
    sk: &SecretKey,
    g: usize,
    chain: &ModulusChain,
    sampler: &GaussianSampler,
    rng: &mut R,
) -> KeySwitchKey {
    let twisted = sk.automorphism(g).to_poly(&chain.key_modulus());
    KeySwitchKey::generate(sk, &twisted, chain, sampler, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::FheParams;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_key_phase() {
        let chain = ModulusChain::new(&FheParams::new(8, 17, 2, false)).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(31);
        let sampler = GaussianSampler::new(3.2);
        let sk = SecretKey::generate(8, 4, &mut rng);
        let key = generate_galois_key(&sk, 3, &chain, &sampler, &mut rng);

        let q = chain.modulus(0);
        let pq = chain.special_modulus() * q;
        let reduced = key.at(q);
        assert_eq!(reduced.modulus(), &pq);

        // phase − P·τ_3(s) is t·e
        let s = sk.to_poly(&pq);
        let expected = sk.automorphism(3).to_poly(&pq).scalar_mul(chain.special_modulus());
        let noise = &(&reduced.a - &(&s * &reduced.b)) - &expected;
        assert!(noise.mod_small(17).iter().all(|&c| c == 0));
        assert!(noise.inf_norm() < BigInt::from(17 * 40));
    }
}
