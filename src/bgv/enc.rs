//! BGV encryption, decryption and noise inspection

use std::sync::Arc;

use num_bigint::BigInt;
use rand::Rng;

use crate::chain::ModulusChain;
use crate::error::{FheError, Result};
use crate::math::modular::center;
use crate::math::sampler::sample_ternary;
use crate::math::{GaussianSampler, Poly};
use crate::rlwe::{CipherPair, RlweCipher};

use super::keys::{scaled_error_poly, PublicKey, SecretKey};

/// Lift a plaintext to the top modulus, rejecting anything wider than the ring
fn plaintext_at(m: &Poly, chain: &ModulusChain, level: usize) -> Result<Poly> {
    if m.dimension() != chain.ring_dim() {
        return Err(FheError::InvalidPlaintext(format!(
            "plaintext has {} coefficients, ring degree is {}",
            m.dimension(),
            chain.ring_dim()
        )));
    }
    Ok(m.reduce_to(chain.modulus(level)))
}

/// Encrypt m under the public key at the top level:
///
/// ```text
/// (u·pk.a + t·e_a + m, u·pk.b + t·e_b)
/// ```
///
/// with u ternary and e_a, e_b Gaussian.
pub fn encrypt<R: Rng + ?Sized>(
    m: &Poly,
    pk: &PublicKey,
    chain: &Arc<ModulusChain>,
    sampler: &GaussianSampler,
    rng: &mut R,
) -> Result<RlweCipher> {
    let n = chain.ring_dim();
    let level = chain.top_level();
    let q = chain.modulus(level);
    let t = chain.plaintext_modulus();
    let m = plaintext_at(m, chain, level)?;

    let u = Poly::from_i64s(&sample_ternary(n, rng), n, q);
    let ea = scaled_error_poly(n, q, t, sampler, rng);
    let eb = scaled_error_poly(n, q, t, sampler, rng);

    let a = &(&(&u * pk.a()) + &ea) + &m;
    let b = &(&u * pk.b()) + &eb;
    RlweCipher::from_parts(a, b, level, chain)
}

/// Trivial encryption (m, 0) at the top level: no randomness, no noise
pub fn encrypt_noiseless(m: &Poly, chain: &Arc<ModulusChain>) -> Result<RlweCipher> {
    let level = chain.top_level();
    let m = plaintext_at(m, chain, level)?;
    Ok(RlweCipher::from_pair(CipherPair::trivial(m), level, chain))
}

/// A − s·B in (−q/2, q/2]
///
/// # Errors
///
/// `DimensionMismatch` when the key and the ciphertext live in rings of
/// different degree.
pub fn phase(ct: &RlweCipher, sk: &SecretKey) -> Result<Poly> {
    if ct.ring_dim() != sk.ring_dim() {
        return Err(FheError::DimensionMismatch {
            left: ct.ring_dim(),
            right: sk.ring_dim(),
        });
    }
    Ok(ct.a() - &(&sk.to_poly(ct.modulus()) * ct.b()))
}

/// Plaintext polynomial, coefficients modulo t.
///
/// No noise check: past q/(2t) the result is silently wrong.
pub fn decrypt(ct: &RlweCipher, sk: &SecretKey) -> Result<Poly> {
    let t = BigInt::from(ct.plaintext_modulus());
    Ok(phase(ct, sk)?.reduce_to(&t))
}

/// Noise E with A − s·B = m + t·E, where m is taken in (−t/2, t/2].
///
/// Meant for tests and parameter tuning only.
pub fn errors(ct: &RlweCipher, sk: &SecretKey) -> Result<Poly> {
    let t = BigInt::from(ct.plaintext_modulus());
    let phase = phase(ct, sk)?;
    let coeffs = phase
        .coeffs()
        .iter()
        .map(|c| (c - center(c, &t)) / &t)
        .collect();
    Ok(Poly::from_coeffs(coeffs, phase.dimension(), phase.modulus()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::RingArithmetic;
    use crate::params::FheParams;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    struct Fixture {
        chain: Arc<ModulusChain>,
        sk: SecretKey,
        pk: PublicKey,
        sampler: GaussianSampler,
        rng: ChaCha20Rng,
    }

    fn fixture() -> Fixture {
        let mut rng = ChaCha20Rng::seed_from_u64(51);
        let chain = Arc::new(ModulusChain::new(&FheParams::new(16, 17, 3, false)).unwrap());
        let sampler = GaussianSampler::new(3.2);
        let sk = SecretKey::generate(16, 8, &mut rng);
        let pk = PublicKey::generate(&sk, &chain, &sampler, &mut rng);
        Fixture {
            chain,
            sk,
            pk,
            sampler,
            rng,
        }
    }

    #[test]
    fn test_roundtrip() {
        let mut f = fixture();
        let t = BigInt::from(17);
        let m = Poly::from_i64s(&[0, 8, 16, 1, 3, 0, 0, 9], 16, &t);
        let ct = encrypt(&m, &f.pk, &f.chain, &f.sampler, &mut f.rng).unwrap();
        assert_eq!(ct.level(), 2);
        assert_eq!(decrypt(&ct, &f.sk).unwrap(), m);
    }

    #[test]
    fn test_noiseless() {
        let f = fixture();
        let m = Poly::from_i64s(&[5, -3], 16, &BigInt::from(17));
        let ct = encrypt_noiseless(&m, &f.chain).unwrap();
        assert_eq!(decrypt(&ct, &f.sk).unwrap(), m);
        assert!(errors(&ct, &f.sk).unwrap().is_zero());
    }

    #[test]
    fn test_errors_reconstruct_phase() {
        let mut f = fixture();
        let t = BigInt::from(17);
        let m = Poly::from_i64s(&[8, 8, 0, 8], 16, &t);
        let ct = encrypt(&m, &f.pk, &f.chain, &f.sampler, &mut f.rng).unwrap();

        let e = errors(&ct, &f.sk).unwrap();
        let rebuilt = &m.reduce_to(ct.modulus()) + &e.mul_small(17);
        assert_eq!(rebuilt, phase(&ct, &f.sk).unwrap());
        assert!(!e.is_zero());
    }

    #[test]
    fn test_mod_switch_preserves_plaintext() {
        let mut f = fixture();
        let m = Poly::from_i64s(&[1, 2, 3, 4, 5, 6, 7, 8], 16, &BigInt::from(17));
        let ct = encrypt(&m, &f.pk, &f.chain, &f.sampler, &mut f.rng).unwrap();
        let mut current = ct;
        while current.level() > 0 {
            current = current.mod_switch_down().unwrap();
            assert_eq!(decrypt(&current, &f.sk).unwrap(), m, "level {}", current.level());
        }
    }

    #[test]
    fn test_wrong_degree_rejected() {
        let f = fixture();
        let m = Poly::zero(32, &BigInt::from(17));
        assert!(matches!(
            encrypt_noiseless(&m, &f.chain),
            Err(FheError::InvalidPlaintext(_))
        ));
    }

    #[test]
    fn test_foreign_degree_key_rejected() {
        let mut f = fixture();
        let m = Poly::from_i64s(&[8], 16, &BigInt::from(17));
        let ct = encrypt(&m, &f.pk, &f.chain, &f.sampler, &mut f.rng).unwrap();
        let small_key = SecretKey::generate(8, 4, &mut f.rng);
        let want = FheError::DimensionMismatch { left: 16, right: 8 };
        assert_eq!(decrypt(&ct, &small_key).unwrap_err(), want);
        assert_eq!(errors(&ct, &small_key).unwrap_err(), want);
    }
}
