//! Engine instance: parameters, modulus chain and every key.
//!
//! The engine owns the secret key. Public, relinearization, Galois and
//! bootstrapping keys are generated once in [`FheEngine::new`] and only
//! read afterwards, so an engine can be shared across threads by reference.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::{debug, info, trace};

use crate::bgv::{self, PublicKey, SecretKey};
use crate::bootstrap::{self, BootstrapKey};
use crate::chain::ModulusChain;
use crate::error::{params_err, FheError, Result};
use crate::ks::{automorphism_switch, generate_galois_key, generate_relin_key, KeySwitchKey};
use crate::lwe::{self, RegevCipher};
use crate::math::{GaussianSampler, Poly};
use crate::params::FheParams;
use crate::rlwe::{automorphism_order, packing_galois_elements, RlweCipher};

/// Boolean BGV engine with optional bootstrapping
///
/// # Example
///
/// ```
/// use rlwe_bool::params::FheParams;
/// use rlwe_bool::FheEngine;
///
/// let engine = FheEngine::new(FheParams::new(16, 17, 3, false).with_seed(1)).unwrap();
/// let a = engine.encrypt_bit(1).unwrap();
/// let b = engine.encrypt_bit(0).unwrap();
/// assert_eq!(engine.decrypt_bit(&engine.or(&a, &b).unwrap()).unwrap(), 1);
/// ```
pub struct FheEngine {
    params: FheParams,
    chain: Arc<ModulusChain>,
    sampler: GaussianSampler,
    secret_key: SecretKey,
    public_key: PublicKey,
    relin_key: KeySwitchKey,
    galois_keys: BTreeMap<usize, KeySwitchKey>,
    bootstrap_key: Option<BootstrapKey>,
}

impl fmt::Debug for FheEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FheEngine")
            .field("params", &self.params)
            .field("plaintext_modulus", &self.chain.plaintext_modulus())
            .field("galois_elements", &self.galois_keys.keys().collect::<Vec<_>>())
            .field("bootstrapping", &self.bootstrap_key.is_some())
            .finish_non_exhaustive()
    }
}

impl FheEngine {
    /// Build the chain and generate every key.
    ///
    /// # Errors
    ///
    /// `InvalidRingDegree` when n is not a power of two ≥ 4,
    /// `NoPlaintextModulus` when no prime t ≡ 1 (mod n) is found, and the
    /// other construction errors of [`ModulusChain::new`].
    pub fn new(params: FheParams) -> Result<Self> {
        let chain = Arc::new(ModulusChain::new(&params)?);
        let mut rng = match params.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        };
        let sampler = GaussianSampler::new(params.sigma);
        let n = chain.ring_dim();

        let secret_key = SecretKey::generate(n, params.min_hamming_weight, &mut rng);
        let public_key = PublicKey::generate(&secret_key, &chain, &sampler, &mut rng);
        let relin_key = generate_relin_key(&secret_key, &chain, &sampler, &mut rng);
        let galois_keys: BTreeMap<usize, KeySwitchKey> = packing_galois_elements(n)
            .into_iter()
            .map(|g| (g, generate_galois_key(&secret_key, g, &chain, &sampler, &mut rng)))
            .collect();
        debug!(count = galois_keys.len(), "generated galois keys");

        let bootstrap_key = if params.bootstrapping {
            Some(BootstrapKey::generate(
                &secret_key,
                &chain,
                params.gadget_log_base,
                &sampler,
                &mut rng,
            )?)
        } else {
            None
        };

        info!(
            ring_dim = n,
            plaintext_modulus = chain.plaintext_modulus(),
            levels = chain.levels(),
            bootstrapping = params.bootstrapping,
            "engine ready"
        );

        Ok(Self {
            params,
            chain,
            sampler,
            secret_key,
            public_key,
            relin_key,
            galois_keys,
            bootstrap_key,
        })
    }

    pub fn params(&self) -> &FheParams {
        &self.params
    }

    pub fn chain(&self) -> &Arc<ModulusChain> {
        &self.chain
    }

    pub fn ring_dim(&self) -> usize {
        self.chain.ring_dim()
    }

    /// The plaintext modulus t found for these parameters
    pub fn plaintext_modulus(&self) -> u64 {
        self.chain.plaintext_modulus()
    }

    /// h = (t−1)/2, the encoding of bit 1
    pub fn bit_scale(&self) -> u64 {
        FheParams::bit_scale(self.plaintext_modulus())
    }

    pub fn top_level(&self) -> usize {
        self.chain.top_level()
    }

    pub fn bootstrapping_enabled(&self) -> bool {
        self.bootstrap_key.is_some()
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn relin_key(&self) -> &KeySwitchKey {
        &self.relin_key
    }

    pub fn galois_keys(&self) -> &BTreeMap<usize, KeySwitchKey> {
        &self.galois_keys
    }

    /// Fails with `ModulusMismatch` for ciphertexts of another engine
    pub(crate) fn check_owned(&self, ct: &RlweCipher) -> Result<()> {
        if ct.chain().same_as(&self.chain) {
            Ok(())
        } else {
            Err(FheError::ModulusMismatch(
                "ciphertext was produced under another modulus chain".into(),
            ))
        }
    }

    fn plaintext(&self, values: &[i64]) -> Result<Poly> {
        let n = self.ring_dim();
        if values.len() > n {
            return Err(FheError::InvalidPlaintext(format!(
                "{} coefficients do not fit ring degree {}",
                values.len(),
                n
            )));
        }
        let t = BigInt::from(self.plaintext_modulus());
        Ok(Poly::from_i64s(values, n, &t))
    }

    /// Encrypt a plaintext polynomial (at most n coefficients, read mod t)
    pub fn encrypt_poly(&self, values: &[i64]) -> Result<RlweCipher> {
        let m = self.plaintext(values)?;
        bgv::encrypt(
            &m,
            &self.public_key,
            &self.chain,
            &self.sampler,
            &mut rand::thread_rng(),
        )
    }

    /// Trivial encryption (m, 0) without randomness, for tests
    pub fn encrypt_noiseless(&self, values: &[i64]) -> Result<RlweCipher> {
        let m = self.plaintext(values)?;
        bgv::encrypt_noiseless(&m, &self.chain)
    }

    /// Decrypted plaintext, coefficients centered mod t
    pub fn decrypt_poly(&self, ct: &RlweCipher) -> Result<Poly> {
        self.check_owned(ct)?;
        bgv::decrypt(ct, &self.secret_key)
    }

    /// Noise E with A − s·B = m + t·E (diagnostics only)
    pub fn errors(&self, ct: &RlweCipher) -> Result<Poly> {
        self.check_owned(ct)?;
        bgv::errors(ct, &self.secret_key)
    }

    /// Encrypt 0 or 1 as the constant 0 or h
    pub fn encrypt_bit(&self, bit: u8) -> Result<RlweCipher> {
        if bit > 1 {
            return Err(FheError::InvalidPlaintext(format!("{} is not a bit", bit)));
        }
        self.encrypt_poly(&[bit as i64 * self.bit_scale() as i64])
    }

    /// Nearest of 0 and h to the constant coefficient
    pub fn decrypt_bit(&self, ct: &RlweCipher) -> Result<u8> {
        let t = self.plaintext_modulus() as i64;
        let h = self.bit_scale() as i64;
        let m = self.decrypt_poly(ct)?;
        let v = m.coeff(0).to_i64().unwrap_or_default().rem_euclid(t);

        let circular = |x: i64| x.rem_euclid(t).min((-x).rem_euclid(t));
        Ok((circular(v - h) < circular(v)) as u8)
    }

    pub fn encrypt_bits(&self, bits: &[u8]) -> Result<Vec<RlweCipher>> {
        bits.iter().map(|&b| self.encrypt_bit(b)).collect()
    }

    pub fn decrypt_bits(&self, cts: &[RlweCipher]) -> Result<Vec<u8>> {
        cts.iter().map(|ct| self.decrypt_bit(ct)).collect()
    }

    /// Encrypt the `width` low bits of `value`, least significant first
    pub fn encrypt_integer(&self, value: u64, width: usize) -> Result<Vec<RlweCipher>> {
        if width == 0 || width > 64 {
            return Err(FheError::InvalidPlaintext(format!(
                "integer width must lie in 1..=64, got {}",
                width
            )));
        }
        let bits: Vec<u8> = (0..width).map(|i| ((value >> i) & 1) as u8).collect();
        self.encrypt_bits(&bits)
    }

    /// Inverse of [`encrypt_integer`](Self::encrypt_integer); bits past 64 are ignored
    pub fn decrypt_integer(&self, cts: &[RlweCipher]) -> Result<u64> {
        let bits = self.decrypt_bits(cts)?;
        Ok(bits
            .iter()
            .take(64)
            .enumerate()
            .fold(0u64, |acc, (i, &b)| acc | ((b as u64) << i)))
    }

    /// Degree-2 product relinearized at the operands' level (no switch down)
    pub fn mul_relin(&self, a: &RlweCipher, b: &RlweCipher) -> Result<RlweCipher> {
        self.check_owned(a)?;
        bgv::mul_relin(a, b, &self.relin_key)
    }

    pub fn mod_switch_to(&self, ct: &RlweCipher, level: usize) -> Result<RlweCipher> {
        ct.mod_switch_to(level)
    }

    /// τ_g followed by a key switch back to s; g must be a packing element.
    ///
    /// # Errors
    ///
    /// `NotInvertible` when g is not a unit mod 2n, `MissingGaloisKey` when
    /// g is a unit without a key.
    pub fn apply_galois(&self, ct: &RlweCipher, g: usize) -> Result<RlweCipher> {
        self.check_owned(ct)?;
        let order = automorphism_order(g, self.ring_dim()).ok_or_else(|| {
            FheError::NotInvertible(format!("{} is not a unit mod {}", g, 2 * self.ring_dim()))
        })?;
        trace!(g, order, "applying automorphism");
        let key = self
            .galois_keys
            .get(&g)
            .ok_or(FheError::MissingGaloisKey(g))?;
        let pair = automorphism_switch(ct.pair(), g, key, self.plaintext_modulus());
        Ok(RlweCipher::from_pair(pair, ct.level(), ct.chain()))
    }

    /// Bootstrap a bottom-level ciphertext.
    ///
    /// Returns the input unchanged unless bootstrapping is enabled and the
    /// ciphertext sits at level 0.
    pub fn bootstrap(&self, ct: &RlweCipher) -> Result<RlweCipher> {
        match &self.bootstrap_key {
            Some(bk) if ct.level() == 0 => {
                self.check_owned(ct)?;
                bootstrap::bootstrap(ct, bk, &self.galois_keys)
            }
            _ => Ok(ct.clone()),
        }
    }

    /// Switch to level 0 and bootstrap back to the top
    ///
    /// # Errors
    ///
    /// `InvalidParams` when bootstrapping is disabled.
    pub fn refresh(&self, ct: &RlweCipher) -> Result<RlweCipher> {
        let bk = self
            .bootstrap_key
            .as_ref()
            .ok_or_else(|| params_err!("refresh needs bootstrapping to be enabled"))?;
        self.check_owned(ct)?;
        let bottom = ct.mod_switch_to(0)?;
        bootstrap::bootstrap(&bottom, bk, &self.galois_keys)
    }

    /// Constant coefficient as a Regev sample
    pub fn to_regev(&self, ct: &RlweCipher) -> RegevCipher {
        lwe::to_regev(ct)
    }

    pub fn from_regev(&self, sample: &RegevCipher) -> Result<RlweCipher> {
        lwe::from_regev(sample, &self.chain)
    }
}
