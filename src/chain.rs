//! Modulus chain of an engine instance.
//!
//! ```text
//!   level primes      p_0 < p_1 < ... < p_{L}        Q_i = p_0 · ... · p_i
//!   extension primes  r_0 ... r_{k-1}               Q_boot = Q_L · R
//!   special primes    s_0 ... s_{L+k}               key modulus = P · Q_boot
//! ```
//!
//! Every prime is ≡ 1 (mod 2·n·t). Rescaling between adjacent levels divides
//! by p_i, bootstrapping leaves Q_boot by dividing by R, and key switching
//! leaves P·Q by dividing by P; all three divisors are ≡ 1 (mod t), so the
//! plaintext survives each division exactly.

use std::sync::Arc;

use num_bigint::BigInt;
use tracing::info;

use crate::error::{FheError, Result};
use crate::math::modular::{find_plaintext_modulus, primes_congruent_one, product};
use crate::math::RnsContext;
use crate::params::FheParams;

/// Moduli and RNS tables shared by every ciphertext of one engine
#[derive(Debug)]
pub struct ModulusChain {
    ring_dim: usize,
    plaintext_modulus: u64,
    level_primes: Vec<u64>,
    extension_primes: Vec<u64>,
    special_primes: Vec<u64>,
    /// Q_0, Q_1, ..., Q_L
    level_moduli: Vec<BigInt>,
    bootstrap_modulus: BigInt,
    special_modulus: BigInt,
    /// NTT tables over the level and extension primes (modulus Q_boot)
    bootstrap_rns: Arc<RnsContext>,
}

impl ModulusChain {
    /// Pick t and every prime for a parameter set.
    ///
    /// # Errors
    ///
    /// `InvalidRingDegree` / `InvalidParams` from validation,
    /// `NoPlaintextModulus` when the t search fails, and
    /// `InvalidModulusChain` when not enough primes fit below 2^62.
    pub fn new(params: &FheParams) -> Result<Self> {
        params.validate()?;

        let n = params.ring_dim;
        let t = find_plaintext_modulus(n, params.plaintext_modulus)?;

        let levels = params.levels;
        let extension = if params.bootstrapping {
            params.extension_primes
        } else {
            0
        };
        let special = levels + extension + 1;

        let step = (2 * n as u64).checked_mul(t).ok_or_else(|| {
            FheError::InvalidModulusChain(format!("2·n·t overflows for n = {}, t = {}", n, t))
        })?;
        let primes = primes_congruent_one(step, params.prime_bits, levels + extension + special)?;

        let level_primes = primes[..levels].to_vec();
        let extension_primes = primes[levels..levels + extension].to_vec();
        let special_primes = primes[levels + extension..].to_vec();

        let level_moduli: Vec<BigInt> = (1..=levels).map(|i| product(&level_primes[..i])).collect();
        let boot_primes: Vec<u64> = level_primes
            .iter()
            .chain(extension_primes.iter())
            .copied()
            .collect();
        let bootstrap_modulus = product(&boot_primes);
        let special_modulus = product(&special_primes);
        let bootstrap_rns = Arc::new(RnsContext::new(n, &boot_primes)?);

        info!(
            ring_dim = n,
            plaintext_modulus = t,
            levels,
            extension,
            special,
            top_bits = level_moduli[levels - 1].bits(),
            key_bits = (&special_modulus * &bootstrap_modulus).bits(),
            "built modulus chain"
        );

        Ok(Self {
            ring_dim: n,
            plaintext_modulus: t,
            level_primes,
            extension_primes,
            special_primes,
            level_moduli,
            bootstrap_modulus,
            special_modulus,
            bootstrap_rns,
        })
    }

    pub fn ring_dim(&self) -> usize {
        self.ring_dim
    }

    /// The plaintext modulus t actually in use
    pub fn plaintext_modulus(&self) -> u64 {
        self.plaintext_modulus
    }

    /// Number of levels (chain primes)
    pub fn levels(&self) -> usize {
        self.level_primes.len()
    }

    /// Level of a fresh ciphertext
    pub fn top_level(&self) -> usize {
        self.level_primes.len() - 1
    }

    /// Q_level
    ///
    /// # Panics
    ///
    /// Panics if `level > top_level()`.
    pub fn modulus(&self, level: usize) -> &BigInt {
        &self.level_moduli[level]
    }

    /// Level whose modulus equals `q`, if any
    pub fn level_of(&self, q: &BigInt) -> Option<usize> {
        self.level_moduli.iter().position(|m| m == q)
    }

    /// The prime dropped when rescaling from `level` to `level − 1`
    pub fn level_prime(&self, level: usize) -> u64 {
        self.level_primes[level]
    }

    pub fn level_primes(&self) -> &[u64] {
        &self.level_primes
    }

    pub fn extension_primes(&self) -> &[u64] {
        &self.extension_primes
    }

    pub fn special_primes(&self) -> &[u64] {
        &self.special_primes
    }

    /// Q_boot = Q_top · R (equal to Q_top when bootstrapping is off)
    pub fn bootstrap_modulus(&self) -> &BigInt {
        &self.bootstrap_modulus
    }

    /// P, the "next modulus up" used by every key switch
    pub fn special_modulus(&self) -> &BigInt {
        &self.special_modulus
    }

    /// P · Q_boot, the modulus key-switching keys are generated at
    pub fn key_modulus(&self) -> BigInt {
        &self.special_modulus * &self.bootstrap_modulus
    }

    /// NTT/CRT tables for Q_boot
    pub fn bootstrap_rns(&self) -> &Arc<RnsContext> {
        &self.bootstrap_rns
    }

    /// Whether two chains describe the same moduli
    pub fn same_as(self: &Arc<Self>, other: &Arc<Self>) -> bool {
        Arc::ptr_eq(self, other) || **self == **other
    }
}

impl PartialEq for ModulusChain {
    fn eq(&self, other: &Self) -> bool {
        self.ring_dim == other.ring_dim
            && self.plaintext_modulus == other.plaintext_modulus
            && self.level_primes == other.level_primes
            && self.extension_primes == other.extension_primes
            && self.special_primes == other.special_primes
    }
}
