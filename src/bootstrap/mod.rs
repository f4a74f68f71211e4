//! Bootstrapping: refresh a level-0 ciphertext back to the top level.
//!
//! # Pipeline
//!
//! ```text
//! level 0 ──prepare──► CtPrep (Z_2n image)
//!         ──extract──► n samples, one per coefficient
//!         ──blind rotate (parallel)──► n RLWE at Q_boot, constant 0 or −2μ
//!         ──repack──► one RLWE at Q_boot encrypting Σ bit_i·h·X^i
//!         ──rescale by R──► top level
//! ```
//!
//! The rotation keys are RGSW encryptions of the indicator polynomials
//! [s_j = 1] and [s_j = −1]; the repacking uses the Galois keys for
//! 2^ℓ + 1 that the engine already holds.

mod blind_rotate;
mod prep;
mod repack;

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::Rng;
use rayon::prelude::*;
use tracing::debug;

use crate::bgv::SecretKey;
use crate::chain::ModulusChain;
use crate::error::{FheError, Result};
use crate::ks::KeySwitchKey;
use crate::math::{GaussianSampler, RnsContext};
use crate::rgsw::{GadgetVector, RgswCipher};
use crate::rlwe::RlweCipher;

pub use blind_rotate::{blind_rotate, finish_rotation, test_polynomial, MonomialTable};
pub use prep::{extract_coefficient, prepare, residuals, sample_phase, CtPrep, ExtractedSample};
pub use repack::repack;

/// Everything the blind rotation needs besides the ciphertext
#[derive(Clone, Debug)]
pub struct BootstrapKey {
    /// RGSW([s_j = 1]) for every secret coefficient
    plus: Vec<RgswCipher>,
    /// RGSW([s_j = −1])
    minus: Vec<RgswCipher>,
    table: MonomialTable,
    test_poly: Vec<i64>,
    mu: i64,
    rns: Arc<RnsContext>,
}

impl BootstrapKey {
    /// Encrypt the secret-key indicators over Q_boot
    pub fn generate<R: Rng + ?Sized>(
        sk: &SecretKey,
        chain: &ModulusChain,
        gadget_log_base: u32,
        sampler: &GaussianSampler,
        rng: &mut R,
    ) -> Result<Self> {
        let n = chain.ring_dim();
        let t = chain.plaintext_modulus();
        let rns = chain.bootstrap_rns().clone();
        let gadget = GadgetVector::new(gadget_log_base, rns.modulus());

        let mut plus = Vec::with_capacity(n);
        let mut minus = Vec::with_capacity(n);
        for &sj in sk.coeffs() {
            plus.push(RgswCipher::encrypt(sk, (sj == 1) as i64, &gadget, &rns, t, sampler, rng)?);
            minus.push(RgswCipher::encrypt(sk, (sj == -1) as i64, &gadget, &rns, t, sampler, rng)?);
        }

        let (test_poly, mu) = test_polynomial(n, t)?;
        debug!(
            ring_dim = n,
            gadget_len = gadget.len,
            mu,
            "generated bootstrapping key"
        );

        Ok(Self {
            plus,
            minus,
            table: MonomialTable::new(&rns),
            test_poly,
            mu,
            rns,
        })
    }

    pub fn ring_dim(&self) -> usize {
        self.plus.len()
    }

    pub fn gadget_len(&self) -> usize {
        self.plus.first().map_or(0, RgswCipher::gadget_len)
    }

    /// μ = (4n)⁻¹ mod t, centered
    pub fn test_scale(&self) -> i64 {
        self.mu
    }
}

/// Bring a level-0 ciphertext back to the top level, keeping its bits.
///
/// Every coefficient of the input must decrypt to 0 or h.
///
/// # Errors
///
/// `LevelMismatch` when `ct` is not at level 0, `MissingGaloisKey` when a
/// packing key is absent.
pub fn bootstrap(
    ct: &RlweCipher,
    bk: &BootstrapKey,
    galois_keys: &BTreeMap<usize, KeySwitchKey>,
) -> Result<RlweCipher> {
    if ct.level() != 0 {
        return Err(FheError::LevelMismatch {
            left: ct.level(),
            right: 0,
        });
    }
    let chain = ct.chain();
    let n = ct.ring_dim();
    let t = ct.plaintext_modulus();

    let prep = prepare(ct);
    debug!(ring_dim = n, "bootstrap: prepared Z_2n image");

    let rotated: Vec<_> = (0..n)
        .into_par_iter()
        .map(|i| {
            let sample = extract_coefficient(&prep, i);
            let acc = blind_rotate(
                &sample,
                &bk.test_poly,
                &bk.plus,
                &bk.minus,
                &bk.table,
                &bk.rns,
            );
            finish_rotation(&acc, bk.mu)
        })
        .collect();
    debug!(count = rotated.len(), "bootstrap: blind rotations done");

    let packed = repack(rotated, galois_keys, t)?;
    debug!("bootstrap: repacked");

    let top = chain.top_level();
    let pair = packed.rescale(chain.modulus(top), t);
    debug!(level = top, "bootstrap: rescaled to top level");

    Ok(RlweCipher::from_pair(pair, top, chain))
}
