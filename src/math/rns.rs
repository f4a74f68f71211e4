//! Residue-number-system representation of ring elements.
//!
//! An `NttPoly` stores a ring element modulo Q = p_0·…·p_k as one negacyclic
//! NTT per prime, so multiplication is pointwise. Conversion to and from the
//! exact `Poly` form goes through the CRT table of the same context.

use std::sync::Arc;

use num_bigint::BigInt;

use crate::error::{FheError, Result};

use super::arith::RingArithmetic;
use super::crt::{residue, CrtTable};
use super::modular::ModQ;
use super::ntt::NttContext;
use super::poly::Poly;

/// NTT and CRT tables for one (n, primes) pair
#[derive(Debug)]
pub struct RnsContext {
    ntt: NttContext,
    crt: CrtTable,
}

impl RnsContext {
    pub fn new(n: usize, primes: &[u64]) -> Result<Self> {
        Ok(Self {
            ntt: NttContext::with_moduli(n, primes)?,
            crt: CrtTable::new(primes)?,
        })
    }

    pub fn dimension(&self) -> usize {
        self.ntt.dimension()
    }

    pub fn primes(&self) -> &[u64] {
        self.ntt.moduli()
    }

    /// Q = Π p_i
    pub fn modulus(&self) -> &BigInt {
        self.crt.modulus()
    }

    pub fn crt(&self) -> &CrtTable {
        &self.crt
    }

    /// Transform an exact polynomial; its modulus must be this context's Q.
    pub fn to_ntt(self: &Arc<Self>, poly: &Poly) -> Result<NttPoly> {
        if poly.dimension() != self.dimension() {
            return Err(FheError::DimensionMismatch {
                left: poly.dimension(),
                right: self.dimension(),
            });
        }
        if poly.modulus() != self.modulus() {
            return Err(FheError::ModulusMismatch(format!(
                "polynomial modulus has {} bits, RNS basis has {}",
                poly.modulus().bits(),
                self.modulus().bits()
            )));
        }

        let n = self.dimension();
        let mut values = vec![0u64; n * self.primes().len()];
        for (chunk, &p) in values.chunks_exact_mut(n).zip(self.primes()) {
            for (v, c) in chunk.iter_mut().zip(poly.coeffs()) {
                *v = residue(c, p);
            }
        }
        self.ntt.forward(&mut values);

        Ok(NttPoly {
            values,
            ctx: Arc::clone(self),
        })
    }

    /// Transform a polynomial with small signed coefficients (|c| < every prime)
    pub fn small_to_ntt(self: &Arc<Self>, coeffs: &[i64]) -> NttPoly {
        let n = self.dimension();
        debug_assert_eq!(coeffs.len(), n);
        let mut values = vec![0u64; n * self.primes().len()];
        for (chunk, &p) in values.chunks_exact_mut(n).zip(self.primes()) {
            for (v, &c) in chunk.iter_mut().zip(coeffs) {
                *v = ModQ::from_signed(c, p);
            }
        }
        self.ntt.forward(&mut values);
        NttPoly {
            values,
            ctx: Arc::clone(self),
        }
    }
}

impl PartialEq for RnsContext {
    fn eq(&self, other: &Self) -> bool {
        self.dimension() == other.dimension() && self.primes() == other.primes()
    }
}

/// Ring element in NTT form over every prime of an RNS basis.
///
/// Values are Montgomery-form evaluations, laid out prime by prime.
#[derive(Clone, Debug)]
pub struct NttPoly {
    values: Vec<u64>,
    ctx: Arc<RnsContext>,
}

impl NttPoly {
    pub fn zero(ctx: &Arc<RnsContext>) -> Self {
        Self {
            values: vec![0; ctx.dimension() * ctx.primes().len()],
            ctx: Arc::clone(ctx),
        }
    }

    pub fn context(&self) -> &Arc<RnsContext> {
        &self.ctx
    }

    /// Back to exact coefficients in (−Q/2, Q/2]
    pub fn to_poly(&self) -> Poly {
        let n = self.ctx.dimension();
        let k = self.ctx.primes().len();
        let mut values = self.values.clone();
        self.ctx.ntt.inverse(&mut values);

        let coeffs = (0..n)
            .map(|i| {
                let residues: Vec<u64> = (0..k).map(|idx| values[idx * n + i]).collect();
                self.ctx.crt.compose(&residues)
            })
            .collect();
        Poly::from_coeffs(coeffs, n, self.ctx.modulus())
    }

    fn zip(&self, other: &NttPoly, f: impl Fn(u64, u64, u64, usize) -> u64) -> NttPoly {
        assert!(
            Arc::ptr_eq(&self.ctx, &other.ctx) || *self.ctx == *other.ctx,
            "RNS contexts must match"
        );
        let n = self.ctx.dimension();
        let values = self
            .values
            .iter()
            .zip(other.values.iter())
            .enumerate()
            .map(|(i, (&a, &b))| {
                let idx = i / n;
                f(a, b, self.ctx.primes()[idx], idx)
            })
            .collect();
        NttPoly {
            values,
            ctx: Arc::clone(&self.ctx),
        }
    }
}

impl PartialEq for NttPoly {
    fn eq(&self, other: &Self) -> bool {
        *self.ctx == *other.ctx && self.values == other.values
    }
}

impl RingArithmetic for NttPoly {
    fn ring_dim(&self) -> usize {
        self.ctx.dimension()
    }

    fn zero_like(&self) -> Self {
        NttPoly::zero(&self.ctx)
    }

    fn add_elem(&self, rhs: &Self) -> Self {
        self.zip(rhs, |a, b, p, _| ModQ::add(a, b, p))
    }

    fn sub_elem(&self, rhs: &Self) -> Self {
        self.zip(rhs, |a, b, p, _| ModQ::sub(a, b, p))
    }

    fn neg_elem(&self) -> Self {
        let n = self.ctx.dimension();
        let values = self
            .values
            .iter()
            .enumerate()
            .map(|(i, &a)| ModQ::negate(a, self.ctx.primes()[i / n]))
            .collect();
        NttPoly {
            values,
            ctx: Arc::clone(&self.ctx),
        }
    }

    fn mul_elem(&self, rhs: &Self) -> Self {
        let ntt = &self.ctx.ntt;
        self.zip(rhs, |a, b, _, idx| ntt.mul_at(a, b, idx))
    }

    fn mul_small(&self, k: i64) -> Self {
        let n = self.ctx.dimension();
        let factors: Vec<u64> = self
            .ctx
            .primes()
            .iter()
            .enumerate()
            .map(|(idx, &p)| self.ctx.ntt.to_mont_at(ModQ::from_signed(k, p), idx))
            .collect();
        let values = self
            .values
            .iter()
            .enumerate()
            .map(|(i, &a)| self.ctx.ntt.mul_at(a, factors[i / n], i / n))
            .collect();
        NttPoly {
            values,
            ctx: Arc::clone(&self.ctx),
        }
    }
}
