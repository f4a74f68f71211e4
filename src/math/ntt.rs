//! Negacyclic number-theoretic transform over a list of word-sized primes.
//!
//! For R_p = Z_p[X]/(X^n + 1) with p ≡ 1 (mod 2n) there is a primitive
//! 2n-th root of unity ψ with ψ^n = −1. Evaluating at the odd powers of ψ
//! turns negacyclic convolution into a pointwise product.
//!
//! One `NttContext` covers every prime of an RNS basis. Data is laid out
//! flat: residues modulo prime `idx` occupy `[idx·n, (idx+1)·n)`. Values in
//! the NTT domain are kept in Montgomery form (R = 2^64).

use crate::error::{FheError, Result};

use super::modular::ModQ;

/// Precomputed twiddle tables and Montgomery constants for an RNS basis.
///
/// Immutable once built; share it behind an `Arc` between everything that
/// works over the same (n, primes) pair.
#[derive(Clone, Debug)]
pub struct NttContext {
    n: usize,
    moduli: Vec<u64>,
    /// −p^(−1) mod 2^64 per prime
    q_inv_neg: Vec<u64>,
    /// R^2 mod p per prime
    r_squared: Vec<u64>,
    /// ψ^bitrev(i) in Montgomery form
    psi_powers: Vec<Vec<u64>>,
    /// ψ^(−bitrev(i)) in Montgomery form
    psi_inv_powers: Vec<Vec<u64>>,
    /// n^(−1) mod p in Montgomery form
    n_inv: Vec<u64>,
}

impl NttContext {
    /// Build tables for ring degree `n` and the given primes.
    ///
    /// Fails if `n` is not a power of two or a prime is not ≡ 1 (mod 2n).
    pub fn with_moduli(n: usize, moduli: &[u64]) -> Result<Self> {
        if !n.is_power_of_two() || n < 2 {
            return Err(FheError::InvalidRingDegree(n));
        }
        if moduli.is_empty() {
            return Err(FheError::InvalidModulusChain("empty RNS basis".into()));
        }

        let two_n = 2 * n as u64;
        let mut q_inv_neg = Vec::with_capacity(moduli.len());
        let mut r_squared = Vec::with_capacity(moduli.len());
        let mut psi_powers = Vec::with_capacity(moduli.len());
        let mut psi_inv_powers = Vec::with_capacity(moduli.len());
        let mut n_inv = Vec::with_capacity(moduli.len());

        for &q in moduli {
            if q % two_n != 1 || q >= 1 << 62 {
                return Err(FheError::InvalidModulusChain(format!(
                    "{} is not an NTT prime for n = {}",
                    q, n
                )));
            }

            let q_inv = Self::compute_q_inv_neg(q);
            let r2 = Self::compute_r_squared(q);

            let psi = Self::find_primitive_root(two_n, q)?;
            let psi_inv = ModQ::inverse(psi, q)?;
            let n_inv_val = ModQ::inverse(n as u64, q)?;

            psi_powers.push(Self::compute_twiddle_factors(n, psi, q));
            psi_inv_powers.push(Self::compute_twiddle_factors(n, psi_inv, q));
            n_inv.push(Self::to_montgomery(n_inv_val, q, r2, q_inv));
            q_inv_neg.push(q_inv);
            r_squared.push(r2);
        }

        let mut ctx = Self {
            n,
            moduli: moduli.to_vec(),
            q_inv_neg,
            r_squared,
            psi_powers,
            psi_inv_powers,
            n_inv,
        };
        // twiddles were computed in plain form; store them in Montgomery form
        for idx in 0..ctx.moduli.len() {
            let (q, r2, qi) = (ctx.moduli[idx], ctx.r_squared[idx], ctx.q_inv_neg[idx]);
            for w in ctx.psi_powers[idx].iter_mut() {
                *w = Self::to_montgomery(*w, q, r2, qi);
            }
            for w in ctx.psi_inv_powers[idx].iter_mut() {
                *w = Self::to_montgomery(*w, q, r2, qi);
            }
        }
        Ok(ctx)
    }

    /// Ring dimension n.
    pub fn dimension(&self) -> usize {
        self.n
    }

    /// RNS primes.
    pub fn moduli(&self) -> &[u64] {
        &self.moduli
    }

    /// Number of RNS primes.
    pub fn crt_count(&self) -> usize {
        self.moduli.len()
    }

    /// Forward transform in place: plain residues in, Montgomery point values out.
    ///
    /// # Panics
    ///
    /// Panics if `coeffs.len() != n * crt_count`.
    pub fn forward(&self, coeffs: &mut [u64]) {
        assert_eq!(
            coeffs.len(),
            self.n * self.crt_count(),
            "Input length must match dimension * crt_count"
        );

        for (idx, chunk) in coeffs.chunks_exact_mut(self.n).enumerate() {
            let (q, r2, qi) = (self.moduli[idx], self.r_squared[idx], self.q_inv_neg[idx]);
            for c in chunk.iter_mut() {
                *c = Self::to_montgomery(*c, q, r2, qi);
            }
            self.forward_at(chunk, idx);
        }
    }

    /// Cooley-Tukey butterflies over one prime.
    fn forward_at(&self, coeffs: &mut [u64], idx: usize) {
        let n = self.n;
        let q = self.moduli[idx];
        let psi_powers = &self.psi_powers[idx];

        let mut t = n;
        let mut m = 1;
        while m < n {
            t >>= 1;
            for i in 0..m {
                let j1 = 2 * i * t;
                let w = psi_powers[m + i];
                for j in j1..j1 + t {
                    let u = coeffs[j];
                    let v = self.montgomery_mul_at(coeffs[j + t], w, idx);
                    coeffs[j] = if u + v >= q { u + v - q } else { u + v };
                    coeffs[j + t] = if u >= v { u - v } else { q - v + u };
                }
            }
            m <<= 1;
        }
    }

    /// Inverse transform in place: Montgomery point values in, plain residues out.
    ///
    /// # Panics
    ///
    /// Panics if `coeffs.len() != n * crt_count`.
    pub fn inverse(&self, coeffs: &mut [u64]) {
        assert_eq!(
            coeffs.len(),
            self.n * self.crt_count(),
            "Input length must match dimension * crt_count"
        );

        for (idx, chunk) in coeffs.chunks_exact_mut(self.n).enumerate() {
            self.inverse_at(chunk, idx);
            for c in chunk.iter_mut() {
                *c = self.montgomery_mul_at(*c, 1, idx);
            }
        }
    }

    /// Gentleman-Sande butterflies over one prime, including the 1/n scaling.
    fn inverse_at(&self, coeffs: &mut [u64], idx: usize) {
        let q = self.moduli[idx];
        let psi_inv_powers = &self.psi_inv_powers[idx];

        let mut t = 1;
        let mut m = self.n;
        while m > 1 {
            m >>= 1;
            for i in 0..m {
                let j1 = 2 * i * t;
                let w = psi_inv_powers[m + i];
                for j in j1..j1 + t {
                    let u = coeffs[j];
                    let v = coeffs[j + t];
                    coeffs[j] = if u + v >= q { u + v - q } else { u + v };
                    let diff = if u >= v { u - v } else { q - v + u };
                    coeffs[j + t] = self.montgomery_mul_at(diff, w, idx);
                }
            }
            t <<= 1;
        }

        for c in coeffs.iter_mut() {
            *c = self.montgomery_mul_at(*c, self.n_inv[idx], idx);
        }
    }

    /// Montgomery product of two values modulo prime `idx`.
    #[inline]
    pub fn mul_at(&self, a: u64, b: u64, idx: usize) -> u64 {
        self.montgomery_mul_at(a, b, idx)
    }

    /// Bring a plain residue into Montgomery form modulo prime `idx`.
    #[inline]
    pub fn to_mont_at(&self, a: u64, idx: usize) -> u64 {
        Self::to_montgomery(a, self.moduli[idx], self.r_squared[idx], self.q_inv_neg[idx])
    }

    #[inline]
    fn montgomery_mul_at(&self, a: u64, b: u64, idx: usize) -> u64 {
        Self::redc(
            (a as u128) * (b as u128),
            self.moduli[idx],
            self.q_inv_neg[idx],
        )
    }

    #[inline]
    fn redc(ab: u128, q: u64, q_inv_neg: u64) -> u64 {
        let m = ((ab as u64).wrapping_mul(q_inv_neg)) as u128;
        let t = ((ab + m * (q as u128)) >> 64) as u64;
        if t >= q {
            t - q
        } else {
            t
        }
    }

    fn to_montgomery(a: u64, q: u64, r_squared: u64, q_inv_neg: u64) -> u64 {
        Self::redc((a as u128) * (r_squared as u128), q, q_inv_neg)
    }

    fn compute_q_inv_neg(q: u64) -> u64 {
        // Newton iteration doubles the number of correct low bits each step
        let mut y: u64 = 1;
        for _ in 0..6 {
            y = y.wrapping_mul(2u64.wrapping_sub(q.wrapping_mul(y)));
        }
        y.wrapping_neg()
    }

    fn compute_r_squared(q: u64) -> u64 {
        let r_mod_q = (1u128 << 64) % (q as u128);
        ((r_mod_q * r_mod_q) % (q as u128)) as u64
    }

    /// Primitive `order`-th root of unity modulo q (order a power of two)
    fn find_primitive_root(order: u64, q: u64) -> Result<u64> {
        let exp = (q - 1) / order;
        for g in 2..q.min(1 << 20) {
            let candidate = ModQ::pow(g, exp, q);
            if ModQ::pow(candidate, order / 2, q) == q - 1 {
                return Ok(candidate);
            }
        }
        Err(FheError::InvalidModulusChain(format!(
            "no primitive {}-th root of unity modulo {}",
            order, q
        )))
    }

    /// ψ^bitrev(i) for i in 1..n, plain form.
    ///
    /// Index m = 2^k holds ψ^(n/2m); other indices multiply the entries for
    /// their bits, since bit reversal is additive over disjoint bits.
    fn compute_twiddle_factors(n: usize, psi: u64, q: u64) -> Vec<u64> {
        let mut factors = vec![1u64; n];
        for m in 1..n {
            factors[m] = if m.is_power_of_two() {
                ModQ::pow(psi, (n / (2 * m)) as u64, q)
            } else {
                let high = m & (m - 1);
                let low = m & m.wrapping_neg();
                ModQ::mul(factors[high], factors[low], q)
            };
        }
        factors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::modular::primes_congruent_one;

    fn context(n: usize, count: usize) -> NttContext {
        let primes = primes_congruent_one(2 * n as u64, 30, count).unwrap();
        NttContext::with_moduli(n, &primes).unwrap()
    }

    fn negacyclic(a: &[u64], b: &[u64], q: u64) -> Vec<u64> {
        let n = a.len();
        let mut out = vec![0u64; n];
        for i in 0..n {
            for j in 0..n {
                let prod = ModQ::mul(a[i], b[j], q);
                let k = i + j;
                if k < n {
                    out[k] = ModQ::add(out[k], prod, q);
                } else {
                    out[k - n] = ModQ::sub(out[k - n], prod, q);
                }
            }
        }
        out
    }

    #[test]
    fn test_ntt_inverse_roundtrip() {
        for n in [4, 16, 256] {
            let ctx = context(n, 3);
            let original: Vec<u64> = ctx
                .moduli()
                .iter()
                .flat_map(|&q| (0..n as u64).map(move |i| (i * 7919) % q))
                .collect();
            let mut coeffs = original.clone();
            ctx.forward(&mut coeffs);
            ctx.inverse(&mut coeffs);
            assert_eq!(coeffs, original);
        }
    }

    #[test]
    fn test_negacyclic_wraparound() {
        // x · x^(n-1) = x^n = −1
        let n = 16;
        let ctx = context(n, 1);
        let q = ctx.moduli()[0];

        let mut a = vec![0u64; n];
        a[1] = 1;
        let mut b = vec![0u64; n];
        b[n - 1] = 1;

        ctx.forward(&mut a);
        ctx.forward(&mut b);
        let mut prod: Vec<u64> = (0..n).map(|i| ctx.mul_at(a[i], b[i], 0)).collect();
        ctx.inverse(&mut prod);

        assert_eq!(prod[0], q - 1);
        assert!(prod[1..].iter().all(|&c| c == 0));
    }

    #[test]
    fn test_pointwise_matches_schoolbook() {
        let n = 16;
        let ctx = context(n, 2);
        for (idx, &q) in ctx.moduli().iter().enumerate() {
            let a: Vec<u64> = (0..n as u64).map(|i| (i * i + 3) % q).collect();
            let b: Vec<u64> = (0..n as u64).map(|i| (q - 1 - i * 5) % q).collect();
            let expected = negacyclic(&a, &b, q);

            let single = NttContext::with_moduli(n, &[q]).unwrap();
            let (mut fa, mut fb) = (a.clone(), b.clone());
            single.forward(&mut fa);
            single.forward(&mut fb);
            let mut prod: Vec<u64> = (0..n).map(|i| single.mul_at(fa[i], fb[i], 0)).collect();
            single.inverse(&mut prod);
            assert_eq!(prod, expected, "prime index {}", idx);
        }
    }

    #[test]
    fn test_rejects_bad_prime() {
        assert!(NttContext::with_moduli(16, &[17]).is_err());
        assert!(NttContext::with_moduli(12, &[97]).is_err());
        assert!(NttContext::with_moduli(16, &[]).is_err());
    }
}
