//! Modular arithmetic and prime search

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::One;

use crate::error::{FheError, Result};

/// Largest plaintext modulus the search will consider
pub const MAX_PLAINTEXT_MODULUS: u64 = 1 << 31;

/// Modular arithmetic operations over Z_q (word-sized q)
pub struct ModQ;

impl ModQ {
    /// Add two values modulo q
    #[inline]
    pub fn add(a: u64, b: u64, q: u64) -> u64 {
        let sum = (a as u128) + (b as u128);
        (sum % (q as u128)) as u64
    }

    /// Subtract two values modulo q
    #[inline]
    pub fn sub(a: u64, b: u64, q: u64) -> u64 {
        if a >= b {
            a - b
        } else {
            q - (b - a)
        }
    }

    /// Multiply two values modulo q
    #[inline]
    pub fn mul(a: u64, b: u64, q: u64) -> u64 {
        let prod = (a as u128) * (b as u128);
        (prod % (q as u128)) as u64
    }

    /// Negate a value modulo q
    #[inline]
    pub fn negate(a: u64, q: u64) -> u64 {
        if a == 0 {
            0
        } else {
            q - a
        }
    }

    /// Convert a signed integer to its representative in [0, q)
    #[inline]
    pub fn from_signed(val: i64, q: u64) -> u64 {
        (val as i128).rem_euclid(q as i128) as u64
    }

    /// Square-and-multiply exponentiation
    pub fn pow(mut base: u64, mut exp: u64, q: u64) -> u64 {
        let mut result = 1u64 % q;
        base %= q;
        while exp > 0 {
            if exp & 1 == 1 {
                result = Self::mul(result, base, q);
            }
            exp >>= 1;
            base = Self::mul(base, base, q);
        }
        result
    }

    /// Inverse of `a` modulo `q` by the extended Euclidean algorithm.
    ///
    /// Fails with `NotInvertible` when gcd(a, q) != 1.
    pub fn inverse(a: u64, q: u64) -> Result<u64> {
        let mut t: i128 = 0;
        let mut new_t: i128 = 1;
        let mut r: i128 = q as i128;
        let mut new_r: i128 = (a % q) as i128;

        while new_r != 0 {
            let quotient = r / new_r;
            (t, new_t) = (new_t, t - quotient * new_t);
            (r, new_r) = (new_r, r - quotient * new_r);
        }

        if r != 1 {
            return Err(FheError::NotInvertible(format!(
                "{} has no inverse modulo {}",
                a, q
            )));
        }

        Ok(t.rem_euclid(q as i128) as u64)
    }
}

/// Deterministic Miller-Rabin for 64-bit integers
pub fn is_prime(n: u64) -> bool {
    const WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

    if n < 2 {
        return false;
    }
    for &p in WITNESSES.iter() {
        if n % p == 0 {
            return n == p;
        }
    }

    let mut d = n - 1;
    let mut s = 0;
    while d % 2 == 0 {
        d /= 2;
        s += 1;
    }

    'witness: for &a in WITNESSES.iter() {
        let mut x = ModQ::pow(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..s {
            x = ModQ::mul(x, x, n);
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// First prime t >= `start` with t ≡ 1 (mod n)
pub fn find_plaintext_modulus(ring_dim: usize, start: u64) -> Result<u64> {
    let n = ring_dim as u64;
    let not_found = FheError::NoPlaintextModulus { ring_dim, start };

    // smallest candidate >= max(start, n + 1) of the form k·n + 1
    let floor = start.max(n + 1);
    let mut candidate = floor.div_ceil(n).saturating_mul(n).saturating_add(1);
    if candidate - n >= floor {
        candidate -= n;
    }

    while candidate <= MAX_PLAINTEXT_MODULUS {
        if is_prime(candidate) {
            return Ok(candidate);
        }
        candidate += n;
    }
    Err(not_found)
}

/// `count` distinct primes p ≡ 1 (mod step) above 2^min_bits, ascending
pub fn primes_congruent_one(step: u64, min_bits: u32, count: usize) -> Result<Vec<u64>> {
    const MAX_PRIME: u64 = 1 << 62;

    let mut primes = Vec::with_capacity(count);
    let mut candidate = ((1u64 << min_bits) / step + 1) * step + 1;

    while primes.len() < count {
        if candidate >= MAX_PRIME {
            return Err(FheError::InvalidModulusChain(format!(
                "ran out of primes = 1 (mod {}) below 2^62 after {}",
                step,
                primes.len()
            )));
        }
        if is_prime(candidate) {
            primes.push(candidate);
        }
        candidate += step;
    }
    Ok(primes)
}

/// Representative of `x` modulo `q` in (−q/2, q/2]
pub fn center(x: &BigInt, q: &BigInt) -> BigInt {
    let r = x.mod_floor(q);
    if &r + &r > *q {
        r - q
    } else {
        r
    }
}

/// Nearest integer to x/d for d > 0 (ties round up)
pub fn div_round(x: &BigInt, d: &BigInt) -> BigInt {
    let twice: BigInt = x << 1usize;
    (twice + d).div_floor(&(d << 1usize))
}

/// Product of a list of word-sized moduli
pub fn product(moduli: &[u64]) -> BigInt {
    moduli
        .iter()
        .fold(BigInt::one(), |acc, &m| acc * BigInt::from(m))
}
