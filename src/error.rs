//! Error handling for the encryption engine
//!
//! Construction errors and operand mismatches are reported through `FheError`.
//! Noise overflow is never reported: a ciphertext whose noise outgrew its
//! modulus simply decrypts to the wrong value.

use std::fmt;

/// Engine operation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FheError {
    /// Ring degree is not a power of two (or is too small)
    InvalidRingDegree(usize),
    /// No prime t ≡ 1 (mod n) was found starting at `start`
    NoPlaintextModulus { ring_dim: usize, start: u64 },
    /// The modulus chain could not be built or is inconsistent
    InvalidModulusChain(String),
    /// A parameter set failed validation
    InvalidParams(String),
    /// Operands live in rings of different degree
    DimensionMismatch { left: usize, right: usize },
    /// Operands are reduced modulo different moduli
    ModulusMismatch(String),
    /// Ciphertexts sit at different levels of the same chain
    LevelMismatch { left: usize, right: usize },
    /// Inversion of a non-unit
    NotInvertible(String),
    /// Plaintext does not fit the ring or the encoding
    InvalidPlaintext(String),
    /// A gate needs more levels than remain and bootstrapping is off
    LevelsExhausted { needed: usize, available: usize },
    /// No key-switching key for this Galois element
    MissingGaloisKey(usize),
}

impl fmt::Display for FheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FheError::InvalidRingDegree(n) => {
                write!(f, "ring degree {} is not a power of two >= 4", n)
            }
            FheError::NoPlaintextModulus { ring_dim, start } => write!(
                f,
                "no prime t = 1 (mod {}) found in [{}, 2^31]",
                ring_dim, start
            ),
            FheError::InvalidModulusChain(msg) => write!(f, "invalid modulus chain: {}", msg),
            FheError::InvalidParams(msg) => write!(f, "invalid parameters: {}", msg),
            FheError::DimensionMismatch { left, right } => {
                write!(f, "ring dimension mismatch: {} vs {}", left, right)
            }
            FheError::ModulusMismatch(msg) => write!(f, "modulus mismatch: {}", msg),
            FheError::LevelMismatch { left, right } => {
                write!(f, "level mismatch: {} vs {}", left, right)
            }
            FheError::NotInvertible(msg) => write!(f, "division by zero: {}", msg),
            FheError::InvalidPlaintext(msg) => write!(f, "invalid plaintext: {}", msg),
            FheError::LevelsExhausted { needed, available } => write!(
                f,
                "gate needs {} levels but only {} remain and bootstrapping is disabled",
                needed, available
            ),
            FheError::MissingGaloisKey(g) => write!(f, "no key-switching key for x -> x^{}", g),
        }
    }
}

impl std::error::Error for FheError {}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, FheError>;

/// Create an `FheError::InvalidParams` with format string support
macro_rules! params_err {
    ($($arg:tt)*) => {
        $crate::error::FheError::InvalidParams(format!($($arg)*))
    };
}

pub(crate) use params_err;
