//! Error types.

use core::fmt;

/// Alias for [`core::result::Result`] with the `rsa-compat` error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Some, but not all, of the private key parameters were supplied.
    #[error("private key parameters must be supplied all together or not at all")]
    IncompletePrivateKey,

    /// The key storage refused to take ownership of a parameter group.
    #[error("key storage refused the {stage} parameters ({released} parameters released)")]
    Import {
        /// Stage at which the storage refused the parameters.
        stage: Stage,
        /// Number of parameters released by the importer.
        released: usize,
    },

    /// Key generation failed.
    #[error("key generation failed: {reason}")]
    Generation {
        /// Diagnostic reported by the failing component.
        reason: String,
    },

    /// Too few primes of the requested length exist to build a key.
    #[error("too few primes of given length to generate an RSA key")]
    TooFewPrimes,

    /// Invalid prime value.
    #[error("invalid prime value")]
    InvalidPrime,

    /// Invalid modulus.
    #[error("invalid modulus")]
    InvalidModulus,

    /// Invalid exponent.
    #[error("invalid exponent")]
    InvalidExponent,

    /// Invalid coefficient.
    #[error("invalid coefficient")]
    InvalidCoefficient,
}

impl Error {
    pub(crate) fn generation(reason: impl fmt::Display) -> Self {
        Error::Generation {
            reason: reason.to_string(),
        }
    }
}

/// Ordered ownership-transfer stages of an accessor-based import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Modulus, public exponent and (for private keys) the private exponent.
    Key,
    /// Prime factors `p` and `q`.
    Factors,
    /// CRT coefficients `dmp1`, `dmq1` and `iqmp`.
    CrtParams,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Key => "key",
            Stage::Factors => "factor",
            Stage::CrtParams => "CRT",
        })
    }
}
