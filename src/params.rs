//! Owned RSA key parameters, as handed to [`RsaKey::import`].
//!
//! A key is either public-only or carries the full set of private
//! parameters. [`KeyParams`] makes a partially populated private key
//! unrepresentable.
//!
//! [`RsaKey::import`]: crate::RsaKey::import

use core::fmt;

use num_bigint::BigUint;
use zeroize::{Zeroize, Zeroizing};

use crate::errors::{Error, Result};

/// Public key parameters.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicParams {
    /// Modulus
    pub n: BigUint,
    /// Public exponent
    pub e: BigUint,
}

impl fmt::Debug for PublicParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicParams")
            .field("n", &format_args!("{:x}", self.n))
            .field("e", &format_args!("{}", self.e))
            .finish()
    }
}

/// Public and private key parameters of a two-prime key. Private values are
/// zeroized when dropped.
#[derive(Clone)]
pub struct PrivateParams {
    n: BigUint,
    e: BigUint,
    d: Zeroizing<BigUint>,
    p: Zeroizing<BigUint>,
    q: Zeroizing<BigUint>,
    dmp1: Zeroizing<BigUint>,
    dmq1: Zeroizing<BigUint>,
    iqmp: Zeroizing<BigUint>,
}

impl PrivateParams {
    /// Collects the parameters of a private key.
    ///
    /// - `d`: private exponent
    /// - `p`, `q`: prime factors of `n`
    /// - `dmp1`: `d mod (p - 1)`
    /// - `dmq1`: `d mod (q - 1)`
    /// - `iqmp`: `q^-1 mod p`
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        n: BigUint,
        e: BigUint,
        d: BigUint,
        p: BigUint,
        q: BigUint,
        dmp1: BigUint,
        dmq1: BigUint,
        iqmp: BigUint,
    ) -> Self {
        PrivateParams {
            n,
            e,
            d: Zeroizing::new(d),
            p: Zeroizing::new(p),
            q: Zeroizing::new(q),
            dmp1: Zeroizing::new(dmp1),
            dmq1: Zeroizing::new(dmq1),
            iqmp: Zeroizing::new(iqmp),
        }
    }

    /// Returns the modulus.
    pub fn n(&self) -> &BigUint {
        &self.n
    }

    /// Returns the public exponent.
    pub fn e(&self) -> &BigUint {
        &self.e
    }

    /// Splits the parameters into the groups accepted by each accessor stage.
    pub(crate) fn into_groups(self) -> (KeyGroup, FactorGroup, CrtGroup) {
        let PrivateParams {
            n,
            e,
            d,
            p,
            q,
            dmp1,
            dmq1,
            iqmp,
        } = self;
        (
            KeyGroup { n, e, d: Some(d) },
            FactorGroup { p, q },
            CrtGroup { dmp1, dmq1, iqmp },
        )
    }
}

impl PartialEq for PrivateParams {
    fn eq(&self, other: &Self) -> bool {
        self.n == other.n
            && self.e == other.e
            && *self.d == *other.d
            && *self.p == *other.p
            && *self.q == *other.q
            && *self.dmp1 == *other.dmp1
            && *self.dmq1 == *other.dmq1
            && *self.iqmp == *other.iqmp
    }
}

impl fmt::Debug for PrivateParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateParams")
            .field("n", &format_args!("{:x}", self.n))
            .field("e", &format_args!("{}", self.e))
            .finish_non_exhaustive()
    }
}

/// Parameters to import into a key handle.
#[derive(Clone, Debug, PartialEq)]
pub enum KeyParams {
    /// Public key: modulus and public exponent only.
    Public(PublicParams),
    /// Private key: every parameter.
    Private(PrivateParams),
}

impl KeyParams {
    /// Parameters of a public key.
    pub fn public(n: BigUint, e: BigUint) -> Self {
        KeyParams::Public(PublicParams { n, e })
    }

    /// Builds parameters from a modulus, public exponent and an optional set
    /// of private parameters, which must be either all present or all
    /// absent.
    ///
    /// On [`Error::IncompletePrivateKey`] the supplied private parameters are
    /// zeroized and dropped.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        n: BigUint,
        e: BigUint,
        d: Option<BigUint>,
        p: Option<BigUint>,
        q: Option<BigUint>,
        dmp1: Option<BigUint>,
        dmq1: Option<BigUint>,
        iqmp: Option<BigUint>,
    ) -> Result<Self> {
        match (d, p, q, dmp1, dmq1, iqmp) {
            (None, None, None, None, None, None) => Ok(KeyParams::public(n, e)),
            (Some(d), Some(p), Some(q), Some(dmp1), Some(dmq1), Some(iqmp)) => Ok(
                KeyParams::Private(PrivateParams::new(n, e, d, p, q, dmp1, dmq1, iqmp)),
            ),
            (d, p, q, dmp1, dmq1, iqmp) => {
                let mut partial = [d, p, q, dmp1, dmq1, iqmp];
                let supplied = partial.iter().filter(|v| v.is_some()).count();
                partial.zeroize();
                tracing::debug!(supplied, "refusing incomplete private key parameters");
                Err(Error::IncompletePrivateKey)
            }
        }
    }

    /// Returns `true` if these are the parameters of a private key.
    pub fn is_private(&self) -> bool {
        matches!(self, KeyParams::Private(_))
    }

    /// Returns the modulus.
    pub fn n(&self) -> &BigUint {
        match self {
            KeyParams::Public(params) => &params.n,
            KeyParams::Private(params) => params.n(),
        }
    }
}

impl From<PublicParams> for KeyParams {
    fn from(params: PublicParams) -> Self {
        KeyParams::Public(params)
    }
}

impl From<PrivateParams> for KeyParams {
    fn from(params: PrivateParams) -> Self {
        KeyParams::Private(params)
    }
}

/// Parameters handed over by the first accessor stage.
pub struct KeyGroup {
    /// Modulus
    pub n: BigUint,
    /// Public exponent
    pub e: BigUint,
    /// Private exponent, present for private keys only.
    pub d: Option<Zeroizing<BigUint>>,
}

impl KeyGroup {
    /// Number of parameters in the group.
    pub fn count(&self) -> usize {
        2 + usize::from(self.d.is_some())
    }
}

/// Prime factors handed over by the second accessor stage.
pub struct FactorGroup {
    /// First prime factor
    pub p: Zeroizing<BigUint>,
    /// Second prime factor
    pub q: Zeroizing<BigUint>,
}

impl FactorGroup {
    /// Number of parameters in the group.
    pub const LEN: usize = 2;
}

/// CRT coefficients handed over by the third accessor stage.
pub struct CrtGroup {
    /// `d mod (p - 1)`
    pub dmp1: Zeroizing<BigUint>,
    /// `d mod (q - 1)`
    pub dmq1: Zeroizing<BigUint>,
    /// `q^-1 mod p`
    pub iqmp: Zeroizing<BigUint>,
}

impl CrtGroup {
    /// Number of parameters in the group.
    pub const LEN: usize = 3;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uint(v: u64) -> BigUint {
        BigUint::from(v)
    }

    #[test]
    fn from_parts_public() {
        let params =
            KeyParams::from_parts(uint(3233), uint(17), None, None, None, None, None, None)
                .unwrap();
        assert!(!params.is_private());
        assert_eq!(params, KeyParams::public(uint(3233), uint(17)));
    }

    #[test]
    fn from_parts_private() {
        let params = KeyParams::from_parts(
            uint(3233),
            uint(17),
            Some(uint(2753)),
            Some(uint(61)),
            Some(uint(53)),
            Some(uint(53)),
            Some(uint(49)),
            Some(uint(38)),
        )
        .unwrap();
        assert!(params.is_private());
        assert_eq!(params.n(), &uint(3233));
    }

    #[test]
    fn from_parts_rejects_each_missing_parameter() {
        for missing in 0..6 {
            let mut parts: Vec<Option<BigUint>> = (1..=6).map(|v| Some(uint(v))).collect();
            parts[missing] = None;
            let mut it = parts.into_iter();
            let mut next = || it.next().flatten();
            let res = KeyParams::from_parts(
                uint(3233),
                uint(17),
                next(),
                next(),
                next(),
                next(),
                next(),
                next(),
            );
            assert_eq!(res, Err(Error::IncompletePrivateKey), "missing #{}", missing);
        }
    }

    #[test]
    fn from_parts_rejects_single_parameter() {
        let res = KeyParams::from_parts(
            uint(3233),
            uint(17),
            None,
            None,
            None,
            None,
            None,
            Some(uint(38)),
        );
        assert_eq!(res, Err(Error::IncompletePrivateKey));
    }

    #[test]
    fn group_sizes() {
        let private = PrivateParams::new(
            uint(3233),
            uint(17),
            uint(2753),
            uint(61),
            uint(53),
            uint(53),
            uint(49),
            uint(38),
        );
        let (key, _, _) = private.into_groups();
        assert_eq!(key.count() + FactorGroup::LEN + CrtGroup::LEN, 8);
    }

    #[test]
    fn debug_hides_private_values() {
        let private = PrivateParams::new(
            uint(3233),
            uint(17),
            uint(2753),
            uint(61),
            uint(53),
            uint(53),
            uint(49),
            uint(38),
        );
        let dbg = format!("{:?}", private);
        assert!(dbg.contains("ca1"));
        assert!(!dbg.contains("2753"));
    }
}
