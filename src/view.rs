//! Borrowed views of a key handle's parameters.

use core::fmt;

use num_bigint::BigUint;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::params::{KeyParams, PrivateParams};

/// Borrowed public parameters of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicView<'a> {
    /// Modulus
    pub n: &'a BigUint,
    /// Public exponent
    pub e: &'a BigUint,
}

/// Borrowed private parameters of a key.
#[derive(Clone, Copy)]
pub struct PrivateView<'a> {
    /// Private exponent
    pub d: &'a BigUint,
    /// First prime factor
    pub p: &'a BigUint,
    /// Second prime factor
    pub q: &'a BigUint,
    /// `d mod (p - 1)`
    pub dmp1: &'a BigUint,
    /// `d mod (q - 1)`
    pub dmq1: &'a BigUint,
    /// `q^-1 mod p`
    pub iqmp: &'a BigUint,
}

impl PrivateView<'_> {
    fn values(&self) -> [&BigUint; 6] {
        [self.d, self.p, self.q, self.dmp1, self.dmq1, self.iqmp]
    }
}

impl PartialEq for PrivateView<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.values()
            .iter()
            .zip(other.values().iter())
            .fold(subtle::Choice::from(1), |acc, (a, b)| {
                let a = Zeroizing::new(a.to_bytes_be());
                let b = Zeroizing::new(b.to_bytes_be());
                acc & a.as_slice().ct_eq(b.as_slice())
            })
            .into()
    }
}

impl Eq for PrivateView<'_> {}

impl fmt::Debug for PrivateView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateView").finish_non_exhaustive()
    }
}

/// Everything exported from a key handle in one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyView<'a> {
    /// Modulus and public exponent.
    pub public: PublicView<'a>,
    /// Private parameters, when requested and present.
    pub private: Option<PrivateView<'a>>,
}

impl KeyView<'_> {
    /// Copies the viewed values into owned parameters, ready to be imported
    /// into another handle.
    pub fn to_params(&self) -> KeyParams {
        let n = self.public.n.clone();
        let e = self.public.e.clone();
        match self.private {
            None => KeyParams::public(n, e),
            Some(private) => KeyParams::Private(PrivateParams::new(
                n,
                e,
                private.d.clone(),
                private.p.clone(),
                private.q.clone(),
                private.dmp1.clone(),
                private.dmq1.clone(),
                private.iqmp.clone(),
            )),
        }
    }
}
