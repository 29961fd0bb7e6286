//! Traits related to the key components

use num_bigint::BigUint;

use crate::params::{PrivateParams, PublicParams};
use crate::view::PublicView;

/// Components of an RSA public key.
pub trait PublicKeyParts {
    /// Returns the modulus of the key.
    fn n(&self) -> &BigUint;

    /// Returns the public exponent of the key.
    fn e(&self) -> &BigUint;

    /// Returns the modulus size in bytes. Raw signatures and ciphertexts for
    /// or by this public key will have the same size.
    fn size(&self) -> usize {
        modulus_size(self.n())
    }

    /// Returns the number of significant bits of the modulus.
    fn bits(&self) -> usize {
        self.n().bits()
    }
}

/// Encoded byte length of a modulus.
pub(crate) fn modulus_size(n: &BigUint) -> usize {
    (n.bits() + 7) / 8
}

impl PublicKeyParts for PublicView<'_> {
    fn n(&self) -> &BigUint {
        self.n
    }

    fn e(&self) -> &BigUint {
        self.e
    }
}

impl PublicKeyParts for PublicParams {
    fn n(&self) -> &BigUint {
        &self.n
    }

    fn e(&self) -> &BigUint {
        &self.e
    }
}

impl PublicKeyParts for PrivateParams {
    fn n(&self) -> &BigUint {
        PrivateParams::n(self)
    }

    fn e(&self) -> &BigUint {
        PrivateParams::e(self)
    }
}
