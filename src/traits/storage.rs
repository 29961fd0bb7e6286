//! The seam between a key handle and a library revision's field layout.

use num_bigint::BigUint;

use crate::errors::Result;
use crate::mode::Mode;
use crate::params::{CrtGroup, FactorGroup, KeyGroup, KeyParams};
use crate::view::{PrivateView, PublicView};

/// Storage for the parameters of one RSA key, laid out the way a particular
/// library revision lays them out.
///
/// Implementations must keep the private parameters all-or-nothing: a
/// storage either yields a complete [`PrivateView`] or none at all.
pub trait KeyStorage: Default {
    /// Mode this storage implements.
    const MODE: Mode;

    /// Takes ownership of `params`, replacing any parameters attached
    /// before.
    ///
    /// Parameters the storage does not end up owning are released before an
    /// error is returned.
    fn attach(&mut self, params: KeyParams) -> Result<()>;

    /// Returns the encoded byte length and the significant bit length of the
    /// modulus, or `None` if no modulus is attached.
    fn modulus_size(&self) -> Option<(usize, usize)>;

    /// Returns the modulus and public exponent, if attached.
    fn public_view(&self) -> Option<PublicView<'_>>;

    /// Returns the private parameters, if all of them are attached.
    fn private_view(&self) -> Option<PrivateView<'_>>;
}

/// Ownership-transferring accessors of a modern key object.
///
/// Each `set0` call either takes ownership of the whole group or hands the
/// group back untouched.
pub trait Accessors {
    /// Attaches the modulus, public exponent and optional private exponent.
    fn set0_key(&mut self, key: KeyGroup) -> core::result::Result<(), KeyGroup>;

    /// Attaches the prime factors.
    fn set0_factors(&mut self, factors: FactorGroup) -> core::result::Result<(), FactorGroup>;

    /// Attaches the CRT coefficients.
    fn set0_crt_params(&mut self, crt: CrtGroup) -> core::result::Result<(), CrtGroup>;

    /// Returns `(n, e, d)`.
    fn get0_key(&self) -> (Option<&BigUint>, Option<&BigUint>, Option<&BigUint>);

    /// Returns `(p, q)`.
    fn get0_factors(&self) -> (Option<&BigUint>, Option<&BigUint>);

    /// Returns `(dmp1, dmq1, iqmp)`.
    fn get0_crt_params(&self) -> (Option<&BigUint>, Option<&BigUint>, Option<&BigUint>);

    /// Encoded byte length of the modulus, zero without a modulus.
    fn size(&self) -> usize;

    /// Significant bits of the modulus, zero without a modulus.
    fn bits(&self) -> usize;
}
