use core::fmt;

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand_core::CryptoRngCore;
use zeroize::Zeroizing;

use crate::algorithms::generate::generate_private_params;
use crate::errors::{Error, Result};
use crate::mode::Mode;
use crate::params::KeyParams;
use crate::storage::ConfiguredStorage;
use crate::traits::{KeyStorage, PublicKeyParts};
use crate::view::KeyView;

/// Modulus size, in bits, of a valid key.
pub const RSA_BITS: usize = 2048;

/// Encoded modulus size, in bytes, of a valid key.
pub const RSA_SIZE: usize = 256;

/// Public exponent of generated keys.
pub const RSA_EXPONENT: u64 = 65537;

/// An opaque RSA key handle.
///
/// The handle owns every parameter attached to it and releases them when
/// dropped; private parameters are zeroized. `S` selects the field layout of
/// the underlying library revision and defaults to the one configured for
/// this build.
pub struct RsaKey<S: KeyStorage = ConfiguredStorage> {
    storage: S,
}

impl RsaKey<ConfiguredStorage> {
    /// Allocates an empty handle using the configured storage. Parameters
    /// are attached with [`RsaKey::import`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates a 2048-bit key pair with public exponent 65537, using the
    /// configured storage.
    ///
    /// Failures are returned to the caller only. Use
    /// [`CryptoContext::generate`](crate::CryptoContext::generate) to also
    /// queue the diagnostic on a context.
    pub fn generate<R: CryptoRngCore + ?Sized>(rng: &mut R) -> Result<Self> {
        Self::generate_with_storage(rng)
    }
}

impl<S: KeyStorage> Default for RsaKey<S> {
    fn default() -> Self {
        RsaKey {
            storage: S::default(),
        }
    }
}

impl<S: KeyStorage> RsaKey<S> {
    /// Generates a 2048-bit key pair with public exponent 65537 into a handle
    /// backed by `S`.
    ///
    /// Either a complete private key or an [`Error::Generation`] is
    /// returned, never a partially populated handle.
    pub fn generate_with_storage<R: CryptoRngCore + ?Sized>(rng: &mut R) -> Result<Self> {
        let exp = BigUint::from(RSA_EXPONENT);
        let generated = generate_private_params(rng, RSA_BITS, &exp)
            .and_then(Self::from_params);

        match generated {
            Ok(key) => {
                tracing::debug!(mode = %S::MODE, bits = RSA_BITS, "generated key pair");
                Ok(key)
            }
            Err(err) => {
                let err = match err {
                    Error::Generation { .. } => err,
                    other => Error::generation(other),
                };
                tracing::warn!(mode = %S::MODE, %err, "key generation failed");
                Err(err)
            }
        }
    }

    /// Allocates a handle backed by `S` and imports `params` into it.
    pub fn from_params(params: impl Into<KeyParams>) -> Result<Self> {
        let mut key = Self::default();
        key.import(params)?;
        Ok(key)
    }

    /// Returns the storage mode of this handle.
    pub fn mode(&self) -> Mode {
        S::MODE
    }

    /// Transfers ownership of `params` into this handle.
    ///
    /// On failure every parameter the handle did not take is released before
    /// the error is returned. Parameters attached by earlier accessor stages
    /// remain owned by the handle; see [`Error::Import`].
    pub fn import(&mut self, params: impl Into<KeyParams>) -> Result<()> {
        let params = params.into();
        tracing::trace!(mode = %S::MODE, private = params.is_private(), "importing key parameters");
        self.storage.attach(params)
    }

    /// Returns borrowed views of the key's parameters. The private
    /// parameters are included when `want_private` is set and the key holds
    /// them.
    ///
    /// # Panics
    ///
    /// Panics if no public parameters have been attached to the handle.
    pub fn export(&self, want_private: bool) -> KeyView<'_> {
        let public = match self.storage.public_view() {
            Some(public) => public,
            None => panic!("exporting from a key handle without public parameters"),
        };
        let private = if want_private {
            self.storage.private_view()
        } else {
            None
        };
        KeyView { public, private }
    }

    /// Returns `true` if the modulus is encoded in exactly 256 bytes and has
    /// exactly 2048 significant bits.
    ///
    /// # Panics
    ///
    /// Panics if no modulus has been attached to the handle.
    pub fn valid_size(&self) -> bool {
        self.size() == RSA_SIZE && self.bits() == RSA_BITS
    }

    /// Returns `true` if the handle holds every private parameter.
    pub fn is_private(&self) -> bool {
        self.storage.private_view().is_some()
    }

    /// Performs basic sanity checks on the key.
    /// Returns `Ok(())` if everything is good, otherwise an appropriate error.
    ///
    /// For private keys this checks that `n == p * q`, that `d` inverts `e`
    /// modulo `p - 1` and `q - 1`, and that the CRT coefficients match.
    pub fn check(&self) -> Result<()> {
        let public = self.storage.public_view().ok_or(Error::InvalidModulus)?;
        if public.n.is_zero() {
            return Err(Error::InvalidModulus);
        }
        if *public.e < BigUint::from(2u8) || public.e.is_even() {
            return Err(Error::InvalidExponent);
        }

        let private = match self.storage.private_view() {
            Some(private) => private,
            None => return Ok(()),
        };

        let one = BigUint::one();
        if *private.p <= one || *private.q <= one {
            return Err(Error::InvalidPrime);
        }
        if private.p * private.q != *public.n {
            return Err(Error::InvalidModulus);
        }

        // Check that de ≡ 1 mod p-1, and de ≡ 1 mod q-1.
        let de = Zeroizing::new(private.d * public.e);
        for (prime, exp) in [(private.p, private.dmp1), (private.q, private.dmq1)] {
            let prime1 = Zeroizing::new(prime - &one);
            if &*de % &*prime1 != one {
                return Err(Error::InvalidExponent);
            }
            if *Zeroizing::new(private.d % &*prime1) != *exp {
                return Err(Error::InvalidExponent);
            }
        }

        if (private.iqmp * private.q) % private.p != one {
            return Err(Error::InvalidCoefficient);
        }

        Ok(())
    }
}

/// # Panics
///
/// Every method panics if no public parameters have been attached to the
/// handle.
impl<S: KeyStorage> PublicKeyParts for RsaKey<S> {
    fn n(&self) -> &BigUint {
        self.export(false).public.n
    }

    fn e(&self) -> &BigUint {
        self.export(false).public.e
    }

    fn size(&self) -> usize {
        self.modulus_size().0
    }

    fn bits(&self) -> usize {
        self.modulus_size().1
    }
}

impl<S: KeyStorage> RsaKey<S> {
    fn modulus_size(&self) -> (usize, usize) {
        match self.storage.modulus_size() {
            Some(size) => size,
            None => panic!("checking the size of a key handle without a modulus"),
        }
    }
}

impl<S: KeyStorage> fmt::Debug for RsaKey<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaKey")
            .field("mode", &S::MODE)
            .field("bits", &self.storage.modulus_size().map(|(_, bits)| bits))
            .field("private", &self.is_private())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::PrivateParams;
    use crate::storage::{AccessorFields, LegacyFields};
    use hex_literal::hex;
    use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};

    fn toy_private() -> PrivateParams {
        let u = |v: u32| BigUint::from(v);
        PrivateParams::new(u(3233), u(17), u(2753), u(61), u(53), u(53), u(49), u(38))
    }

    // 2048-bit sized modulus whose top byte is 0x71, so it only has 2047
    // significant bits.
    const SHORT_MODULUS: [u8; 256] = hex!(
        "7163c842b2190a8970942b2764aed42d4124647b6f30e09a2da1c0e2"
        "56aa2ee24e790c40c96a4bd66d75c371a915e0703c476b4e1a06f1bd"
        "38c5a3c10ae3bd30f4ef62a5aa4f512ad145a06c48e96469a22ce8e6"
        "21e052f0669a8c34155512d82e55447f0b7e18da94bd911ac7b3aabe"
        "706843668964593ee71b2e5e484bcf0c7834101ab5d61bba1e63e623"
        "7af40489ce36a260dab70add4fbec24d659db0f7cac099b0a3aa4549"
        "acde7fc858a793a975e6cf65ca276b743525f0883980f6ad069bec34"
        "6d787797386d50fe0c9734be967c7d84ae5b8f349b094079457c0c0c"
        "6fee34c42a0b832603804f71e49f3320081637512c6cbf2bb81b6f6b"
        "e239846d"
    );

    fn public_key<S: KeyStorage>(n: BigUint) -> RsaKey<S> {
        RsaKey::from_params(KeyParams::public(n, BigUint::from(RSA_EXPONENT))).unwrap()
    }

    fn sizes_in<S: KeyStorage>() {
        let short = BigUint::from_bytes_be(&SHORT_MODULUS);
        assert_eq!(short.bits(), 2047);
        assert!(!public_key::<S>(short).valid_size());

        let mut full = SHORT_MODULUS;
        full[0] |= 0x80;
        assert!(public_key::<S>(BigUint::from_bytes_be(&full)).valid_size());

        let long = BigUint::one() << 2048;
        assert!(!public_key::<S>(long).valid_size());
    }

    #[test]
    fn valid_size_legacy() {
        sizes_in::<LegacyFields>();
    }

    #[test]
    fn valid_size_modern() {
        sizes_in::<AccessorFields>();
    }

    #[test]
    #[should_panic(expected = "without a modulus")]
    fn valid_size_needs_modulus() {
        RsaKey::new().valid_size();
    }

    #[test]
    #[should_panic(expected = "without public parameters")]
    fn export_needs_public_parameters() {
        RsaKey::<LegacyFields>::default().export(false);
    }

    #[test]
    fn export_public_only_key() {
        let key: RsaKey = RsaKey::from_params(KeyParams::public(
            BigUint::from(3233u32),
            BigUint::from(17u32),
        ))
        .unwrap();
        let view = key.export(true);
        assert_eq!(view.public.n, &BigUint::from(3233u32));
        assert!(view.private.is_none());
        assert!(!key.is_private());
    }

    #[test]
    fn check_toy_key() {
        let key = RsaKey::<AccessorFields>::from_params(toy_private()).unwrap();
        assert!(key.is_private());
        key.check().unwrap();
    }

    #[test]
    fn check_detects_inconsistency() {
        let u = |v: u32| BigUint::from(v);
        let bad_coefficient =
            PrivateParams::new(u(3233), u(17), u(2753), u(61), u(53), u(53), u(49), u(39));
        let key = RsaKey::<LegacyFields>::from_params(bad_coefficient).unwrap();
        assert_eq!(key.check(), Err(Error::InvalidCoefficient));

        let bad_modulus =
            PrivateParams::new(u(3127), u(17), u(2753), u(61), u(53), u(53), u(49), u(38));
        let key = RsaKey::<LegacyFields>::from_params(bad_modulus).unwrap();
        assert_eq!(key.check(), Err(Error::InvalidModulus));

        let bad_exponent =
            PrivateParams::new(u(3233), u(17), u(2752), u(61), u(53), u(53), u(49), u(38));
        let key = RsaKey::<AccessorFields>::from_params(bad_exponent).unwrap();
        assert_eq!(key.check(), Err(Error::InvalidExponent));
    }

    #[test]
    fn generation_reports_entropy_failure() {
        struct FailingRng;

        impl rand_core::RngCore for FailingRng {
            fn next_u32(&mut self) -> u32 {
                unimplemented!()
            }

            fn next_u64(&mut self) -> u64 {
                unimplemented!()
            }

            fn fill_bytes(&mut self, _: &mut [u8]) {
                unimplemented!()
            }

            fn try_fill_bytes(&mut self, _: &mut [u8]) -> core::result::Result<(), rand_core::Error> {
                Err(rand_core::Error::new("entropy source exhausted"))
            }
        }

        impl rand_core::CryptoRng for FailingRng {}

        let err = RsaKey::generate(&mut FailingRng).unwrap_err();
        match err {
            Error::Generation { reason } => assert!(reason.contains("entropy source exhausted")),
            other => panic!("unexpected error: {other}"),
        }
    }

    fn key_parts_in<S: KeyStorage>() {
        let key = RsaKey::<S>::from_params(toy_private()).unwrap();
        assert_eq!(key.n(), &BigUint::from(3233u32));
        assert_eq!(key.e(), &BigUint::from(17u32));
        assert_eq!((key.size(), key.bits()), (2, 12));

        let short = public_key::<S>(BigUint::from_bytes_be(&SHORT_MODULUS));
        assert_eq!((short.size(), short.bits()), (RSA_SIZE, 2047));
    }

    #[test]
    fn key_parts_legacy() {
        key_parts_in::<LegacyFields>();
    }

    #[test]
    fn key_parts_modern() {
        key_parts_in::<AccessorFields>();
    }

    #[test]
    #[should_panic(expected = "without a modulus")]
    fn bits_need_modulus() {
        RsaKey::<AccessorFields>::default().bits();
    }

    #[test]
    fn debug_is_redacted() {
        let key = RsaKey::<AccessorFields>::from_params(toy_private()).unwrap();
        let dbg = format!("{:?}", key);
        assert_eq!(dbg, "RsaKey { mode: Modern, bits: Some(12), private: true }");
    }

    #[test]
    fn generated_key_is_valid() {
        let mut rng = ChaCha8Rng::from_seed([42; 32]);
        let key = RsaKey::<LegacyFields>::generate_with_storage(&mut rng).unwrap();
        assert!(key.valid_size());
        assert_eq!(key.export(false).public.e, &BigUint::from(RSA_EXPONENT));
        key.check().unwrap();
    }
}
