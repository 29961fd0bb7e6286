//! Accessor-based storage of library revisions 1.1.0 and later.

use core::fmt;

use num_bigint::BigUint;
use zeroize::Zeroizing;

use crate::errors::{Error, Result, Stage};
use crate::mode::Mode;
use crate::params::{CrtGroup, FactorGroup, KeyGroup, KeyParams, PublicParams};
use crate::traits::keys::modulus_size;
use crate::traits::{Accessors, KeyStorage};
use crate::view::{PrivateView, PublicView};

/// Opaque key object whose parameters are only reachable through
/// [`Accessors`].
///
/// A `set0` call replaces the values already held for its group, and a key
/// group without a private exponent keeps the current one. Importing through
/// [`KeyStorage::attach`] starts from an empty object, so the handle ends up
/// holding exactly the imported parameters.
#[derive(Default)]
pub struct AccessorFields {
    n: Option<BigUint>,
    e: Option<BigUint>,
    d: Option<Zeroizing<BigUint>>,
    p: Option<Zeroizing<BigUint>>,
    q: Option<Zeroizing<BigUint>>,
    dmp1: Option<Zeroizing<BigUint>>,
    dmq1: Option<Zeroizing<BigUint>>,
    iqmp: Option<Zeroizing<BigUint>>,
}

impl Accessors for AccessorFields {
    fn set0_key(&mut self, key: KeyGroup) -> core::result::Result<(), KeyGroup> {
        self.n = Some(key.n);
        self.e = Some(key.e);
        if let Some(d) = key.d {
            self.d = Some(d);
        }
        Ok(())
    }

    fn set0_factors(&mut self, factors: FactorGroup) -> core::result::Result<(), FactorGroup> {
        self.p = Some(factors.p);
        self.q = Some(factors.q);
        Ok(())
    }

    fn set0_crt_params(&mut self, crt: CrtGroup) -> core::result::Result<(), CrtGroup> {
        self.dmp1 = Some(crt.dmp1);
        self.dmq1 = Some(crt.dmq1);
        self.iqmp = Some(crt.iqmp);
        Ok(())
    }

    fn get0_key(&self) -> (Option<&BigUint>, Option<&BigUint>, Option<&BigUint>) {
        (self.n.as_ref(), self.e.as_ref(), self.d.as_deref())
    }

    fn get0_factors(&self) -> (Option<&BigUint>, Option<&BigUint>) {
        (self.p.as_deref(), self.q.as_deref())
    }

    fn get0_crt_params(&self) -> (Option<&BigUint>, Option<&BigUint>, Option<&BigUint>) {
        (self.dmp1.as_deref(), self.dmq1.as_deref(), self.iqmp.as_deref())
    }

    fn size(&self) -> usize {
        self.n.as_ref().map_or(0, modulus_size)
    }

    fn bits(&self) -> usize {
        self.n.as_ref().map_or(0, BigUint::bits)
    }
}

impl KeyStorage for AccessorFields {
    const MODE: Mode = Mode::Modern;

    fn attach(&mut self, params: KeyParams) -> Result<()> {
        // Previously held values are zeroized on drop.
        *self = AccessorFields::default();
        import_staged(self, params)
    }

    fn modulus_size(&self) -> Option<(usize, usize)> {
        let (n, _, _) = self.get0_key();
        n.map(|_| (self.size(), self.bits()))
    }

    fn public_view(&self) -> Option<PublicView<'_>> {
        match self.get0_key() {
            (Some(n), Some(e), _) => Some(PublicView { n, e }),
            _ => None,
        }
    }

    fn private_view(&self) -> Option<PrivateView<'_>> {
        match (self.get0_key(), self.get0_factors(), self.get0_crt_params()) {
            ((_, _, Some(d)), (Some(p), Some(q)), (Some(dmp1), Some(dmq1), Some(iqmp))) => {
                Some(PrivateView {
                    d,
                    p,
                    q,
                    dmp1,
                    dmq1,
                    iqmp,
                })
            }
            _ => None,
        }
    }
}

impl fmt::Debug for AccessorFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorFields")
            .field("bits", &self.bits())
            .field("private", &self.d.is_some())
            .finish()
    }
}

/// Transfers `params` into `key` in three ordered stages: key, factors,
/// CRT coefficients.
///
/// A refused group and every group after it are dropped here, so nothing is
/// leaked and nothing is released twice. Groups from earlier stages stay
/// attached to `key`.
pub(crate) fn import_staged<A: Accessors + ?Sized>(key: &mut A, params: KeyParams) -> Result<()> {
    let (head, rest) = match params {
        KeyParams::Public(PublicParams { n, e }) => (KeyGroup { n, e, d: None }, None),
        KeyParams::Private(params) => {
            let (head, factors, crt) = params.into_groups();
            (head, Some((factors, crt)))
        }
    };

    if let Err(refused) = key.set0_key(head) {
        let mut released = refused.count();
        drop(refused);
        if let Some(rest) = rest {
            released += FactorGroup::LEN + CrtGroup::LEN;
            drop(rest);
        }
        return Err(refuse(Stage::Key, released));
    }
    tracing::trace!(stage = %Stage::Key, "parameters attached");

    let Some((factors, crt)) = rest else {
        return Ok(());
    };

    if let Err(refused) = key.set0_factors(factors) {
        drop(refused);
        drop(crt);
        return Err(refuse(Stage::Factors, FactorGroup::LEN + CrtGroup::LEN));
    }
    tracing::trace!(stage = %Stage::Factors, "parameters attached");

    if let Err(refused) = key.set0_crt_params(crt) {
        drop(refused);
        return Err(refuse(Stage::CrtParams, CrtGroup::LEN));
    }
    tracing::trace!(stage = %Stage::CrtParams, "parameters attached");

    Ok(())
}

fn refuse(stage: Stage, released: usize) -> Error {
    tracing::debug!(%stage, released, "key storage refused parameters");
    Error::Import { stage, released }
}
