//! Direct field storage of library revisions before 1.1.0.

use core::fmt;

use num_bigint::BigUint;
use zeroize::Zeroizing;

use crate::errors::Result;
use crate::mode::Mode;
use crate::params::{KeyParams, PublicParams};
use crate::traits::keys::modulus_size;
use crate::traits::KeyStorage;
use crate::view::{PrivateView, PublicView};

/// Key parameters held in plain fields which are assigned directly.
///
/// Assignment cannot fail, so attaching parameters always succeeds. Private
/// values are zeroized when released.
#[derive(Default)]
pub struct LegacyFields {
    n: Option<BigUint>,
    e: Option<BigUint>,
    d: Option<Zeroizing<BigUint>>,
    p: Option<Zeroizing<BigUint>>,
    q: Option<Zeroizing<BigUint>>,
    dmp1: Option<Zeroizing<BigUint>>,
    dmq1: Option<Zeroizing<BigUint>>,
    iqmp: Option<Zeroizing<BigUint>>,
}

impl KeyStorage for LegacyFields {
    const MODE: Mode = Mode::Legacy;

    fn attach(&mut self, params: KeyParams) -> Result<()> {
        match params {
            KeyParams::Public(PublicParams { n, e }) => {
                self.n = Some(n);
                self.e = Some(e);
                // A public import leaves a public key behind.
                self.d = None;
                self.p = None;
                self.q = None;
                self.dmp1 = None;
                self.dmq1 = None;
                self.iqmp = None;
            }
            KeyParams::Private(params) => {
                let (key, factors, crt) = params.into_groups();
                self.n = Some(key.n);
                self.e = Some(key.e);
                self.d = key.d;
                self.p = Some(factors.p);
                self.q = Some(factors.q);
                self.dmp1 = Some(crt.dmp1);
                self.dmq1 = Some(crt.dmq1);
                self.iqmp = Some(crt.iqmp);
            }
        }
        Ok(())
    }

    fn modulus_size(&self) -> Option<(usize, usize)> {
        self.n.as_ref().map(|n| (modulus_size(n), n.bits()))
    }

    fn public_view(&self) -> Option<PublicView<'_>> {
        match (&self.n, &self.e) {
            (Some(n), Some(e)) => Some(PublicView { n, e }),
            _ => None,
        }
    }

    fn private_view(&self) -> Option<PrivateView<'_>> {
        match (&self.d, &self.p, &self.q, &self.dmp1, &self.dmq1, &self.iqmp) {
            (Some(d), Some(p), Some(q), Some(dmp1), Some(dmq1), Some(iqmp)) => Some(PrivateView {
                d,
                p,
                q,
                dmp1,
                dmq1,
                iqmp,
            }),
            _ => None,
        }
    }
}

impl fmt::Debug for LegacyFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LegacyFields")
            .field("bits", &self.n.as_ref().map(|n| n.bits()))
            .field("private", &self.d.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::PrivateParams;

    fn toy_private() -> KeyParams {
        let u = |v: u32| BigUint::from(v);
        PrivateParams::new(u(3233), u(17), u(2753), u(61), u(53), u(53), u(49), u(38)).into()
    }

    #[test]
    fn assignment_never_fails() {
        let mut fields = LegacyFields::default();
        assert!(fields.public_view().is_none());
        fields.attach(toy_private()).unwrap();
        fields.attach(toy_private()).unwrap();

        let private = fields.private_view().unwrap();
        assert_eq!(private.d, &BigUint::from(2753u32));
        assert_eq!(private.iqmp, &BigUint::from(38u32));
        assert_eq!(fields.modulus_size(), Some((2, 12)));
    }

    #[test]
    fn public_import_drops_private_fields() {
        let mut fields = LegacyFields::default();
        fields.attach(toy_private()).unwrap();
        fields
            .attach(KeyParams::public(
                BigUint::from(3233u32),
                BigUint::from(17u32),
            ))
            .unwrap();
        assert!(fields.public_view().is_some());
        assert!(fields.private_view().is_none());
    }
}
