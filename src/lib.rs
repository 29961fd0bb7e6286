#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # Storage modes
//!
//! Library revisions before OpenSSL 1.1.0 (and LibreSSL before 2.7.0) keep
//! RSA parameters in public struct fields. Later revisions hide them behind
//! `set0`/`get0` accessors which take ownership in three separate calls.
//! This crate models both layouts as [`KeyStorage`](traits::KeyStorage)
//! implementations:
//!
//! - [`LegacyFields`]: direct assignment, cannot fail.
//! - [`AccessorFields`]: staged transfer through
//!   [`Accessors`](traits::Accessors). A refused stage releases its own
//!   parameters and those of every later stage; earlier stages stay attached.
//!
//! [`ConfiguredStorage`] is `AccessorFields` unless the `legacy-fields`
//! feature is enabled, and [`Revision::mode`] maps a library version number
//! to the [`Mode`] it requires.
//!
//! # Importing parameters
//!
//! ```
//! use rsa_compat::{BigUint, Error, KeyParams, LegacyFields, RsaKey};
//!
//! let n = BigUint::from(3233u32);
//! let e = BigUint::from(17u32);
//!
//! // Private parameters come all together or not at all.
//! let partial = KeyParams::from_parts(
//!     n.clone(), e.clone(), Some(BigUint::from(2753u32)), None, None, None, None, None,
//! );
//! assert_eq!(partial, Err(Error::IncompletePrivateKey));
//!
//! let mut key = RsaKey::<LegacyFields>::default();
//! key.import(KeyParams::public(n, e))?;
//! assert!(!key.valid_size());
//! assert!(key.export(true).private.is_none());
//! # Ok::<(), Error>(())
//! ```

pub use num_bigint::BigUint;
pub use rand_core;

mod algorithms;
pub mod errors;
pub mod mode;
pub mod params;
pub mod storage;
pub mod traits;
pub mod view;

mod context;
mod key;

pub use crate::{
    context::CryptoContext,
    errors::{Error, Result, Stage},
    key::{RsaKey, RSA_BITS, RSA_EXPONENT, RSA_SIZE},
    mode::{Mode, Revision},
    params::{KeyParams, PrivateParams, PublicParams},
    storage::{AccessorFields, ConfiguredStorage, LegacyFields},
    view::{KeyView, PrivateView, PublicView},
};
