//! Key-related trait definitions.

pub(crate) mod keys;
mod storage;

pub use keys::PublicKeyParts;
pub use storage::{Accessors, KeyStorage};
