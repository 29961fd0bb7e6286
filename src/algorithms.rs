//! Useful algorithms related to RSA.

pub(crate) mod generate;
mod prime;
