//! Process-scoped cryptographic state.

use core::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rand_core::{CryptoRngCore, OsRng};
use zeroize::Zeroize;

use crate::errors::Result;
use crate::key::RsaKey;
use crate::storage::ConfiguredStorage;
use crate::traits::KeyStorage;

/// Holds the state shared by every key operation of a process: the entropy
/// source used for generation and the queue of diagnostics reported by
/// failed operations.
///
/// Create one context at startup and release it once with
/// [`CryptoContext::finalize`] after every key handle has been dropped.
/// Dropping the context without finalizing it releases the same state.
///
/// The context is `Sync` when the entropy source is `Send`. Concurrent
/// [`generate`](CryptoContext::generate) calls take turns on the entropy
/// source.
pub struct CryptoContext<R = OsRng> {
    rng: Mutex<R>,
    errors: Mutex<Vec<String>>,
    released: bool,
}

impl CryptoContext<OsRng> {
    /// Creates a context drawing entropy from the operating system.
    pub fn new() -> Self {
        Self::with_rng(OsRng)
    }
}

impl Default for CryptoContext<OsRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> CryptoContext<R> {
    /// Creates a context drawing entropy from `rng`.
    pub fn with_rng(rng: R) -> Self {
        tracing::debug!("cryptographic context initialized");
        CryptoContext {
            rng: Mutex::new(rng),
            errors: Mutex::new(Vec::new()),
            released: false,
        }
    }

    /// Returns the diagnostics queued by failed operations, oldest first.
    pub fn errors(&self) -> Vec<String> {
        lock(&self.errors).clone()
    }

    /// Removes and returns the queued diagnostics.
    pub fn take_errors(&self) -> Vec<String> {
        core::mem::take(&mut *lock(&self.errors))
    }

    /// Releases the context's state. The context cannot be used afterwards.
    pub fn finalize(mut self) {
        self.release();
    }

    fn push_error(&self, message: String) {
        lock(&self.errors).push(message);
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        let errors = self
            .errors
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        let pending = errors.len();
        errors.zeroize();

        tracing::debug!(pending, "cryptographic context released");
    }
}

impl<R: CryptoRngCore> CryptoContext<R> {
    /// Generates a 2048-bit key pair with public exponent 65537 in the
    /// configured storage.
    ///
    /// On failure the diagnostic is also queued on the context.
    pub fn generate(&self) -> Result<RsaKey<ConfiguredStorage>> {
        self.generate_with_storage()
    }

    /// Generates a 2048-bit key pair with public exponent 65537 in storage
    /// `S`.
    pub fn generate_with_storage<S: KeyStorage>(&self) -> Result<RsaKey<S>> {
        let generated = {
            let mut rng = lock(&self.rng);
            RsaKey::<S>::generate_with_storage(&mut *rng)
        };
        if let Err(err) = &generated {
            self.push_error(err.to_string());
        }
        generated
    }
}

impl<R> Drop for CryptoContext<R> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<R> fmt::Debug for CryptoContext<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoContext")
            .field("pending_errors", &lock(&self.errors).len())
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
