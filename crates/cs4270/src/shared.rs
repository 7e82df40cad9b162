//! Shared handle for concurrent callers.
//!
//! Stream callbacks and mixer-control access can come from different
//! contexts. Wrapping the driver in a blocking mutex serializes them, so
//! every read-modify-write stays atomic with respect to the cache.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::driver::Cs4270;

/// A [`Cs4270`] behind a blocking mutex.
pub struct SharedCs4270<M: RawMutex, B, S, D> {
    inner: Mutex<M, RefCell<Cs4270<B, S, D>>>,
}

impl<M: RawMutex, B, S, D> SharedCs4270<M, B, S, D> {
    /// Wrap an attached driver.
    pub const fn new(codec: Cs4270<B, S, D>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(codec)),
        }
    }

    /// Run `f` with exclusive access to the driver.
    ///
    /// `f` must not call back into the same handle.
    pub fn with<R>(&self, f: impl FnOnce(&mut Cs4270<B, S, D>) -> R) -> R {
        self.inner.lock(|codec| f(&mut codec.borrow_mut()))
    }

    /// Unwrap the driver.
    pub fn into_inner(self) -> Cs4270<B, S, D> {
        self.inner.into_inner().into_inner()
    }
}
