use std::sync::{Arc, Mutex, PoisonError};

/// Zero-or-one owned resource handle.
///
/// Only touched from inside the owning observer's critical sections, so the
/// lock is never contended; it exists to make the slot `Sync`.
pub(crate) struct Slot<T: ?Sized> {
    inner: Mutex<Option<Arc<T>>>,
}

impl<T: ?Sized> Slot<T> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(None),
        }
    }

    pub(crate) fn take(&self) -> Option<Arc<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    pub(crate) fn get(&self) -> Option<Arc<T>> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Store `handle`, returning whatever was there before.
    pub(crate) fn put(&self, handle: Arc<T>) -> Option<Arc<T>> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle)
    }

    pub(crate) fn is_occupied(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
