//! Poison-recovering lock helpers.
//!
//! The only shared mutable state in this crate is the width cache in
//! [`crate::cells`] and the style registry in [`crate::registry`]. Both hold
//! read-mostly data that stays valid even if a writer panicked, so a
//! poisoned lock is recovered instead of propagated.

use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Lock a mutex, recovering from poison if necessary.
#[inline]
pub fn lock_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Acquire a read lock, recovering from poison if necessary.
#[inline]
pub fn read_recover<T>(rwlock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    rwlock.read().unwrap_or_else(|poisoned| {
        log::warn!("recovered poisoned read lock");
        poisoned.into_inner()
    })
}

/// Acquire a write lock, recovering from poison if necessary.
#[inline]
pub fn write_recover<T>(rwlock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    rwlock.write().unwrap_or_else(|poisoned| {
        log::warn!("recovered poisoned write lock");
        poisoned.into_inner()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};

    #[test]
    fn test_lock_recover_after_poison() {
        let mutex = Mutex::new(42);
        let _ = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = mutex.lock().unwrap();
            panic!("intentional panic to poison mutex");
        }));
        assert!(mutex.lock().is_err(), "Mutex should be poisoned");
        assert_eq!(*lock_recover(&mutex), 42);
    }

    #[test]
    fn test_rwlock_recover_after_poison() {
        let lock = RwLock::new(vec![1, 2, 3]);
        let _ = panic::catch_unwind(AssertUnwindSafe(|| {
            let _guard = lock.write().unwrap();
            panic!("intentional panic to poison rwlock");
        }));
        assert!(lock.read().is_err());
        write_recover(&lock).push(4);
        assert_eq!(read_recover(&lock).len(), 4);
    }
}
