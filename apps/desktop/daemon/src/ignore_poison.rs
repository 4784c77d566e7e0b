//! Extension trait to ignore mutex poisoning.
//!
//! Row labels, bar state and view counters are plain values where a panic in another
//! thread doesn't leave anything half-updated, so `.lock_ignore_poison()` replaces
//! `.lock().unwrap_or_else(|e| e.into_inner())` throughout.

use std::sync::{Mutex, MutexGuard};

pub trait IgnorePoison<T> {
    /// Locks the mutex, ignoring poison.
    fn lock_ignore_poison(&self) -> MutexGuard<'_, T>;
}

impl<T> IgnorePoison<T> for Mutex<T> {
    fn lock_ignore_poison(&self) -> MutexGuard<'_, T> {
        self.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn poisoned_mutex_still_yields_value() {
        let shared = Arc::new(Mutex::new(7));
        let clone = Arc::clone(&shared);
        let _ = std::thread::spawn(move || {
            let _guard = clone.lock().unwrap();
            panic!("poison it");
        })
        .join();

        assert!(shared.is_poisoned());
        assert_eq!(*shared.lock_ignore_poison(), 7);
    }
}
