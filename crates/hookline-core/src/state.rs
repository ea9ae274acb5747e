//! Call state shared between the event task and the command task.

use parking_lot::{Mutex, MutexGuard};

/// The three logical call-control states mirrored on the device indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallState {
    /// Microphone muted
    pub mute: bool,
    /// Off-hook (call active)
    pub hook: bool,
    /// Ringing
    pub ring: bool,
}

/// Call state behind one exclusive lock.
///
/// Hook, mute and ring interact (lifting the hook cancels a ring), so a single
/// lock covers all three fields and every read-then-write runs inside it.
#[derive(Debug, Default)]
pub struct CallStateStore {
    inner: Mutex<CallState>,
}

impl CallStateStore {
    /// Create a store with every state cleared.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter the critical section. Hold the guard across the device writes
    /// that mirror a state change.
    pub fn lock(&self) -> MutexGuard<'_, CallState> {
        self.inner.lock()
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> CallState {
        *self.inner.lock()
    }

    #[must_use]
    pub fn mute(&self) -> bool {
        self.inner.lock().mute
    }

    pub fn set_mute(&self, mute: bool) {
        self.inner.lock().mute = mute;
    }

    #[must_use]
    pub fn hook(&self) -> bool {
        self.inner.lock().hook
    }

    pub fn set_hook(&self, hook: bool) {
        self.inner.lock().hook = hook;
    }

    #[must_use]
    pub fn ring(&self) -> bool {
        self.inner.lock().ring
    }

    pub fn set_ring(&self, ring: bool) {
        self.inner.lock().ring = ring;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn test_starts_cleared() {
        assert_eq!(CallStateStore::new().snapshot(), CallState::default());
    }

    #[test]
    fn test_setters_touch_one_field() {
        let store = CallStateStore::new();
        store.set_hook(true);
        store.set_ring(true);
        assert_eq!(store.snapshot(), CallState { mute: false, hook: true, ring: true });

        store.set_ring(false);
        store.set_mute(true);
        assert!(store.mute());
        assert!(store.hook());
        assert!(!store.ring());
    }

    #[test]
    fn test_locked_toggles_are_not_lost() {
        let store = Arc::new(CallStateStore::new());
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..1001 {
                        let mut state = store.lock();
                        state.mute = !state.mute;
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        // 8 * 1001 flips is even
        assert!(!store.mute());
    }
}
