//! The session: one device handle, the call state mirrored on it, and the
//! cooperative shutdown flag shared by the event task and the command task.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use crate::backend::HidBackend;
use crate::error::{Error, Result};
use crate::observer::{CallObserver, Origin, TracingObserver, Transition};
use crate::state::{CallState, CallStateStore};
use crate::transactor::{ReadPolicy, Transactor};
use crate::usage::{LED_MUTE, LED_OFF_HOOK, LED_RING, TEL_RINGER, Usage, UsageKey};

/// Shared state of a running call-control session.
///
/// Wrap it in an `Arc` and hand it to both tasks.
pub struct Session<D> {
    transactor: Transactor<D>,
    store: CallStateStore,
    running: AtomicBool,
    observer: Box<dyn CallObserver>,
}

impl<D: HidBackend> Session<D> {
    /// Create a session with cleared call state that logs its transitions.
    #[must_use]
    pub fn new(device: D) -> Self {
        Self {
            transactor: Transactor::new(device),
            store: CallStateStore::new(),
            running: AtomicBool::new(true),
            observer: Box::new(TracingObserver),
        }
    }

    #[must_use]
    pub fn with_observer(self, observer: Box<dyn CallObserver>) -> Self {
        Self { observer, ..self }
    }

    #[must_use]
    pub fn with_read_policy(self, policy: ReadPolicy) -> Self {
        Self { transactor: self.transactor.with_read_policy(policy), ..self }
    }

    #[must_use]
    pub fn device(&self) -> &D {
        self.transactor.device()
    }

    #[must_use]
    pub fn store(&self) -> &CallStateStore {
        &self.store
    }

    /// Whether shutdown has not been requested yet.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Ask both loops to stop at their next iteration.
    pub fn request_shutdown(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("Shutdown requested");
        }
    }

    /// Overwrite the call state with the device's output indicators.
    ///
    /// An indicator that cannot be read keeps its current value.
    pub fn sync_from_device(&self) -> CallState {
        let mut state = self.store.lock();
        let read = |usage: Usage| match self.transactor.read_usage(UsageKey::output(usage)) {
            Ok(value) => Some(value != 0),
            Err(e) => {
                warn!(usage = %usage, error = %e, "Could not read indicator, keeping default");
                None
            }
        };

        if let Some(mute) = read(LED_MUTE) {
            state.mute = mute;
        }
        if let Some(hook) = read(LED_OFF_HOOK) {
            state.hook = hook;
        }
        if let Some(ring) = read(LED_RING) {
            state.ring = ring;
        }

        info!(mute = state.mute, hook = state.hook, ring = state.ring, "Call state synchronized");
        *state
    }

    /// Drive the off-hook indicator to `off_hook`.
    ///
    /// Going off-hook silences the ring indicator and ringer tone first. Every
    /// write is attempted even if an earlier one fails; the first failure is
    /// returned. Must be called with the store lock held; `state` is the
    /// guarded value.
    pub(crate) fn apply_hook(&self, state: &mut CallState, off_hook: bool, origin: Origin) -> Result<()> {
        let mut first = None;

        if off_hook && !state.hook {
            let was_ringing = state.ring;
            keep_first(&mut first, settle(self.write_flag(LED_RING, false), || state.ring = false));
            keep_first(&mut first, self.write_flag(TEL_RINGER, false));
            if was_ringing && !state.ring {
                self.notify(Transition::RingCancelled { origin });
            }
        }

        keep_first(&mut first, settle(self.write_flag(LED_OFF_HOOK, off_hook), || state.hook = off_hook));
        if state.hook == off_hook {
            self.notify(Transition::Hook { off_hook, origin });
        }

        first.map_or(Ok(()), Err)
    }

    /// Flip mute and drive the mute indicator. Store lock must be held.
    pub(crate) fn toggle_mute(&self, state: &mut CallState, origin: Origin) -> Result<()> {
        let muted = !state.mute;
        settle(self.write_flag(LED_MUTE, muted), || state.mute = muted)?;
        self.notify(Transition::Mute { muted, origin });
        Ok(())
    }

    /// Flip ring and drive ring indicator and ringer tone. The tone is written
    /// even if the indicator fails. Store lock must be held.
    pub(crate) fn toggle_ringer(&self, state: &mut CallState, origin: Origin) -> Result<()> {
        let ringing = !state.ring;
        let mut first = None;

        keep_first(&mut first, settle(self.write_flag(LED_RING, ringing), || state.ring = ringing));
        keep_first(&mut first, self.write_flag(TEL_RINGER, ringing));
        if state.ring == ringing {
            self.notify(Transition::Ringer { ringing, origin });
        }

        first.map_or(Ok(()), Err)
    }

    pub(crate) fn notify(&self, transition: Transition) {
        self.observer.notify(transition);
    }

    fn write_flag(&self, usage: Usage, on: bool) -> Result<()> {
        self.transactor.write_usage(UsageKey::output(usage), i32::from(on))
    }
}

/// Remember the first failure of a multi-write transition; log the rest.
fn keep_first(first: &mut Option<Error>, result: Result<()>) {
    if let Err(e) = result {
        if first.is_some() {
            warn!(error = %e, "Further write failed");
        } else {
            *first = Some(e);
        }
    }
}

/// Commit a logical change once its device write went through, or failed only
/// after reaching the device. Lookup and range failures leave state untouched.
fn settle(result: Result<()>, change: impl FnOnce()) -> Result<()> {
    match result {
        Ok(()) => {
            change();
            Ok(())
        }
        Err(e) if e.reached_device() => {
            change();
            Err(e)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeHeadset;

    #[test]
    fn test_sync_takes_device_indicators() {
        let device = FakeHeadset::new();
        device.preset(LED_MUTE, 1);
        device.preset(LED_RING, 1);

        let session = Session::new(device);
        let state = session.sync_from_device();
        assert_eq!(state, CallState { mute: true, hook: false, ring: true });
        assert_eq!(session.store().snapshot(), state);
    }

    #[test]
    fn test_sync_keeps_default_for_unreadable_indicator() {
        let device = FakeHeadset::new();
        device.preset(LED_MUTE, 1);
        device.remove(LED_OFF_HOOK);

        let session = Session::new(device);
        session.store().set_hook(true);
        let state = session.sync_from_device();
        assert!(state.mute);
        assert!(state.hook);
    }

    #[test]
    fn test_shutdown_is_sticky() {
        let session = Session::new(FakeHeadset::new());
        assert!(session.is_running());
        session.request_shutdown();
        session.request_shutdown();
        assert!(!session.is_running());
    }

    #[test]
    fn test_commit_failure_leaves_state_ahead_of_device() {
        let device = FakeHeadset::new();
        device.fail_commits(true);
        let session = Session::new(device);

        let mut state = session.store().lock();
        assert!(session.toggle_mute(&mut state, Origin::User).unwrap_err().reached_device());
        assert!(state.mute);
        drop(state);
        assert_eq!(session.device().committed(LED_MUTE), Some(0));
    }
}
