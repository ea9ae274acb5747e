//! Reconciliation of hardware events with the call state.

use tracing::{debug, trace};

use crate::backend::HidBackend;
use crate::error::Result;
use crate::event::HidEvent;
use crate::observer::{Origin, Transition, VolumeDirection};
use crate::session::Session;
use crate::usage::{CON_VOLUME_DECREMENT, CON_VOLUME_INCREMENT, TEL_HOOK_SWITCH, TEL_PHONE_MUTE};

impl<D: HidBackend> Session<D> {
    /// Apply one hardware event.
    ///
    /// Runs entirely under the call-state lock so a user command cannot
    /// interleave with it.
    ///
    /// - Hook switch: acts only when the value differs from the stored hook
    ///   state; a pickup silences ring indicator and ringer tone before the
    ///   off-hook indicator follows.
    /// - Phone mute: a press (value 1) toggles mute; a release is ignored.
    /// - Volume up/down: reported, never stored.
    ///
    /// Anything else is ignored.
    ///
    /// # Errors
    /// Propagates the first failed device write; the rest of the event's
    /// writes are abandoned.
    pub fn reconcile(&self, event: &HidEvent) -> Result<()> {
        trace!(usage = %event.usage(), value = event.value, "Event");
        let mut state = self.store().lock();

        match event.usage() {
            TEL_HOOK_SWITCH => {
                let off_hook = event.value != 0;
                if off_hook != state.hook {
                    self.apply_hook(&mut state, off_hook, Origin::Device)?;
                }
            }
            TEL_PHONE_MUTE => {
                if event.value == 1 {
                    self.toggle_mute(&mut state, Origin::Device)?;
                }
            }
            CON_VOLUME_INCREMENT if event.value != 0 => {
                self.notify(Transition::Volume { direction: VolumeDirection::Up, value: event.value });
            }
            CON_VOLUME_DECREMENT if event.value != 0 => {
                self.notify(Transition::Volume { direction: VolumeDirection::Down, value: event.value });
            }
            other => debug!(usage = %other, value = event.value, "Ignoring event"),
        }

        Ok(())
    }
}
