//! State-transition notifications.
//!
//! The reconciler and dispatcher report what they changed through a
//! [`CallObserver`] instead of printing, so presentation stays outside the core.

use tracing::info;

/// Who initiated a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// A hardware event from the headset
    Device,
    /// A command issued on the host
    User,
}

/// Direction of a volume button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeDirection {
    Up,
    Down,
}

/// A completed change of call state, or an observed button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Hook { off_hook: bool, origin: Origin },
    Mute { muted: bool, origin: Origin },
    Ringer { ringing: bool, origin: Origin },
    /// Ring indicator and ringer tone silenced by an off-hook pickup
    RingCancelled { origin: Origin },
    Volume { direction: VolumeDirection, value: i32 },
}

/// Receives transitions after they have been applied.
pub trait CallObserver: Send + Sync {
    fn notify(&self, transition: Transition);
}

/// Logs transitions through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl CallObserver for TracingObserver {
    fn notify(&self, transition: Transition) {
        match transition {
            Transition::Hook { off_hook, origin } => info!(off_hook, ?origin, "Hook changed"),
            Transition::Mute { muted, origin } => info!(muted, ?origin, "Mute changed"),
            Transition::Ringer { ringing, origin } => info!(ringing, ?origin, "Ringer changed"),
            Transition::RingCancelled { origin } => info!(?origin, "Ring cancelled by pickup"),
            Transition::Volume { direction, value } => info!(?direction, value, "Volume button"),
        }
    }
}
