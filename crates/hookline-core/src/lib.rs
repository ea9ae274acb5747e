//! Hookline Core - HID usage protocol engine for telephony headsets.
//!
//! This crate resolves logical usages to report/field locations, performs
//! range-checked write/commit transactions, and keeps the headset's mute,
//! off-hook and ring indicators in step with the call state whether changes
//! come from the hardware or from the user. Device access goes through the
//! [`HidBackend`] and [`EventSource`] traits.

pub mod backend;
pub mod command;
pub mod dump;
pub mod error;
pub mod event;
pub mod observer;
pub mod pump;
pub mod reconciler;
pub mod resolver;
pub mod session;
pub mod state;
pub mod transactor;
pub mod usage;

#[cfg(test)]
mod fake;

pub use backend::{EventSource, HidBackend};
pub use command::{Command, Outcome};
pub use error::{DeviceError, Error, Result};
pub use event::HidEvent;
pub use observer::{CallObserver, Origin, TracingObserver, Transition, VolumeDirection};
pub use pump::run_event_pump;
pub use session::Session;
pub use state::{CallState, CallStateStore};
pub use transactor::{ReadPolicy, Transactor};
pub use usage::{ReportType, Usage, UsageKey};
