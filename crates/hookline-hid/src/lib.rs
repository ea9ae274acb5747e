//! Hookline HID - Linux hiddev backend.
//!
//! Talks to USB telephony headsets through the kernel's hiddev interface
//! (`/dev/usb/hiddevN`): usage lookup, field metadata, staged usage writes,
//! report commits and the event stream. Implements the core's
//! [`HidBackend`](hookline_core::HidBackend) and
//! [`EventSource`](hookline_core::EventSource) traits.

pub mod device;
pub mod discovery;
pub mod error;
mod sys;

pub use device::{DeviceInfo, HiddevDevice};
pub use discovery::{ScanConfig, find_device};
pub use error::{HidError, HidResult};
