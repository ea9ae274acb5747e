//! Error types for the usage protocol engine.

use std::io;

use thiserror::Error;

use crate::usage::{FieldRange, UsageKey};

/// A request rejected by the device (ioctl failure, short transfer, stale handle).
#[derive(Debug, Error)]
#[error("{op} failed: {source}")]
pub struct DeviceError {
    op: &'static str,
    #[source]
    source: io::Error,
}

impl DeviceError {
    /// Wrap an I/O error raised while performing `op`.
    #[must_use]
    pub fn new(op: &'static str, source: io::Error) -> Self {
        Self { op, source }
    }

    /// Capture `errno` for a failed request.
    #[must_use]
    pub fn last_os_error(op: &'static str) -> Self {
        Self::new(op, io::Error::last_os_error())
    }

    /// Name of the request that failed.
    #[must_use]
    pub fn op(&self) -> &'static str {
        self.op
    }

    /// Raw OS error code, if the failure came from a syscall.
    #[must_use]
    pub fn raw_os_error(&self) -> Option<i32> {
        self.source.raw_os_error()
    }
}

/// Core error type for usage transactions and event handling.
#[derive(Debug, Error)]
pub enum Error {
    /// The device rejected the usage lookup or the field metadata query.
    #[error("Cannot resolve {key}: {source}")]
    Resolution {
        key: UsageKey,
        #[source]
        source: DeviceError,
    },

    /// A proposed value lies outside the field's logical range.
    #[error("{page}: value {value} outside of allowed range ({range})")]
    Range {
        page: &'static str,
        key: UsageKey,
        value: i32,
        range: FieldRange,
    },

    /// Staging, committing or reading a value was rejected by the device.
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    /// The event stream returned less than one whole event record.
    #[error("Short read from device: got {got} bytes, need at least {need}")]
    ShortRead { got: usize, need: usize },
}

impl Error {
    /// Whether the failure happened after the value was handed to the device.
    ///
    /// Such failures leave the logical call state ahead of the device; the
    /// other variants abort before anything reaches the hardware.
    #[must_use]
    pub fn reached_device(&self) -> bool {
        matches!(self, Self::Device(_))
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
