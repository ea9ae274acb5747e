//! HID error types.

use std::path::PathBuf;

use thiserror::Error;

/// HID error type.
#[derive(Debug, Error)]
pub enum HidError {
    #[error("No device with vendor id 0x{vendor_id:04X} found")]
    DeviceNotFound { vendor_id: u16 },

    #[error("Permission denied opening {0:?} - try as root or check udev rules")]
    PermissionDenied(PathBuf),

    #[error("Device error: {0}")]
    Device(#[from] hookline_core::DeviceError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for HID operations.
pub type HidResult<T> = Result<T, HidError>;
