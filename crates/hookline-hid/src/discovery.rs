//! Locating the headset among the hiddev nodes.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::device::{DeviceInfo, read_info};
use crate::error::{HidError, HidResult};

/// Jabra (GN Audio) USB vendor id
pub const JABRA_VID: u16 = 0x0B0E;
/// hiddev node prefix
pub const DEFAULT_PATH_PREFIX: &str = "/dev/usb/hiddev";
/// Number of hiddev nodes probed
pub const DEFAULT_SCAN_COUNT: u32 = 19;

/// Where to look and what to look for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub path_prefix: String,
    pub scan_count: u32,
    pub vendor_id: u16,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            path_prefix: DEFAULT_PATH_PREFIX.to_string(),
            scan_count: DEFAULT_SCAN_COUNT,
            vendor_id: JABRA_VID,
        }
    }
}

impl ScanConfig {
    /// Candidate nodes in probe order.
    pub fn candidates(&self) -> impl Iterator<Item = PathBuf> + '_ {
        (0..self.scan_count).map(|i| PathBuf::from(format!("{}{i}", self.path_prefix)))
    }
}

/// Read the identity record of one candidate.
///
/// `Ok(None)` if the node does not exist.
///
/// # Errors
/// Returns an error if the node exists but cannot be opened or queried.
pub fn probe(path: &Path) -> HidResult<Option<DeviceInfo>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            return Err(HidError::PermissionDenied(path.to_path_buf()));
        }
        Err(e) => return Err(HidError::IoError(e)),
    };
    read_info(&file).map(Some)
}

/// Return the first candidate whose vendor id matches.
///
/// Candidates that are missing or fail to probe are skipped.
///
/// # Errors
/// Returns [`HidError::DeviceNotFound`] if no candidate matches.
pub fn find_device(config: &ScanConfig) -> HidResult<PathBuf> {
    for path in config.candidates() {
        match probe(&path) {
            Ok(Some(info)) if info.vendor_id == config.vendor_id => {
                info!(path = %path.display(), product_id = format_args!("0x{:04X}", info.product_id), "Headset found");
                return Ok(path);
            }
            Ok(Some(info)) => {
                debug!(path = %path.display(), vendor_id = format_args!("0x{:04X}", info.vendor_id), "Skipping other vendor");
            }
            Ok(None) => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Probe failed"),
        }
    }

    Err(HidError::DeviceNotFound { vendor_id: config.vendor_id })
}
