//! An opened hiddev node and its usage-level protocol.

use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::{Path, PathBuf};
use std::time::Duration;

use hookline_core::usage::{
    FieldInfo, FieldRange, REPORT_ID_UNKNOWN, ReportInfo, ReportType, UsageLocation, UsageRef,
};
use hookline_core::{DeviceError, EventSource, HidBackend};
use tracing::{debug, info};

use crate::error::{HidError, HidResult};
use crate::sys::{self, HiddevDevinfo, HiddevFieldInfo, HiddevReportInfo, HiddevUsageRef};

/// Identity record of a hiddev device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInfo {
    pub bustype: u32,
    pub busnum: u32,
    pub devnum: u32,
    pub ifnum: u32,
    pub vendor_id: u16,
    pub product_id: u16,
    pub version: u16,
    pub num_applications: u32,
}

impl From<HiddevDevinfo> for DeviceInfo {
    fn from(raw: HiddevDevinfo) -> Self {
        Self {
            bustype: raw.bustype,
            busnum: raw.busnum,
            devnum: raw.devnum,
            ifnum: raw.ifnum,
            vendor_id: u16::from_ne_bytes(raw.vendor.to_ne_bytes()),
            product_id: u16::from_ne_bytes(raw.product.to_ne_bytes()),
            version: u16::from_ne_bytes(raw.version.to_ne_bytes()),
            num_applications: raw.num_applications,
        }
    }
}

/// A `/dev/usb/hiddevN` node opened for usage access and event reads.
///
/// All requests take `&self`; the kernel serializes them per handle, so one
/// device can be shared by the event thread and the command loop.
#[derive(Debug)]
pub struct HiddevDevice {
    file: File,
    path: PathBuf,
}

impl HiddevDevice {
    /// Open a hiddev node and initialise its report buffers.
    ///
    /// # Errors
    /// - [`HidError::PermissionDenied`] if the node is not accessible
    /// - [`HidError::IoError`] for other open failures
    /// - [`HidError::Device`] if report initialisation is rejected
    pub fn open(path: &Path) -> HidResult<Self> {
        let file = OpenOptions::new().read(true).open(path).map_err(|e| match e.kind() {
            io::ErrorKind::PermissionDenied => HidError::PermissionDenied(path.to_path_buf()),
            _ => HidError::IoError(e),
        })?;
        let device = Self { file, path: path.to_path_buf() };

        sys::ioctl_none(device.fd(), sys::HIDIOCINITREPORT, "HIDIOCINITREPORT")?;
        debug!(path = %path.display(), "Reports initialised");
        Ok(device)
    }

    /// Read the device identity record.
    ///
    /// # Errors
    /// Returns an error if the request is rejected.
    pub fn info(&self) -> HidResult<DeviceInfo> {
        read_info(&self.file)
    }

    /// Product name reported by the device.
    ///
    /// # Errors
    /// Returns an error if the request is rejected.
    pub fn name(&self) -> HidResult<String> {
        let mut buf = [0u8; sys::HID_STRING_SIZE];
        let len = sys::get_name(self.fd(), &mut buf)?.min(buf.len());
        let end = buf[..len].iter().position(|b| *b == 0).unwrap_or(len);
        Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
    }

    /// hiddev driver version as `(major, minor, patch)`.
    ///
    /// # Errors
    /// Returns an error if the request is rejected.
    pub fn driver_version(&self) -> HidResult<(u8, u8, u8)> {
        let mut version: libc::c_int = 0;
        sys::ioctl(self.fd(), sys::HIDIOCGVERSION, &mut version, "HIDIOCGVERSION")?;
        let [_, major, minor, patch] = version.to_be_bytes();
        Ok((major, minor, patch))
    }

    /// Log name, identity and driver version.
    pub fn log_identity(&self) {
        let name = self.name().unwrap_or_else(|_| "unknown".to_string());
        match (self.info(), self.driver_version()) {
            (Ok(info), Ok((major, minor, patch))) => info!(
                path = %self.path.display(),
                name = %name,
                vendor_id = format_args!("0x{:04X}", info.vendor_id),
                product_id = format_args!("0x{:04X}", info.product_id),
                driver = format_args!("{major}.{minor}.{patch}"),
                "HID device opened"
            ),
            _ => info!(path = %self.path.display(), name = %name, "HID device opened"),
        }
    }

    fn fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

pub(crate) fn read_info(file: &File) -> HidResult<DeviceInfo> {
    let mut raw = HiddevDevinfo::default();
    sys::ioctl(file.as_raw_fd(), sys::HIDIOCGDEVINFO, &mut raw, "HIDIOCGDEVINFO")?;
    Ok(raw.into())
}

fn usage_ref(raw: &HiddevUsageRef) -> UsageRef {
    UsageRef {
        location: UsageLocation {
            report_id: raw.report_id,
            field_index: raw.field_index,
            usage_index: raw.usage_index,
        },
        usage_code: raw.usage_code,
        value: raw.value,
    }
}

fn located(report_type: ReportType, location: &UsageLocation) -> HiddevUsageRef {
    HiddevUsageRef {
        report_type: report_type.as_raw(),
        report_id: location.report_id,
        field_index: location.field_index,
        usage_index: location.usage_index,
        ..HiddevUsageRef::default()
    }
}

impl HidBackend for HiddevDevice {
    fn find_usage(&self, report_type: ReportType, usage_code: u32) -> Result<UsageRef, DeviceError> {
        let mut uref = HiddevUsageRef {
            report_type: report_type.as_raw(),
            report_id: REPORT_ID_UNKNOWN,
            usage_code,
            ..HiddevUsageRef::default()
        };
        sys::ioctl(self.fd(), sys::HIDIOCGUSAGE, &mut uref, "HIDIOCGUSAGE")?;
        Ok(usage_ref(&uref))
    }

    fn field_info(
        &self,
        report_type: ReportType,
        report_id: u32,
        field_index: u32,
    ) -> Result<FieldInfo, DeviceError> {
        let mut finfo = HiddevFieldInfo {
            report_type: report_type.as_raw(),
            report_id,
            field_index,
            ..HiddevFieldInfo::default()
        };
        sys::ioctl(self.fd(), sys::HIDIOCGFIELDINFO, &mut finfo, "HIDIOCGFIELDINFO")?;

        Ok(FieldInfo {
            report_id: finfo.report_id,
            field_index: finfo.field_index,
            maxusage: finfo.maxusage,
            flags: finfo.flags,
            physical: finfo.physical,
            logical: finfo.logical,
            application: finfo.application,
            logical_range: FieldRange::new(finfo.logical_minimum, finfo.logical_maximum),
            physical_range: FieldRange::new(finfo.physical_minimum, finfo.physical_maximum),
            unit_exponent: finfo.unit_exponent,
            unit: finfo.unit,
        })
    }

    fn usage_value(&self, report_type: ReportType, location: &UsageLocation) -> Result<i32, DeviceError> {
        let mut uref = located(report_type, location);
        sys::ioctl(self.fd(), sys::HIDIOCGUSAGE, &mut uref, "HIDIOCGUSAGE")?;
        Ok(uref.value)
    }

    fn set_usage(
        &self,
        report_type: ReportType,
        location: &UsageLocation,
        usage_code: u32,
        value: i32,
    ) -> Result<(), DeviceError> {
        let mut uref = HiddevUsageRef { usage_code, value, ..located(report_type, location) };
        sys::ioctl(self.fd(), sys::HIDIOCSUSAGE, &mut uref, "HIDIOCSUSAGE")?;
        Ok(())
    }

    fn commit_report(&self, report_type: ReportType, report_id: u32) -> Result<(), DeviceError> {
        let mut rinfo = HiddevReportInfo { report_type: report_type.as_raw(), report_id, num_fields: 0 };
        sys::ioctl(self.fd(), sys::HIDIOCSREPORT, &mut rinfo, "HIDIOCSREPORT")?;
        Ok(())
    }

    fn report_info(&self, report_type: ReportType, report_id: u32) -> Result<Option<ReportInfo>, DeviceError> {
        let mut rinfo = HiddevReportInfo { report_type: report_type.as_raw(), report_id, num_fields: 0 };
        match sys::ioctl(self.fd(), sys::HIDIOCGREPORTINFO, &mut rinfo, "HIDIOCGREPORTINFO") {
            Ok(_) => Ok(Some(ReportInfo {
                report_type,
                report_id: rinfo.report_id,
                num_fields: rinfo.num_fields,
            })),
            // no report at (or after) the cursor
            Err(e) if e.raw_os_error() == Some(libc::EINVAL) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn usage_at(&self, report_type: ReportType, location: &UsageLocation) -> Result<UsageRef, DeviceError> {
        let mut uref = located(report_type, location);
        sys::ioctl(self.fd(), sys::HIDIOCGUCODE, &mut uref, "HIDIOCGUCODE")?;
        sys::ioctl(self.fd(), sys::HIDIOCGUSAGE, &mut uref, "HIDIOCGUSAGE")?;
        Ok(usage_ref(&uref))
    }
}

impl EventSource for HiddevDevice {
    fn wait_readable(&self, timeout: Duration) -> Result<bool, DeviceError> {
        let mut pollfd = libc::pollfd { fd: self.fd(), events: libc::POLLIN, revents: 0 };
        let timeout_ms = libc::c_int::try_from(timeout.as_millis()).unwrap_or(libc::c_int::MAX);

        #[allow(unsafe_code)]
        // SAFETY: one valid pollfd, count 1.
        let rc = unsafe { libc::poll(&raw mut pollfd, 1, timeout_ms) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(false);
            }
            return Err(DeviceError::new("poll", err));
        }
        Ok(rc > 0)
    }

    fn read_events(&self, buf: &mut [u8]) -> Result<usize, DeviceError> {
        (&self.file).read(buf).map_err(|e| DeviceError::new("read", e))
    }
}
