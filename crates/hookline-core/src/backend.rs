//! The device boundary the protocol engine speaks.
//!
//! A backend exposes the four usage primitives (lookup, field metadata,
//! stage a value, commit a report) plus the enumeration requests used by the
//! report dump. Hardware-event delivery is a separate [`EventSource`] so that
//! the same handle can be driven from the event task and the command task.

use std::time::Duration;

use crate::error::DeviceError;
use crate::usage::{FieldInfo, ReportInfo, ReportType, UsageLocation, UsageRef};

/// Usage-level access to an opened HID device.
#[cfg_attr(test, mockall::automock)]
pub trait HidBackend {
    /// Locate an extended usage code in reports of `report_type`, letting the
    /// device choose the owning report. Returns the location and current value.
    fn find_usage(&self, report_type: ReportType, usage_code: u32) -> Result<UsageRef, DeviceError>;

    /// Fetch metadata for the field at `field_index` of report `report_id`.
    fn field_info(
        &self,
        report_type: ReportType,
        report_id: u32,
        field_index: u32,
    ) -> Result<FieldInfo, DeviceError>;

    /// Read the value of the usage at an explicit location.
    fn usage_value(&self, report_type: ReportType, location: &UsageLocation) -> Result<i32, DeviceError>;

    /// Stage a value for a usage; nothing reaches the device until [`commit_report`](Self::commit_report).
    fn set_usage(
        &self,
        report_type: ReportType,
        location: &UsageLocation,
        usage_code: u32,
        value: i32,
    ) -> Result<(), DeviceError>;

    /// Submit the staged report `report_id` to the device in one transfer.
    fn commit_report(&self, report_type: ReportType, report_id: u32) -> Result<(), DeviceError>;

    /// Describe the report addressed by `report_id` (which may carry the
    /// first/next cursor flags). `None` once the cursor runs past the last report.
    fn report_info(&self, report_type: ReportType, report_id: u32) -> Result<Option<ReportInfo>, DeviceError>;

    /// Usage code and value at an explicit location.
    fn usage_at(&self, report_type: ReportType, location: &UsageLocation) -> Result<UsageRef, DeviceError>;
}

/// Source of raw hardware event records.
pub trait EventSource {
    /// Block until events are readable or `timeout` elapses. `Ok(false)` on timeout.
    fn wait_readable(&self, timeout: Duration) -> Result<bool, DeviceError>;

    /// Read as many whole event records as fit into `buf`, returning the byte count.
    fn read_events(&self, buf: &mut [u8]) -> Result<usize, DeviceError>;
}
