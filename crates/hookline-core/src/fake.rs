//! In-memory headset used by unit tests.

use std::collections::VecDeque;
use std::io;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::backend::{EventSource, HidBackend};
use crate::error::DeviceError;
use crate::event::HidEvent;
use crate::usage::{
    CON_VOLUME_DECREMENT, CON_VOLUME_INCREMENT, FieldInfo, FieldRange, LED_MUTE, LED_OFF_HOOK,
    LED_RING, REPORT_ID_FIRST, REPORT_ID_NEXT, ReportInfo, ReportType, TEL_HOOK_SWITCH,
    TEL_PHONE_MUTE, TEL_RINGER, Usage, UsageLocation, UsageRef,
};

const EINVAL: i32 = 22;
const ENODEV: i32 = 19;

/// A request observed by the fake, in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Find(Usage),
    Field { report_id: u32, field_index: u32 },
    Value(Usage),
    Stage(Usage, i32),
    Commit { report_id: u32 },
}

#[derive(Debug, Clone)]
struct FakeUsage {
    report_type: ReportType,
    usage: Usage,
    location: UsageLocation,
    range: FieldRange,
    staged: i32,
    committed: i32,
}

#[derive(Default)]
struct Inner {
    usages: Vec<FakeUsage>,
    ops: Vec<Op>,
    fail_commits: bool,
    reads: VecDeque<Vec<u8>>,
}

/// A telephony headset with LED and ringer outputs and hook/mute/volume inputs.
pub(crate) struct FakeHeadset {
    inner: Mutex<Inner>,
}

impl FakeHeadset {
    pub(crate) fn new() -> Self {
        let binary = FieldRange::new(0, 1);
        let layout = [
            (ReportType::Output, LED_MUTE, 1, 0, 0, binary),
            (ReportType::Output, LED_OFF_HOOK, 1, 0, 1, binary),
            (ReportType::Output, LED_RING, 1, 0, 2, binary),
            (ReportType::Output, TEL_RINGER, 2, 0, 0, binary),
            (ReportType::Input, TEL_HOOK_SWITCH, 3, 0, 0, binary),
            (ReportType::Input, TEL_PHONE_MUTE, 3, 0, 1, binary),
            (ReportType::Input, CON_VOLUME_INCREMENT, 3, 1, 0, FieldRange::new(-1, 1)),
            (ReportType::Input, CON_VOLUME_DECREMENT, 3, 1, 1, FieldRange::new(-1, 1)),
        ];
        let usages = layout
            .into_iter()
            .map(|(report_type, usage, report_id, field_index, usage_index, range)| FakeUsage {
                report_type,
                usage,
                location: UsageLocation { report_id, field_index, usage_index },
                range,
                staged: 0,
                committed: 0,
            })
            .collect();

        Self { inner: Mutex::new(Inner { usages, ..Inner::default() }) }
    }

    /// Set both the staged and committed value of a usage.
    pub(crate) fn preset(&self, usage: Usage, value: i32) {
        for u in self.inner.lock().usages.iter_mut().filter(|u| u.usage == usage) {
            u.staged = value;
            u.committed = value;
        }
    }

    /// Make a usage unknown to the device.
    pub(crate) fn remove(&self, usage: Usage) {
        self.inner.lock().usages.retain(|u| u.usage != usage);
    }

    pub(crate) fn set_range(&self, usage: Usage, range: FieldRange) {
        let mut inner = self.inner.lock();
        let Some(location) = inner.usages.iter().find(|u| u.usage == usage).map(|u| u.location) else {
            return;
        };
        for u in inner.usages.iter_mut().filter(|u| {
            u.location.report_id == location.report_id && u.location.field_index == location.field_index
        }) {
            u.range = range;
        }
    }

    pub(crate) fn fail_commits(&self, fail: bool) {
        self.inner.lock().fail_commits = fail;
    }

    /// Value the device last accepted for `usage`.
    pub(crate) fn committed(&self, usage: Usage) -> Option<i32> {
        self.inner.lock().usages.iter().find(|u| u.usage == usage).map(|u| u.committed)
    }

    pub(crate) fn ops(&self) -> Vec<Op> {
        self.inner.lock().ops.clone()
    }

    pub(crate) fn clear_ops(&self) {
        self.inner.lock().ops.clear();
    }

    /// Staged writes in order.
    pub(crate) fn writes(&self) -> Vec<(Usage, i32)> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Stage(usage, value) => Some((usage, value)),
                _ => None,
            })
            .collect()
    }

    /// Queue one read returning these events.
    pub(crate) fn push_events(&self, events: &[HidEvent]) {
        let bytes = events.iter().flat_map(|e| e.to_bytes()).collect();
        self.push_raw(bytes);
    }

    /// Queue one read returning exactly these bytes.
    pub(crate) fn push_raw(&self, bytes: Vec<u8>) {
        self.inner.lock().reads.push_back(bytes);
    }

    fn lookup(&self, report_type: ReportType, pred: impl Fn(&FakeUsage) -> bool) -> Option<FakeUsage> {
        self.inner
            .lock()
            .usages
            .iter()
            .find(|u| u.report_type == report_type && pred(u))
            .cloned()
    }

    fn record(&self, op: Op) {
        self.inner.lock().ops.push(op);
    }
}

fn rejected(op: &'static str, errno: i32) -> DeviceError {
    DeviceError::new(op, io::Error::from_raw_os_error(errno))
}

impl HidBackend for FakeHeadset {
    fn find_usage(&self, report_type: ReportType, usage_code: u32) -> Result<UsageRef, DeviceError> {
        self.record(Op::Find(Usage::from_code(usage_code)));
        self.lookup(report_type, |u| u.usage.code() == usage_code)
            .map(|u| UsageRef { location: u.location, usage_code, value: u.staged })
            .ok_or_else(|| rejected("HIDIOCGUSAGE", EINVAL))
    }

    fn field_info(
        &self,
        report_type: ReportType,
        report_id: u32,
        field_index: u32,
    ) -> Result<FieldInfo, DeviceError> {
        self.record(Op::Field { report_id, field_index });
        let inner = self.inner.lock();
        let members: Vec<_> = inner
            .usages
            .iter()
            .filter(|u| {
                u.report_type == report_type
                    && u.location.report_id == report_id
                    && u.location.field_index == field_index
            })
            .collect();
        let first = members.first().ok_or_else(|| rejected("HIDIOCGFIELDINFO", EINVAL))?;

        Ok(FieldInfo {
            report_id,
            field_index,
            maxusage: u32::try_from(members.len()).unwrap_or(u32::MAX),
            flags: 0x2,
            physical: 0,
            logical: 0,
            application: 0x000B_0005,
            logical_range: first.range,
            physical_range: FieldRange::new(0, 0),
            unit_exponent: 0,
            unit: 0,
        })
    }

    fn usage_value(&self, report_type: ReportType, location: &UsageLocation) -> Result<i32, DeviceError> {
        let found = self
            .lookup(report_type, |u| u.location == *location)
            .ok_or_else(|| rejected("HIDIOCGUSAGE", EINVAL))?;
        self.record(Op::Value(found.usage));
        Ok(found.staged)
    }

    fn set_usage(
        &self,
        report_type: ReportType,
        location: &UsageLocation,
        usage_code: u32,
        value: i32,
    ) -> Result<(), DeviceError> {
        self.record(Op::Stage(Usage::from_code(usage_code), value));
        let mut inner = self.inner.lock();
        let target = inner
            .usages
            .iter_mut()
            .find(|u| u.report_type == report_type && u.location == *location)
            .ok_or_else(|| rejected("HIDIOCSUSAGE", EINVAL))?;
        target.staged = value;
        Ok(())
    }

    fn commit_report(&self, report_type: ReportType, report_id: u32) -> Result<(), DeviceError> {
        self.record(Op::Commit { report_id });
        let mut inner = self.inner.lock();
        if inner.fail_commits {
            return Err(rejected("HIDIOCSREPORT", ENODEV));
        }
        for u in inner
            .usages
            .iter_mut()
            .filter(|u| u.report_type == report_type && u.location.report_id == report_id)
        {
            u.committed = u.staged;
        }
        Ok(())
    }

    fn report_info(&self, report_type: ReportType, report_id: u32) -> Result<Option<ReportInfo>, DeviceError> {
        let inner = self.inner.lock();
        let mut ids: Vec<u32> = inner
            .usages
            .iter()
            .filter(|u| u.report_type == report_type)
            .map(|u| u.location.report_id)
            .collect();
        ids.sort_unstable();
        ids.dedup();

        let wanted = if report_id & REPORT_ID_FIRST != 0 {
            ids.first().copied()
        } else if report_id & REPORT_ID_NEXT != 0 {
            let current = report_id & 0xFF;
            ids.into_iter().find(|id| *id > current)
        } else {
            ids.into_iter().find(|id| *id == report_id)
        };

        Ok(wanted.map(|id| {
            let mut fields: Vec<u32> = inner
                .usages
                .iter()
                .filter(|u| u.report_type == report_type && u.location.report_id == id)
                .map(|u| u.location.field_index)
                .collect();
            fields.sort_unstable();
            fields.dedup();
            ReportInfo {
                report_type,
                report_id: id,
                num_fields: u32::try_from(fields.len()).unwrap_or(u32::MAX),
            }
        }))
    }

    fn usage_at(&self, report_type: ReportType, location: &UsageLocation) -> Result<UsageRef, DeviceError> {
        self.lookup(report_type, |u| u.location == *location)
            .map(|u| UsageRef { location: u.location, usage_code: u.usage.code(), value: u.staged })
            .ok_or_else(|| rejected("HIDIOCGUCODE", EINVAL))
    }
}

impl EventSource for FakeHeadset {
    fn wait_readable(&self, timeout: Duration) -> Result<bool, DeviceError> {
        if self.inner.lock().reads.is_empty() {
            thread::sleep(timeout.min(Duration::from_millis(5)));
            return Ok(false);
        }
        Ok(true)
    }

    fn read_events(&self, buf: &mut [u8]) -> Result<usize, DeviceError> {
        let chunk = self.inner.lock().reads.pop_front().unwrap_or_default();
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        Ok(n)
    }
}
