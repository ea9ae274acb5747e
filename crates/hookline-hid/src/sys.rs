//! Raw hiddev structures and ioctl request numbers (`linux/hiddev.h`).
#![allow(unsafe_code)]

use std::os::unix::io::RawFd;

use hookline_core::DeviceError;

pub const HID_STRING_SIZE: usize = 256;

const HIDDEV_IOCTL_TYPE: u8 = b'H';
const HIDIOC_NR_GVERSION: u8 = 0x01;
const HIDIOC_NR_GDEVINFO: u8 = 0x03;
const HIDIOC_NR_INITREPORT: u8 = 0x05;
const HIDIOC_NR_GNAME: u8 = 0x06;
const HIDIOC_NR_SREPORT: u8 = 0x08;
const HIDIOC_NR_GREPORTINFO: u8 = 0x09;
const HIDIOC_NR_GFIELDINFO: u8 = 0x0A;
const HIDIOC_NR_GUSAGE: u8 = 0x0B;
const HIDIOC_NR_SUSAGE: u8 = 0x0C;
const HIDIOC_NR_GUCODE: u8 = 0x0D;

const IOC_NRBITS: u32 = 8;
const IOC_TYPEBITS: u32 = 8;
const IOC_SIZEBITS: u32 = 14;
const IOC_NRSHIFT: u32 = 0;
const IOC_TYPESHIFT: u32 = IOC_NRSHIFT + IOC_NRBITS;
const IOC_SIZESHIFT: u32 = IOC_TYPESHIFT + IOC_TYPEBITS;
const IOC_DIRSHIFT: u32 = IOC_SIZESHIFT + IOC_SIZEBITS;
const IOC_NONE: u32 = 0;
const IOC_WRITE: u32 = 1;
const IOC_READ: u32 = 2;
const IOC_READ_WRITE: u32 = 3;

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct HiddevDevinfo {
    pub bustype: u32,
    pub busnum: u32,
    pub devnum: u32,
    pub ifnum: u32,
    pub vendor: i16,
    pub product: i16,
    pub version: i16,
    pub num_applications: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct HiddevReportInfo {
    pub report_type: u32,
    pub report_id: u32,
    pub num_fields: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct HiddevFieldInfo {
    pub report_type: u32,
    pub report_id: u32,
    pub field_index: u32,
    pub maxusage: u32,
    pub flags: u32,
    pub physical: u32,
    pub logical: u32,
    pub application: u32,
    pub logical_minimum: i32,
    pub logical_maximum: i32,
    pub physical_minimum: i32,
    pub physical_maximum: i32,
    pub unit_exponent: u32,
    pub unit: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct HiddevUsageRef {
    pub report_type: u32,
    pub report_id: u32,
    pub field_index: u32,
    pub usage_index: u32,
    pub usage_code: u32,
    pub value: i32,
}

const fn ioctl_code(direction: u32, kind: u8, nr: u8, size: usize) -> libc::c_ulong {
    ((direction << IOC_DIRSHIFT)
        | ((kind as u32) << IOC_TYPESHIFT)
        | ((nr as u32) << IOC_NRSHIFT)
        | ((size as u32) << IOC_SIZESHIFT)) as libc::c_ulong
}

const fn io(nr: u8) -> libc::c_ulong {
    ioctl_code(IOC_NONE, HIDDEV_IOCTL_TYPE, nr, 0)
}

const fn ior<T>(nr: u8) -> libc::c_ulong {
    ioctl_code(IOC_READ, HIDDEV_IOCTL_TYPE, nr, std::mem::size_of::<T>())
}

const fn iow<T>(nr: u8) -> libc::c_ulong {
    ioctl_code(IOC_WRITE, HIDDEV_IOCTL_TYPE, nr, std::mem::size_of::<T>())
}

const fn iowr<T>(nr: u8) -> libc::c_ulong {
    ioctl_code(IOC_READ_WRITE, HIDDEV_IOCTL_TYPE, nr, std::mem::size_of::<T>())
}

pub const HIDIOCGVERSION: libc::c_ulong = ior::<libc::c_int>(HIDIOC_NR_GVERSION);
pub const HIDIOCGDEVINFO: libc::c_ulong = ior::<HiddevDevinfo>(HIDIOC_NR_GDEVINFO);
pub const HIDIOCINITREPORT: libc::c_ulong = io(HIDIOC_NR_INITREPORT);
pub const HIDIOCSREPORT: libc::c_ulong = iow::<HiddevReportInfo>(HIDIOC_NR_SREPORT);
pub const HIDIOCGREPORTINFO: libc::c_ulong = iowr::<HiddevReportInfo>(HIDIOC_NR_GREPORTINFO);
pub const HIDIOCGFIELDINFO: libc::c_ulong = iowr::<HiddevFieldInfo>(HIDIOC_NR_GFIELDINFO);
pub const HIDIOCGUSAGE: libc::c_ulong = iowr::<HiddevUsageRef>(HIDIOC_NR_GUSAGE);
pub const HIDIOCSUSAGE: libc::c_ulong = iow::<HiddevUsageRef>(HIDIOC_NR_SUSAGE);
pub const HIDIOCGUCODE: libc::c_ulong = iowr::<HiddevUsageRef>(HIDIOC_NR_GUCODE);

pub const fn hidiocgname(len: usize) -> libc::c_ulong {
    ioctl_code(IOC_READ, HIDDEV_IOCTL_TYPE, HIDIOC_NR_GNAME, len)
}

/// Issue `request` with `arg` as its in/out buffer.
///
/// `T` must be the `repr(C)` structure whose size is encoded in `request`.
pub fn ioctl<T>(fd: RawFd, request: libc::c_ulong, arg: &mut T, op: &'static str) -> Result<libc::c_int, DeviceError> {
    // SAFETY: arg is a live, exclusively borrowed repr(C) value matching the request size.
    let rc = unsafe { libc::ioctl(fd, request, std::ptr::from_mut(arg)) };
    if rc < 0 { Err(DeviceError::last_os_error(op)) } else { Ok(rc) }
}

/// Issue an argument-less request.
pub fn ioctl_none(fd: RawFd, request: libc::c_ulong, op: &'static str) -> Result<libc::c_int, DeviceError> {
    // SAFETY: the request takes no argument.
    let rc = unsafe { libc::ioctl(fd, request, 0) };
    if rc < 0 { Err(DeviceError::last_os_error(op)) } else { Ok(rc) }
}

/// Read the device name into `buf`, returning the byte count.
pub fn get_name(fd: RawFd, buf: &mut [u8]) -> Result<usize, DeviceError> {
    // SAFETY: the request encodes buf.len(), so the kernel writes at most that many bytes.
    let rc = unsafe { libc::ioctl(fd, hidiocgname(buf.len()), buf.as_mut_ptr()) };
    usize::try_from(rc).map_err(|_| DeviceError::last_os_error("HIDIOCGNAME"))
}
