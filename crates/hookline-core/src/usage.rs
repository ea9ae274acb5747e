//! HID usage tables and the typed request/response records of the usage protocol.

use std::fmt;

/// Telephony Device page
pub const TELEPHONY_PAGE: u16 = 0x000B;
/// Consumer page
pub const CONSUMER_PAGE: u16 = 0x000C;
/// LED indicator page
pub const LED_PAGE: u16 = 0x0008;
/// Button page
pub const BUTTON_PAGE: u16 = 0x0009;

/// Report id wildcard: let the device pick the report owning a usage.
pub const REPORT_ID_UNKNOWN: u32 = 0xFFFF_FFFF;
/// Report id cursor: first report of a type.
pub const REPORT_ID_FIRST: u32 = 0x0000_0100;
/// Report id flag: the report following the given id.
pub const REPORT_ID_NEXT: u32 = 0x0000_0200;

/// A usage-page/usage-id pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Usage {
    pub page: u16,
    pub id: u16,
}

impl Usage {
    #[must_use]
    pub const fn new(page: u16, id: u16) -> Self {
        Self { page, id }
    }

    /// The extended 32-bit usage code (`page << 16 | id`).
    #[must_use]
    pub const fn code(self) -> u32 {
        ((self.page as u32) << 16) | self.id as u32
    }

    /// Split an extended usage code into page and id.
    #[must_use]
    pub const fn from_code(code: u32) -> Self {
        Self { page: (code >> 16) as u16, id: (code & 0xFFFF) as u16 }
    }
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:X} ({})", self.code(), page_name(self.code()))
    }
}

// LED page (0x08)
pub const LED_MUTE: Usage = Usage::new(LED_PAGE, 0x0009);
pub const LED_OFF_HOOK: Usage = Usage::new(LED_PAGE, 0x0017);
pub const LED_RING: Usage = Usage::new(LED_PAGE, 0x0018);
pub const LED_HOLD: Usage = Usage::new(LED_PAGE, 0x0020);
pub const LED_MICROPHONE: Usage = Usage::new(LED_PAGE, 0x0021);
pub const LED_ON_LINE: Usage = Usage::new(LED_PAGE, 0x002A);
pub const LED_OFF_LINE: Usage = Usage::new(LED_PAGE, 0x002B);

// Telephony page (0x0B)
pub const TEL_HOOK_SWITCH: Usage = Usage::new(TELEPHONY_PAGE, 0x0020);
pub const TEL_FLASH: Usage = Usage::new(TELEPHONY_PAGE, 0x0021);
pub const TEL_FEATURE: Usage = Usage::new(TELEPHONY_PAGE, 0x0022);
pub const TEL_HOLD: Usage = Usage::new(TELEPHONY_PAGE, 0x0023);
pub const TEL_REDIAL: Usage = Usage::new(TELEPHONY_PAGE, 0x0024);
pub const TEL_TRANSFER: Usage = Usage::new(TELEPHONY_PAGE, 0x0025);
pub const TEL_DROP: Usage = Usage::new(TELEPHONY_PAGE, 0x0026);
pub const TEL_PARK: Usage = Usage::new(TELEPHONY_PAGE, 0x0027);
pub const TEL_FORWARD: Usage = Usage::new(TELEPHONY_PAGE, 0x0028);
pub const TEL_ALTERNATE: Usage = Usage::new(TELEPHONY_PAGE, 0x0029);
pub const TEL_LINE: Usage = Usage::new(TELEPHONY_PAGE, 0x002A);
pub const TEL_SPEAKER: Usage = Usage::new(TELEPHONY_PAGE, 0x002B);
pub const TEL_CONFERENCE: Usage = Usage::new(TELEPHONY_PAGE, 0x002C);
pub const TEL_RING_ENABLE: Usage = Usage::new(TELEPHONY_PAGE, 0x002D);
pub const TEL_RING_SELECT: Usage = Usage::new(TELEPHONY_PAGE, 0x002E);
pub const TEL_PHONE_MUTE: Usage = Usage::new(TELEPHONY_PAGE, 0x002F);
pub const TEL_CALLER: Usage = Usage::new(TELEPHONY_PAGE, 0x0030);
pub const TEL_SEND: Usage = Usage::new(TELEPHONY_PAGE, 0x0031);
pub const TEL_VOICE_MAIL: Usage = Usage::new(TELEPHONY_PAGE, 0x0070);
pub const TEL_RINGER: Usage = Usage::new(TELEPHONY_PAGE, 0x009E);
pub const TEL_PHONE_KEY_0: Usage = Usage::new(TELEPHONY_PAGE, 0x00B0);
pub const TEL_PHONE_KEY_1: Usage = Usage::new(TELEPHONY_PAGE, 0x00B1);
pub const TEL_PHONE_KEY_2: Usage = Usage::new(TELEPHONY_PAGE, 0x00B2);
pub const TEL_PHONE_KEY_3: Usage = Usage::new(TELEPHONY_PAGE, 0x00B3);
pub const TEL_PHONE_KEY_4: Usage = Usage::new(TELEPHONY_PAGE, 0x00B4);
pub const TEL_PHONE_KEY_5: Usage = Usage::new(TELEPHONY_PAGE, 0x00B5);
pub const TEL_PHONE_KEY_6: Usage = Usage::new(TELEPHONY_PAGE, 0x00B6);
pub const TEL_PHONE_KEY_7: Usage = Usage::new(TELEPHONY_PAGE, 0x00B7);
pub const TEL_PHONE_KEY_8: Usage = Usage::new(TELEPHONY_PAGE, 0x00B8);
pub const TEL_PHONE_KEY_9: Usage = Usage::new(TELEPHONY_PAGE, 0x00B9);
pub const TEL_PHONE_KEY_STAR: Usage = Usage::new(TELEPHONY_PAGE, 0x00BA);
pub const TEL_PHONE_KEY_POUND: Usage = Usage::new(TELEPHONY_PAGE, 0x00BB);
pub const TEL_PHONE_KEY_A: Usage = Usage::new(TELEPHONY_PAGE, 0x00BC);
pub const TEL_PHONE_KEY_B: Usage = Usage::new(TELEPHONY_PAGE, 0x00BD);
pub const TEL_PHONE_KEY_C: Usage = Usage::new(TELEPHONY_PAGE, 0x00BE);
pub const TEL_PHONE_KEY_D: Usage = Usage::new(TELEPHONY_PAGE, 0x00BF);
pub const TEL_CONTROL: Usage = Usage::new(TELEPHONY_PAGE, 0xFFFF);

// Consumer page (0x0C)
pub const CON_VOLUME_INCREMENT: Usage = Usage::new(CONSUMER_PAGE, 0x00E9);
pub const CON_VOLUME_DECREMENT: Usage = Usage::new(CONSUMER_PAGE, 0x00EA);

/// Human-readable name of the page an extended usage code belongs to.
///
/// Diagnostics only; control decisions never depend on it.
#[must_use]
pub fn page_name(usage_code: u32) -> &'static str {
    match Usage::from_code(usage_code).page {
        TELEPHONY_PAGE => "TelephonyUsagePage",
        CONSUMER_PAGE => "ConsumerUsagePage",
        LED_PAGE => "LEDUsagePage",
        BUTTON_PAGE => "ButtonUsagePage",
        _ => "not translated",
    }
}

/// Direction of a HID report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportType {
    /// Device to host
    Input,
    /// Host to device
    Output,
    /// Bidirectional configuration
    Feature,
}

impl ReportType {
    /// All report types, in descriptor dump order.
    pub const ALL: [Self; 3] = [Self::Input, Self::Output, Self::Feature];

    /// Wire value used by the hiddev interface.
    #[must_use]
    pub const fn as_raw(self) -> u32 {
        match self {
            Self::Input => 1,
            Self::Output => 2,
            Self::Feature => 3,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Input => "INPUT",
            Self::Output => "OUTPUT",
            Self::Feature => "FEATURE",
        }
    }
}

/// A logical control point: which usage, in which kind of report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UsageKey {
    pub report_type: ReportType,
    pub usage: Usage,
}

impl UsageKey {
    #[must_use]
    pub const fn new(report_type: ReportType, usage: Usage) -> Self {
        Self { report_type, usage }
    }

    #[must_use]
    pub const fn output(usage: Usage) -> Self {
        Self::new(ReportType::Output, usage)
    }
}

impl fmt::Display for UsageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} usage {}", self.report_type.name().to_lowercase(), self.usage)
    }
}

/// Where a usage currently lives in the device's report/field space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UsageLocation {
    pub report_id: u32,
    pub field_index: u32,
    pub usage_index: u32,
}

/// Inclusive logical bounds of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRange {
    pub logical_minimum: i32,
    pub logical_maximum: i32,
}

impl FieldRange {
    #[must_use]
    pub const fn new(logical_minimum: i32, logical_maximum: i32) -> Self {
        Self { logical_minimum, logical_maximum }
    }

    #[must_use]
    pub fn contains(&self, value: i32) -> bool {
        (self.logical_minimum..=self.logical_maximum).contains(&value)
    }
}

impl fmt::Display for FieldRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.logical_minimum, self.logical_maximum)
    }
}

/// Answer to a usage lookup: its location, extended code and current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageRef {
    pub location: UsageLocation,
    pub usage_code: u32,
    pub value: i32,
}

/// Metadata of one report field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    pub report_id: u32,
    pub field_index: u32,
    pub maxusage: u32,
    pub flags: u32,
    pub physical: u32,
    pub logical: u32,
    pub application: u32,
    pub logical_range: FieldRange,
    pub physical_range: FieldRange,
    pub unit_exponent: u32,
    pub unit: u32,
}

/// Summary of one report of a given type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportInfo {
    pub report_type: ReportType,
    pub report_id: u32,
    pub num_fields: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_code_packs_page_in_high_half() {
        assert_eq!(TEL_HOOK_SWITCH.code(), 0x000B_0020);
        assert_eq!(LED_OFF_HOOK.code(), 0x0008_0017);
        assert_eq!(Usage::from_code(0x000C_00E9), CON_VOLUME_INCREMENT);
    }

    #[test]
    fn test_page_names() {
        assert_eq!(page_name(TEL_RINGER.code()), "TelephonyUsagePage");
        assert_eq!(page_name(CON_VOLUME_DECREMENT.code()), "ConsumerUsagePage");
        assert_eq!(page_name(LED_RING.code()), "LEDUsagePage");
        assert_eq!(page_name(0x0009_0001), "ButtonUsagePage");
        assert_eq!(page_name(0xFF30_0001), "not translated");
    }

    #[test]
    fn test_field_range_is_inclusive() {
        let range = FieldRange::new(0, 1);
        assert!(range.contains(0));
        assert!(range.contains(1));
        assert!(!range.contains(-1));
        assert!(!range.contains(5));
    }

    #[test]
    fn test_report_type_wire_values() {
        assert_eq!(ReportType::Input.as_raw(), 1);
        assert_eq!(ReportType::Output.as_raw(), 2);
        assert_eq!(ReportType::Feature.as_raw(), 3);
    }
}
