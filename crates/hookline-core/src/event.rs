//! Hardware event records as delivered by the device.

use crate::error::{Error, Result};
use crate::usage::Usage;

/// Size of one event record on the wire: `u32` usage code, `i32` value.
pub const EVENT_RECORD_SIZE: usize = 8;
/// Maximum number of records read per wake-up.
pub const EVENT_BATCH: usize = 64;

/// A usage value change reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HidEvent {
    /// Extended usage code (`page << 16 | id`)
    pub usage_code: u32,
    pub value: i32,
}

impl HidEvent {
    #[must_use]
    pub const fn new(usage: Usage, value: i32) -> Self {
        Self { usage_code: usage.code(), value }
    }

    #[must_use]
    pub const fn usage(&self) -> Usage {
        Usage::from_code(self.usage_code)
    }

    /// Decode a buffer of native-endian event records.
    ///
    /// Trailing bytes that do not form a whole record are dropped.
    ///
    /// # Errors
    /// Returns [`Error::ShortRead`] if `bytes` holds less than one record.
    pub fn decode_batch(bytes: &[u8]) -> Result<Vec<Self>> {
        if bytes.len() < EVENT_RECORD_SIZE {
            return Err(Error::ShortRead { got: bytes.len(), need: EVENT_RECORD_SIZE });
        }

        Ok(bytes
            .chunks_exact(EVENT_RECORD_SIZE)
            .map(|c| Self {
                usage_code: u32::from_ne_bytes([c[0], c[1], c[2], c[3]]),
                value: i32::from_ne_bytes([c[4], c[5], c[6], c[7]]),
            })
            .collect())
    }

    /// Wire form of this event.
    #[cfg(test)]
    pub(crate) fn to_bytes(self) -> [u8; EVENT_RECORD_SIZE] {
        let mut out = [0u8; EVENT_RECORD_SIZE];
        out[..4].copy_from_slice(&self.usage_code.to_ne_bytes());
        out[4..].copy_from_slice(&self.value.to_ne_bytes());
        out
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::usage::{CON_VOLUME_INCREMENT, TEL_HOOK_SWITCH, TEL_PHONE_MUTE};

    #[test]
    fn test_decode_batch_of_three() {
        let mut bytes = Vec::new();
        bytes.extend(HidEvent::new(TEL_HOOK_SWITCH, 1).to_bytes());
        bytes.extend(HidEvent::new(TEL_PHONE_MUTE, 0).to_bytes());
        bytes.extend(HidEvent::new(CON_VOLUME_INCREMENT, -1).to_bytes());

        let events = HidEvent::decode_batch(&bytes).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].usage(), TEL_HOOK_SWITCH);
        assert_eq!(events[0].value, 1);
        assert_eq!(events[2].value, -1);
    }

    #[test]
    fn test_less_than_one_record_is_short_read() {
        assert_matches!(HidEvent::decode_batch(&[0u8; 5]), Err(Error::ShortRead { got: 5, need: 8 }));
        assert_matches!(HidEvent::decode_batch(&[]), Err(Error::ShortRead { got: 0, .. }));
    }

    #[test]
    fn test_partial_trailing_record_is_dropped() {
        let mut bytes = HidEvent::new(TEL_PHONE_MUTE, 1).to_bytes().to_vec();
        bytes.extend([0xAA, 0xBB, 0xCC]);
        let events = HidEvent::decode_batch(&bytes).unwrap();
        assert_eq!(events, vec![HidEvent::new(TEL_PHONE_MUTE, 1)]);
    }
}
