//! Usage resolution: logical usage key to current report/field location.

use tracing::trace;

use crate::backend::HidBackend;
use crate::error::{Error, Result};
use crate::usage::{FieldInfo, UsageKey, UsageRef};

/// A usage resolved against the device, valid for a single transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub key: UsageKey,
    pub usage: UsageRef,
    pub field: FieldInfo,
}

/// Resolves usage keys through the device on every call.
///
/// Nothing is cached: indices are not guaranteed stable across requests, so
/// each transaction pays for a lookup plus a field query.
pub struct Resolver<'a, D> {
    device: &'a D,
}

impl<'a, D: HidBackend> Resolver<'a, D> {
    #[must_use]
    pub fn new(device: &'a D) -> Self {
        Self { device }
    }

    /// Look up `key` and the metadata of the field that owns it.
    ///
    /// # Errors
    /// Returns [`Error::Resolution`] if either query is rejected.
    pub fn resolve(&self, key: UsageKey) -> Result<Resolved> {
        let usage = self
            .device
            .find_usage(key.report_type, key.usage.code())
            .map_err(|source| Error::Resolution { key, source })?;

        let field = self
            .device
            .field_info(key.report_type, usage.location.report_id, usage.location.field_index)
            .map_err(|source| Error::Resolution { key, source })?;

        trace!(
            %key,
            report_id = usage.location.report_id,
            field_index = usage.location.field_index,
            usage_index = usage.location.usage_index,
            range = %field.logical_range,
            "Usage resolved"
        );

        Ok(Resolved { key, usage, field })
    }
}
